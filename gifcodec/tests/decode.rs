use gifcodec::block::{
    DisposalMethod, Header, ImageDesc, LogicalScreenDesc,
};
use gifcodec::{
    ColourTable, Component, Decoder, Encoder, ErrorState, Gif, Step,
    TableBasedImageData,
};
use pix::rgb::{SRgb8, SRgba8};
use std::error::Error;
use std::io::Cursor;

#[rustfmt::skip]
const GIF_3X5: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x03, 0x00,
    0x05, 0x00, 0x91, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00,
    0x05, 0x00, 0x00, 0x08, 0x0B, 0x00, 0x03, 0x00,
    0x18, 0x28, 0x70, 0xA0, 0xC1, 0x83, 0x01, 0x01,
    0x00, 0x3B,
];

#[rustfmt::skip]
const GIF_10X10: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00,
    0x0A, 0x00, 0x91, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
    0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
    0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00,
    0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
    0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75,
    0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04,
    0x91, 0x4C, 0x01, 0x00, 0x3B,
];

#[rustfmt::skip]
const IMAGE_10X10: [u8; 100] = [
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
    1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
    1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
    2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
    2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
];

fn black() -> SRgba8 {
    SRgba8::new(0, 0, 0, 255)
}

fn white() -> SRgba8 {
    SRgba8::new(255, 255, 255, 255)
}

fn red() -> SRgba8 {
    SRgba8::new(255, 0, 0, 255)
}

fn green() -> SRgba8 {
    SRgba8::new(0, 255, 0, 255)
}

fn clear() -> SRgba8 {
    SRgba8::new(0, 0, 0, 0)
}

#[test]
fn canonical_3x5() -> Result<(), Box<dyn Error>> {
    let gif = Decoder::new(GIF_3X5).decode()?;
    assert_eq!(gif.consolidated_state(), ErrorState::OK);
    assert_eq!(gif.frames().len(), 1);
    let frame = &gif.frames()[0];
    let data = frame.image_data();
    assert_eq!(data.lzw_minimum_code_size(), 8);
    assert_eq!(data.clear_code(), 256);
    assert_eq!(data.end_of_information(), 257);
    assert_eq!(data.initial_code_size(), 9);
    let raster = frame.raster();
    assert_eq!((raster.width(), raster.height()), (3, 5));
    #[rustfmt::skip]
    let expected = [
        white(), black(), black(),
        black(), white(), black(),
        black(), black(), black(),
        black(), black(), black(),
        black(), black(), black(),
    ];
    assert_eq!(raster.pixels(), &expected[..]);
    Ok(())
}

#[test]
fn sample_10x10() -> Result<(), Box<dyn Error>> {
    let gif = Decoder::new(GIF_10X10).decode()?;
    assert_eq!(gif.consolidated_state(), ErrorState::OK);
    let frame = &gif.frames()[0];
    assert_eq!(frame.image_data().indices(), &IMAGE_10X10[..]);
    assert_eq!(frame.disposal_method(), DisposalMethod::NotSpecified);
    assert_eq!(frame.delay_time_cs(), Some(0));
    let raster = frame.raster();
    assert_eq!(raster.pixel(0, 0), red());
    assert_eq!(raster.pixel(9, 0), SRgba8::new(0, 0, 255, 255));
    assert_eq!(raster.pixel(4, 4), white());
    let mut out = vec![];
    gif.write_to_stream(&mut out)?;
    assert_eq!(out, GIF_10X10);
    Ok(())
}

#[test]
fn truncated_everywhere() -> Result<(), Box<dyn Error>> {
    for len in 0..GIF_10X10.len() {
        let gif = Gif::from_stream(&mut Cursor::new(&GIF_10X10[..len]))?;
        assert_ne!(gif.consolidated_state(), ErrorState::OK, "len: {len}");
        if len > 6 {
            assert!(gif.test_state(ErrorState::END_OF_INPUT_STREAM));
        }
        for frame in gif.frames() {
            let raster = frame.raster();
            assert_eq!((raster.width(), raster.height()), (10, 10));
        }
    }
    Ok(())
}

#[test]
fn truncated_image_data() -> Result<(), Box<dyn Error>> {
    let gif = Decoder::new(&GIF_10X10[..55]).decode()?;
    let frame = &gif.frames()[0];
    assert_eq!(frame.image_data().indices().len(), 100);
    assert!(frame.test_state(
        ErrorState::DATA_BLOCK_TOO_SHORT
            | ErrorState::TOO_FEW_PIXELS_IN_IMAGE_DATA
    ));
    assert!(!frame.consolidated_messages().is_empty());
    Ok(())
}

#[test]
fn max_image_sz() -> Result<(), Box<dyn Error>> {
    // screen over the limit
    let gif = Decoder::new(GIF_10X10).max_image_sz(Some(99)).decode()?;
    assert!(gif.frames().is_empty());
    assert_eq!(gif.consolidated_state(), ErrorState::IMAGE_TOO_LARGE);
    // 2x2 screen, frame over the limit
    let mut bytes = GIF_10X10.to_vec();
    bytes[6..10].copy_from_slice(&[0x02, 0x00, 0x02, 0x00]);
    let gif = Decoder::new(&bytes[..]).max_image_sz(Some(50)).decode()?;
    assert_eq!(gif.frames().len(), 1);
    let frame = &gif.frames()[0];
    assert_eq!(
        frame.error_state(),
        ErrorState::IMAGE_TOO_LARGE | ErrorState::NO_IMAGE_DATA
    );
    let raster = frame.raster();
    assert_eq!((raster.width(), raster.height()), (2, 2));
    assert!(raster.pixels().iter().all(|p| *p == clear()));
    let gif = Decoder::new(GIF_10X10).max_image_sz(None).decode()?;
    assert_eq!(gif.consolidated_state(), ErrorState::OK);
    Ok(())
}

#[test]
fn interlaced() -> Result<(), Box<dyn Error>> {
    let colours: Vec<SRgb8> =
        (0..8).map(|i| SRgb8::new(i * 30, 0, 0)).collect();
    let tbl = ColourTable::with_colours(&colours)?;
    // rows stored in interlace order
    let pixels = [0, 4, 2, 6, 1, 3, 5, 7];
    let data = TableBasedImageData::encode(&pixels, 3)?;
    let mut bytes = vec![];
    Header::default().write_to_stream(&mut bytes)?;
    LogicalScreenDesc::default()
        .with_screen_width(1)
        .with_screen_height(8)
        .with_colour_table(Some(&tbl))
        .write_to_stream(&mut bytes)?;
    tbl.write_to_stream(&mut bytes)?;
    ImageDesc::default()
        .with_width(1)
        .with_height(8)
        .with_interlaced(true)
        .write_to_stream(&mut bytes)?;
    data.write_to_stream(&mut bytes)?;
    bytes.push(0x3B);
    let gif = Decoder::new(&bytes[..]).decode()?;
    assert_eq!(gif.consolidated_state(), ErrorState::OK);
    let raster = gif.frames()[0].raster();
    for y in 0..8 {
        assert_eq!(raster.pixel(0, y), SRgba8::new(y as u8 * 30, 0, 0, 255));
    }
    Ok(())
}

#[test]
fn disposal_methods() -> Result<(), Box<dyn Error>> {
    let tbl = ColourTable::with_colours(&[
        SRgb8::new(255, 0, 0),
        SRgb8::new(0, 255, 0),
    ])?;
    let mut enc = Encoder::new(vec![]).into_step_enc();
    // frame 0: red background
    enc.encode_step(&Step::with_indexed(2, 2, vec![0; 4], tbl.clone())?)?;
    // frame 1: green corner, restored to background afterwards
    let step = Step::with_indexed(1, 1, vec![1], tbl.clone())?
        .with_disposal_method(DisposalMethod::RestoreToBackgroundColour);
    enc.encode_step(&step)?;
    // frame 2: transparent pixel, restored to previous afterwards
    let step = Step::with_indexed(1, 1, vec![0], tbl.clone())?
        .with_transparent_colour(Some(0))
        .with_disposal_method(DisposalMethod::RestoreToPrevious);
    enc.encode_step(&step)?;
    // frame 3: transparent pixel
    let step = Step::with_indexed(1, 1, vec![0], tbl)?
        .with_transparent_colour(Some(0));
    enc.encode_step(&step)?;
    let bytes = enc.finish()?;
    let gif = Decoder::new(&bytes[..]).decode()?;
    assert_eq!(gif.consolidated_state(), ErrorState::OK);
    let frames = gif.frames();
    assert_eq!(frames.len(), 4);
    let r = frames[0].raster();
    assert!(r.pixels().iter().all(|p| *p == red()));
    let r = frames[1].raster();
    assert_eq!(r.pixel(0, 0), green());
    assert_eq!(r.pixel(1, 1), red());
    // seeded from frame 0, with frame 1 area filled with background
    let r = frames[2].raster();
    assert_eq!(r.pixel(0, 0), clear());
    assert_eq!(r.pixel(1, 0), red());
    assert_eq!(r.pixel(1, 1), red());
    // seeded from frame 1
    let r = frames[3].raster();
    assert_eq!(r.pixel(0, 0), green());
    assert_eq!(r.pixel(1, 1), red());
    Ok(())
}

#[test]
fn comments_and_loops() -> Result<(), Box<dyn Error>> {
    let mut bytes = GIF_10X10[..25].to_vec();
    bytes.extend_from_slice(&[0x21, 0xFE, 0x05]);
    bytes.extend_from_slice(b"hello");
    bytes.push(0x00);
    bytes.extend_from_slice(&[0x21, 0xFF, 0x0B]);
    bytes.extend_from_slice(b"NETSCAPE2.0");
    bytes.extend_from_slice(&[0x03, 0x01, 0x05, 0x00, 0x00]);
    bytes.extend_from_slice(&GIF_10X10[25..]);
    let gif = Decoder::new(&bytes[..]).decode()?;
    assert_eq!(gif.consolidated_state(), ErrorState::OK);
    assert_eq!(gif.comments().len(), 1);
    assert_eq!(gif.comments()[0].text(), "hello");
    assert_eq!(gif.loop_count(), Some(5));
    assert_eq!(gif.frames()[0].image_data().indices(), &IMAGE_10X10[..]);
    Ok(())
}
