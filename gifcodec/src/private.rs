// private.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Private module for top-level items
use crate::decode::{Gif, MAX_IMAGE_SZ};
use crate::encode::StepEnc;
use crate::Result;
use std::io::{BufReader, Read, Write};

/// GIF stream decoder
///
/// ## Example: Get a `Raster` from a GIF
/// ```
/// use gifcodec::{Component, Decoder, ErrorState};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` as "gif"
/// let gif = Decoder::new(gif).decode()?;
/// // was any part of the stream malformed?
/// assert_eq!(gif.consolidated_state(), ErrorState::OK);
/// for frame in gif.frames() {
///     let raster = frame.raster();
///     // ... work with raster
/// }
/// # Ok(())
/// # }
/// ```
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
}

impl<R: Read> Decoder<R> {
    /// Create a new GIF decoder.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(MAX_IMAGE_SZ),
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    ///
    /// This limits both the logical screen and each frame. A screen over
    /// the limit records `IMAGE_TOO_LARGE` and no frames are decoded; a
    /// frame over the limit records it and its image data is skipped.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Decode the whole stream.
    ///
    /// Only a failure of the reader is an `Err`; malformed data is recorded
    /// in the consolidated state of the result.
    pub fn decode(self) -> Result<Gif> {
        let mut reader = BufReader::new(self.reader);
        Gif::read(&mut reader, self.max_image_sz)
    }
}

/// GIF stream encoder
///
/// ## Encoding Example
/// ```
/// use gifcodec::{ColourTable, Encoder, Step};
/// use pix::rgb::SRgb8;
/// use std::error::Error;
/// use std::io::Write;
///
/// fn encode<W: Write>(mut w: W) -> Result<(), Box<dyn Error>> {
///     let mut enc = Encoder::new(&mut w).into_step_enc();
///     let table = ColourTable::with_colours(&[
///         SRgb8::new(0xFF, 0, 0),
///         SRgb8::new(0xFF, 0xFF, 0),
///     ])?;
///     let pixels = vec![1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1];
///     let step = Step::with_indexed(4, 4, pixels, table)?;
///     enc.encode_step(&step)?;
///     enc.finish()?;
///     Ok(())
/// }
/// # encode(Vec::new()).unwrap();
/// ```
pub struct Encoder<W: Write> {
    /// Writer for output data
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Create a new GIF encoder.
    pub fn new(writer: W) -> Self {
        Encoder { writer }
    }

    /// Convert into a step encoder.
    pub fn into_step_enc(self) -> StepEnc<W> {
        StepEnc::new(self.writer)
    }
}
