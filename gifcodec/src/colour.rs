// colour.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Colour tables
use crate::error::{Error, Result};
use crate::status::{Component, ComponentStatus, ErrorState};
use crate::stream::read_up_to;
use pix::el::Pixel;
use pix::rgb::{Rgb, SRgb8, SRgba8};
use std::io::{Read, Write};

/// Number of channels in a colour table entry
pub(crate) const CHANNELS: usize = 3;

/// Maximum number of colours in a table
pub const MAX_COLOURS: usize = 256;

/// Get the red, green and blue channels of a colour
pub(crate) fn channels(clr: SRgb8) -> [u8; CHANNELS] {
    [
        u8::from(Rgb::red(clr)),
        u8::from(Rgb::green(clr)),
        u8::from(Rgb::blue(clr)),
    ]
}

/// Make a colour with an alpha channel
pub(crate) fn with_alpha(clr: SRgb8, alpha: u8) -> SRgba8 {
    let [red, green, blue] = channels(clr);
    SRgba8::new(red, green, blue, alpha)
}

/// Split a colour into RGB and alpha channels
pub(crate) fn split_alpha(clr: SRgba8) -> (SRgb8, u8) {
    let rgb = SRgb8::new(
        u8::from(Rgb::red(clr)),
        u8::from(Rgb::green(clr)),
        u8::from(Rgb::blue(clr)),
    );
    (rgb, u8::from(Pixel::alpha(clr)))
}

/// Check a number of colours
fn check_len(len: usize) -> Result<()> {
    if len <= MAX_COLOURS {
        Ok(())
    } else {
        Err(Error::out_of_range(
            "colours",
            format!(
                "The number of colours must be between 0 and 256. \
                 Supplied number of colours: {len}"
            ),
        ))
    }
}

/// Ordered table of up to 256 RGB colours
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColourTable {
    /// Colours in table order
    colours: Vec<SRgb8>,
    /// Data-quality state
    status: ComponentStatus,
}

impl Component for ColourTable {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl ColourTable {
    /// Create an empty colour table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a colour table from a slice of colours
    pub fn with_colours(colours: &[SRgb8]) -> Result<Self> {
        check_len(colours.len())?;
        Ok(ColourTable {
            colours: colours.to_vec(),
            status: ComponentStatus::default(),
        })
    }

    /// Read a colour table with a given number of colours.
    ///
    /// A stream which ends early is not an error: every colour of the table
    /// is black, and the table is flagged `COLOUR_TABLE_TOO_SHORT`.
    pub fn from_stream<R: Read>(reader: &mut R, len: usize) -> Result<Self> {
        check_len(len)?;
        let mut buf = vec![0; len * CHANNELS];
        let n = read_up_to(reader, &mut buf)?;
        let mut status = ComponentStatus::default();
        if n < buf.len() {
            status.record(
                ErrorState::COLOUR_TABLE_TOO_SHORT,
                format!(
                    "Colour table should be {} bytes, but only {n} bytes \
                     were read",
                    buf.len()
                ),
            );
            let colours = vec![SRgb8::new(0, 0, 0); len];
            return Ok(ColourTable { colours, status });
        }
        let colours = buf
            .chunks_exact(CHANNELS)
            .map(|c| SRgb8::new(c[0], c[1], c[2]))
            .collect();
        Ok(ColourTable { colours, status })
    }

    /// Write the colours as a flat run of RGB bytes
    pub fn write_to_stream<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Get the colours as a flat run of RGB bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.colours.iter().flat_map(|c| channels(*c)).collect()
    }

    /// Add a colour to the end of the table
    pub fn push(&mut self, clr: SRgb8) -> Result<()> {
        if self.colours.len() < MAX_COLOURS {
            self.colours.push(clr);
            Ok(())
        } else {
            Err(Error::TooManyColours)
        }
    }

    /// Pad with black up to the length implied by the size bits
    pub fn pad_to_size_bits(&mut self) {
        let len = self.padded_len();
        self.colours.resize(len, SRgb8::new(0, 0, 0));
    }

    /// Get the length which fills a GIF colour table of this size
    pub fn padded_len(&self) -> usize {
        2 << Self::size_bits_for(self.colours.len())
    }

    /// Get the number of colours
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Get a colour by index
    pub fn get(&self, idx: usize) -> Option<SRgb8> {
        self.colours.get(idx).copied()
    }

    /// Get all colours
    pub fn colours(&self) -> &[SRgb8] {
        &self.colours
    }

    /// Get the size bits declared for this table in packed fields.
    ///
    /// A table of 2^(n+1) colours has n size bits.  Lengths which are not
    /// a power of two have 0 size bits.
    pub fn size_bits(&self) -> u8 {
        let len = self.colours.len();
        if len.is_power_of_two() && len >= 2 {
            len.trailing_zeros() as u8 - 1
        } else {
            0
        }
    }

    /// Get the smallest size bits for a table holding `len` colours
    fn size_bits_for(len: usize) -> u8 {
        let len = len.clamp(2, MAX_COLOURS).next_power_of_two();
        len.trailing_zeros() as u8 - 1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn rainbow(n: usize) -> Vec<SRgb8> {
        (0..n)
            .map(|i| SRgb8::new(i as u8, (i * 7) as u8, (255 - i) as u8))
            .collect()
    }

    #[test]
    fn round_trip() -> Result<()> {
        for n in [0, 1, 2, 3, 100, 256] {
            let table = ColourTable::with_colours(&rainbow(n))?;
            let mut buf = vec![];
            table.write_to_stream(&mut buf)?;
            assert_eq!(buf.len(), n * 3);
            let read = ColourTable::from_stream(&mut Cursor::new(buf), n)?;
            assert_eq!(read.colours(), &rainbow(n)[..]);
            assert_eq!(read.error_state(), ErrorState::OK);
        }
        Ok(())
    }

    #[test]
    fn too_short() -> Result<()> {
        let table = ColourTable::from_stream(&mut Cursor::new(vec![]), 4)?;
        assert_eq!(table.len(), 4);
        let black = SRgb8::new(0, 0, 0);
        assert!(table.colours().iter().all(|c| *c == black));
        assert!(table.test_state(ErrorState::COLOUR_TABLE_TOO_SHORT));
        // partial colours read are not kept
        let bytes = vec![1, 2, 3, 4, 5, 6, 7];
        let table = ColourTable::from_stream(&mut Cursor::new(bytes), 4)?;
        assert_eq!(table.len(), 4);
        assert!(table.colours().iter().all(|c| *c == black));
        assert_eq!(table.get(4), None);
        assert_eq!(table.error_state(), ErrorState::COLOUR_TABLE_TOO_SHORT);
        Ok(())
    }

    #[test]
    fn too_many() {
        match ColourTable::from_stream(&mut Cursor::new(vec![]), 257) {
            Err(Error::OutOfRange { param, msg }) => {
                assert_eq!(param, "colours");
                assert_eq!(
                    msg,
                    "The number of colours must be between 0 and 256. \
                     Supplied number of colours: 257"
                );
            }
            _ => panic!("expected range error"),
        }
        let mut table = ColourTable::with_colours(&rainbow(256)).unwrap();
        assert!(matches!(
            table.push(SRgb8::new(1, 1, 1)),
            Err(Error::TooManyColours)
        ));
    }

    #[test]
    fn size_bits() -> Result<()> {
        let bits = |n| ColourTable::with_colours(&rainbow(n)).unwrap().size_bits();
        assert_eq!(bits(0), 0);
        assert_eq!(bits(2), 0);
        assert_eq!(bits(4), 1);
        assert_eq!(bits(8), 2);
        assert_eq!(bits(128), 6);
        assert_eq!(bits(256), 7);
        assert_eq!(bits(3), 0);
        assert_eq!(bits(100), 0);
        let mut table = ColourTable::with_colours(&rainbow(5))?;
        assert_eq!(table.padded_len(), 8);
        table.pad_to_size_bits();
        assert_eq!(table.len(), 8);
        assert_eq!(table.size_bits(), 2);
        assert_eq!(ColourTable::new().padded_len(), 2);
        Ok(())
    }
}
