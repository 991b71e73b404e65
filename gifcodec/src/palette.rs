// palette.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Palettes and Adobe Colour Table files
use crate::colour::{channels, ColourTable, CHANNELS, MAX_COLOURS};
use crate::error::{Error, Result};
use crate::stream::read_up_to;
use pix::rgb::SRgb8;
use std::io::{Read, Write};

/// Length of an Adobe Colour Table (.act) file
pub const ACT_LEN: usize = MAX_COLOURS * CHANNELS;

/// Palette of up to 256 distinct colours.
///
/// Adding a colour which is already present does nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    colours: Vec<SRgb8>,
}

impl Palette {
    /// Create an empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a palette with the distinct colours of a colour table
    pub fn from_colour_table(table: &ColourTable) -> Result<Self> {
        let mut palette = Palette::new();
        for clr in table.colours() {
            palette.add(*clr)?;
        }
        Ok(palette)
    }

    /// Read an Adobe Colour Table file.
    ///
    /// The stream must contain exactly 768 bytes.  Colours are loaded as
    /// they appear in the file, so saving the palette reproduces the file.
    pub fn from_act<R: Read>(reader: &mut R, param: &'static str) -> Result<Self> {
        let mut buf = vec![0; ACT_LEN + 1];
        let mut actual = read_up_to(reader, &mut buf)?;
        if actual > ACT_LEN {
            // count the rest, to report the actual length
            let mut rest = [0; 1024];
            loop {
                match read_up_to(reader, &mut rest)? {
                    0 => break,
                    n => actual += n,
                }
            }
        }
        if actual != ACT_LEN {
            return Err(Error::InvalidStreamLength {
                param,
                expected: ACT_LEN,
                actual,
            });
        }
        let colours = buf[..ACT_LEN]
            .chunks_exact(CHANNELS)
            .map(|c| SRgb8::new(c[0], c[1], c[2]))
            .collect();
        Ok(Palette { colours })
    }

    /// Write as an Adobe Colour Table file.
    ///
    /// Palettes with fewer than 256 colours are padded with black.
    pub fn write_act<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buf: Vec<u8> =
            self.colours.iter().flat_map(|c| channels(*c)).collect();
        buf.resize(ACT_LEN, 0);
        writer.write_all(&buf)?;
        Ok(())
    }

    /// Add a colour, unless it is already present
    pub fn add(&mut self, clr: SRgb8) -> Result<()> {
        if self.contains(clr) {
            return Ok(());
        }
        if self.colours.len() >= MAX_COLOURS {
            return Err(Error::TooManyColours);
        }
        self.colours.push(clr);
        Ok(())
    }

    /// Check whether a colour is present
    pub fn contains(&self, clr: SRgb8) -> bool {
        self.index_of(clr).is_some()
    }

    /// Find the index of a colour
    pub fn index_of(&self, clr: SRgb8) -> Option<usize> {
        self.colours.iter().position(|c| *c == clr)
    }

    /// Get the number of colours
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Get all colours
    pub fn colours(&self) -> &[SRgb8] {
        &self.colours
    }

    /// Convert to a colour table
    pub fn to_colour_table(&self) -> ColourTable {
        // a palette never holds more than 256 colours
        ColourTable::with_colours(&self.colours).unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn act_bytes() -> Vec<u8> {
        // includes duplicate colours, which must survive a round trip
        (0..ACT_LEN).map(|i| (i / 7) as u8).collect()
    }

    #[test]
    fn add_duplicate() -> Result<()> {
        let mut p = Palette::new();
        p.add(SRgb8::new(1, 2, 3))?;
        p.add(SRgb8::new(4, 5, 6))?;
        p.add(SRgb8::new(1, 2, 3))?;
        assert_eq!(p.len(), 2);
        assert_eq!(p.index_of(SRgb8::new(4, 5, 6)), Some(1));
        Ok(())
    }

    #[test]
    fn add_too_many() -> Result<()> {
        let mut p = Palette::new();
        for i in 0..256 {
            p.add(SRgb8::new(i as u8, 0, 0))?;
        }
        assert_eq!(p.len(), 256);
        // duplicate of a present colour is still fine
        p.add(SRgb8::new(7, 0, 0))?;
        let err = p.add(SRgb8::new(0, 1, 0)).unwrap_err();
        assert!(matches!(err, Error::TooManyColours));
        assert!(err.to_string().contains("maximum number of colours"));
        assert_eq!(p.len(), 256);
        Ok(())
    }

    #[test]
    fn act_round_trip() -> Result<()> {
        let bytes = act_bytes();
        let p = Palette::from_act(&mut Cursor::new(bytes.clone()), "reader")?;
        assert_eq!(p.len(), 256);
        let mut out = vec![];
        p.write_act(&mut out)?;
        assert_eq!(out, bytes);
        Ok(())
    }

    #[test]
    fn act_too_short() {
        let mut bytes = act_bytes();
        bytes.pop();
        let err = Palette::from_act(&mut Cursor::new(bytes), "reader")
            .unwrap_err();
        match &err {
            Error::InvalidStreamLength {
                param,
                expected,
                actual,
            } => {
                assert_eq!(*param, "reader");
                assert_eq!(*expected, 768);
                assert_eq!(*actual, 767);
            }
            _ => panic!("expected stream length error"),
        }
        let msg = err.to_string();
        assert!(msg.contains("768 bytes"));
        assert!(msg.contains("767"));
    }

    #[test]
    fn act_too_long() {
        let mut bytes = act_bytes();
        bytes.extend_from_slice(&[0; 2000]);
        match Palette::from_act(&mut Cursor::new(bytes), "reader") {
            Err(Error::InvalidStreamLength { actual, .. }) => {
                assert_eq!(actual, 2768)
            }
            _ => panic!("expected stream length error"),
        }
    }

    #[test]
    fn short_palette_act() -> Result<()> {
        let mut p = Palette::new();
        p.add(SRgb8::new(9, 8, 7))?;
        let mut out = vec![];
        p.write_act(&mut out)?;
        assert_eq!(out.len(), ACT_LEN);
        assert_eq!(&out[..4], &[9, 8, 7, 0]);
        assert_eq!(p.to_colour_table().len(), 1);
        Ok(())
    }
}
