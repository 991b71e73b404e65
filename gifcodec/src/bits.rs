// bits.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Packed bit fields
use crate::error::{Error, Result};

/// Number of bits in a packed field byte
const BITS: usize = 8;

/// One byte of packed fields.
///
/// Bits are numbered MSB-first: bit 0 has weight 128 and bit 7 has
/// weight 1.  Runs of bits are read and written *in place*, so the value of
/// a run keeps the positional weight of its bits within the byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedByte(u8);

impl From<u8> for PackedByte {
    fn from(byte: u8) -> Self {
        PackedByte(byte)
    }
}

impl From<PackedByte> for u8 {
    fn from(packed: PackedByte) -> Self {
        packed.0
    }
}

impl PackedByte {
    /// Get the mask for a bit run
    fn mask(start: usize, length: usize) -> u8 {
        let run = (0xFFu16 << (BITS - length)) as u8;
        run >> start
    }

    /// Check a bit index
    fn check_index(index: usize) -> Result<()> {
        if index < BITS {
            Ok(())
        } else {
            Err(Error::out_of_range(
                "index",
                format!(
                    "Bit index must be between 0 and 7. Supplied index: {index}"
                ),
            ))
        }
    }

    /// Check a bit run
    fn check_run(start: usize, length: usize) -> Result<()> {
        if start >= BITS {
            return Err(Error::out_of_range(
                "start",
                format!(
                    "Start bit must be between 0 and 7. Supplied start: {start}"
                ),
            ));
        }
        if length == 0 || start + length > BITS {
            return Err(Error::out_of_range(
                "length",
                format!(
                    "Length must be greater than 0 and start + length must \
                     be 8 or less. Supplied start: {start}, length: {length}"
                ),
            ));
        }
        Ok(())
    }

    /// Get one bit
    pub fn bit(self, index: usize) -> Result<bool> {
        Self::check_index(index)?;
        Ok(self.0 & (0x80 >> index) != 0)
    }

    /// Set one bit
    pub fn set_bit(&mut self, index: usize, value: bool) -> Result<()> {
        Self::check_index(index)?;
        let m = 0x80 >> index;
        if value {
            self.0 |= m;
        } else {
            self.0 &= !m;
        }
        Ok(())
    }

    /// Get a run of bits, in place
    pub fn bits(self, start: usize, length: usize) -> Result<u8> {
        Self::check_run(start, length)?;
        Ok(self.0 & Self::mask(start, length))
    }

    /// Set a run of bits from an in-place value.
    ///
    /// Bits of `value` outside of the run are ignored.
    pub fn set_bits(
        &mut self,
        start: usize,
        length: usize,
        value: u8,
    ) -> Result<()> {
        Self::check_run(start, length)?;
        let m = Self::mask(start, length);
        self.0 = (self.0 & !m) | (value & m);
        Ok(())
    }

    /// Get a run of bits, shifted down to an integer
    pub(crate) fn field(self, start: usize, length: usize) -> u8 {
        debug_assert!(Self::check_run(start, length).is_ok());
        (self.0 & Self::mask(start, length)) >> (BITS - start - length)
    }

    /// Set a run of bits from an integer
    pub(crate) fn set_field(&mut self, start: usize, length: usize, value: u8) {
        debug_assert!(Self::check_run(start, length).is_ok());
        let m = Self::mask(start, length);
        self.0 = (self.0 & !m) | ((value << (BITS - start - length)) & m);
    }

    /// Get one bit at a known-good index
    pub(crate) fn flag(self, index: usize) -> bool {
        debug_assert!(index < BITS);
        self.0 & (0x80 >> index) != 0
    }

    /// Set one bit at a known-good index
    pub(crate) fn set_flag(&mut self, index: usize, value: bool) {
        self.set_field(index, 1, value as u8);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bit_round_trip() -> Result<()> {
        for byte in [0x00, 0xFF, 0xA5, 0x5A] {
            for i in 0..8 {
                for v in [false, true] {
                    let mut p = PackedByte::from(byte);
                    p.set_bit(i, v)?;
                    assert_eq!(p.bit(i)?, v);
                    let others = !(0x80u8 >> i);
                    assert_eq!(u8::from(p) & others, byte & others);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn msb_first() -> Result<()> {
        let p = PackedByte::from(0b1000_0001);
        assert!(p.bit(0)?);
        assert!(!p.bit(1)?);
        assert!(p.bit(7)?);
        Ok(())
    }

    #[test]
    fn bits_in_place() -> Result<()> {
        let p = PackedByte::from(0b0010_0000);
        assert_eq!(p.bits(2, 1)?, 32);
        let p = PackedByte::from(0b1111_1111);
        assert_eq!(p.bits(3, 3)?, 0b0001_1100);
        assert_eq!(p.bits(0, 8)?, 0xFF);
        Ok(())
    }

    #[test]
    fn bits_round_trip() -> Result<()> {
        for start in 0..8 {
            for length in 1..=(8 - start) {
                for value in [0x00, 0xFF, 0x55, 0x0F] {
                    let mut p = PackedByte::from(0xC3);
                    p.set_bits(start, length, value)?;
                    let m = PackedByte::mask(start, length);
                    assert_eq!(p.bits(start, length)?, value & m);
                    assert_eq!(u8::from(p) & !m, 0xC3 & !m);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn fields() {
        let mut p = PackedByte::default();
        p.set_field(3, 3, 2);
        assert_eq!(u8::from(p), 0b0000_1000);
        assert_eq!(p.field(3, 3), 2);
        p.set_flag(7, true);
        assert!(p.flag(7));
        assert_eq!(p.field(5, 3), 1);
    }

    #[test]
    fn index_out_of_range() {
        let mut p = PackedByte::default();
        match p.bit(8) {
            Err(Error::OutOfRange { param, msg }) => {
                assert_eq!(param, "index");
                assert_eq!(
                    msg,
                    "Bit index must be between 0 and 7. Supplied index: 8"
                );
            }
            _ => panic!("expected range error"),
        }
        assert!(p.set_bit(8, true).is_err());
    }

    #[test]
    fn run_out_of_range() {
        let mut p = PackedByte::default();
        match p.bits(8, 1) {
            Err(Error::OutOfRange { param, .. }) => assert_eq!(param, "start"),
            _ => panic!("expected range error"),
        }
        match p.bits(0, 0) {
            Err(Error::OutOfRange { param, msg }) => {
                assert_eq!(param, "length");
                assert_eq!(
                    msg,
                    "Length must be greater than 0 and start + length must \
                     be 8 or less. Supplied start: 0, length: 0"
                );
            }
            _ => panic!("expected range error"),
        }
        assert!(p.bits(5, 4).is_err());
        assert!(p.set_bits(7, 2, 0).is_err());
        assert!(p.set_bits(0, 9, 0).is_err());
    }
}
