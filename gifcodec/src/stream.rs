// stream.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Byte stream primitives
use crate::bits::PackedByte;
use std::io::{self, ErrorKind, Read, Write};

/// Maximum length of one data sub-block
pub const SUB_BLOCK_SZ: usize = 0xFF;

/// Read into a buffer until it is full or input ends.
///
/// Returns the number of bytes read.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut len = 0;
    while len < buf.len() {
        match reader.read(&mut buf[len..]) {
            Ok(0) => break, // EOF
            Ok(n) => len += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(len)
}

/// Read one byte, or `None` at end of input
pub fn read_u8<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0; 1];
    match read_up_to(reader, &mut buf)? {
        1 => Ok(Some(buf[0])),
        _ => Ok(None),
    }
}

/// Read a little-endian 16-bit word, or `None` at end of input
pub fn read_u16<R: Read>(reader: &mut R) -> io::Result<Option<u16>> {
    let mut buf = [0; 2];
    match read_up_to(reader, &mut buf)? {
        2 => Ok(Some(u16::from_le_bytes(buf))),
        _ => Ok(None),
    }
}

/// Read a fixed-length ASCII string.
///
/// Returns the characters which were available; the string is shorter
/// than `len` at end of input.
pub fn read_ascii<R: Read>(reader: &mut R, len: usize) -> io::Result<String> {
    let mut buf = vec![0; len];
    let n = read_up_to(reader, &mut buf)?;
    buf.truncate(n);
    Ok(buf.into_iter().map(char::from).collect())
}

/// Reader for the fields of a fixed-layout record.
///
/// Fields past the end of input read as zero, and the reader remembers
/// that input ended.
pub struct FieldReader<'a, R: Read> {
    reader: &'a mut R,
    eof: bool,
}

impl<'a, R: Read> FieldReader<'a, R> {
    /// Create a new field reader
    pub fn new(reader: &'a mut R) -> Self {
        FieldReader { reader, eof: false }
    }

    /// Check whether input ended before all fields were read
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Read a byte field
    pub fn u8(&mut self) -> io::Result<u8> {
        match read_u8(self.reader)? {
            Some(v) => Ok(v),
            None => {
                self.eof = true;
                Ok(0)
            }
        }
    }

    /// Read a little-endian word field
    pub fn u16(&mut self) -> io::Result<u16> {
        match read_u16(self.reader)? {
            Some(v) => Ok(v),
            None => {
                self.eof = true;
                Ok(0)
            }
        }
    }

    /// Read a packed bit-field byte
    pub fn packed(&mut self) -> io::Result<PackedByte> {
        Ok(PackedByte::from(self.u8()?))
    }
}

/// Data sub-blocks read from a stream
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubBlocks {
    /// Contents of each sub-block (without size prefix)
    pub blocks: Vec<Vec<u8>>,
    /// Was a sub-block cut short by end of input?
    pub truncated: bool,
    /// Was the zero-size terminator found?
    pub terminated: bool,
}

/// Read data sub-blocks, up to and including the zero-size terminator
pub fn read_sub_blocks<R: Read>(reader: &mut R) -> io::Result<SubBlocks> {
    let mut sub_blocks = SubBlocks::default();
    while let Some(sz) = read_u8(reader)? {
        if sz == 0 {
            sub_blocks.terminated = true;
            break;
        }
        let mut buf = vec![0; usize::from(sz)];
        let n = read_up_to(reader, &mut buf)?;
        if n < buf.len() {
            buf.truncate(n);
            sub_blocks.truncated = true;
            if n > 0 {
                sub_blocks.blocks.push(buf);
            }
            break;
        }
        sub_blocks.blocks.push(buf);
    }
    Ok(sub_blocks)
}

/// Write one byte
pub fn write_u8<W: Write>(writer: &mut W, value: u8) -> io::Result<()> {
    writer.write_all(&[value])
}

/// Write a little-endian 16-bit word
pub fn write_u16<W: Write>(writer: &mut W, value: u16) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Write a string of single-byte characters, as read by [read_ascii]
pub fn write_ascii<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    let buf: Vec<u8> = s.chars().map(|c| c as u8).collect();
    writer.write_all(&buf)
}

/// Write data sub-blocks, followed by the zero-size terminator
pub fn write_sub_blocks<W: Write, B: AsRef<[u8]>>(
    writer: &mut W,
    blocks: &[B],
) -> io::Result<()> {
    for b in blocks {
        let b = b.as_ref();
        assert!(b.len() <= SUB_BLOCK_SZ);
        if !b.is_empty() {
            write_u8(writer, b.len() as u8)?; // block size
            writer.write_all(b)?;
        }
    }
    write_u8(writer, 0) // block size
}

/// Split data into sub-blocks of the maximum length
pub fn split_sub_blocks(data: &[u8]) -> Vec<Vec<u8>> {
    data.chunks(SUB_BLOCK_SZ).map(|c| c.to_vec()).collect()
}
