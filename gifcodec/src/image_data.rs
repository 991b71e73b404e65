// image_data.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Table-based image data
use crate::error::{Error, Result};
use crate::lzw::{Compressor, Decompressor, MAX_CODE_SIZE, MIN_CODE_SIZE};
use crate::status::{Component, ComponentStatus, ErrorState};
use crate::stream::{
    read_sub_blocks, read_u8, split_sub_blocks, write_sub_blocks, write_u8,
};
use std::io::{Read, Write};

/// Colour indices of an image, one per pixel in raster order.
///
/// A buffer is either growable, or has a fixed capacity which rejects
/// further pixels once full.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexedPixels {
    pixels: Vec<u8>,
    capacity: Option<usize>,
}

impl From<Vec<u8>> for IndexedPixels {
    fn from(pixels: Vec<u8>) -> Self {
        IndexedPixels {
            pixels,
            capacity: None,
        }
    }
}

impl IndexedPixels {
    /// Create an empty growable buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with a fixed capacity
    pub fn with_fixed_capacity(capacity: usize) -> Self {
        IndexedPixels {
            pixels: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Get the fixed capacity, if any
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Append one pixel
    pub fn push(&mut self, idx: u8) -> Result<()> {
        match self.capacity {
            Some(cap) if self.pixels.len() >= cap => {
                Err(Error::CapacityExceeded(cap))
            }
            _ => {
                self.pixels.push(idx);
                Ok(())
            }
        }
    }

    /// Append a slice of pixels.
    ///
    /// Nothing is appended if the slice does not fit.
    pub fn extend_from_slice(&mut self, indices: &[u8]) -> Result<()> {
        match self.capacity {
            Some(cap) if self.pixels.len() + indices.len() > cap => {
                Err(Error::CapacityExceeded(cap))
            }
            _ => {
                self.pixels.extend_from_slice(indices);
                Ok(())
            }
        }
    }

    /// Get the number of pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Check if there are no pixels
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Get the colour indices
    pub fn indices(&self) -> &[u8] {
        &self.pixels
    }
}

/// Get the LZW minimum code size for a number of colours
pub fn min_code_size_for(colours: usize) -> u8 {
    let mut bits = MIN_CODE_SIZE;
    while (1 << bits) < colours && bits < 8 {
        bits += 1;
    }
    bits
}

/// Table-based image data: LZW minimum code size and data sub-blocks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableBasedImageData {
    /// Decoded colour indices
    pixels: IndexedPixels,
    /// Minimum code size, as stored in the stream
    lzw_minimum_code_size: u8,
    /// Compressed data sub-blocks
    data_blocks: Vec<Vec<u8>>,
    /// Data-quality state
    status: ComponentStatus,
}

impl Component for TableBasedImageData {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl TableBasedImageData {
    /// Read image data, decoding `pixel_count` colour indices.
    ///
    /// Malformed data never fails: whatever was decoded is kept, padded
    /// with index 0 up to `pixel_count`, and the problem is recorded.
    pub fn from_stream<R: Read>(
        reader: &mut R,
        pixel_count: usize,
    ) -> Result<Self> {
        let (mut image_data, has_code_size) = Self::read_blocks(reader)?;
        if has_code_size {
            image_data.decode(pixel_count);
        }
        Ok(image_data)
    }

    /// Read image data without decoding it
    pub(crate) fn skip_stream<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self::read_blocks(reader)?.0)
    }

    /// Read the minimum code size and data sub-blocks.
    ///
    /// Also returns whether the minimum code size was present.
    fn read_blocks<R: Read>(reader: &mut R) -> Result<(Self, bool)> {
        let mut status = ComponentStatus::default();
        let lzw_minimum_code_size = match read_u8(reader)? {
            Some(sz) => sz,
            None => {
                status.record(
                    ErrorState::END_OF_INPUT_STREAM,
                    "Input ended before LZW minimum code size",
                );
                let image_data = TableBasedImageData {
                    status,
                    ..Default::default()
                };
                return Ok((image_data, false));
            }
        };
        let sb = read_sub_blocks(reader)?;
        if sb.truncated {
            status.record(
                ErrorState::DATA_BLOCK_TOO_SHORT,
                "Image data sub-block is shorter than its size",
            );
        }
        if !sb.terminated {
            status.record(
                ErrorState::END_OF_INPUT_STREAM,
                "Input ended before image data terminator",
            );
        }
        debug!(
            "image data: code size {lzw_minimum_code_size}, {} sub-blocks",
            sb.blocks.len()
        );
        let image_data = TableBasedImageData {
            pixels: IndexedPixels::new(),
            lzw_minimum_code_size,
            data_blocks: sb.blocks,
            status,
        };
        Ok((image_data, true))
    }

    /// Decode data sub-blocks into pixels
    fn decode(&mut self, pixel_count: usize) {
        if self.data_blocks.is_empty() {
            if pixel_count > 0 {
                self.status.record(
                    ErrorState::TOO_FEW_PIXELS_IN_IMAGE_DATA,
                    "Image data contains no data sub-blocks",
                );
            }
            return;
        }
        let mut buffer = Vec::with_capacity(pixel_count);
        if self.lzw_minimum_code_size > MAX_CODE_SIZE {
            self.status.record(
                ErrorState::BAD_LZW_MINIMUM_CODE_SIZE,
                format!(
                    "LZW minimum code size must be {MAX_CODE_SIZE} or less, \
                     but is {}",
                    self.lzw_minimum_code_size
                ),
            );
        } else {
            self.decompress(pixel_count, &mut buffer);
        }
        if buffer.len() > pixel_count {
            self.status.record(
                ErrorState::TOO_MANY_PIXELS_IN_IMAGE_DATA,
                format!(
                    "Image data has {} pixels, but image size is {pixel_count}",
                    buffer.len()
                ),
            );
            buffer.truncate(pixel_count);
        } else if buffer.len() < pixel_count {
            if !self.test_state(ErrorState::BAD_LZW_MINIMUM_CODE_SIZE) {
                self.status.record(
                    ErrorState::TOO_FEW_PIXELS_IN_IMAGE_DATA,
                    format!(
                        "Image data has {} pixels, but image size is \
                         {pixel_count}",
                        buffer.len()
                    ),
                );
            }
            buffer.resize(pixel_count, 0);
        }
        self.pixels = IndexedPixels::from(buffer);
    }

    /// Decompress data sub-blocks into a buffer
    fn decompress(&mut self, pixel_count: usize, buffer: &mut Vec<u8>) {
        let mut dec = Decompressor::new(self.code_size());
        for block in &self.data_blocks {
            if let Err(e) = dec.decompress(block, buffer) {
                self.status.record(
                    ErrorState::CODE_NOT_IN_DICTIONARY,
                    format!("{e} after {} pixels", buffer.len()),
                );
                return;
            }
            if dec.is_done() || buffer.len() > pixel_count {
                break;
            }
        }
        if !dec.is_done() && buffer.len() <= pixel_count {
            self.status.record(
                ErrorState::END_OF_INPUT_STREAM,
                "Image data ended before end of information code",
            );
        }
    }

    /// Encode colour indices.
    ///
    /// Every index must be less than `2 ^ lzw_minimum_code_size`, which
    /// must be between 2 and 11.
    pub fn encode(pixels: &[u8], lzw_minimum_code_size: u8) -> Result<Self> {
        if !(MIN_CODE_SIZE..=MAX_CODE_SIZE).contains(&lzw_minimum_code_size) {
            return Err(Error::out_of_range(
                "lzw_minimum_code_size",
                format!(
                    "LZW minimum code size must be between {MIN_CODE_SIZE} \
                     and {MAX_CODE_SIZE}. Supplied code size: \
                     {lzw_minimum_code_size}"
                ),
            ));
        }
        let clear_code = 1u16 << lzw_minimum_code_size;
        if let Some(idx) = pixels.iter().find(|p| u16::from(**p) >= clear_code)
        {
            return Err(Error::out_of_range(
                "pixels",
                format!(
                    "Colour index must be less than {clear_code}. Supplied \
                     index: {idx}"
                ),
            ));
        }
        let mut buffer = Vec::with_capacity(pixels.len() / 2);
        Compressor::new(lzw_minimum_code_size).compress(pixels, &mut buffer);
        Ok(TableBasedImageData {
            pixels: IndexedPixels::from(pixels.to_vec()),
            lzw_minimum_code_size,
            data_blocks: split_sub_blocks(&buffer),
            status: ComponentStatus::default(),
        })
    }

    /// Write the minimum code size and data sub-blocks
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, self.lzw_minimum_code_size)?;
        write_sub_blocks(w, &self.data_blocks)?;
        Ok(())
    }

    /// Get the decoded pixels
    pub fn pixels(&self) -> &IndexedPixels {
        &self.pixels
    }

    /// Get the decoded colour indices
    pub fn indices(&self) -> &[u8] {
        self.pixels.indices()
    }

    /// Get the minimum code size, as stored in the stream
    pub fn lzw_minimum_code_size(&self) -> u8 {
        self.lzw_minimum_code_size
    }

    /// Get the minimum code size used for coding
    fn code_size(&self) -> u8 {
        self.lzw_minimum_code_size.clamp(MIN_CODE_SIZE, MAX_CODE_SIZE)
    }

    /// Get the clear code
    pub fn clear_code(&self) -> u16 {
        1 << self.code_size()
    }

    /// Get the end of information code
    pub fn end_of_information(&self) -> u16 {
        self.clear_code() + 1
    }

    /// Get the initial code size (bits)
    pub fn initial_code_size(&self) -> u8 {
        self.code_size() + 1
    }

    /// Get the compressed data sub-blocks
    pub fn data_blocks(&self) -> &[Vec<u8>] {
        &self.data_blocks
    }
}
