// lib.rs      gifcodec crate.
//
// Copyright (c) 2026  gifcodec developers
//
//! GIF89a decoding and encoding, with frame compositing.
//!
//! Malformed input never aborts decoding: every component records what was
//! wrong with it in a [ComponentStatus], and the [consolidated
//! state](trait.Component.html#method.consolidated_state) of a decoded
//! [Gif] tells whether any part of the stream was non-conformant.
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod bits;
pub mod block;
mod colour;
mod compose;
mod decode;
mod encode;
mod error;
mod frame;
mod image_data;
pub mod lzw;
mod palette;
mod private;
mod status;
mod stream;

pub use crate::bits::PackedByte;
pub use crate::colour::{ColourTable, MAX_COLOURS};
pub use crate::decode::Gif;
pub use crate::encode::{Step, StepEnc};
pub use crate::error::{Error, Result};
pub use crate::frame::GifFrame;
pub use crate::image_data::{IndexedPixels, TableBasedImageData};
pub use crate::palette::{Palette, ACT_LEN};
pub use crate::private::{Decoder, Encoder};
pub use crate::status::{Component, ComponentStatus, ErrorState};
