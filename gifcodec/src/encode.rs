// encode.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Whole stream encoding
use crate::block::{
    Application, BlockCode, DisposalMethod, GraphicControl, Header, ImageDesc,
    LogicalScreenDesc,
};
use crate::colour::{channels, split_alpha, ColourTable, MAX_COLOURS};
use crate::error::{Error, Result};
use crate::image_data::{min_code_size_for, TableBasedImageData};
use crate::palette::Palette;
use pix::rgb::{SRgb8, SRgba8};
use pix::Raster;
use std::collections::HashMap;
use std::io::Write;

/// Raster of an animation step
enum StepRaster {
    /// True colour raster
    TrueColour(Raster<SRgba8>),
    /// Colour indices, with a colour table
    Indexed {
        width: u16,
        height: u16,
        pixels: Vec<u8>,
        colour_table: ColourTable,
    },
}

impl Clone for StepRaster {
    fn clone(&self) -> Self {
        match self {
            StepRaster::TrueColour(r) => {
                StepRaster::TrueColour(Raster::with_raster(r))
            }
            StepRaster::Indexed {
                width,
                height,
                pixels,
                colour_table,
            } => StepRaster::Indexed {
                width: *width,
                height: *height,
                pixels: pixels.clone(),
                colour_table: colour_table.clone(),
            },
        }
    }
}

/// One step of an animation
#[derive(Clone)]
pub struct Step {
    /// Raster of the step
    raster: StepRaster,
    /// Graphic control for the step
    graphic_control: Option<GraphicControl>,
}

/// Frame ready to write
struct IndexedFrame {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    colour_table: ColourTable,
    transparent_colour: Option<u8>,
}

/// Convert raster dimensions
fn dimensions(raster: &Raster<SRgba8>) -> Result<(u16, u16)> {
    let width = u16::try_from(raster.width())
        .map_err(|_| Error::InvalidRasterDimensions)?;
    let height = u16::try_from(raster.height())
        .map_err(|_| Error::InvalidRasterDimensions)?;
    Ok((width, height))
}

impl Step {
    /// Create a step with colour indices.
    ///
    /// There must be exactly `width * height` pixels.
    pub fn with_indexed(
        width: u16,
        height: u16,
        pixels: Vec<u8>,
        colour_table: ColourTable,
    ) -> Result<Self> {
        if pixels.len() != usize::from(width) * usize::from(height) {
            return Err(Error::InvalidRasterDimensions);
        }
        if colour_table.is_empty() {
            return Err(Error::MissingColourTable);
        }
        let raster = StepRaster::Indexed {
            width,
            height,
            pixels,
            colour_table,
        };
        Ok(Step {
            raster,
            graphic_control: None,
        })
    }

    /// Create a step with a true colour raster.
    ///
    /// Fully transparent pixels are encoded with a transparent colour index;
    /// every other pixel is opaque.
    pub fn with_true_colour(raster: Raster<SRgba8>) -> Self {
        Step {
            raster: StepRaster::TrueColour(raster),
            graphic_control: None,
        }
    }

    /// Adjust the graphic control
    fn with_control<F: FnOnce(&mut GraphicControl)>(mut self, f: F) -> Self {
        let mut control = self.graphic_control.take().unwrap_or_default();
        f(&mut control);
        if control != GraphicControl::default() {
            self.graphic_control = Some(control);
        }
        self
    }

    /// Adjust the disposal method
    pub fn with_disposal_method(self, method: DisposalMethod) -> Self {
        self.with_control(|c| c.set_disposal_method(method))
    }

    /// Adjust the transparent colour of an indexed step
    pub fn with_transparent_colour(self, clr: Option<u8>) -> Self {
        self.with_control(|c| c.set_transparent_colour(clr))
    }

    /// Adjust the delay time
    pub fn with_delay_time_cs(self, delay: Option<u16>) -> Self {
        self.with_control(|c| c.set_delay_time_cs(delay.unwrap_or_default()))
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> Option<u16> {
        self.graphic_control.as_ref().map(|c| c.delay_time_cs())
    }

    /// Get the transparent colour
    pub fn transparent_colour(&self) -> Option<u8> {
        self.graphic_control
            .as_ref()
            .and_then(|c| c.transparent_colour())
    }

    /// Convert to colour indices
    fn to_indexed(&self) -> Result<IndexedFrame> {
        match &self.raster {
            StepRaster::TrueColour(raster) => Self::index_raster(raster),
            StepRaster::Indexed {
                width,
                height,
                pixels,
                colour_table,
            } => {
                let len = colour_table.len();
                if let Some(idx) = pixels.iter().find(|p| usize::from(**p) >= len)
                {
                    return Err(Error::out_of_range(
                        "pixels",
                        format!(
                            "Colour index must be less than {len}. Supplied \
                             index: {idx}"
                        ),
                    ));
                }
                Ok(IndexedFrame {
                    width: *width,
                    height: *height,
                    pixels: pixels.clone(),
                    colour_table: colour_table.clone(),
                    transparent_colour: self.transparent_colour(),
                })
            }
        }
    }

    /// Build an exact palette for a true colour raster
    fn index_raster(raster: &Raster<SRgba8>) -> Result<IndexedFrame> {
        let (width, height) = dimensions(raster)?;
        let mut palette = Palette::new();
        let mut lookup = HashMap::new();
        let mut has_transparent = false;
        let mut indices = Vec::with_capacity(raster.pixels().len());
        for p in raster.pixels() {
            let (clr, alpha) = split_alpha(*p);
            if alpha == 0 {
                has_transparent = true;
                indices.push(None);
                continue;
            }
            let key = channels(clr);
            let idx = match lookup.get(&key) {
                Some(idx) => *idx,
                None => {
                    let idx = palette.len() as u8;
                    palette.add(clr)?;
                    lookup.insert(key, idx);
                    idx
                }
            };
            indices.push(Some(idx));
        }
        let transparent_colour = if has_transparent {
            if palette.len() >= MAX_COLOURS {
                return Err(Error::TooManyColours);
            }
            Some(palette.len() as u8)
        } else {
            None
        };
        let mut colour_table = palette.to_colour_table();
        if transparent_colour.is_some() {
            colour_table.push(SRgb8::new(0, 0, 0))?;
        }
        let pixels = indices
            .into_iter()
            .map(|i| i.or(transparent_colour).unwrap_or_default())
            .collect();
        Ok(IndexedFrame {
            width,
            height,
            pixels,
            colour_table,
            transparent_colour,
        })
    }
}

/// Encoder for animation [Step]s.
///
/// The first step fixes the logical screen size.  Call
/// [finish](struct.StepEnc.html#method.finish) to write the trailer.
pub struct StepEnc<W: Write> {
    /// Writer for output data
    writer: W,
    /// Animation loop count
    loop_count: Option<u16>,
    /// Logical screen size, once written
    screen: Option<(u16, u16)>,
}

impl<W: Write> StepEnc<W> {
    /// Create a new step encoder
    pub(crate) fn new(writer: W) -> Self {
        StepEnc {
            writer,
            loop_count: None,
            screen: None,
        }
    }

    /// Set the animation loop count (0 means forever)
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = Some(loop_count);
        self
    }

    /// Write the header, logical screen descriptor and loop extension
    fn encode_preamble(&mut self, width: u16, height: u16) -> Result<()> {
        let w = &mut self.writer;
        Header::default().write_to_stream(w)?;
        LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_colour_table(None)
            .write_to_stream(w)?;
        if let Some(loop_count) = self.loop_count {
            Application::with_loop_count(loop_count).write_to_stream(w)?;
        }
        self.screen = Some((width, height));
        Ok(())
    }

    /// Encode one animation step
    pub fn encode_step(&mut self, step: &Step) -> Result<()> {
        let frame = step.to_indexed()?;
        match self.screen {
            None => self.encode_preamble(frame.width, frame.height)?,
            Some((width, height)) => {
                if frame.width > width || frame.height > height {
                    return Err(Error::InvalidRasterDimensions);
                }
            }
        }
        let mut colour_table = frame.colour_table;
        colour_table.pad_to_size_bits();
        let min_code_size = min_code_size_for(colour_table.len());
        let image_data =
            TableBasedImageData::encode(&frame.pixels, min_code_size)?;
        let mut control = step.graphic_control.clone().unwrap_or_default();
        control.set_transparent_colour(frame.transparent_colour);
        let image_desc = ImageDesc::default()
            .with_width(frame.width)
            .with_height(frame.height)
            .with_colour_table(Some(&colour_table));
        let w = &mut self.writer;
        if control != GraphicControl::default() {
            control.write_to_stream(w)?;
        }
        image_desc.write_to_stream(w)?;
        colour_table.write_to_stream(w)?;
        image_data.write_to_stream(w)?;
        debug!("encoded step: {}x{}", frame.width, frame.height);
        Ok(())
    }

    /// Write the trailer, and get the writer back
    pub fn finish(mut self) -> Result<W> {
        if self.screen.is_none() {
            self.encode_preamble(0, 0)?;
        }
        self.writer.write_all(&[BlockCode::Trailer_.signature()])?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
