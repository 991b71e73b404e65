// frame.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! GIF frames
use crate::block::{DisposalMethod, GraphicControl, ImageDesc, LogicalScreenDesc};
use crate::colour::ColourTable;
use crate::compose::{Compositor, Prior};
use crate::error::Result;
use crate::image_data::TableBasedImageData;
use crate::status::{Component, ComponentStatus, ErrorState};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::{Read, Write};

/// Stream state needed to decode a frame
pub(crate) struct FrameContext<'a> {
    /// Logical screen descriptor
    pub screen_desc: &'a LogicalScreenDesc,
    /// Global colour table
    pub global_colour_table: Option<&'a ColourTable>,
    /// Background colour of the stream
    pub background_colour: SRgba8,
    /// Frame N-1
    pub previous: Option<&'a GifFrame>,
    /// Frame N-2
    pub before_previous: Option<&'a GifFrame>,
    /// Maximum pixel count of one frame
    pub max_image_sz: Option<usize>,
}

/// One decoded frame, with its composited screen raster
pub struct GifFrame {
    graphic_control: Option<GraphicControl>,
    image_desc: ImageDesc,
    local_colour_table: Option<ColourTable>,
    image_data: TableBasedImageData,
    background_colour: SRgba8,
    raster: Raster<SRgba8>,
    status: ComponentStatus,
}

impl Component for GifFrame {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }

    fn parts(&self) -> Vec<&dyn Component> {
        let mut parts: Vec<&dyn Component> = Vec::with_capacity(4);
        if let Some(gc) = &self.graphic_control {
            parts.push(gc);
        }
        parts.push(&self.image_desc);
        if let Some(tbl) = &self.local_colour_table {
            parts.push(tbl);
        }
        parts.push(&self.image_data);
        parts
    }
}

impl GifFrame {
    /// Read a frame, starting after its image separator.
    ///
    /// The frame is composited over the frames in the context.
    pub(crate) fn from_stream<R: Read>(
        reader: &mut R,
        graphic_control: Option<GraphicControl>,
        ctx: &FrameContext,
    ) -> Result<Self> {
        let mut status = ComponentStatus::default();
        let image_desc = ImageDesc::from_stream(reader)?;
        let local_colour_table = if image_desc.has_local_colour_table() {
            let len = image_desc.local_colour_table_len();
            Some(ColourTable::from_stream(reader, len)?)
        } else {
            None
        };
        let image_sz = image_desc.image_sz();
        let image_data = match ctx.max_image_sz {
            Some(max) if image_sz > max => {
                status.record(
                    ErrorState::IMAGE_TOO_LARGE,
                    format!(
                        "Image size {image_sz} is over the maximum of {max}"
                    ),
                );
                TableBasedImageData::skip_stream(reader)?
            }
            _ => TableBasedImageData::from_stream(reader, image_sz)?,
        };
        let colour_table = local_colour_table.as_ref().or(ctx.global_colour_table);
        let compositor = Compositor {
            screen_width: ctx.screen_desc.screen_width(),
            screen_height: ctx.screen_desc.screen_height(),
            image_desc: &image_desc,
            colour_table,
            graphic_control: graphic_control.as_ref(),
            pixels: image_data.indices(),
            previous: ctx.previous.map(GifFrame::prior),
            before_previous: ctx.before_previous.map(GifFrame::prior),
        };
        let raster = compositor.compose(&mut status);
        debug!(
            "frame: {}x{} at {},{}",
            image_desc.width(),
            image_desc.height(),
            image_desc.left(),
            image_desc.top()
        );
        Ok(GifFrame {
            graphic_control,
            image_desc,
            local_colour_table,
            image_data,
            background_colour: ctx.background_colour,
            raster,
            status,
        })
    }

    /// Get the frame as a prior frame for compositing
    fn prior(&self) -> Prior {
        Prior {
            raster: &self.raster,
            disposal_method: self.disposal_method(),
            image_desc: &self.image_desc,
            background_colour: self.background_colour,
        }
    }

    /// Write the frame: graphic control, image descriptor, local colour
    /// table and image data
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        if let Some(gc) = &self.graphic_control {
            gc.write_to_stream(w)?;
        }
        self.image_desc.write_to_stream(w)?;
        if let Some(tbl) = &self.local_colour_table {
            tbl.write_to_stream(w)?;
        }
        self.image_data.write_to_stream(w)
    }

    /// Get the graphic control extension
    pub fn graphic_control(&self) -> Option<&GraphicControl> {
        self.graphic_control.as_ref()
    }

    /// Get the image descriptor
    pub fn image_desc(&self) -> &ImageDesc {
        &self.image_desc
    }

    /// Get the local colour table
    pub fn local_colour_table(&self) -> Option<&ColourTable> {
        self.local_colour_table.as_ref()
    }

    /// Get the table-based image data
    pub fn image_data(&self) -> &TableBasedImageData {
        &self.image_data
    }

    /// Get the background colour
    pub fn background_colour(&self) -> SRgba8 {
        self.background_colour
    }

    /// Get the composited screen raster
    pub fn raster(&self) -> &Raster<SRgba8> {
        &self.raster
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        self.graphic_control
            .as_ref()
            .map(|gc| gc.disposal_method())
            .unwrap_or_default()
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> Option<u16> {
        self.graphic_control.as_ref().map(|gc| gc.delay_time_cs())
    }

    /// Get the transparent colour index
    pub fn transparent_colour(&self) -> Option<u8> {
        self.graphic_control
            .as_ref()
            .and_then(|gc| gc.transparent_colour())
    }
}
