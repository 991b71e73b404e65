// decode.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Whole stream decoding
use crate::block::{
    Application, BlockCode, Comment, ExtensionCode, GraphicControl, Header,
    LogicalScreenDesc, PlainText,
};
use crate::colour::{with_alpha, ColourTable};
use crate::compose::transparent;
use crate::error::Result;
use crate::frame::{FrameContext, GifFrame};
use crate::status::{Component, ComponentStatus, ErrorState};
use crate::stream::{read_sub_blocks, read_u8, write_u8};
use pix::rgb::SRgba8;
use std::io::{Read, Write};

/// Default maximum pixel count of one frame
pub(crate) const MAX_IMAGE_SZ: usize = 1 << 25;

/// A decoded GIF stream
pub struct Gif {
    header: Header,
    screen_desc: LogicalScreenDesc,
    global_colour_table: Option<ColourTable>,
    applications: Vec<Application>,
    comments: Vec<Comment>,
    plain_texts: Vec<PlainText>,
    frames: Vec<GifFrame>,
    status: ComponentStatus,
}

impl Component for Gif {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }

    fn parts(&self) -> Vec<&dyn Component> {
        let mut parts: Vec<&dyn Component> =
            vec![&self.header, &self.screen_desc];
        if let Some(tbl) = &self.global_colour_table {
            parts.push(tbl);
        }
        for app in &self.applications {
            parts.push(app);
        }
        for comment in &self.comments {
            parts.push(comment);
        }
        for text in &self.plain_texts {
            parts.push(text);
        }
        for frame in &self.frames {
            parts.push(frame);
        }
        parts
    }
}

/// Count of skipped bytes with unknown block introducers
#[derive(Default)]
struct Skipped {
    count: usize,
    first: u8,
}

impl Skipped {
    /// Skip one byte
    fn skip(&mut self, b: u8) {
        if self.count == 0 {
            self.first = b;
        }
        self.count += 1;
    }

    /// Record skipped bytes, if any
    fn record(&mut self, status: &mut ComponentStatus) {
        if self.count > 0 {
            status.record(
                ErrorState::UNKNOWN_BLOCK_INTRODUCER,
                format!(
                    "Skipped {} bytes, starting with unknown block \
                     introducer 0x{:02X}",
                    self.count, self.first
                ),
            );
            self.count = 0;
        }
    }
}

impl Gif {
    /// Read a whole GIF stream.
    ///
    /// Malformed data never fails; check the
    /// [consolidated state](trait.Component.html#method.consolidated_state)
    /// of the result.
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        Self::read(reader, Some(MAX_IMAGE_SZ))
    }

    /// Read a whole GIF stream, with a maximum screen and frame size
    pub(crate) fn read<R: Read>(
        reader: &mut R,
        max_image_sz: Option<usize>,
    ) -> Result<Self> {
        let header = Header::from_stream(reader)?;
        let mut gif = Gif {
            header,
            screen_desc: LogicalScreenDesc::default(),
            global_colour_table: None,
            applications: vec![],
            comments: vec![],
            plain_texts: vec![],
            frames: vec![],
            status: ComponentStatus::default(),
        };
        if gif.header.error_state().intersects(
            ErrorState::BAD_SIGNATURE | ErrorState::END_OF_INPUT_STREAM,
        ) {
            return Ok(gif);
        }
        gif.screen_desc = LogicalScreenDesc::from_stream(reader)?;
        if gif.screen_desc.test_state(ErrorState::END_OF_INPUT_STREAM) {
            return Ok(gif);
        }
        if gif.screen_desc.has_global_colour_table() {
            let len = gif.screen_desc.global_colour_table_len();
            gif.global_colour_table = Some(ColourTable::from_stream(reader, len)?);
        }
        let screen_sz = usize::from(gif.screen_desc.screen_width())
            * usize::from(gif.screen_desc.screen_height());
        if let Some(max) = max_image_sz {
            // every frame is composited onto a full screen raster
            if screen_sz > max {
                gif.status.record(
                    ErrorState::IMAGE_TOO_LARGE,
                    format!(
                        "Screen size {screen_sz} is over the maximum of {max}"
                    ),
                );
                return Ok(gif);
            }
        }
        gif.read_blocks(reader, max_image_sz)?;
        debug!("decoded {} frames", gif.frames.len());
        Ok(gif)
    }

    /// Read blocks up to the trailer
    fn read_blocks<R: Read>(
        &mut self,
        reader: &mut R,
        max_image_sz: Option<usize>,
    ) -> Result<()> {
        let background_colour = self.background_colour();
        let mut graphic_control = None;
        let mut skipped = Skipped::default();
        loop {
            let b = match read_u8(reader)? {
                Some(b) => b,
                None => {
                    skipped.record(&mut self.status);
                    self.status.record(
                        ErrorState::END_OF_INPUT_STREAM,
                        "Input ended before trailer",
                    );
                    return Ok(());
                }
            };
            let code = match BlockCode::from_u8(b) {
                Some(code) => code,
                None => {
                    skipped.skip(b);
                    continue;
                }
            };
            skipped.record(&mut self.status);
            match code {
                BlockCode::Trailer_ => {
                    debug!("trailer");
                    return Ok(());
                }
                BlockCode::Extension_ => {
                    let label = match read_u8(reader)? {
                        Some(label) => label,
                        None => continue, // end of input found next time
                    };
                    self.read_extension(reader, label, &mut graphic_control)?;
                }
                BlockCode::ImageDesc_ => {
                    let frame = {
                        let n = self.frames.len();
                        let ctx = FrameContext {
                            screen_desc: &self.screen_desc,
                            global_colour_table: self
                                .global_colour_table
                                .as_ref(),
                            background_colour,
                            previous: self.frames.last(),
                            before_previous: n
                                .checked_sub(2)
                                .and_then(|i| self.frames.get(i)),
                            max_image_sz,
                        };
                        GifFrame::from_stream(
                            reader,
                            graphic_control.take(),
                            &ctx,
                        )?
                    };
                    self.frames.push(frame);
                }
            }
        }
    }

    /// Read an extension, after its label
    fn read_extension<R: Read>(
        &mut self,
        reader: &mut R,
        label: u8,
        graphic_control: &mut Option<GraphicControl>,
    ) -> Result<()> {
        match ExtensionCode::from(label) {
            ExtensionCode::GraphicControl_ => {
                if graphic_control.is_some() {
                    debug!("graphic control replaced before use");
                }
                *graphic_control = Some(GraphicControl::from_stream(reader)?);
            }
            ExtensionCode::Application_ => {
                let app = Application::from_stream(reader)?;
                debug!("application: loop count {:?}", app.loop_count());
                self.applications.push(app);
            }
            ExtensionCode::Comment_ => {
                let comment = Comment::from_stream(reader)?;
                debug!("comment: {:?}", comment.text());
                self.comments.push(comment);
            }
            ExtensionCode::PlainText_ => {
                // graphic control applies to the plain text
                graphic_control.take();
                self.plain_texts.push(PlainText::from_stream(reader)?);
                debug!("plain text");
            }
            ExtensionCode::Unknown_(label) => {
                let sb = read_sub_blocks(reader)?;
                self.status.record(
                    ErrorState::UNKNOWN_EXTENSION,
                    format!(
                        "Skipped unknown extension 0x{label:02X} \
                         ({} sub-blocks)",
                        sb.blocks.len()
                    ),
                );
            }
        }
        Ok(())
    }

    /// Write the stream
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        self.header.write_to_stream(w)?;
        self.screen_desc.write_to_stream(w)?;
        if let Some(tbl) = &self.global_colour_table {
            tbl.write_to_stream(w)?;
        }
        for app in &self.applications {
            app.write_to_stream(w)?;
        }
        for comment in &self.comments {
            comment.write_to_stream(w)?;
        }
        for text in &self.plain_texts {
            text.write_to_stream(w)?;
        }
        for frame in &self.frames {
            frame.write_to_stream(w)?;
        }
        write_u8(w, BlockCode::Trailer_.signature())?;
        Ok(())
    }

    /// Get the header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the logical screen descriptor
    pub fn screen_desc(&self) -> &LogicalScreenDesc {
        &self.screen_desc
    }

    /// Get the global colour table
    pub fn global_colour_table(&self) -> Option<&ColourTable> {
        self.global_colour_table.as_ref()
    }

    /// Get the background colour.
    ///
    /// This is the global colour table entry at the background colour
    /// index, or transparent if there is no such entry.
    pub fn background_colour(&self) -> SRgba8 {
        let idx = usize::from(self.screen_desc.background_colour_idx());
        self.global_colour_table
            .as_ref()
            .and_then(|tbl| tbl.get(idx))
            .map(|clr| with_alpha(clr, 255))
            .unwrap_or_else(transparent)
    }

    /// Get the number of times to loop the animation
    pub fn loop_count(&self) -> Option<u16> {
        self.applications.iter().find_map(|app| app.loop_count())
    }

    /// Get the application extensions
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Get the comment extensions
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Get the plain text extensions
    pub fn plain_texts(&self) -> &[PlainText] {
        &self.plain_texts
    }

    /// Get the frames
    pub fn frames(&self) -> &[GifFrame] {
        &self.frames
    }
}
