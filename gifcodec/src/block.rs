// block.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Fixed-layout GIF records
use crate::bits::PackedByte;
use crate::colour::ColourTable;
use crate::error::Result;
use crate::status::{Component, ComponentStatus, ErrorState};
use crate::stream::{
    read_ascii, read_sub_blocks, write_ascii, write_sub_blocks, write_u16,
    write_u8, FieldReader, SubBlocks,
};
use std::io::{Cursor, Read, Write};

/// Signature of every GIF stream
pub const SIGNATURE: &str = "GIF";

/// Block introducer codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Extension_,
    ImageDesc_,
    Trailer_,
}

impl BlockCode {
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }
    pub fn signature(self) -> u8 {
        use self::BlockCode::*;
        match self {
            Extension_ => b'!',
            ImageDesc_ => b',',
            Trailer_ => b';',
        }
    }
}

/// Extension labels
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            PlainText_ => 0x01,
            GraphicControl_ => 0xF9,
            Comment_ => 0xFE,
            Application_ => 0xFF,
            Unknown_(n) => n,
        }
    }
}

/// Write an extension introducer and label
fn write_ext_start<W: Write>(w: &mut W, code: ExtensionCode) -> Result<()> {
    write_u8(w, BlockCode::Extension_.signature())?;
    write_u8(w, code.into())?;
    Ok(())
}

/// Record problems with extension sub-blocks
fn check_sub_blocks(sb: &SubBlocks, status: &mut ComponentStatus, what: &str) {
    if sb.truncated {
        status.record(
            ErrorState::DATA_BLOCK_TOO_SHORT,
            format!("{what}: data sub-block is shorter than its size"),
        );
    }
    if !sb.terminated {
        status.record(
            ErrorState::END_OF_INPUT_STREAM,
            format!("{what}: input ended before block terminator"),
        );
    }
}

/// Stream header: signature and version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    signature: String,
    version: String,
    status: ComponentStatus,
}

impl Default for Header {
    fn default() -> Self {
        Header::with_version("89a")
    }
}

impl Component for Header {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl Header {
    /// Create a header with a version ("87a" or "89a")
    pub fn with_version(version: &str) -> Self {
        Header {
            signature: SIGNATURE.to_string(),
            version: version.to_string(),
            status: ComponentStatus::default(),
        }
    }

    /// Get the signature
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Get the version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read a header
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let signature = read_ascii(reader, 3)?;
        let version = read_ascii(reader, 3)?;
        let mut status = ComponentStatus::default();
        if signature.len() + version.len() < 6 {
            status.record(
                ErrorState::END_OF_INPUT_STREAM,
                "Input ended inside the header",
            );
        }
        if signature != SIGNATURE {
            status.record(
                ErrorState::BAD_SIGNATURE,
                format!("Bad signature: {signature:?}"),
            );
        } else if version != "87a" && version != "89a" {
            status.record(
                ErrorState::UNSUPPORTED_VERSION,
                format!("Unsupported version: {version:?}"),
            );
        }
        debug!("header: {signature}{version}");
        Ok(Header {
            signature,
            version,
            status,
        })
    }

    /// Write the header
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_ascii(w, SIGNATURE)?;
        write_ascii(w, &self.version)?;
        Ok(())
    }
}

/// Logical Screen Descriptor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: PackedByte,
    background_colour_idx: u8, // index into global colour table
    pixel_aspect_ratio: u8,
    status: ComponentStatus,
}

impl Component for LogicalScreenDesc {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl LogicalScreenDesc {
    const COLOUR_TABLE_PRESENT: usize = 0;
    const COLOUR_RESOLUTION: (usize, usize) = (1, 3);
    const COLOUR_TABLE_SORTED: usize = 4;
    const COLOUR_TABLE_SIZE: (usize, usize) = (5, 3);

    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }
    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }
    pub fn flags(&self) -> u8 {
        self.flags.into()
    }
    pub fn has_global_colour_table(&self) -> bool {
        self.flags.flag(Self::COLOUR_TABLE_PRESENT)
    }
    /// Get the colour resolution (bits per primary colour)
    pub fn colour_resolution(&self) -> u8 {
        let (start, len) = Self::COLOUR_RESOLUTION;
        self.flags.field(start, len) + 1
    }
    pub fn global_colour_table_sorted(&self) -> bool {
        self.flags.flag(Self::COLOUR_TABLE_SORTED)
    }
    pub fn global_colour_table_size_bits(&self) -> u8 {
        let (start, len) = Self::COLOUR_TABLE_SIZE;
        self.flags.field(start, len)
    }
    /// Get the number of colours in the global colour table
    pub fn global_colour_table_len(&self) -> usize {
        if self.has_global_colour_table() {
            2 << self.global_colour_table_size_bits()
        } else {
            0
        }
    }
    /// Set the global colour table flags from a table
    pub fn with_colour_table(mut self, tbl: Option<&ColourTable>) -> Self {
        let (start, len) = Self::COLOUR_TABLE_SIZE;
        let bits = tbl.map_or(0, |t| t.size_bits());
        self.flags.set_flag(Self::COLOUR_TABLE_PRESENT, tbl.is_some());
        self.flags.set_flag(Self::COLOUR_TABLE_SORTED, false);
        self.flags.set_field(start, len, bits);
        let (start, len) = Self::COLOUR_RESOLUTION;
        self.flags.set_field(start, len, 7);
        self
    }
    pub fn with_background_colour_idx(mut self, idx: u8) -> Self {
        self.background_colour_idx = idx;
        self
    }
    pub fn background_colour_idx(&self) -> u8 {
        self.background_colour_idx
    }
    pub fn with_pixel_aspect_ratio(mut self, ratio: u8) -> Self {
        self.pixel_aspect_ratio = ratio;
        self
    }
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }

    /// Read a logical screen descriptor
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let mut f = FieldReader::new(reader);
        let screen_width = f.u16()?;
        let screen_height = f.u16()?;
        let flags = f.packed()?;
        let background_colour_idx = f.u8()?;
        let pixel_aspect_ratio = f.u8()?;
        let mut status = ComponentStatus::default();
        if f.eof() {
            status.record(
                ErrorState::END_OF_INPUT_STREAM,
                "Input ended inside the logical screen descriptor",
            );
        }
        debug!("screen: {screen_width}x{screen_height} flags: {flags:?}");
        Ok(LogicalScreenDesc {
            screen_width,
            screen_height,
            flags,
            background_colour_idx,
            pixel_aspect_ratio,
            status,
        })
    }

    /// Write the logical screen descriptor
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16(w, self.screen_width)?;
        write_u16(w, self.screen_height)?;
        write_u8(w, self.flags.into())?;
        write_u8(w, self.background_colour_idx)?;
        write_u8(w, self.pixel_aspect_ratio)?;
        Ok(())
    }
}

/// Frame disposal method
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DisposalMethod {
    /// No disposal specified
    #[default]
    NotSpecified,
    /// Leave the frame in place
    DoNotDispose,
    /// Restore the frame area to the background colour
    RestoreToBackgroundColour,
    /// Restore to the state before the frame
    RestoreToPrevious,
    /// Reserved value (4 - 7)
    Reserved(u8),
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NotSpecified,
            1 => DoNotDispose,
            2 => RestoreToBackgroundColour,
            3 => RestoreToPrevious,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NotSpecified => 0,
            DoNotDispose => 1,
            RestoreToBackgroundColour => 2,
            RestoreToPrevious => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Graphic Control Extension
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphicControl {
    flags: PackedByte,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_colour_idx: u8,
    status: ComponentStatus,
}

impl Component for GraphicControl {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl GraphicControl {
    /// Size of the (only) data sub-block
    const BLOCK_SIZE: usize = 4;
    const DISPOSAL_METHOD: (usize, usize) = (3, 3);
    const USER_INPUT: usize = 6;
    const TRANSPARENT_COLOUR: usize = 7;

    pub fn flags(&self) -> u8 {
        self.flags.into()
    }
    pub fn disposal_method(&self) -> DisposalMethod {
        let (start, len) = Self::DISPOSAL_METHOD;
        self.flags.field(start, len).into()
    }
    pub fn set_disposal_method(&mut self, method: DisposalMethod) {
        let (start, len) = Self::DISPOSAL_METHOD;
        self.flags.set_field(start, len, method.into());
    }
    pub fn user_input(&self) -> bool {
        self.flags.flag(Self::USER_INPUT)
    }
    pub fn set_user_input(&mut self, user_input: bool) {
        self.flags.set_flag(Self::USER_INPUT, user_input);
    }
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }
    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }
    pub fn has_transparent_colour(&self) -> bool {
        self.flags.flag(Self::TRANSPARENT_COLOUR)
    }
    pub fn transparent_colour_idx(&self) -> u8 {
        self.transparent_colour_idx
    }
    /// Get the transparent colour index, if transparency is enabled
    pub fn transparent_colour(&self) -> Option<u8> {
        if self.has_transparent_colour() {
            Some(self.transparent_colour_idx)
        } else {
            None
        }
    }
    pub fn set_transparent_colour(&mut self, transparent_colour: Option<u8>) {
        self.flags
            .set_flag(Self::TRANSPARENT_COLOUR, transparent_colour.is_some());
        self.transparent_colour_idx = transparent_colour.unwrap_or_default();
    }

    /// Read a graphic control extension.
    ///
    /// The introducer and label must already be consumed.
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let sb = read_sub_blocks(reader)?;
        let mut status = ComponentStatus::default();
        check_sub_blocks(&sb, &mut status, "Graphic control extension");
        let mut data = sb.blocks.first().cloned().unwrap_or_default();
        if data.len() != Self::BLOCK_SIZE || sb.blocks.len() > 1 {
            status.record(
                ErrorState::BAD_BLOCK_SIZE,
                format!(
                    "Graphic control extension block size should be 4, \
                     but is {} (in {} sub-blocks)",
                    data.len(),
                    sb.blocks.len()
                ),
            );
        }
        data.resize(Self::BLOCK_SIZE, 0);
        let mut cursor = Cursor::new(data);
        let mut f = FieldReader::new(&mut cursor);
        let flags = f.packed()?;
        let delay_time_cs = f.u16()?;
        let transparent_colour_idx = f.u8()?;
        let gc = GraphicControl {
            flags,
            delay_time_cs,
            transparent_colour_idx,
            status,
        };
        debug!(
            "graphic control: {:?} delay: {} transparent: {:?}",
            gc.disposal_method(),
            gc.delay_time_cs(),
            gc.transparent_colour()
        );
        Ok(gc)
    }

    /// Write the graphic control extension
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_ext_start(w, ExtensionCode::GraphicControl_)?;
        write_u8(w, Self::BLOCK_SIZE as u8)?; // block size
        write_u8(w, self.flags.into())?;
        write_u16(w, self.delay_time_cs)?;
        write_u8(w, self.transparent_colour_idx)?;
        write_u8(w, 0)?; // block terminator
        Ok(())
    }
}

/// Image Descriptor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: PackedByte,
    status: ComponentStatus,
}

impl Component for ImageDesc {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl ImageDesc {
    const COLOUR_TABLE_PRESENT: usize = 0;
    const INTERLACED: usize = 1;
    const COLOUR_TABLE_SORTED: usize = 2;
    const COLOUR_TABLE_SIZE: (usize, usize) = (5, 3);

    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }
    pub fn left(&self) -> u16 {
        self.left
    }
    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }
    pub fn top(&self) -> u16 {
        self.top
    }
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }
    pub fn width(&self) -> u16 {
        self.width
    }
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }
    pub fn height(&self) -> u16 {
        self.height
    }
    pub fn flags(&self) -> u8 {
        self.flags.into()
    }
    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.flags.set_flag(Self::INTERLACED, interlaced);
        self
    }
    pub fn interlaced(&self) -> bool {
        self.flags.flag(Self::INTERLACED)
    }
    pub fn has_local_colour_table(&self) -> bool {
        self.flags.flag(Self::COLOUR_TABLE_PRESENT)
    }
    pub fn local_colour_table_sorted(&self) -> bool {
        self.flags.flag(Self::COLOUR_TABLE_SORTED)
    }
    pub fn local_colour_table_size_bits(&self) -> u8 {
        let (start, len) = Self::COLOUR_TABLE_SIZE;
        self.flags.field(start, len)
    }
    /// Get the number of colours in the local colour table
    pub fn local_colour_table_len(&self) -> usize {
        if self.has_local_colour_table() {
            2 << self.local_colour_table_size_bits()
        } else {
            0
        }
    }
    /// Set the local colour table flags from a table
    pub fn with_colour_table(mut self, tbl: Option<&ColourTable>) -> Self {
        let (start, len) = Self::COLOUR_TABLE_SIZE;
        let bits = tbl.map_or(0, |t| t.size_bits());
        self.flags.set_flag(Self::COLOUR_TABLE_PRESENT, tbl.is_some());
        self.flags.set_flag(Self::COLOUR_TABLE_SORTED, false);
        self.flags.set_field(start, len, bits);
        self
    }
    /// Get the number of pixels in the image
    pub fn image_sz(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Read an image descriptor.
    ///
    /// The image separator must already be consumed.
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let mut f = FieldReader::new(reader);
        let left = f.u16()?;
        let top = f.u16()?;
        let width = f.u16()?;
        let height = f.u16()?;
        let flags = f.packed()?;
        let mut status = ComponentStatus::default();
        if f.eof() {
            status.record(
                ErrorState::END_OF_INPUT_STREAM,
                "Input ended inside the image descriptor",
            );
        }
        debug!("image: {width}x{height} at {left},{top} flags: {flags:?}");
        Ok(ImageDesc {
            left,
            top,
            width,
            height,
            flags,
            status,
        })
    }

    /// Write the image descriptor, with image separator
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, BlockCode::ImageDesc_.signature())?;
        write_u16(w, self.left)?;
        write_u16(w, self.top)?;
        write_u16(w, self.width)?;
        write_u16(w, self.height)?;
        write_u8(w, self.flags.into())?;
        Ok(())
    }
}

/// Application Extension
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Application {
    app_data: Vec<Vec<u8>>, // sequence of sub-blocks
    status: ComponentStatus,
}

impl Component for Application {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl Application {
    fn is_looping(app_id: &[u8]) -> bool {
        app_id == b"NETSCAPE2.0" || app_id == b"ANIMEXTS1.0"
    }
    pub fn with_loop_count(loop_count: u16) -> Self {
        let mut app_data = vec![b"NETSCAPE2.0".to_vec()];
        let mut v = vec![1];
        v.extend_from_slice(&loop_count.to_le_bytes());
        app_data.push(v);
        Application {
            app_data,
            status: ComponentStatus::default(),
        }
    }
    pub fn app_data(&self) -> &[Vec<u8>] {
        &self.app_data
    }
    /// Get the number of times to loop (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        let d = &self.app_data;
        let exists = d.len() == 2 &&            // 2 sub-blocks
                     Self::is_looping(&d[0]) && // app ID / auth code
                     d[1].len() == 3 &&         // app data sub-block length
                     d[1][0] == 1; // sub-block ID
        if exists {
            Some(u16::from_le_bytes([d[1][1], d[1][2]]))
        } else {
            None
        }
    }

    /// Read an application extension.
    ///
    /// The introducer and label must already be consumed.
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let sb = read_sub_blocks(reader)?;
        let mut status = ComponentStatus::default();
        check_sub_blocks(&sb, &mut status, "Application extension");
        Ok(Application {
            app_data: sb.blocks,
            status,
        })
    }

    /// Write the application extension
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_ext_start(w, ExtensionCode::Application_)?;
        write_sub_blocks(w, &self.app_data)?;
        Ok(())
    }
}

/// Comment Extension
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    comments: Vec<Vec<u8>>, // ascii only comments recommended
    status: ComponentStatus,
}

impl Component for Comment {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl Comment {
    /// Create a comment from text, split into sub-blocks
    pub fn with_text(text: &str) -> Self {
        Comment {
            comments: crate::stream::split_sub_blocks(text.as_bytes()),
            status: ComponentStatus::default(),
        }
    }
    pub fn comments(&self) -> &[Vec<u8>] {
        &self.comments
    }
    /// Get the comment as text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.comments.concat()).into_owned()
    }

    /// Read a comment extension.
    ///
    /// The introducer and label must already be consumed.
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let sb = read_sub_blocks(reader)?;
        let mut status = ComponentStatus::default();
        check_sub_blocks(&sb, &mut status, "Comment extension");
        Ok(Comment {
            comments: sb.blocks,
            status,
        })
    }

    /// Write the comment extension
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_ext_start(w, ExtensionCode::Comment_)?;
        write_sub_blocks(w, &self.comments)?;
        Ok(())
    }
}

/// Plain Text Extension (retained, never rendered)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlainText {
    sub_blocks: Vec<Vec<u8>>,
    status: ComponentStatus,
}

impl Component for PlainText {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

impl PlainText {
    pub fn sub_blocks(&self) -> &[Vec<u8>] {
        &self.sub_blocks
    }

    /// Read a plain text extension.
    ///
    /// The introducer and label must already be consumed.
    pub fn from_stream<R: Read>(reader: &mut R) -> Result<Self> {
        let sb = read_sub_blocks(reader)?;
        let mut status = ComponentStatus::default();
        check_sub_blocks(&sb, &mut status, "Plain text extension");
        Ok(PlainText {
            sub_blocks: sb.blocks,
            status,
        })
    }

    /// Write the plain text extension
    pub fn write_to_stream<W: Write>(&self, w: &mut W) -> Result<()> {
        write_ext_start(w, ExtensionCode::PlainText_)?;
        write_sub_blocks(w, &self.sub_blocks)?;
        Ok(())
    }
}
