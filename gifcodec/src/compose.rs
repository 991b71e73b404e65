// compose.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Frame compositing
use crate::block::{DisposalMethod, GraphicControl, ImageDesc};
use crate::colour::{with_alpha, ColourTable};
use crate::status::{ComponentStatus, ErrorState};
use pix::rgb::SRgba8;
use pix::Raster;

/// Interlace passes: (first row, row step)
const INTERLACE_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Fully transparent colour
pub(crate) fn transparent() -> SRgba8 {
    SRgba8::new(0, 0, 0, 0)
}

/// Opaque black, used for bad colour indices
fn black() -> SRgba8 {
    SRgba8::new(0, 0, 0, 255)
}

/// Get destination rows, in the order rows are stored
fn row_order(height: usize, interlaced: bool) -> Vec<usize> {
    if interlaced {
        INTERLACE_PASSES
            .iter()
            .flat_map(|(first, step)| (*first..height).step_by(*step))
            .collect()
    } else {
        (0..height).collect()
    }
}

/// An already composited frame
#[derive(Clone, Copy)]
pub(crate) struct Prior<'a> {
    /// Composited screen raster
    pub raster: &'a Raster<SRgba8>,
    /// Disposal method of the frame
    pub disposal_method: DisposalMethod,
    /// Image descriptor of the frame
    pub image_desc: &'a ImageDesc,
    /// Background colour of the frame
    pub background_colour: SRgba8,
}

/// Compositor for one frame.
///
/// Frame N is drawn over the frames before it:
///
/// * If frame N-1 is not disposed (`NotSpecified` or `DoNotDispose`), the
///   canvas starts as frame N-1.
/// * Otherwise, the canvas starts as frame N-2, or blank when there is no
///   such frame.  When frame N-1 is `RestoreToBackgroundColour`, its area is
///   then filled with its background colour (or transparent, if frame N has
///   a transparent colour).
pub(crate) struct Compositor<'a> {
    /// Logical screen width
    pub screen_width: u16,
    /// Logical screen height
    pub screen_height: u16,
    /// Image descriptor of frame N
    pub image_desc: &'a ImageDesc,
    /// Active colour table of frame N
    pub colour_table: Option<&'a ColourTable>,
    /// Graphic control of frame N
    pub graphic_control: Option<&'a GraphicControl>,
    /// Colour indices of frame N
    pub pixels: &'a [u8],
    /// Frame N-1
    pub previous: Option<Prior<'a>>,
    /// Frame N-2
    pub before_previous: Option<Prior<'a>>,
}

impl<'a> Compositor<'a> {
    /// Make a blank screen raster
    fn blank(&self) -> Raster<SRgba8> {
        Raster::with_clear(self.screen_width.into(), self.screen_height.into())
    }

    /// Get the transparent colour index of frame N
    fn transparent_colour(&self) -> Option<u8> {
        self.graphic_control.and_then(|gc| gc.transparent_colour())
    }

    /// Composite the frame onto a screen raster
    pub fn compose(&self, status: &mut ComponentStatus) -> Raster<SRgba8> {
        if self.pixels.is_empty() {
            status.record(
                ErrorState::NO_IMAGE_DATA,
                "Frame has no image data",
            );
            return self.blank();
        }
        let mut raster = self.seed();
        self.draw(&mut raster, status);
        raster
    }

    /// Start the canvas from earlier frames
    fn seed(&self) -> Raster<SRgba8> {
        let previous = match self.previous {
            Some(previous) => previous,
            None => return self.blank(),
        };
        if previous.disposal_method <= DisposalMethod::DoNotDispose {
            return Raster::with_raster(previous.raster);
        }
        let mut raster = match self.before_previous {
            Some(before) => Raster::with_raster(before.raster),
            None => self.blank(),
        };
        if previous.disposal_method
            == DisposalMethod::RestoreToBackgroundColour
        {
            let clr = if self.transparent_colour().is_some() {
                transparent()
            } else {
                previous.background_colour
            };
            self.fill(&mut raster, previous.image_desc, clr);
        }
        raster
    }

    /// Fill the area of an image with a colour
    fn fill(&self, raster: &mut Raster<SRgba8>, desc: &ImageDesc, clr: SRgba8) {
        let left = usize::from(desc.left());
        let top = usize::from(desc.top());
        let right = (left + usize::from(desc.width()))
            .min(self.screen_width.into());
        let bottom = (top + usize::from(desc.height()))
            .min(self.screen_height.into());
        for y in top..bottom {
            for x in left..right {
                *raster.pixel_mut(x as i32, y as i32) = clr;
            }
        }
    }

    /// Draw colour indices onto the canvas
    fn draw(&self, raster: &mut Raster<SRgba8>, status: &mut ComponentStatus) {
        let transparent_idx = self.transparent_colour();
        if self.colour_table.is_none() {
            status.record(
                ErrorState::FRAME_HAS_NO_COLOUR_TABLE,
                "Frame has no local or global colour table",
            );
        }
        // local copy of the table, with the transparent entry cleared
        let mut colours: Vec<SRgba8> = self
            .colour_table
            .map(|t| t.colours().iter().map(|c| with_alpha(*c, 255)).collect())
            .unwrap_or_default();
        if let Some(clr) = transparent_idx
            .and_then(|idx| colours.get_mut(usize::from(idx)))
        {
            *clr = transparent();
        }
        let width = usize::from(self.image_desc.width());
        let height = usize::from(self.image_desc.height());
        let left = usize::from(self.image_desc.left());
        let top = usize::from(self.image_desc.top());
        let screen_width = usize::from(self.screen_width);
        let screen_height = usize::from(self.screen_height);
        let mut bad_indices = 0;
        let rows = row_order(height, self.image_desc.interlaced());
        for (src, row) in self.pixels.chunks(width.max(1)).zip(rows) {
            let y = top + row;
            if y >= screen_height {
                continue;
            }
            for (col, idx) in src.iter().enumerate() {
                if Some(*idx) == transparent_idx {
                    continue;
                }
                let clr = match colours.get(usize::from(*idx)) {
                    Some(clr) => *clr,
                    None => {
                        bad_indices += 1;
                        black()
                    }
                };
                let x = left + col;
                if x < screen_width {
                    *raster.pixel_mut(x as i32, y as i32) = clr;
                }
            }
        }
        if bad_indices > 0 && self.colour_table.is_some() {
            status.record(
                ErrorState::BAD_COLOUR_INDEX,
                format!(
                    "{bad_indices} pixels have colour indices beyond the \
                     colour table (length {})",
                    colours.len()
                ),
            );
        }
    }
}
