//! Brush stroke tracking and mask rasterization

use super::surface::{OverlaySurface, BRUSH_COLOR};
use crate::config::{DEFAULT_BRUSH_SIZE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::types::{Mask, Point, MASK_BLACK, MASK_WHITE};
use image::GrayImage;
use tracing::trace;

/// Receives pointer gestures. Implemented by the renderer itself and by the
/// editing session that forwards to it.
pub trait StrokeTarget {
    fn begin_stroke(&mut self, point: Point);
    fn extend_stroke(&mut self, point: Point);
    fn end_stroke(&mut self);
    fn set_brush_size(&mut self, diameter: u32) -> u32;
}

/// Paints translucent brush strokes on an overlay and exports them as a
/// binary mask.
#[derive(Debug, Clone)]
pub struct MaskRenderer {
    surface: Option<OverlaySurface>,
    brush_size: u32,
    drawing: bool,
    last_point: Option<Point>,
}

impl Default for MaskRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE)
    }
}

impl MaskRenderer {
    /// Create a renderer without a surface. Strokes are ignored until
    /// [`MaskRenderer::resize`] gives it one.
    #[must_use]
    pub fn new(brush_size: u32) -> Self {
        Self {
            surface: None,
            brush_size: brush_size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            drawing: false,
            last_point: None,
        }
    }

    /// Replace the surface with a transparent one of the given canvas size.
    /// Existing paint and any stroke in progress are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface = OverlaySurface::new(width, height);
        self.drawing = false;
        self.last_point = None;
    }

    /// Drop the surface entirely
    pub fn detach(&mut self) {
        self.surface = None;
        self.drawing = false;
        self.last_point = None;
    }

    #[must_use]
    pub fn surface(&self) -> Option<&OverlaySurface> {
        self.surface.as_ref()
    }

    /// Whether a surface exists to paint on
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.surface.is_some()
    }

    #[must_use]
    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Point the next segment will start from
    #[must_use]
    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    /// Whether any pixel carries paint
    #[must_use]
    pub fn has_paint(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| !s.is_blank())
    }

    /// Erase the overlay to fully transparent
    pub fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }

    /// Rasterize the painted region into a binary mask.
    ///
    /// Returns `None` when there is no surface yet or nothing has been
    /// painted, meaning the edit applies to the whole image. Any pixel with
    /// non-zero alpha becomes white, everything else black.
    #[must_use]
    pub fn export_mask(&self) -> Option<Mask> {
        let surface = self.surface.as_ref()?;
        if surface.is_blank() {
            return None;
        }

        let pixels = surface.pixels();
        let raster = GrayImage::from_fn(surface.width(), surface.height(), |x, y| {
            let alpha = pixels.get_pixel(x, y).0[3];
            image::Luma([if alpha > 0 { MASK_WHITE } else { MASK_BLACK }])
        });

        Some(Mask::from_raster(raster))
    }

    fn paint_segment(&mut self, from: Point, to: Point) {
        let diameter = self.brush_size as f32;
        if let Some(surface) = self.surface.as_mut() {
            let touched = surface.fill_capsule(from, to, diameter, BRUSH_COLOR);
            trace!(touched, diameter, "painted stroke segment");
        }
    }
}

impl StrokeTarget for MaskRenderer {
    /// Start a stroke at `point` and paint a dab there, so a click without
    /// drag still marks the spot.
    fn begin_stroke(&mut self, point: Point) {
        if self.surface.is_none() {
            trace!("ignoring stroke: overlay has no surface yet");
            return;
        }
        self.drawing = true;
        self.last_point = Some(point);
        self.paint_segment(point, point);
    }

    fn extend_stroke(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        let Some(from) = self.last_point else {
            return;
        };
        self.paint_segment(from, point);
        self.last_point = Some(point);
    }

    fn end_stroke(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        self.last_point = None;
    }

    /// Set the brush diameter for later strokes, clamped to 5-100 px.
    /// Returns the applied value.
    fn set_brush_size(&mut self, diameter: u32) -> u32 {
        self.brush_size = diameter.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        self.brush_size
    }
}
