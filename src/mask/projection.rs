//! Mapping between the letterboxed canvas and source image pixels
//!
//! The canvas shows the source image scaled to fit and centred, leaving bars
//! on two sides when the aspect ratios differ. Masks are painted in canvas
//! space but the model expects them at the image's own resolution.

use crate::types::{Mask, Point, MASK_BLACK, MASK_WHITE};
use image::GrayImage;

/// Fit-and-centre transform from image space to canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxProjection {
    image_width: u32,
    image_height: u32,
    canvas_width: u32,
    canvas_height: u32,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl LetterboxProjection {
    /// Compute the projection of an `image` shown on a `canvas`.
    /// `None` when either has a zero dimension.
    #[must_use]
    pub fn fit(image: (u32, u32), canvas: (u32, u32)) -> Option<Self> {
        let (image_width, image_height) = image;
        let (canvas_width, canvas_height) = canvas;
        if image_width == 0 || image_height == 0 || canvas_width == 0 || canvas_height == 0 {
            return None;
        }

        let (iw, ih) = (image_width as f32, image_height as f32);
        let (cw, ch) = (canvas_width as f32, canvas_height as f32);

        let (render_width, render_height) = if iw / ih > cw / ch {
            (cw, cw * ih / iw)
        } else {
            (ch * iw / ih, ch)
        };

        Some(Self {
            image_width,
            image_height,
            canvas_width,
            canvas_height,
            scale: render_width / iw,
            offset_x: (cw - render_width) / 2.0,
            offset_y: (ch - render_height) / 2.0,
        })
    }

    /// Projection where canvas and image coincide
    #[must_use]
    pub fn identity(width: u32, height: u32) -> Option<Self> {
        Self::fit((width, height), (width, height))
    }

    /// Canvas pixels per image pixel
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Top-left corner of the displayed image on the canvas
    #[must_use]
    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    /// Displayed image size on the canvas
    #[must_use]
    pub fn rendered_size(&self) -> (f32, f32) {
        (
            self.image_width as f32 * self.scale,
            self.image_height as f32 * self.scale,
        )
    }

    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    #[must_use]
    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    #[must_use]
    pub fn image_to_canvas(&self, point: Point) -> Point {
        Point::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + point.y * self.scale,
        )
    }

    /// Image-space position under a canvas point, `None` on the bars
    #[must_use]
    pub fn canvas_to_image(&self, point: Point) -> Option<Point> {
        let x = (point.x - self.offset_x) / self.scale;
        let y = (point.y - self.offset_y) / self.scale;
        let inside = (0.0..self.image_width as f32).contains(&x)
            && (0.0..self.image_height as f32).contains(&y);
        inside.then_some(Point::new(x, y))
    }

    /// Resample a canvas-space mask into image space.
    ///
    /// An image pixel is selected when its centre lands on a selected canvas
    /// pixel or when any selected canvas pixel centre falls inside its
    /// footprint. The second rule keeps thin strokes alive when the image is
    /// shown enlarged. Paint on the bars is dropped and the result stays
    /// binary. Returns `None` if nothing selected survives.
    #[must_use]
    pub fn project_mask(&self, mask: &Mask) -> Option<Mask> {
        if mask.dimensions() != self.canvas_size() {
            log::warn!(
                "Mask is {}x{} but canvas is {}x{}; sampling out-of-range pixels as unselected",
                mask.width(),
                mask.height(),
                self.canvas_width,
                self.canvas_height
            );
        }

        let mut raster = GrayImage::from_fn(self.image_width, self.image_height, |x, y| {
            let canvas = self.image_to_canvas(Point::new(x as f32 + 0.5, y as f32 + 0.5));
            let selected = canvas.x >= 0.0
                && canvas.y >= 0.0
                && mask.is_selected(canvas.x.floor() as u32, canvas.y.floor() as u32);
            image::Luma([if selected { MASK_WHITE } else { MASK_BLACK }])
        });

        for (cx, cy, value) in mask.raster().enumerate_pixels() {
            if value.0[0] != MASK_WHITE {
                continue;
            }
            let centre = Point::new(cx as f32 + 0.5, cy as f32 + 0.5);
            if let Some(point) = self.canvas_to_image(centre) {
                let x = (point.x.floor() as u32).min(self.image_width - 1);
                let y = (point.y.floor() as u32).min(self.image_height - 1);
                raster.put_pixel(x, y, image::Luma([MASK_WHITE]));
            }
        }

        let projected = Mask::from_raster(raster);
        (!projected.is_empty()).then_some(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::{MaskRenderer, StrokeTarget};

    fn mask_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Mask {
        Mask::from_raster(GrayImage::from_fn(width, height, |x, y| {
            image::Luma([if f(x, y) { MASK_WHITE } else { MASK_BLACK }])
        }))
    }

    #[test]
    fn test_wide_image_gets_bars_top_and_bottom() {
        let p = LetterboxProjection::fit((200, 100), (100, 100)).unwrap();
        assert!((p.scale() - 0.5).abs() < 1e-6);
        assert_eq!(p.offset(), (0.0, 25.0));
        assert_eq!(p.rendered_size(), (100.0, 50.0));
    }

    #[test]
    fn test_tall_image_gets_bars_left_and_right() {
        let p = LetterboxProjection::fit((100, 200), (160, 100)).unwrap();
        assert!((p.scale() - 0.5).abs() < 1e-6);
        assert_eq!(p.offset(), (55.0, 0.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(LetterboxProjection::fit((0, 10), (10, 10)).is_none());
        assert!(LetterboxProjection::fit((10, 10), (10, 0)).is_none());
    }

    #[test]
    fn test_canvas_to_image_round_trip_and_bars() {
        let p = LetterboxProjection::fit((200, 100), (100, 100)).unwrap();
        let image_point = p.canvas_to_image(Point::new(50.0, 50.0)).unwrap();
        assert!((image_point.x - 100.0).abs() < 1e-4);
        assert!((image_point.y - 50.0).abs() < 1e-4);

        assert!(p.canvas_to_image(Point::new(50.0, 10.0)).is_none());
        assert!(p.canvas_to_image(Point::new(50.0, 90.0)).is_none());
    }

    #[test]
    fn test_identity_projection_preserves_mask() {
        let mask = mask_from_fn(10, 8, |x, _| x < 5);
        let p = LetterboxProjection::identity(10, 8).unwrap();
        let projected = p.project_mask(&mask).unwrap();
        assert_eq!(projected, mask);
    }

    #[test]
    fn test_projection_upscales_to_image_resolution() {
        // 200x100 image on a 100x100 canvas: image occupies rows 25..75
        let mask = mask_from_fn(100, 100, |x, y| x < 50 && (25..75).contains(&y));
        let p = LetterboxProjection::fit((200, 100), (100, 100)).unwrap();
        let projected = p.project_mask(&mask).unwrap();

        assert_eq!(projected.dimensions(), (200, 100));
        assert!(projected.is_binary());
        assert!(projected.is_selected(0, 0));
        assert!(projected.is_selected(99, 99));
        assert!(!projected.is_selected(100, 0));
        assert_eq!(projected.white_pixel_count(), 100 * 100);
    }

    #[test]
    fn test_paint_on_bars_only_yields_none() {
        let mask = mask_from_fn(100, 100, |_, y| y < 20);
        let p = LetterboxProjection::fit((200, 100), (100, 100)).unwrap();
        assert!(p.project_mask(&mask).is_none());
    }

    #[test]
    fn test_small_brush_survives_enlarged_image() {
        let p = LetterboxProjection::fit((10, 10), (1000, 1000)).unwrap();
        let mut renderer = MaskRenderer::new(5);
        renderer.resize(1000, 1000);
        renderer.begin_stroke(Point::new(20.0, 20.0));
        renderer.end_stroke();

        let canvas_mask = renderer.export_mask().unwrap();
        assert!(canvas_mask.white_pixel_count() > 0);

        let projected = p.project_mask(&canvas_mask).expect("stroke must survive projection");
        assert!(projected.is_binary());
        assert_eq!(projected.white_pixel_count(), 1);
        assert!(projected.is_selected(0, 0));
    }

    #[test]
    fn test_single_canvas_pixel_selects_its_image_pixel() {
        // 4x4 image at scale 25: canvas pixel (60, 85) lies in image pixel (2, 3)
        let p = LetterboxProjection::fit((4, 4), (100, 100)).unwrap();
        let mask = mask_from_fn(100, 100, |x, y| x == 60 && y == 85);
        let projected = p.project_mask(&mask).unwrap();
        assert_eq!(projected.white_pixel_count(), 1);
        assert!(projected.is_selected(2, 3));
    }
}
