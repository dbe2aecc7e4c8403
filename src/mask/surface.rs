//! Overlay raster that brush strokes are painted onto

use crate::types::Point;
use image::{Rgba, RgbaImage};

/// Translucent cyan used for live stroke feedback
pub const BRUSH_COLOR: Rgba<u8> = Rgba([0, 255, 255, 128]);

/// Owned RGBA surface with explicit drawing commands.
///
/// Starts fully transparent. Coverage is binary: a pixel is painted when its
/// centre lies inside the shape, so no partially covered edge pixels exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySurface {
    pixels: RgbaImage,
}

impl OverlaySurface {
    /// Create a transparent surface, or `None` for a zero-sized canvas
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Alpha of the pixel at `(x, y)`, `None` outside the surface
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0[3])
    }

    /// Erase everything to fully transparent
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// True when every pixel is fully transparent
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    /// Paint a capsule: the segment `from`-`to` thickened to `diameter` with
    /// round caps. A zero-length segment paints a disc.
    ///
    /// Every covered pixel is composited exactly once (source-over).
    /// Returns the number of pixels touched.
    pub fn fill_capsule(&mut self, from: Point, to: Point, diameter: f32, color: Rgba<u8>) -> usize {
        let finite = [from.x, from.y, to.x, to.y, diameter]
            .iter()
            .all(|v| v.is_finite());
        if !finite || diameter <= 0.0 {
            return 0;
        }

        let radius = diameter / 2.0;
        let radius_sq = radius * radius;

        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
        let max_x = ((from.x.max(to.x) + radius).ceil() as u32).min(self.width());
        let max_y = ((from.y.max(to.y) + radius).ceil() as u32).min(self.height());

        let mut touched = 0;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(centre, from, to) <= radius_sq {
                    let dst = self.pixels.get_pixel_mut(x, y);
                    *dst = composite_over(color, *dst);
                    touched += 1;
                }
            }
        }
        touched
    }
}

/// Squared distance from `p` to the closest point of segment `a`-`b`
fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let ab2 = abx * abx + aby * aby;

    let t = if ab2 < 1e-6 {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / ab2).clamp(0.0, 1.0)
    };

    let qx = a.x + t * abx - p.x;
    let qy = a.y + t * aby - p.y;
    qx * qx + qy * qy
}

/// Porter-Duff source-over on straight (non-premultiplied) RGBA8
fn composite_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src.0[3]) / 255.0;
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let sc = f32::from(src.0[i]);
        let dc = f32::from(dst.0[i]);
        ((sc * sa + dc * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
