//! Core data types shared by the mask renderer, the session and the edit client

use crate::error::{EditError, Result};
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;
use uuid::Uuid;

/// Mask value for pixels inside the edit region
pub const MASK_WHITE: u8 = 255;
/// Mask value for pixels outside the edit region
pub const MASK_BLACK: u8 = 0;

/// A pointer position in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A decoded image together with the encoded bytes it came from.
///
/// Every instance carries a fresh handle id. Sessions hold images behind
/// `Arc` and compare them by handle, never by pixels.
#[derive(Debug)]
pub struct EditImage {
    id: Uuid,
    name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
    image: DynamicImage,
}

impl EditImage {
    /// Assemble an image from already validated parts.
    ///
    /// Use [`crate::services::ImageIOService::decode`] to build one from
    /// untrusted bytes.
    pub(crate) fn from_parts(
        name: String,
        format: ImageFormat,
        bytes: Vec<u8>,
        image: DynamicImage,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            format,
            bytes,
            image,
        }
    }

    /// Unique handle of this image
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name (file name for uploads)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type of the encoded bytes
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Encoded bytes as received
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decoded pixels
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Binary edit mask: every pixel is either [`MASK_WHITE`] (editable) or [`MASK_BLACK`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    raster: GrayImage,
}

impl Mask {
    /// MIME type of the serialized mask
    pub const MIME_TYPE: &'static str = "image/png";

    /// Wrap a raster, snapping any non-zero value to white
    #[must_use]
    pub fn from_raster(mut raster: GrayImage) -> Self {
        for Luma([value]) in raster.pixels_mut() {
            *value = if *value > 0 { MASK_WHITE } else { MASK_BLACK };
        }
        Self { raster }
    }

    #[must_use]
    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Whether the pixel at `(x, y)` is part of the edit region
    #[must_use]
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.raster
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[0] == MASK_WHITE)
    }

    /// Number of pixels inside the edit region
    #[must_use]
    pub fn white_pixel_count(&self) -> usize {
        self.raster.pixels().filter(|p| p.0[0] == MASK_WHITE).count()
    }

    /// True when no pixel is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raster.pixels().all(|p| p.0[0] == MASK_BLACK)
    }

    /// True when every pixel is pure black or pure white
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.raster
            .pixels()
            .all(|p| p.0[0] == MASK_BLACK || p.0[0] == MASK_WHITE)
    }

    /// Serialize as an opaque single-channel PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(self.raster.clone()).write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

/// A single edit submitted to the generative model
#[derive(Debug, Clone)]
pub struct EditRequest {
    image: Arc<EditImage>,
    prompt: String,
    mask: Option<Mask>,
}

impl EditRequest {
    /// Build a request, enforcing its constraints.
    ///
    /// The prompt must contain non-whitespace text. A mask without any white
    /// pixel is dropped, which means the edit applies to the whole image.
    pub fn new<S: Into<String>>(image: Arc<EditImage>, prompt: S, mask: Option<Mask>) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(EditError::invalid_input(
                "Please describe the change you want to make.",
            ));
        }

        Ok(Self {
            image,
            prompt,
            mask: mask.filter(|m| !m.is_empty()),
        })
    }

    #[must_use]
    pub fn image(&self) -> &Arc<EditImage> {
        &self.image
    }

    /// Prompt exactly as the user entered it
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_image() -> Arc<EditImage> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 3));
        Arc::new(EditImage::from_parts(
            "house.png".to_string(),
            ImageFormat::Png,
            Vec::new(),
            image,
        ))
    }

    #[test]
    fn test_mask_snaps_to_binary() {
        let mut raster = GrayImage::new(3, 1);
        raster.put_pixel(0, 0, Luma([0]));
        raster.put_pixel(1, 0, Luma([1]));
        raster.put_pixel(2, 0, Luma([200]));
        let mask = Mask::from_raster(raster);

        assert!(mask.is_binary());
        assert_eq!(mask.white_pixel_count(), 2);
        assert!(!mask.is_selected(0, 0));
        assert!(mask.is_selected(2, 0));
        assert!(!mask.is_selected(10, 10));
    }

    #[test]
    fn test_mask_png_keeps_dimensions() {
        let mut raster = GrayImage::new(8, 6);
        raster.put_pixel(3, 3, Luma([MASK_WHITE]));
        let mask = Mask::from_raster(raster);

        let png = mask.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 3).0[0], MASK_WHITE);
        assert_eq!(decoded.get_pixel(0, 0).0[0], MASK_BLACK);
    }

    #[test]
    fn test_request_rejects_blank_prompt() {
        let err = EditRequest::new(sample_image(), "   \t", None).unwrap_err();
        assert!(matches!(err, EditError::InvalidInput(_)));
    }

    #[test]
    fn test_request_drops_empty_mask() {
        let empty = Mask::from_raster(GrayImage::new(4, 3));
        let request = EditRequest::new(sample_image(), "add a fence", Some(empty)).unwrap();
        assert!(request.mask().is_none());
        assert_eq!(request.prompt(), "add a fence");
    }

    #[test]
    fn test_image_handles_are_unique() {
        let a = sample_image();
        let b = sample_image();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.mime_type(), "image/png");
        assert_eq!(a.dimensions(), (4, 3));
    }
}
