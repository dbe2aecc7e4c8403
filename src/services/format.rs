//! Output format handling service
//!
//! Keeps download-format conversion out of the session logic.

use crate::config::OutputFormat;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Service for handling output format conversions
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Convert pixels into a layout the target encoder accepts
    ///
    /// JPEG has no alpha channel, so the image is flattened to RGB. The other
    /// formats keep RGBA.
    ///
    /// # Examples
    /// ```rust
    /// use house_architect::{services::OutputFormatHandler, config::OutputFormat};
    /// use image::DynamicImage;
    ///
    /// let image = DynamicImage::new_rgba8(4, 4);
    /// let converted = OutputFormatHandler::convert_format(&image, OutputFormat::Jpeg);
    /// assert!(matches!(converted, DynamicImage::ImageRgb8(_)));
    /// ```
    #[must_use]
    pub fn convert_format(image: &DynamicImage, format: OutputFormat) -> DynamicImage {
        match format {
            OutputFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            OutputFormat::Png | OutputFormat::WebP => DynamicImage::ImageRgba8(image.to_rgba8()),
        }
    }

    /// Encoder used for a given output format
    #[must_use]
    pub fn image_format(format: OutputFormat) -> ImageFormat {
        match format {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Get the appropriate file extension for a given output format
    ///
    /// # Examples
    /// ```rust
    /// use house_architect::{services::OutputFormatHandler, config::OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    /// Infer the output format from a file extension, falling back to PNG
    pub fn from_path<P: AsRef<Path>>(path: P) -> OutputFormat {
        let inferred = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match inferred.as_deref() {
            Some("jpg" | "jpeg") => OutputFormat::Jpeg,
            Some("webp") => OutputFormat::WebP,
            Some("png") => OutputFormat::Png,
            other => {
                if let Some(ext) = other {
                    log::warn!("Unknown output extension '{}', saving as PNG", ext);
                }
                OutputFormat::Png
            },
        }
    }
}
