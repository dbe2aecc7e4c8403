//! Image I/O operations service
//!
//! This module is the decode boundary of the editor: every image that enters
//! a session (uploads and model responses alike) passes through
//! [`ImageIOService::decode`], and every download leaves through
//! [`ImageIOService::save_image`].

use crate::{
    config::OutputFormat,
    error::{EditError, Result},
    services::format::OutputFormatHandler,
    types::EditImage,
};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Message shown when an image decodes to zero pixels
pub const EMPTY_IMAGE_MESSAGE: &str =
    "The image file seems to be corrupted or empty. Please try another one.";

/// Message shown when an image cannot be decoded at all
pub const UNREADABLE_IMAGE_MESSAGE: &str =
    "Failed to load the image. It might be an unsupported format or a network issue.";

/// Service for handling image decoding, encoding and file output
pub struct ImageIOService;

impl ImageIOService {
    /// Decode untrusted image bytes into an [`EditImage`]
    ///
    /// # Arguments
    /// * `bytes` - Encoded image data (PNG, JPEG, WebP, TIFF)
    /// * `name` - Display name kept with the image
    ///
    /// # Errors
    /// * [`EditError::Decode`] - undecodable data or zero width/height
    ///
    /// # Examples
    /// ```rust,no_run
    /// use house_architect::services::ImageIOService;
    ///
    /// let data = std::fs::read("house.jpg")?;
    /// let image = ImageIOService::decode(data, "house.jpg")?;
    /// println!("{}x{}", image.width(), image.height());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode<B: Into<Vec<u8>>, S: Into<String>>(bytes: B, name: S) -> Result<EditImage> {
        let bytes = bytes.into();
        let name = name.into();

        if bytes.is_empty() {
            log::debug!("Rejecting empty image payload '{}'", name);
            return Err(EditError::decode(EMPTY_IMAGE_MESSAGE));
        }

        let format = image::guess_format(&bytes).map_err(|e| {
            log::debug!("Could not detect format of '{}': {}", name, e);
            EditError::decode(UNREADABLE_IMAGE_MESSAGE)
        })?;

        let image = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
            log::debug!(
                "Failed to decode '{}' as {:?} ({} bytes): {}",
                name,
                format,
                bytes.len(),
                e
            );
            EditError::decode(UNREADABLE_IMAGE_MESSAGE)
        })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            log::debug!("Image '{}' has zero dimensions {}x{}", name, width, height);
            return Err(EditError::decode(EMPTY_IMAGE_MESSAGE));
        }

        log::debug!("Decoded '{}' as {:?} {}x{}", name, format, width, height);
        Ok(EditImage::from_parts(name, format, bytes, image))
    }

    /// Read and decode an image file
    ///
    /// # Errors
    /// * [`EditError::Io`] - the file cannot be read
    /// * [`EditError::Decode`] - the content is not a usable image
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<EditImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(EditError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        let data = std::fs::read(path_ref)
            .map_err(|e| EditError::file_io_error("read image data", path_ref, &e))?;

        let name = path_ref
            .file_name()
            .map_or_else(|| path_ref.display().to_string(), |n| n.to_string_lossy().into_owned());

        Self::decode(data, name)
    }

    /// Encode pixels into the given output format
    pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        let converted = OutputFormatHandler::convert_format(image, format);
        let mut buffer = Cursor::new(Vec::new());
        converted.write_to(&mut buffer, OutputFormatHandler::image_format(format))?;
        Ok(buffer.into_inner())
    }

    /// Encode pixels as PNG
    pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
        Self::encode(image, OutputFormat::Png)
    }

    /// Save an image to a file
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use house_architect::{services::ImageIOService, config::OutputFormat};
    /// use image::DynamicImage;
    ///
    /// # let image = DynamicImage::new_rgb8(100, 100);
    /// ImageIOService::save_image(&image, "edit.png", OutputFormat::Png)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EditError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        let encoded = Self::encode(image, format)?;
        std::fs::write(path_ref, encoded)
            .map_err(|e| EditError::file_io_error("write image file", path_ref, &e))?;

        log::info!("Saved {:?} image to {}", format, path_ref.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
        ImageIOService::encode_png(&image).unwrap()
    }

    #[test]
    fn test_decode_valid_png() {
        let image = ImageIOService::decode(png_bytes(5, 4), "house.png").unwrap();
        assert_eq!(image.dimensions(), (5, 4));
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.name(), "house.png");
        assert!(!image.bytes().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = ImageIOService::decode(b"definitely not an image".to_vec(), "bad.png").unwrap_err();
        assert!(matches!(err, EditError::Decode(_)));
        assert_eq!(err.to_string(), UNREADABLE_IMAGE_MESSAGE);
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        let err = ImageIOService::decode(Vec::new(), "empty.png").unwrap_err();
        assert!(matches!(err, EditError::Decode(_)));
        assert_eq!(err.to_string(), EMPTY_IMAGE_MESSAGE);
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(bytes.len() / 2);
        let err = ImageIOService::decode(bytes, "cut.png").unwrap_err();
        assert!(err.is_session_fatal());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ImageIOService::load_image("/definitely/missing/house.jpg").unwrap_err();
        assert!(matches!(err, EditError::Io(_)));
        assert!(err.to_string().contains("read image file"));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("edit.jpg");
        let image = DynamicImage::ImageRgb8(RgbImage::new(3, 3));

        ImageIOService::save_image(&image, &path, OutputFormat::Jpeg).unwrap();

        let reloaded = ImageIOService::load_image(&path).unwrap();
        assert_eq!(reloaded.format(), ImageFormat::Jpeg);
        assert_eq!(reloaded.dimensions(), (3, 3));
    }
}
