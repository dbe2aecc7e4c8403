#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # House Architect
//!
//! Core of an AI-assisted house photo editor: the user uploads a photo,
//! optionally paints over the part to change, describes the change, and a
//! generative image model returns the edited photo.
//!
//! ## Features
//!
//! - **Mask painting**: translucent brush strokes on an overlay, exported as
//!   a strict black/white mask
//! - **Letterbox projection**: masks painted on a fit-to-canvas view are
//!   resampled to the photo's own resolution before sending
//! - **Edit lifecycle**: upload, edit, retry, download and reset with a
//!   single-request-in-flight guarantee
//! - **Gemini client**: image + prompt + optional mask in, first image out
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use house_architect::{
//!     ClientConfig, EditSession, EditorConfig, GeminiClient, Point, StrokeTarget,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = GeminiClient::new(ClientConfig::builder().api_key("...").build()?)?;
//! let mut session = EditSession::new(Arc::new(client), EditorConfig::default());
//!
//! session.upload(std::fs::read("house.jpg")?, "house.jpg")?;
//! session.begin_stroke(Point::new(120.0, 80.0));
//! session.extend_stroke(Point::new(260.0, 80.0));
//! session.end_stroke();
//! session.set_prompt("Replace the roof with dark slate tiles");
//!
//! session.request_edit().await?;
//! session.download("ai-house-architect-edit.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, spinner and tracing subscriber
//! - `webp-support` (default): WebP input and output
//! - `tracing-json`: JSON log output for the CLI

#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod mask;
pub mod presets;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use std::sync::Arc;

// Public API exports
pub use client::{augment_prompt, GeminiClient, ImageEditBackend, PROMPT_SUFFIX};
pub use config::{AppConfig, CanvasSize, ClientConfig, EditorConfig, OutputFormat};
pub use error::{EditError, RemoteFailure, Result};
pub use mask::{LetterboxProjection, MaskRenderer, StrokeScript, StrokeTarget};
pub use presets::{find_feature, Feature, FEATURES};
pub use services::{ImageIOService, OutputFormatHandler};
pub use session::{EditSession, SessionState};
pub use types::{EditImage, EditRequest, Mask, Point};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Apply one prompt to an encoded image without a session
///
/// Decodes `image_bytes`, sends it with `prompt` and the optional `mask`
/// (already in image resolution) to `backend`, and returns the edited image.
///
/// # Examples
/// ```rust,no_run
/// use house_architect::{edit_image_bytes, ClientConfig, GeminiClient};
///
/// # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
/// let client = GeminiClient::new(ClientConfig::builder().api_key("...").build()?)?;
/// let edited = edit_image_bytes(&client, upload, "house.jpg", "Add solar panels", None).await?;
/// std::fs::write("edited.png", edited.bytes())?;
/// # Ok(())
/// # }
/// ```
pub async fn edit_image_bytes<B: ImageEditBackend + ?Sized>(
    backend: &B,
    image_bytes: Vec<u8>,
    name: &str,
    prompt: &str,
    mask: Option<Mask>,
) -> Result<EditImage> {
    let image = ImageIOService::decode(image_bytes, name)?;
    if let Some(mask) = &mask {
        if mask.dimensions() != image.dimensions() {
            return Err(EditError::invalid_input(format!(
                "Mask is {}x{} but the image is {}x{}",
                mask.width(),
                mask.height(),
                image.width(),
                image.height()
            )));
        }
    }

    let request = EditRequest::new(Arc::new(image), prompt, mask)?;
    backend.submit(&request).await
}
