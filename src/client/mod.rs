//! Edit request client: the seam between the session and the generative model
//!
//! - `gemini`: production backend talking to the Gemini REST API
//! - `response`: the image-or-text response policy
//! - `test_utils`: scripted backend for tests

pub mod gemini;
pub mod response;

#[cfg(test)]
pub mod test_utils;

use crate::error::Result;
use crate::types::{EditImage, EditRequest};
use async_trait::async_trait;

pub use gemini::{augment_prompt, GeminiClient, PROMPT_SUFFIX};
pub use response::{select_image, InlineImage, ResponsePart};

/// Trait for generative image edit backends
#[async_trait]
pub trait ImageEditBackend: Send + Sync {
    /// Submit one edit and wait for the resulting image
    ///
    /// # Errors
    /// - [`crate::EditError::Remote`] for network, API or policy failures,
    ///   with the detail already logged
    /// - [`crate::EditError::Decode`] when the returned image is unusable
    async fn submit(&self, request: &EditRequest) -> Result<EditImage>;

    /// Short name for logs
    fn name(&self) -> &str;
}
