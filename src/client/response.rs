//! Picking the edited image out of a model response
//!
//! The model may answer with any mix of image and text parts. Policy, in
//! order: the first image part wins; otherwise the first text part becomes
//! the error (usually a refusal or a clarifying question); otherwise the
//! response is treated as empty.

use crate::error::RemoteFailure;

/// Inline image payload as returned by the API (base64 text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// Transport-neutral view of one response part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Image(InlineImage),
    Text(String),
    /// Anything else the API may add (function calls, thoughts, …)
    Other,
}

/// Apply the response policy to an ordered list of parts
///
/// # Errors
/// * [`RemoteFailure::TextInsteadOfImage`] - no image but at least one text part
/// * [`RemoteFailure::NoImage`] - neither images nor text
pub fn select_image<I>(parts: I) -> std::result::Result<InlineImage, RemoteFailure>
where
    I: IntoIterator<Item = ResponsePart>,
{
    let mut first_text: Option<String> = None;

    for part in parts {
        match part {
            ResponsePart::Image(image) if !image.data.is_empty() => return Ok(image),
            ResponsePart::Text(text) if first_text.is_none() && !text.trim().is_empty() => {
                first_text = Some(text);
            },
            _ => {},
        }
    }

    Err(first_text.map_or(RemoteFailure::NoImage, RemoteFailure::TextInsteadOfImage))
}
