//! Edit backend for the Gemini `generateContent` REST API

use super::response::{select_image, InlineImage, ResponsePart};
use super::ImageEditBackend;
use crate::config::ClientConfig;
use crate::error::{EditError, RemoteFailure, Result};
use crate::services::ImageIOService;
use crate::types::{EditImage, EditRequest, Mask};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use instant::Instant;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Appended to every prompt before it is sent
pub const PROMPT_SUFFIX: &str = ". Ensure the final image is high-resolution, 4k quality, photorealistic, and seamlessly blended with the original photo. The lighting and shadows should be consistent with the original image.";

/// Name given to images produced by the model
pub const RESULT_IMAGE_NAME: &str = "modified-house.png";

/// Append the fixed quality and consistency instructions to a user prompt.
/// The prompt itself is sent exactly as typed.
#[must_use]
pub fn augment_prompt(prompt: &str) -> String {
    format!("{prompt}{PROMPT_SUFFIX}")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl From<Part> for ResponsePart {
    fn from(part: Part) -> Self {
        match (part.inline_data, part.text) {
            (Some(data), _) => ResponsePart::Image(InlineImage {
                mime_type: data.mime_type,
                data: data.data,
            }),
            (None, Some(text)) => ResponsePart::Text(text),
            (None, None) => ResponsePart::Other,
        }
    }
}

impl GenerateContentResponse {
    /// Parts of the first candidate, in order
    ///
    /// # Errors
    /// [`RemoteFailure::MalformedResponse`] when the response has no candidate
    pub fn into_parts(self) -> std::result::Result<Vec<ResponsePart>, RemoteFailure> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(RemoteFailure::MalformedResponse(format!(
                "response has no candidates (block reason: {})",
                block_reason.as_deref().unwrap_or("none")
            )));
        };

        debug!(finish_reason = ?candidate.finish_reason, "received candidate");
        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().map(ResponsePart::from).collect())
            .unwrap_or_default())
    }
}

/// Client for image edits through the Gemini API.
///
/// Holds its own credential; nothing is read from the process environment.
#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    config: ClientConfig,
}

impl GeminiClient {
    /// Create a client from validated configuration
    ///
    /// # Errors
    /// - Invalid configuration (missing API key, bad endpoint)
    /// - Failed to create HTTP client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EditError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL of the `generateContent` call
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the JSON body: image, augmented prompt, then the mask if any
    ///
    /// # Errors
    /// Mask PNG encoding failure
    pub fn build_request_body(request: &EditRequest) -> Result<GenerateContentRequest> {
        let image = request.image();
        let mut parts = vec![
            Part {
                inline_data: Some(InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: STANDARD.encode(image.bytes()),
                }),
                ..Part::default()
            },
            Part {
                text: Some(augment_prompt(request.prompt())),
                ..Part::default()
            },
        ];

        if let Some(mask) = request.mask() {
            parts.push(Part {
                inline_data: Some(InlineData {
                    mime_type: Mask::MIME_TYPE.to_string(),
                    data: STANDARD.encode(mask.to_png()?),
                }),
                ..Part::default()
            });
        }

        Ok(GenerateContentRequest {
            contents: vec![Content { parts, role: None }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        })
    }

    async fn send(
        &self,
        body: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, RemoteFailure> {
        let response = self
            .http
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteFailure::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteFailure::Transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(RemoteFailure::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_response(&text)
    }
}

/// Parse a `generateContent` response body
///
/// # Errors
/// [`RemoteFailure::MalformedResponse`] for invalid JSON
pub fn parse_response(body: &str) -> std::result::Result<GenerateContentResponse, RemoteFailure> {
    serde_json::from_str(body).map_err(|e| RemoteFailure::MalformedResponse(e.to_string()))
}

/// Turn a parsed response into the edited image.
///
/// Remote failures come back as [`EditError::Remote`]; image bytes that do
/// not decode come back as [`EditError::Decode`].
pub fn image_from_response(response: GenerateContentResponse) -> Result<EditImage> {
    let inline = response
        .into_parts()
        .and_then(select_image)
        .map_err(EditError::remote)?;

    let bytes = STANDARD.decode(inline.data.trim()).map_err(|e| {
        EditError::remote(RemoteFailure::MalformedResponse(format!(
            "image data is not valid base64: {e}"
        )))
    })?;

    debug!(mime_type = %inline.mime_type, bytes = bytes.len(), "decoding returned image");
    ImageIOService::decode(bytes, RESULT_IMAGE_NAME)
}

#[async_trait]
impl ImageEditBackend for GeminiClient {
    #[instrument(
        skip(self, request),
        fields(
            model = %self.config.model,
            dimensions = %format!("{}x{}", request.image().width(), request.image().height()),
            masked = request.mask().is_some()
        )
    )]
    async fn submit(&self, request: &EditRequest) -> Result<EditImage> {
        let start = Instant::now();
        let body = Self::build_request_body(request)?;

        info!("Sending edit request");
        let outcome = match self.send(&body).await {
            Ok(response) => image_from_response(response),
            Err(failure) => Err(EditError::remote(failure)),
        };

        match &outcome {
            Ok(image) => info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                width = image.width(),
                height = image.height(),
                "Edit request completed"
            ),
            Err(EditError::Remote(failure)) => error!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                detail = %failure.detail(),
                "Error calling image edit API"
            ),
            Err(e) => error!(error = %e, "Edited image could not be used"),
        }

        outcome
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
