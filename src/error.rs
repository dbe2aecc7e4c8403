//! Error types for mask painting, image lifecycle and edit requests

use thiserror::Error;

/// Result type alias for house-architect operations
pub type Result<T> = std::result::Result<T, EditError>;

/// User-facing summary for every remote failure
pub const REMOTE_FAILURE_MESSAGE: &str =
    "Failed to generate image. The model may have refused the request. Please try a different prompt or image.";

/// Error types for editing operations
#[derive(Error, Debug)]
pub enum EditError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Rejected locally before any network call (empty prompt, no image)
    #[error("{0}")]
    InvalidInput(String),

    /// Corrupt, empty or unsupported image data. Ends the editing session.
    #[error("{0}")]
    Decode(String),

    /// Network or API failure during an edit request
    #[error("{}", .0.user_message())]
    Remote(RemoteFailure),

    /// A request is already pending
    #[error("An edit is already in progress. Please wait for it to finish.")]
    EditInFlight,

    /// Operation not valid in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Diagnostic detail of a failed edit request.
///
/// Only [`RemoteFailure::user_message`] is meant for display. The variants carry
/// the raw detail that gets logged for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// Connection, TLS or timeout failure
    Transport(String),
    /// Non-success HTTP status from the API
    Status { status: u16, body: String },
    /// Response body that could not be understood
    MalformedResponse(String),
    /// The model answered with text only (usually a refusal or a question)
    TextInsteadOfImage(String),
    /// Neither image nor text in the response
    NoImage,
}

impl RemoteFailure {
    /// Message suitable for an error banner
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TextInsteadOfImage(text) => format!(
                "The model responded with text instead of an image: \"{}\". {}",
                text.trim(),
                REMOTE_FAILURE_MESSAGE
            ),
            _ => REMOTE_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Full diagnostic description for logs
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Transport(msg) => format!("transport error: {msg}"),
            Self::Status { status, body } => format!("API returned status {status}: {body}"),
            Self::MalformedResponse(msg) => format!("malformed response: {msg}"),
            Self::TextInsteadOfImage(text) => {
                format!("model responded with text instead of an image: {text}")
            },
            Self::NoImage => "no image data found in the AI response".to_string(),
        }
    }
}

impl EditError {
    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new remote error
    #[must_use]
    pub fn remote(failure: RemoteFailure) -> Self {
        Self::Remote(failure)
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Whether this error ends the editing session
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Whether the session should keep its current image after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !self.is_session_fatal()
    }
}
