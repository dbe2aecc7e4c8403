//! Configuration types for the editor session and the edit client

use crate::error::{EditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Smallest brush diameter offered by the brush control
pub const MIN_BRUSH_SIZE: u32 = 5;
/// Largest brush diameter offered by the brush control
pub const MAX_BRUSH_SIZE: u32 = 100;
/// Brush diameter used until the user changes it
pub const DEFAULT_BRUSH_SIZE: u32 = 40;

/// Default model for image edits
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
/// Default REST endpoint of the generative language API
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
/// File name used when downloading the edited image
pub const DEFAULT_DOWNLOAD_NAME: &str = "ai-house-architect-edit.png";

/// Download image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG (lossless, the format the model returns)
    #[default]
    Png,
    /// JPEG (alpha is flattened)
    Jpeg,
    /// WebP (lossless)
    WebP,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
        }
    }
}

/// Size of the editing canvas in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CanvasSize {
    type Err = EditError;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| EditError::invalid_config(format!("Canvas size '{s}' must look like 1280x720")))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| EditError::invalid_config(format!("Invalid canvas size '{s}': {e}")))
        };

        let size = Self::new(parse(w)?, parse(h)?);
        if size.width == 0 || size.height == 0 {
            return Err(EditError::invalid_config(format!(
                "Canvas size '{s}' must have non-zero width and height"
            )));
        }
        Ok(size)
    }
}

/// Configuration for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas the image is displayed on. `None` lays the canvas out at the
    /// image's own resolution.
    pub canvas: Option<CanvasSize>,

    /// Initial brush diameter (5-100 px)
    pub brush_size: u32,

    /// Format used for downloads
    pub output_format: OutputFormat,

    /// File name used for downloads
    pub download_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: None,
            brush_size: DEFAULT_BRUSH_SIZE,
            output_format: OutputFormat::default(),
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use house_architect::config::{CanvasSize, EditorConfig};
    ///
    /// let config = EditorConfig::builder()
    ///     .canvas(CanvasSize::new(1280, 720))
    ///     .brush_size(60)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.brush_size, 60);
    /// ```
    #[must_use]
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Brush size outside 5-100
    /// - Zero-sized canvas
    /// - Empty download name
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).contains(&self.brush_size) {
            return Err(EditError::config_value_error(
                "brush size",
                self.brush_size,
                "5-100",
                Some(DEFAULT_BRUSH_SIZE),
            ));
        }

        if let Some(canvas) = self.canvas {
            if canvas.width == 0 || canvas.height == 0 {
                return Err(EditError::invalid_config(format!(
                    "Canvas size {canvas} must have non-zero width and height"
                )));
            }
        }

        if self.download_name.trim().is_empty() {
            return Err(EditError::invalid_config("Download file name must not be empty"));
        }

        Ok(())
    }
}

/// Builder for `EditorConfig`
#[derive(Debug, Default)]
pub struct EditorConfigBuilder {
    config: EditorConfig,
}

impl EditorConfigBuilder {
    /// Set a fixed canvas size
    #[must_use]
    pub fn canvas(mut self, canvas: CanvasSize) -> Self {
        self.config.canvas = Some(canvas);
        self
    }

    /// Set the initial brush size, clamped to the brush control's range
    #[must_use]
    pub fn brush_size(mut self, diameter: u32) -> Self {
        self.config.brush_size = diameter.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn download_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.download_name = name.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<EditorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for the generative image client.
///
/// The API key is supplied at startup and never written to config files.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(skip)]
    pub api_key: String,

    /// Model used for edits
    pub model: String,

    /// Base URL of the REST API
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Missing API key
    /// - Empty model name or non-HTTP endpoint
    /// - Zero timeout
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(EditError::invalid_config(
                "API key is not set. Pass --api-key or set GEMINI_API_KEY.",
            ));
        }

        if self.model.trim().is_empty() {
            return Err(EditError::invalid_config("Model name must not be empty"));
        }

        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(EditError::invalid_config(format!(
                "Endpoint '{}' must be an http(s) URL",
                self.endpoint
            )));
        }

        if self.timeout_secs == 0 {
            return Err(EditError::config_value_error(
                "timeout",
                self.timeout_secs,
                "1-3600 seconds",
                Some(120),
            ));
        }

        Ok(())
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.api_key = key.into();
        self
    }

    #[must_use]
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.config.model = model.into();
        self
    }

    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Settings file layout (`config.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub editor: EditorConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load settings from a JSON file
    ///
    /// # Errors
    /// - File cannot be read
    /// - Malformed JSON
    /// - Editor settings fail validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| EditError::file_io_error("read config file", path_ref, &e))?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            EditError::invalid_config(format!("Failed to parse '{}': {}", path_ref.display(), e))
        })?;

        config.editor.validate()?;
        log::debug!("Loaded configuration from {}", path_ref.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_editor_defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.brush_size, DEFAULT_BRUSH_SIZE);
        assert_eq!(config.download_name, DEFAULT_DOWNLOAD_NAME);
    }

    #[test]
    fn test_brush_size_clamped_by_builder() {
        let config = EditorConfig::builder().brush_size(500).build().unwrap();
        assert_eq!(config.brush_size, MAX_BRUSH_SIZE);

        let config = EditorConfig::builder().brush_size(1).build().unwrap();
        assert_eq!(config.brush_size, MIN_BRUSH_SIZE);
    }

    #[test]
    fn test_manual_invalid_brush_size() {
        let mut config = EditorConfig::default();
        config.brush_size = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("brush size"));
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn test_canvas_size_parsing() {
        assert_eq!("1280x720".parse::<CanvasSize>().unwrap(), CanvasSize::new(1280, 720));
        assert_eq!(" 64X48 ".parse::<CanvasSize>().unwrap(), CanvasSize::new(64, 48));
        assert!("1280".parse::<CanvasSize>().is_err());
        assert!("0x720".parse::<CanvasSize>().is_err());
        assert!("axb".parse::<CanvasSize>().is_err());
    }

    #[test]
    fn test_client_requires_api_key() {
        let err = ClientConfig::builder().build().unwrap_err();
        assert!(matches!(err, EditError::InvalidConfig(_)));
        assert!(err.to_string().contains("API key"));

        let config = ClientConfig::builder()
            .api_key("secret-key")
            .endpoint("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_client_debug_redacts_key() {
        let config = ClientConfig::builder().api_key("super-secret").build().unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_client_rejects_bad_endpoint_and_timeout() {
        let err = ClientConfig::builder()
            .api_key("k")
            .endpoint("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http(s)"));

        let err = ClientConfig::builder().api_key("k").timeout_secs(0).build().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_app_config_from_json_never_reads_key() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"editor": {{"brush_size": 25, "canvas": {{"width": 800, "height": 600}}}},
                "client": {{"model": "custom-model", "api_key": "should-be-ignored"}}}}"#
        )
        .unwrap();

        let config = AppConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.editor.brush_size, 25);
        assert_eq!(config.editor.canvas, Some(CanvasSize::new(800, 600)));
        assert_eq!(config.client.model, "custom-model");
        assert!(config.client.api_key.is_empty());
        assert_eq!(config.client.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_app_config_rejects_invalid_editor_settings() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"editor": {{"brush_size": 0}}}}"#).unwrap();
        assert!(AppConfig::from_json_file(file.path()).is_err());
    }
}
