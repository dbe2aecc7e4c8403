//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputFormat};
use crate::{
    config::{AppConfig, ClientConfig, EditorConfig, OutputFormat},
    presets::find_feature,
    services::OutputFormatHandler,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Name of the settings directory under the platform config dir
const CONFIG_DIR_NAME: &str = "house-architect";
const CONFIG_FILE_NAME: &str = "config.json";

/// Merges the settings file with command-line overrides
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Default settings file location, e.g. `~/.config/house-architect/config.json`
    pub(crate) fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the settings file: `--config` must exist, the default location
    /// is optional.
    pub(crate) fn load_app_config(cli: &Cli) -> Result<AppConfig> {
        if let Some(path) = &cli.config {
            return AppConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()));
        }

        match Self::default_config_path() {
            Some(path) if path.is_file() => AppConfig::from_json_file(&path)
                .with_context(|| format!("Failed to load config file {}", path.display())),
            _ => Ok(AppConfig::default()),
        }
    }

    /// Editor settings with CLI overrides applied
    pub(crate) fn editor_config(cli: &Cli, base: &EditorConfig) -> Result<EditorConfig> {
        let mut builder = EditorConfig::builder()
            .brush_size(cli.brush_size.unwrap_or(base.brush_size))
            .download_name(base.download_name.clone())
            .output_format(Self::output_format(cli, base));

        if let Some(canvas) = cli.canvas.or(base.canvas) {
            builder = builder.canvas(canvas);
        }

        builder.build().context("Invalid editor settings")
    }

    /// `--format`, else the extension of `--output`, else the settings file
    fn output_format(cli: &Cli, base: &EditorConfig) -> OutputFormat {
        match (cli.format, &cli.output) {
            (Some(format), _) => format.into(),
            (None, Some(path)) if path.extension().is_some() => OutputFormatHandler::from_path(path),
            (None, _) => base.output_format,
        }
    }

    /// Client settings with CLI overrides applied. The API key only ever
    /// comes from the command line or its environment variable.
    pub(crate) fn client_config(cli: &Cli, base: &ClientConfig) -> Result<ClientConfig> {
        let api_key = cli.api_key.clone().unwrap_or_default();

        ClientConfig::builder()
            .api_key(api_key)
            .model(cli.model.clone().unwrap_or_else(|| base.model.clone()))
            .endpoint(cli.endpoint.clone().unwrap_or_else(|| base.endpoint.clone()))
            .timeout_secs(cli.timeout.unwrap_or(base.timeout_secs))
            .build()
            .context("Invalid client settings")
    }

    /// The prompt to send: `--prompt` text or the prompt of `--feature`
    pub(crate) fn resolve_prompt(cli: &Cli) -> Result<String> {
        if let Some(title) = &cli.feature {
            let feature = find_feature(title).with_context(|| {
                format!("Unknown feature '{title}'. Use --list-features to see the catalog.")
            })?;
            return Ok(feature.prompt.to_string());
        }

        Ok(cli.prompt.clone().unwrap_or_default())
    }

    /// Where the edited image is written. The default download name gets
    /// the extension of the chosen format.
    pub(crate) fn output_path(cli: &Cli, editor: &EditorConfig) -> PathBuf {
        cli.output.clone().unwrap_or_else(|| {
            PathBuf::from(&editor.download_name)
                .with_extension(OutputFormatHandler::get_extension(editor.output_format))
        })
    }
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => Self::Png,
            CliOutputFormat::Jpeg => Self::Jpeg,
            CliOutputFormat::Webp => Self::WebP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanvasSize, DEFAULT_BRUSH_SIZE, DEFAULT_DOWNLOAD_NAME, DEFAULT_MODEL};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["house-architect"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_editor_defaults_without_flags() {
        let cli = parse(&["house.jpg", "-p", "add a fence"]);
        let editor = CliConfigBuilder::editor_config(&cli, &EditorConfig::default()).unwrap();
        assert_eq!(editor.brush_size, DEFAULT_BRUSH_SIZE);
        assert_eq!(editor.canvas, None);
        assert_eq!(editor.output_format, OutputFormat::Png);
    }

    #[test]
    fn test_editor_overrides() {
        let cli = parse(&[
            "house.jpg",
            "-p",
            "x",
            "--brush-size",
            "500",
            "--canvas",
            "800x600",
            "--format",
            "jpeg",
        ]);
        let editor = CliConfigBuilder::editor_config(&cli, &EditorConfig::default()).unwrap();
        assert_eq!(editor.brush_size, 100);
        assert_eq!(editor.canvas, Some(CanvasSize::new(800, 600)));
        assert_eq!(editor.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_format_inferred_from_output_extension() {
        let cli = parse(&["house.jpg", "-p", "x", "-o", "edit.JPG"]);
        let editor = CliConfigBuilder::editor_config(&cli, &EditorConfig::default()).unwrap();
        assert_eq!(editor.output_format, OutputFormat::Jpeg);

        let cli = parse(&["house.jpg", "-p", "x", "-o", "edit.jpg", "--format", "webp"]);
        let editor = CliConfigBuilder::editor_config(&cli, &EditorConfig::default()).unwrap();
        assert_eq!(editor.output_format, OutputFormat::WebP);
    }

    #[test]
    fn test_default_output_name_follows_format() {
        let cli = parse(&["house.jpg", "-p", "x", "--format", "jpeg"]);
        let editor = CliConfigBuilder::editor_config(&cli, &EditorConfig::default()).unwrap();
        let path = CliConfigBuilder::output_path(&cli, &editor);
        assert_eq!(path, PathBuf::from("ai-house-architect-edit.jpg"));
    }

    #[test]
    fn test_client_requires_api_key() {
        let mut cli = parse(&["house.jpg", "-p", "x"]);
        cli.api_key = None;
        assert!(CliConfigBuilder::client_config(&cli, &ClientConfig::default()).is_err());

        cli.api_key = Some("secret".to_string());
        let client = CliConfigBuilder::client_config(&cli, &ClientConfig::default()).unwrap();
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.api_key, "secret");
    }

    #[test]
    fn test_client_overrides() {
        let mut cli = parse(&[
            "house.jpg",
            "-p",
            "x",
            "--model",
            "other-model",
            "--endpoint",
            "http://localhost:8080/v1/",
            "--timeout",
            "5",
        ]);
        cli.api_key = Some("k".to_string());
        let client = CliConfigBuilder::client_config(&cli, &ClientConfig::default()).unwrap();
        assert_eq!(client.model, "other-model");
        assert_eq!(client.endpoint, "http://localhost:8080/v1");
        assert_eq!(client.timeout_secs, 5);
    }

    #[test]
    fn test_resolve_prompt_from_feature() {
        let cli = parse(&["house.jpg", "--feature", "solar panels"]);
        let prompt = CliConfigBuilder::resolve_prompt(&cli).unwrap();
        assert!(prompt.contains("solar panels"));

        let cli = parse(&["house.jpg", "--feature", "moat"]);
        assert!(CliConfigBuilder::resolve_prompt(&cli).is_err());
    }

    #[test]
    fn test_output_path_defaults_to_download_name() {
        let cli = parse(&["house.jpg", "-p", "x"]);
        let path = CliConfigBuilder::output_path(&cli, &EditorConfig::default());
        assert_eq!(path, PathBuf::from(DEFAULT_DOWNLOAD_NAME));

        let cli = parse(&["house.jpg", "-p", "x", "-o", "out/result.png"]);
        let path = CliConfigBuilder::output_path(&cli, &EditorConfig::default());
        assert_eq!(path, PathBuf::from("out/result.png"));
    }

    #[test]
    fn test_explicit_missing_config_file_fails() {
        let cli = parse(&["house.jpg", "-p", "x", "--config", "/nonexistent/config.json"]);
        assert!(CliConfigBuilder::load_app_config(&cli).is_err());
    }
}
