//! House Architect CLI Tool
//!
//! Loads a house photo, optionally paints a selection from a stroke script,
//! sends one edit to the generative model and saves the result.

use super::config::CliConfigBuilder;
use crate::{
    client::{augment_prompt, GeminiClient, ImageEditBackend},
    config::CanvasSize,
    error::EditError,
    mask::StrokeScript,
    presets::FEATURES,
    services::{EditStage, LoadingTicker, LogProgressReporter, ProgressReporter},
    session::EditSession,
    tracing_config::init_cli_tracing,
    types::{EditImage, EditRequest},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// AI house photo editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "house-architect")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Photo of the house to edit
    #[arg(value_name = "INPUT", required_unless_present = "list_features")]
    pub input: Option<PathBuf>,

    /// Describe the change to make
    #[arg(short, long, conflicts_with = "feature")]
    pub prompt: Option<String>,

    /// Use the prompt of a catalog feature (see --list-features)
    #[arg(long)]
    pub feature: Option<String>,

    /// Print the feature catalog and exit
    #[arg(long)]
    pub list_features: bool,

    /// JSON stroke script painting the area to change
    #[arg(long, value_name = "FILE")]
    pub strokes: Option<PathBuf>,

    /// Initial brush diameter in pixels (5-100)
    #[arg(long)]
    pub brush_size: Option<u32>,

    /// Canvas the strokes were painted on, e.g. 1280x720 [default: image size]
    #[arg(long, value_name = "WxH")]
    pub canvas: Option<CanvasSize>,

    /// Where to save the edited image [default: ai-house-architect-edit.png]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also save the mask that is sent with the request
    #[arg(long, value_name = "FILE")]
    pub mask_out: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Prepare the request but do not send it
    #[arg(long)]
    pub dry_run: bool,

    /// API key for the generative image service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the REST API
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Settings file [default: <config dir>/house-architect/config.json]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log progress instead of showing a spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Webp,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = uuid::Uuid::new_v4().to_string();
    init_cli_tracing(cli.verbose, &session_id).context("Failed to initialize tracing")?;

    if cli.list_features {
        print_features();
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input image is required")?;

    let app_config = CliConfigBuilder::load_app_config(&cli)?;
    let editor_config = CliConfigBuilder::editor_config(&cli, &app_config.editor)?;
    let prompt = CliConfigBuilder::resolve_prompt(&cli)?;
    let output = CliConfigBuilder::output_path(&cli, &editor_config);

    let backend: Arc<dyn ImageEditBackend> = if cli.dry_run {
        Arc::new(DryRunBackend)
    } else {
        let client_config = CliConfigBuilder::client_config(&cli, &app_config.client)?;
        Arc::new(GeminiClient::new(client_config).context("Failed to create API client")?)
    };

    let reporter = create_progress_reporter(cli.no_progress);
    let mut session = EditSession::new(backend, editor_config);
    info!(session = %session.id(), input = %input.display(), "starting edit");

    reporter.report_stage(EditStage::ImageLoading);
    if let Err(err) = session.upload_file(&input) {
        reporter.report_error(EditStage::ImageLoading, &err.to_string());
        return Err(err).with_context(|| format!("Failed to load {}", input.display()));
    }

    if let Some(path) = &cli.strokes {
        reporter.report_stage(EditStage::MaskPreparation);
        paint_strokes(&mut session, path)?;
    }

    if let Some(path) = &cli.mask_out {
        save_mask(&session, path)?;
    }

    session.set_prompt(prompt);

    if cli.dry_run {
        return print_dry_run(&mut session);
    }

    reporter.report_stage(EditStage::Generating);
    run_edit(&mut session, reporter.as_ref()).await?;

    reporter.report_stage(EditStage::Saving);
    session
        .download(&output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    reporter.report_stage(EditStage::Completed);

    println!("✅ Saved edited image to {}", output.display());
    Ok(())
}

fn print_features() {
    println!("Available features:");
    for feature in FEATURES {
        println!("  • {:<26} {}", feature.title, feature.description);
    }
    println!();
    println!("💡 Usage: house-architect --feature \"Solar Panels\" house.jpg");
}

fn paint_strokes(session: &mut EditSession, path: &Path) -> Result<()> {
    let script = StrokeScript::from_file(path)
        .with_context(|| format!("Failed to load stroke script {}", path.display()))?;
    if script.is_empty() {
        warn!(script = %path.display(), "stroke script contains no strokes");
        return Ok(());
    }

    script.replay(session);
    debug!(
        strokes = script.strokes.len(),
        points = script.point_count(),
        painted = session.renderer().has_paint(),
        "replayed stroke script"
    );
    Ok(())
}

fn save_mask(session: &EditSession, path: &Path) -> Result<()> {
    let Some(mask) = session.mask_for_request() else {
        warn!("no area selected on the image, the whole image will be edited");
        return Ok(());
    };

    let png = mask.to_png().context("Failed to encode mask")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(mask = %path.display(), selected = mask.white_pixel_count(), "saved mask");
    Ok(())
}

fn print_dry_run(session: &mut EditSession) -> Result<()> {
    let request = session.begin_edit().map_err(user_facing)?;
    let (width, height) = request.image().dimensions();

    println!("Image:  {} ({}x{})", request.image().name(), width, height);
    match request.mask() {
        Some(mask) => println!(
            "Mask:   {}x{}, {} pixels selected",
            mask.width(),
            mask.height(),
            mask.white_pixel_count()
        ),
        None => println!("Mask:   none (whole image)"),
    }
    println!("Prompt: {}", augment_prompt(request.prompt()));
    println!("Dry run: request not sent");
    Ok(())
}

async fn run_edit(session: &mut EditSession, reporter: &dyn ProgressReporter) -> Result<()> {
    let ticker = LoadingTicker::default();
    let prompt = session.prompt().to_string();
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    let edit = session.request_edit();
    tokio::pin!(edit);
    let outcome = loop {
        tokio::select! {
            result = &mut edit => break result,
            _ = tick.tick() => reporter.report_waiting(&format!("Applying: {prompt}  {}", ticker.current())),
        }
    };

    match outcome {
        Ok(()) => {
            info!(elapsed_ms = ticker.elapsed().as_millis() as u64, "edit completed");
            Ok(())
        },
        Err(err) => {
            reporter.report_error(EditStage::Generating, &err.to_string());
            Err(user_facing(err))
        },
    }
}

/// Error banner text, without the `anyhow` chain noise
fn user_facing(err: EditError) -> anyhow::Error {
    anyhow::anyhow!("{err}")
}

fn create_progress_reporter(no_progress: bool) -> Box<dyn ProgressReporter> {
    if no_progress {
        Box::new(LogProgressReporter)
    } else {
        Box::new(SpinnerProgressReporter::new())
    }
}

/// Spinner on stderr showing the current stage and loading message
struct SpinnerProgressReporter {
    spinner: ProgressBar,
}

impl SpinnerProgressReporter {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }
}

impl ProgressReporter for SpinnerProgressReporter {
    fn report_stage(&self, stage: EditStage) {
        if stage == EditStage::Completed {
            self.spinner.finish_and_clear();
        } else {
            self.spinner.set_message(stage.description());
        }
    }

    fn report_waiting(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    fn report_error(&self, _stage: EditStage, _error: &str) {
        self.spinner.finish_and_clear();
    }
}

/// Backend used by `--dry-run`; requests never reach it
struct DryRunBackend;

#[async_trait]
impl ImageEditBackend for DryRunBackend {
    async fn submit(&self, _request: &EditRequest) -> crate::Result<EditImage> {
        Err(EditError::invalid_state("dry run: requests are not sent"))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
