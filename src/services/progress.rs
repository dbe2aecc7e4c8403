//! Progress reporting service
//!
//! Keeps the "what is happening right now" text out of the session so each
//! frontend can render it its own way (spinner, status line, nothing).

use instant::{Duration, Instant};

/// Messages cycled while an edit request is in flight
pub const LOADING_MESSAGES: &[&str] = &[
    "Analyzing image...",
    "Applying AI magic...",
    "Adding final touches...",
    "This can take a moment...",
    "Rendering new architecture...",
];

/// How long each loading message stays up
pub const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_secs(3);

/// Steps of one edit run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStage {
    /// Reading and decoding the input image
    ImageLoading,
    /// Replaying strokes and building the mask
    MaskPreparation,
    /// Waiting for the model
    Generating,
    /// Writing the result to disk
    Saving,
    /// Finished
    Completed,
}

impl EditStage {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ImageLoading => "Loading image",
            Self::MaskPreparation => "Preparing mask",
            Self::Generating => "Generating edit",
            Self::Saving => "Saving result",
            Self::Completed => "Done",
        }
    }
}

/// Picks the loading message to show for a given elapsed time
#[derive(Debug, Clone)]
pub struct LoadingTicker {
    started: Instant,
    interval: Duration,
}

impl Default for LoadingTicker {
    fn default() -> Self {
        Self::new(LOADING_MESSAGE_INTERVAL)
    }
}

impl LoadingTicker {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            interval,
        }
    }

    /// Message for `elapsed` time since the request started
    #[must_use]
    pub fn message_at(&self, elapsed: Duration) -> &'static str {
        let interval_ms = self.interval.as_millis().max(1);
        let index = (elapsed.as_millis() / interval_ms) as usize % LOADING_MESSAGES.len();
        LOADING_MESSAGES[index]
    }

    /// Message for right now
    #[must_use]
    pub fn current(&self) -> &'static str {
        self.message_at(self.started.elapsed())
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Receives progress notifications from an edit run
pub trait ProgressReporter: Send + Sync {
    fn report_stage(&self, stage: EditStage);

    /// Called periodically while waiting for the model
    fn report_waiting(&self, _message: &str) {}

    fn report_error(&self, stage: EditStage, error: &str);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_stage(&self, _stage: EditStage) {}

    fn report_error(&self, _stage: EditStage, _error: &str) {}
}

/// Reporter that logs stages through `log`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn report_stage(&self, stage: EditStage) {
        log::info!("{}", stage.description());
    }

    fn report_waiting(&self, message: &str) {
        log::debug!("{}", message);
    }

    fn report_error(&self, stage: EditStage, error: &str) {
        log::error!("{} failed: {}", stage.description(), error);
    }
}
