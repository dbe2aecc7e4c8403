//! Service layer for separating concerns
//!
//! - Image decoding, encoding and file output
//! - Output format conversion
//! - Progress reporting

pub mod format;
pub mod io;
pub mod progress;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
pub use progress::{
    EditStage, LoadingTicker, LogProgressReporter, NoOpProgressReporter, ProgressReporter,
    LOADING_MESSAGES, LOADING_MESSAGE_INTERVAL,
};
