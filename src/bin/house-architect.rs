//! House Architect CLI Tool
//!
//! Command-line front end for AI house photo edits: paint a selection from a
//! stroke script, describe the change, save the result.

#[cfg(feature = "cli")]
use house_architect::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
