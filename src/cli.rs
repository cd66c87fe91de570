//! Command-line flags for the terminal yoga screen.

use clap::Parser;
use std::path::PathBuf;

/// Run a timed yoga-pose session against a simulated camera and classifier.
///
/// Type `toggle` (or just press enter) to start, pause and resume, `status` to
/// redraw, `reset` to start over and `back` to leave.
#[derive(Parser, Debug, Clone)]
#[command(name = "yogascreen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pose being practised; sent to the status endpoint on completion
    #[arg(short, long, env = "YOGASCREEN_POSE", default_value = "Tree")]
    pub pose: String,

    /// Path to the JSON settings file
    #[arg(short, long, env = "YOGASCREEN_SETTINGS", default_value = "yogascreen.json")]
    pub settings: PathBuf,

    /// Override the status endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Comma-separated class labels; skips the model metadata fetch
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
