//! # Crossroads
//!
//! Entry point for the crossroads binary.
//!
//! The controller loop runs on the main thread. Commands are read as JSON
//! lines from stdin by a small pump thread, and events are written as JSON
//! lines to stdout. Logs go to stderr so the event stream stays clean.
//!
//! Interactive use:
//!
//! ```text
//! $ crossroads
//! {"command": "start_simulation", "training": true}
//! ```
//!
//! Headless batch training:
//!
//! ```text
//! $ crossroads --autostart --train --tick-ms 0 --max-episodes 500 < /dev/null
//! ```

mod app;
mod input;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command line options.
#[derive(Parser, Debug)]
#[command(name = "crossroads", version, about)]
pub struct Args {
    /// Directory holding the persisted value table.
    #[arg(long, default_value = "models")]
    pub models_dir: PathBuf,

    /// Milliseconds to pause between simulation steps.
    #[arg(long, default_value_t = 500)]
    pub tick_ms: u64,

    /// Replay batch size at the end of each training episode.
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Start a run immediately instead of waiting for `start_simulation`.
    #[arg(long)]
    pub autostart: bool,

    /// Train while running (applies to `--autostart`).
    #[arg(long)]
    pub train: bool,

    /// Stop the run after this many completed episodes.
    #[arg(long)]
    pub max_episodes: Option<u64>,

    /// Seed for arrivals and exploration, for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    app::run(&args)
}
