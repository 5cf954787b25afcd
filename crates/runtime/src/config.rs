use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Blob name of the persisted live table.
pub const DEFAULT_TABLE_NAME: &str = "q_table";

/// Settings for [`crate::SimulationController`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding persisted tables. Created on first save.
    pub models_dir: PathBuf,
    pub table_name: String,
    /// Pause between ticks of an active run.
    pub tick_ms: u64,
    /// Replay batch size at the end of each training episode.
    pub batch_size: usize,
    /// Stop an active run after this many completed episodes.
    pub max_episodes: Option<u64>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            table_name: DEFAULT_TABLE_NAME.to_owned(),
            tick_ms: 500,
            batch_size: 32,
            max_episodes: None,
        }
    }
}
