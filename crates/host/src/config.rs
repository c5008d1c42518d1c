//! Host configuration from `BLOCK_DROP_*` environment variables.
//!
//! Unset or blank variables fall back to the defaults; an unparsable seed is
//! treated as unset.

use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default location of the save file.
pub const DEFAULT_SAVE_PATH: &str = "block-drop-save.json";

/// Host settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Where the profile is persisted.
    pub save_path: PathBuf,
    /// Fixed piece seed; `None` seeds from the system time.
    pub seed: Option<u32>,
    /// Log file; logging is off when unset since the terminal is in raw mode.
    pub log_path: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            seed: None,
            log_path: None,
        }
    }
}

impl HostConfig {
    /// Create from `BLOCK_DROP_SAVE_PATH`, `BLOCK_DROP_SEED` and `BLOCK_DROP_LOG_PATH`.
    pub fn from_env() -> Self {
        let save_path = non_empty_var("BLOCK_DROP_SAVE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));

        let seed = non_empty_var("BLOCK_DROP_SEED").and_then(|s| s.parse().ok());

        let log_path = non_empty_var("BLOCK_DROP_LOG_PATH").map(PathBuf::from);

        Self {
            save_path,
            seed,
            log_path,
        }
    }

    /// The configured seed, or one derived from the clock.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
