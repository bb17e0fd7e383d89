//! Runtime configuration from environment variables and the command line.

use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use crate::core::CoreError;
use crate::types::is_valid_board_size;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "tui-2048", about = "Terminal 2048 with undo/redo and save slots")]
pub struct Args {
    /// Board size (3, 4 or 5); skips the size menu.
    #[arg(long)]
    pub size: Option<u8>,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `slot_<n>.save`
    pub save_dir: PathBuf,
    /// The auto-save file
    pub autosave_path: PathBuf,
    /// Board size picked up front; None shows the size menu
    pub board_size: Option<u8>,
    /// Fixed RNG seed; None seeds from the clock
    pub seed: Option<u32>,
    /// Tracing output file; None disables logging
    pub log_path: Option<PathBuf>,
    pub autosave_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            save_dir: home.join(".2048_saves"),
            autosave_path: home.join(".2048"),
            board_size: None,
            seed: None,
            log_path: None,
            autosave_enabled: true,
        }
    }
}

impl AppConfig {
    /// Create from `TUI_2048_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let defaults = Self::default();

        let save_dir = get("TUI_2048_SAVE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.save_dir);
        let autosave_path = get("TUI_2048_AUTOSAVE")
            .map(PathBuf::from)
            .unwrap_or(defaults.autosave_path);
        let board_size = get("TUI_2048_SIZE")
            .and_then(|s| s.parse().ok())
            .filter(|&n| is_valid_board_size(n));
        let seed = get("TUI_2048_SEED").and_then(|s| s.parse().ok());
        let log_path = get("TUI_2048_LOG").map(PathBuf::from);
        let autosave_enabled = !get("TUI_2048_NO_AUTOSAVE")
            .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            save_dir,
            autosave_path,
            board_size,
            seed,
            log_path,
            autosave_enabled,
        }
    }

    /// Layer command line arguments over the environment.
    pub fn with_args(mut self, args: &Args) -> Result<Self, CoreError> {
        if let Some(size) = args.size {
            if !is_valid_board_size(size) {
                return Err(CoreError::InvalidSize(size));
            }
            self.board_size = Some(size);
        }
        Ok(self)
    }

    /// The configured seed, or one taken from the clock
    pub fn seed(&self) -> u32 {
        self.seed.unwrap_or_else(clock_seed)
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub(crate) fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}
