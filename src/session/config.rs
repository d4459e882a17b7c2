//! Terminal session configuration.
//!
//! Small JSON file with the symbol picker contents, the starting
//! underlying, and the persisted playback speed. Every field has a
//! default so a partial or missing file still yields a working
//! session.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Underlyings offered by the symbol picker
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Underlying selected at session start
    #[serde(default = "default_symbol")]
    pub default_symbol: String,

    /// Playback speed percent (1-100), persisted across sessions
    #[serde(default = "default_playback_speed")]
    pub playback_speed: u32,
}

fn default_symbols() -> Vec<String> {
    ["AAPL", "GOOGL", "TSLA", "SPX"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_symbol() -> String {
    "AAPL".to_string()
}

fn default_playback_speed() -> u32 {
    50
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            default_symbol: default_symbol(),
            playback_speed: default_playback_speed(),
        }
    }
}

impl TerminalConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a config file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not load config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
