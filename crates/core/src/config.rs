//! Session configuration, loaded from `irlab.toml`.
//!
//! # Example
//!
//! ```toml
//! [session]
//! debounce_ms = 150
//! auto_recompute = true
//! display_mode = "condensed"
//!
//! [query]
//! tool = "irlab-opt"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sequence::DisplayMode;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "irlab.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last edit before a run starts.
    pub debounce_ms: u64,
    /// Schedule a run after every edit. When off, only explicit recompute
    /// requests start runs.
    pub auto_recompute: bool,
    pub display_mode: DisplayMode,
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            debounce_ms: 150,
            auto_recompute: true,
            display_mode: DisplayMode::Expanded,
        }
    }
}

/// `[query]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Program name used when rendering the pipeline as a command line.
    pub tool: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            tool: "irlab-opt".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Load `explicit` if given (it must exist), otherwise `irlab.toml` in
    /// `dir` if present, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::read(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
