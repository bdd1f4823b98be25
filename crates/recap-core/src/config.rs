use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::squash::SquashConfig;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "recap.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapConfig {
    #[serde(default)]
    pub squash: SquashConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Replay both streams and compare after squashing.
    #[serde(default = "default_true")]
    pub verify: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { verify: true }
    }
}

/// Load config from `path`. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<RecapConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(RecapConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<RecapConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `recap.toml` from `dir`.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_from_dir(dir: &Path) -> Result<RecapConfig> {
    load_config(&dir.join(CONFIG_FILE_NAME))
}

const fn default_true() -> bool {
    true
}
