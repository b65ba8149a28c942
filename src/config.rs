// ABOUTME: Configuration loading for vshell.
// ABOUTME: Reads ~/.vshell/config.toml (or an explicit path), falling back to defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub log: LogConfig,
}

/// Interactive shell behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Host part of the prompt, as in `user@host:/path$ `.
    pub host: String,
    /// Sort `ls` and `tree` output by name instead of host iteration order.
    pub sort_entries: bool,
    /// Keep the extracted directory on disk after the shell exits.
    pub keep_workdir: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            host: "virtual_shell".to_string(),
            sort_entries: true,
            keep_workdir: false,
        }
    }
}

/// Action log behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Add a `time` attribute to every recorded action.
    pub timestamps: bool,
    pub on_corrupt: CorruptLogPolicy,
}

/// What to do when the existing log file cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptLogPolicy {
    /// Refuse to touch the file and report an error.
    #[default]
    Fail,
    /// Move the file aside to `<log>.corrupt` and start a new log.
    Fresh,
}

impl Config {
    /// Load config from ~/.vshell/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vshell")
            .join("config.toml")
    }
}
