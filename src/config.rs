//! Bindkit Configuration Module
//!
//! Display defaults for the CLI: locale, wire syntax and preview length.
//! Config is stored in `~/.config/bindkit/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Command-line flags (`--locale`, `--syntax`)
//! 2. Environment variables (`BINDKIT_LOCALE`, `BINDKIT_SYNTAX`, `BINDKIT_PREVIEW_LEN`)
//! 3. Config file (`~/.config/bindkit/config.toml` or `--config <path>`)
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BindError, Result};
use crate::expr::Syntax;
use crate::format::Locale;
use crate::resolve::DEFAULT_PREVIEW_LEN;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BindkitConfig {
    /// Display locale (en-US, en-GB, de-DE, fr-FR)
    pub locale: Locale,

    /// Wire syntax (escaped, legacy)
    pub syntax: Syntax,

    /// Maximum characters of a variable value preview
    pub preview_len: usize,
}

impl Default for BindkitConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            syntax: Syntax::default(),
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl BindkitConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/bindkit/` on Unix, `%APPDATA%/bindkit/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bindkit")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file (must exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BindError::ConfigError {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| BindError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| BindError::ConfigError {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| BindError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| BindError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })?;

        Ok(())
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    /// Invalid values are errors rather than silently ignored.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Merge with variables from any source (environment, tests)
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(locale) = non_empty("BINDKIT_LOCALE") {
            self.locale = locale.parse()?;
        }

        if let Some(syntax) = non_empty("BINDKIT_SYNTAX") {
            self.syntax = syntax.parse()?;
        }

        if let Some(len) = non_empty("BINDKIT_PREVIEW_LEN") {
            self.preview_len = len.trim().parse().map_err(|_| BindError::ConfigError {
                reason: format!("BINDKIT_PREVIEW_LEN must be a positive integer, got '{}'", len),
            })?;
        }

        Ok(self)
    }
}
