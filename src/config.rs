//! Configuration file handling.
//!
//! This module provides loading and saving of droidgate configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/droidgate/config.toml`
//! - macOS: `~/Library/Application Support/droidgate/config.toml`
//! - Windows: `%APPDATA%\droidgate\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! min_severity = "warning"
//! fail_on = "error"
//! progress = true
//!
//! [ignore]
//! rules = ["MC001", "DP00*"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Finding, ScanResult, Severity};

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use droidgate::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Fail on: {}", config.fail_on);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Findings below this severity are left out of the output.
    ///
    /// Default: info (everything is shown)
    pub min_severity: Severity,

    /// Exit with a non-zero status when a finding at or above this severity remains.
    ///
    /// Default: error
    pub fail_on: Severity,

    /// Whether to show a progress bar while checkers run.
    ///
    /// Default: true
    pub progress: bool,

    /// Ignore list for suppressing accepted findings.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Configuration for ignoring specific rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Rule IDs to suppress (e.g. "MC001").
    ///
    /// Supports glob patterns (e.g. "DP*").
    pub rules: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a rule should be ignored.
    pub fn should_ignore_rule(&self, rule_id: &str) -> bool {
        self.rules.iter().any(|pattern| rule_matches(pattern, rule_id))
    }
}

/// Matches a rule id against a pattern where `*` stands for any run of characters.
fn rule_matches(pattern: &str, rule_id: &str) -> bool {
    let Some((head, tail)) = pattern.split_once('*') else {
        return pattern == rule_id;
    };
    let Some(rest) = rule_id.strip_prefix(head) else {
        return false;
    };
    rest.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(rest.len()))
        .any(|i| rule_matches(tail, &rest[i..]))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            fail_on: Severity::Error,
            progress: true,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path, falling back to defaults when it is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use droidgate::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("droidgate/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("droidgate")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        Config::default().to_toml().unwrap_or_default()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Writes the default configuration to `path` unless a file is already
    /// there. Returns whether a file was written.
    pub fn init_file(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Config::default().save_to(path)?;
        Ok(true)
    }

    /// Findings of `result` that survive the severity floor and ignore list, in order.
    pub fn apply<'a>(&self, result: &'a ScanResult) -> Vec<&'a Finding> {
        result
            .findings
            .iter()
            .filter(|f| f.severity >= self.min_severity)
            .filter(|f| !self.ignore.should_ignore_rule(&f.rule_id))
            .collect()
    }
}
