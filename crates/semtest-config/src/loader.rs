//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::suite::SuiteConfig;
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Default pause after the summary line, in milliseconds
pub const DEFAULT_DRAIN_MS: u64 = 500;

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Suite config (semtest.toml) - overrides defaults
/// 3. Environment variables (SEMTEST_*, NO_COLOR) - overrides suite config
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Read environment overrides
    use_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Suite configuration, with environment overrides applied
    pub suite: SuiteConfig,

    /// Path of the semtest.toml that was read, if any
    pub source: Option<PathBuf>,
}

/// Effective settings after defaults are filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub extension: Option<String>,
    pub verbose: bool,
    pub reasoning: bool,
    pub delay_ms: u64,
    pub drain_ms: u64,
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension: None,
            verbose: false,
            reasoning: false,
            delay_ms: 0,
            drain_ms: DEFAULT_DRAIN_MS,
            color: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { use_env: true }
    }

    /// Skip environment variable overrides
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find semtest.toml. A tree without one
    /// yields the defaults.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (source, suite) = find_suite_config(start_dir)?;
        self.finish(suite, source)
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let suite = SuiteConfig::load_from_file(config_path)?;
        self.finish(suite, Some(config_path.to_path_buf()))
    }

    fn finish(&self, suite: SuiteConfig, source: Option<PathBuf>) -> ConfigResult<Config> {
        let suite = if self.use_env {
            apply_env_overrides(suite, |key| env::var(key).ok())?
        } else {
            suite
        };
        suite.validate()?;
        Ok(Config { suite, source })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Find semtest.toml by walking up the directory tree
///
/// Returns (config path, suite config), or the defaults when none is found
fn find_suite_config(start_dir: &Path) -> ConfigResult<(Option<PathBuf>, SuiteConfig)> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);

        if config_path.is_file() {
            let suite = SuiteConfig::load_from_file(&config_path)?;
            return Ok((Some(config_path), suite));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok((None, SuiteConfig::default())),
        }
    }
}

/// Apply environment variable overrides to a suite config
///
/// `lookup` returns the value of a variable, or None when it is unset.
/// `NO_COLOR` disables color whenever it is set to a non-empty value.
pub fn apply_env_overrides(
    mut config: SuiteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<SuiteConfig> {
    if let Some(value) = lookup("SEMTEST_VERBOSE") {
        config.suite_mut().verbose = Some(parse_bool("SEMTEST_VERBOSE", &value)?);
    }

    if let Some(value) = lookup("SEMTEST_REASONING") {
        config.reasoning_mut().enabled = Some(parse_bool("SEMTEST_REASONING", &value)?);
    }

    if let Some(value) = lookup("SEMTEST_DELAY_MS") {
        config.suite_mut().delay_ms = Some(parse_millis("SEMTEST_DELAY_MS", &value)?);
    }

    if let Some(value) = lookup("SEMTEST_DRAIN_MS") {
        config.suite_mut().drain_ms = Some(parse_millis("SEMTEST_DRAIN_MS", &value)?);
    }

    if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        config.output_mut().color = Some(false);
    }

    Ok(config)
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a boolean, got '{}'", value),
        }),
    }
}

fn parse_millis(field: &str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected milliseconds, got '{}'", value),
        })
}

impl Config {
    /// Fill in defaults for everything the sources left unset
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            extension: self.suite.extension().map(str::to_string),
            verbose: self.suite.verbose().unwrap_or(defaults.verbose),
            reasoning: self.suite.reasoning().unwrap_or(defaults.reasoning),
            delay_ms: self.suite.delay_ms().unwrap_or(defaults.delay_ms),
            drain_ms: self.suite.drain_ms().unwrap_or(defaults.drain_ms),
            color: self.suite.color().unwrap_or(defaults.color),
        }
    }

    /// Path of the semtest.toml that was read
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
