//! Suite Configuration (semtest.toml)
//!
//! Handles the settings file stored next to (or above) a suite directory.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest pause accepted for `delay_ms` and `drain_ms` (one hour)
pub const MAX_PAUSE_MS: u64 = 60 * 60 * 1000;

/// Suite configuration from semtest.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Discovery and pacing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<SuiteSection>,

    /// Diagnostic reasoning mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningSection>,

    /// Report output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,
}

/// `[suite]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SuiteSection {
    /// Unit file extension, without the dot (default: the host's)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Print success and progress lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Pause before each test in reasoning mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,

    /// Pause after the summary line (default: 500)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drain_ms: Option<u64>,
}

/// `[reasoning]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReasoningSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// `[output]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Colorize status words (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

impl SuiteConfig {
    /// Load suite configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the suite configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(suite) = &self.suite {
            if let Some(extension) = &suite.extension {
                validate_extension(extension)?;
            }
            if let Some(delay) = suite.delay_ms {
                validate_pause("suite.delay_ms", delay)?;
            }
            if let Some(drain) = suite.drain_ms {
                validate_pause("suite.drain_ms", drain)?;
            }
        }
        Ok(())
    }

    pub fn extension(&self) -> Option<&str> {
        self.suite.as_ref().and_then(|s| s.extension.as_deref())
    }

    pub fn verbose(&self) -> Option<bool> {
        self.suite.as_ref().and_then(|s| s.verbose)
    }

    pub fn delay_ms(&self) -> Option<u64> {
        self.suite.as_ref().and_then(|s| s.delay_ms)
    }

    pub fn drain_ms(&self) -> Option<u64> {
        self.suite.as_ref().and_then(|s| s.drain_ms)
    }

    pub fn reasoning(&self) -> Option<bool> {
        self.reasoning.as_ref().and_then(|r| r.enabled)
    }

    pub fn color(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.color)
    }

    /// Mutable `[suite]` table, created on demand
    pub fn suite_mut(&mut self) -> &mut SuiteSection {
        self.suite.get_or_insert_with(SuiteSection::default)
    }

    /// Mutable `[reasoning]` table, created on demand
    pub fn reasoning_mut(&mut self) -> &mut ReasoningSection {
        self.reasoning.get_or_insert_with(ReasoningSection::default)
    }

    /// Mutable `[output]` table, created on demand
    pub fn output_mut(&mut self) -> &mut OutputSection {
        self.output.get_or_insert_with(OutputSection::default)
    }
}

/// Extensions are bare names such as `sem`
fn validate_extension(extension: &str) -> ConfigResult<()> {
    let reason = if extension.is_empty() {
        Some("extension cannot be empty")
    } else if extension.starts_with('.') {
        Some("extension must not start with '.'")
    } else if extension.contains(['/', '\\']) {
        Some("extension must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidValue {
            field: "suite.extension".to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn validate_pause(field: &str, millis: u64) -> ConfigResult<()> {
    if millis > MAX_PAUSE_MS {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} ms exceeds the maximum of {} ms", millis, MAX_PAUSE_MS),
        });
    }
    Ok(())
}
