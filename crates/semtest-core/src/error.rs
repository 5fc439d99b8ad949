/// Driver error types
use std::path::PathBuf;
use thiserror::Error;

pub type DriverResult<T> = Result<T, DriverError>;

/// Infrastructure failures.
///
/// None of these is a test failure: they abort the whole run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to list suite directory {path}: {error}")]
    ListSuite {
        path: PathBuf,
        error: walkdir::Error,
    },

    #[error("Infrastructure failure in {unit}.{test}: {message}")]
    Infrastructure {
        unit: String,
        test: String,
        message: String,
    },

    #[error("Reasoning engine error: {0}")]
    Engine(String),

    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl DriverError {
    /// Create an infrastructure error for a specific test
    pub fn infrastructure(
        unit: impl Into<String>,
        test: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Infrastructure {
            unit: unit.into(),
            test: test.into(),
            message: message.to_string(),
        }
    }

    /// Create a reasoning engine error
    pub fn engine(message: impl ToString) -> Self {
        Self::Engine(message.to_string())
    }
}

/// A program unit could not be loaded or parsed.
///
/// Counted as exactly one failure for the unit; the suite continues.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct LoadError {
    pub path: PathBuf,
    pub reason: String,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
