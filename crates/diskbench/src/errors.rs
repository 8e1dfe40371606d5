use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the benchmark runner
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Failed to parse configuration: {0}")]
    ConfigError(String),

    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to start {program}: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Device {device} failed in {mode} mode (exit code {code}): {stderr}")]
    ToolExecutionFailure {
        device: String,
        mode: String,
        code: i32,
        stderr: String,
    },

    #[error("No IOPS statistics found in fio output for device {device} in {mode} mode")]
    MissingMetricFailure { device: String, mode: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// The two ways a single benchmark case can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ToolExecution,
    MissingMetric,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ToolExecution => write!(f, "tool execution failure"),
            FailureKind::MissingMetric => write!(f, "missing metric"),
        }
    }
}

impl BenchError {
    /// Case-level failure kind, or None for errors that abort the run itself
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            BenchError::ToolExecutionFailure { .. } => Some(FailureKind::ToolExecution),
            BenchError::MissingMetricFailure { .. } => Some(FailureKind::MissingMetric),
            _ => None,
        }
    }
}

/// Utility functions for working with BenchError
pub mod util {
    use super::*;
    use std::path::Path;

    /// Check if a file exists, returning a FileNotFound error if it doesn't
    pub fn ensure_file_exists<P: AsRef<Path>>(path: P) -> BenchResult<()> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(BenchError::FileNotFound(path_ref.to_path_buf()));
        }
        Ok(())
    }
}
