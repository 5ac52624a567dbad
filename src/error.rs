//! Error handling for downtime report preparation.
//!
//! File-level and schema-level failures are fatal and propagate to the
//! caller. Row-level problems (bad timestamps, inverted intervals) are
//! represented here so they can be counted, but the pipeline absorbs them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DowntimeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Required column '{column}' missing from {path}")]
    Schema { path: PathBuf, column: String },

    #[error("Invalid stop interval: start '{start}', end '{end}' - {reason}")]
    InvalidInterval {
        start: String,
        end: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed: {reason}")]
    Processing { reason: String },
}

impl DowntimeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid interval error for one downtime record
    pub fn invalid_interval(
        start: impl Into<String>,
        end: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInterval {
            start: start.into(),
            end: end.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the run rather than dropping a single row
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidInterval { .. })
    }
}

pub type Result<T> = std::result::Result<T, DowntimeError>;
