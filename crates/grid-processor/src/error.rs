//! Error types for grid queries.

use chrono::{DateTime, Utc};
use grid_common::TimeParseError;
use thiserror::Error;

/// Errors that can occur while resolving or extracting from a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// No dataset has been uploaded yet.
    #[error("no dataset loaded")]
    NoDatasetLoaded,

    /// A coordinate axis has no points.
    #[error("{0} axis is empty")]
    EmptyAxis(String),

    /// The point does not lie exactly on the current axes.
    #[error("({lat}, {lon}) is not a grid point of the loaded dataset")]
    InvalidGridPoint { lat: f64, lon: f64 },

    /// The end of the date range precedes its start.
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A date bound could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A query coordinate is NaN or infinite.
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Writing exported series failed.
    #[error("export failed: {0}")]
    Export(String),
}

impl GridError {
    /// Create an Export error.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

impl From<TimeParseError> for GridError {
    fn from(err: TimeParseError) -> Self {
        match err {
            TimeParseError::ReversedRange { start, end } => Self::InvalidDateRange { start, end },
            TimeParseError::InvalidFormat(s) => Self::InvalidDate(s),
        }
    }
}

impl From<csv::Error> for GridError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
