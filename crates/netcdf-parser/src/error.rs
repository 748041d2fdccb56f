//! Error types for NetCDF loading operations.

use grid_common::{AxisError, DatasetError};
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF loading.
///
/// Every variant means the upload cannot become the active dataset.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be opened or read as NetCDF
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Missing required coordinate, variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// A spatial coordinate axis is unusable
    #[error("Invalid coordinate axis: {0}")]
    InvalidAxis(#[from] AxisError),

    /// The time coordinate could not be decoded
    #[error("Invalid time coordinate: {0}")]
    InvalidTime(String),

    /// The time coordinate uses a calendar we cannot map onto UTC
    #[error("Unsupported calendar: {0}")]
    UnsupportedCalendar(String),

    /// A variable's data does not match its declared shape
    #[error("Invalid variable: {0}")]
    InvalidVariable(#[from] DatasetError),
}
