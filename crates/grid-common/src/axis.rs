//! Coordinate axes of a gridded dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when an axis violates its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    /// The axis has no points.
    #[error("Axis '{0}' is empty")]
    Empty(String),

    /// The axis contains NaN or infinite values.
    #[error("Axis '{name}' has a non-finite value at index {index}")]
    NonFinite { name: String, index: usize },

    /// The axis is not strictly increasing or strictly decreasing.
    #[error("Axis '{name}' is not strictly monotonic at index {index}")]
    NotMonotonic { name: String, index: usize },
}

/// A one-dimensional spatial coordinate axis (latitude or longitude).
///
/// Values keep the order they have in the source file. Both ascending and
/// descending axes are accepted, but the values must be finite and strictly
/// monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateAxis {
    /// Variable name of the coordinate (e.g. "lat", "latitude").
    pub name: String,
    /// Name of the dimension this axis indexes.
    pub dimension: String,
    /// Units attribute, if present (e.g. "degrees_north").
    pub units: Option<String>,
    values: Vec<f64>,
}

impl CoordinateAxis {
    /// Build an axis, validating that it is non-empty, finite and strictly monotonic.
    pub fn new(
        name: impl Into<String>,
        dimension: impl Into<String>,
        units: Option<String>,
        values: Vec<f64>,
    ) -> Result<Self, AxisError> {
        let name = name.into();

        if values.is_empty() {
            return Err(AxisError::Empty(name));
        }

        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(AxisError::NonFinite { name, index });
        }

        if values.len() > 1 {
            let ascending = values[1] > values[0];
            for (i, pair) in values.windows(2).enumerate() {
                let ok = if ascending {
                    pair[1] > pair[0]
                } else {
                    pair[1] < pair[0]
                };
                if !ok {
                    return Err(AxisError::NotMonotonic { name, index: i + 1 });
                }
            }
        }

        Ok(Self {
            name,
            dimension: dimension.into(),
            units,
            values,
        })
    }

    /// Axis values in file order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest axis value.
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest axis value.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of a value that is exactly on the axis.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        self.values.iter().position(|&v| v == value)
    }
}

/// The time axis of a dataset, already decoded to UTC timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    /// Variable name of the time coordinate.
    pub name: String,
    /// Name of the dimension this axis indexes.
    pub dimension: String,
    times: Vec<DateTime<Utc>>,
}

impl TimeAxis {
    pub fn new(
        name: impl Into<String>,
        dimension: impl Into<String>,
        times: Vec<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            dimension: dimension.into(),
            times,
        }
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Earliest timestamp on the axis.
    pub fn first(&self) -> Option<DateTime<Utc>> {
        self.times.iter().min().copied()
    }

    /// Latest timestamp on the axis.
    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.times.iter().max().copied()
    }
}
