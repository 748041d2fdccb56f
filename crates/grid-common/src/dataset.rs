//! In-memory representation of a loaded gridded dataset.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{BoundingBox, CoordinateAxis, TimeAxis};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("Variable '{name}' has {dims} dimensions but a shape of rank {rank}")]
    RankMismatch { name: String, dims: usize, rank: usize },

    #[error("Variable '{name}' expects {expected} values from its shape, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// A named data field stored row-major, with NaN marking missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Dimension names, outermost first.
    pub dimensions: Vec<String>,
    pub shape: Vec<usize>,
    pub attributes: BTreeMap<String, Value>,
    pub units: Option<String>,
    pub long_name: Option<String>,
    data: Vec<f64>,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        dimensions: Vec<String>,
        shape: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        let name = name.into();

        if dimensions.len() != shape.len() {
            return Err(DatasetError::RankMismatch {
                name,
                dims: dimensions.len(),
                rank: shape.len(),
            });
        }

        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(DatasetError::ShapeMismatch {
                name,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            name,
            dimensions,
            shape,
            attributes: BTreeMap::new(),
            units: None,
            long_name: None,
            data,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        let units = units.into();
        self.attributes
            .insert("units".to_string(), Value::String(units.clone()));
        self.units = Some(units);
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, Value>) -> Self {
        self.units = attributes
            .get("units")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.long_name = attributes
            .get("long_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.attributes = attributes;
        self
    }

    /// Raw row-major values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Position of a named dimension in this variable's dimension list.
    pub fn dimension_index(&self, dimension: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d == dimension)
    }

    /// Row-major strides, one per dimension.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for i in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.shape[i + 1];
        }
        strides
    }
}

/// Min/max/size of a coordinate variable, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSummary {
    pub min: f64,
    pub max: f64,
    pub size: usize,
}

impl CoordinateSummary {
    pub fn from_axis(axis: &CoordinateAxis) -> Self {
        Self {
            min: axis.min(),
            max: axis.max(),
            size: axis.len(),
        }
    }
}

/// A dataset with one latitude, one longitude and one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDataset {
    pub lat: CoordinateAxis,
    pub lon: CoordinateAxis,
    pub time: TimeAxis,
    pub variables: Vec<Variable>,
    /// Summaries of every numeric coordinate variable, keyed by name.
    pub coordinates: BTreeMap<String, CoordinateSummary>,
    pub global_attributes: BTreeMap<String, Value>,
}

impl GridDataset {
    pub fn new(lat: CoordinateAxis, lon: CoordinateAxis, time: TimeAxis) -> Self {
        let mut coordinates = BTreeMap::new();
        coordinates.insert(lat.name.clone(), CoordinateSummary::from_axis(&lat));
        coordinates.insert(lon.name.clone(), CoordinateSummary::from_axis(&lon));

        Self {
            lat,
            lon,
            time,
            variables: Vec::new(),
            coordinates,
            global_attributes: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_axes(&self.lat, &self.lon)
    }

    /// Summary of the dataset for upload responses.
    pub fn info(&self) -> DatasetInfo {
        let variables = self
            .variables
            .iter()
            .map(|v| {
                (
                    v.name.clone(),
                    VariableInfo {
                        dims: v.dimensions.clone(),
                        shape: v.shape.clone(),
                        attrs: v.attributes.clone(),
                    },
                )
            })
            .collect();

        DatasetInfo {
            coords: self.coordinates.clone(),
            variables,
            global_attrs: self.global_attributes.clone(),
            time_range: match (self.time.first(), self.time.last()) {
                (Some(start), Some(end)) => Some(TimeRangeInfo { start, end }),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub attrs: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRangeInfo {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Coordinates, variables and global attributes of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub coords: BTreeMap<String, CoordinateSummary>,
    pub variables: BTreeMap<String, VariableInfo>,
    pub global_attrs: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRangeInfo>,
}
