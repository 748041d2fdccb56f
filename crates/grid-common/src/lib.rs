//! Common types shared across the NetCDF time-series viewer crates.
//!
//! The loader (`netcdf-parser`) produces a [`GridDataset`], the query layer
//! (`grid-processor`) reads it, and the HTTP service serializes the
//! [`TimeSeries`] values it gets back.

pub mod axis;
pub mod bbox;
pub mod dataset;
pub mod series;
pub mod time;

pub use axis::{AxisError, CoordinateAxis, TimeAxis};
pub use bbox::BoundingBox;
pub use dataset::{
    CoordinateSummary, DatasetError, DatasetInfo, GridDataset, TimeRangeInfo, Variable, VariableInfo,
};
pub use series::{GridPoint, Sample, TimeSeries};
pub use time::{format_timestamp, parse_datetime, DateRange, TimeParseError};
