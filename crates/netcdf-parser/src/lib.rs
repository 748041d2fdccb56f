//! NetCDF loader for gridded time-series datasets.
//!
//! Reads NetCDF-3/NetCDF-4 files through the `netcdf` crate (libnetcdf/HDF5)
//! and produces a [`GridDataset`] with one latitude, one longitude and one
//! time axis plus every numeric data variable.
//!
//! # Coordinate detection
//!
//! Coordinate variables are recognised by CF attributes first
//! (`standard_name`, `units`, `axis`) and by name otherwise, so both
//! `lat`/`lon`/`time` and ERA5-style `latitude`/`longitude`/`valid_time`
//! files load.
//!
//! # Data conventions
//!
//! - `scale_factor`/`add_offset` are applied on load
//! - `_FillValue`, `missing_value` and NaN become NaN
//! - time values are decoded from `"<unit> since <date>"` units in the
//!   Gregorian, `noleap` and `all_leap` calendars

mod cf_time;
mod coords;
mod error;
mod native;

pub use cf_time::{decode_times, Calendar, CfTimeUnits, TimeUnit};
pub use coords::{detect_roles, CoordinateCandidate, CoordinateRole, CoordinateRoles};
pub use error::{NetCdfError, NetCdfResult};
pub use native::{load_dataset, load_dataset_from_bytes, silence_hdf5_errors};

// Re-export the dataset model so callers only need this crate to load files
pub use grid_common::GridDataset;
