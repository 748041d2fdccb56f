//! Grid point resolution and time-series extraction.
//!
//! This crate answers the one question the viewer asks of a loaded dataset:
//! "what happened over time at this spot?"
//!
//! # Architecture
//!
//! ```text
//! click (lat, lon)
//!      │
//!      ▼
//! DatasetStore::current() ──► Arc<DatasetHandle>
//!      │
//!      ├─► GridIndex::nearest(lat, lon)      separable 1-D search per axis
//!      │
//!      ├─► extract(point, range)             one series per variable
//!      │
//!      └─► convert_kelvin_series / write_csv / to_docx_bytes
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{DatasetHandle, DatasetStore};
//!
//! let store = DatasetStore::new();
//! store.replace(DatasetHandle::new(dataset, "era5.nc")?);
//!
//! let handle = store.current()?;
//! let point = handle.nearest(22.0, 101.0)?;
//! let extraction = handle.extract(point, None)?;
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod index;
pub mod store;
pub mod units;

// Re-export commonly used types at crate root
pub use error::{GridError, Result};
pub use export::{to_csv_string, to_docx_bytes, write_csv};
pub use extract::{extract, Extraction};
pub use index::GridIndex;
pub use store::{DatasetHandle, DatasetStore};
pub use units::{convert_kelvin_series, is_kelvin, kelvin_to_celsius};
