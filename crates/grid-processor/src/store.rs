//! The currently loaded dataset and the store that swaps it.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use grid_common::{DateRange, GridDataset, GridPoint};
use tracing::info;

use crate::error::{GridError, Result};
use crate::extract::{extract, Extraction};
use crate::index::GridIndex;

/// A loaded dataset together with its grid index.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    pub dataset: GridDataset,
    pub index: GridIndex,
    /// Name of the uploaded file.
    pub filename: String,
    pub loaded_at: DateTime<Utc>,
}

impl DatasetHandle {
    pub fn new(dataset: GridDataset, filename: impl Into<String>) -> Result<Self> {
        let index = GridIndex::from_dataset(&dataset)?;
        Ok(Self {
            dataset,
            index,
            filename: filename.into(),
            loaded_at: Utc::now(),
        })
    }

    /// Snap `(lat, lon)` to the grid.
    pub fn nearest(&self, lat: f64, lon: f64) -> Result<GridPoint> {
        self.index.nearest(lat, lon)
    }

    /// Extract every series at `point`, optionally limited to `range`.
    pub fn extract(&self, point: GridPoint, range: Option<&DateRange>) -> Result<Extraction> {
        extract(&self.dataset, &self.index, point, range)
    }

    /// Like [`extract`](Self::extract) but with independent optional bounds.
    ///
    /// Filtering applies only when both bounds are given.
    pub fn extract_between(
        &self,
        point: GridPoint,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Extraction> {
        let range = DateRange::from_bounds(start, end)?;
        self.extract(point, range.as_ref())
    }
}

/// Holder of the active dataset.
///
/// Readers clone the `Arc` and keep working on it even if an upload replaces
/// the dataset meanwhile.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Option<Arc<DatasetHandle>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` the active dataset, dropping the previous one.
    pub fn replace(&self, handle: DatasetHandle) -> Arc<DatasetHandle> {
        let handle = Arc::new(handle);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::clone(&handle));

        info!(
            filename = %handle.filename,
            grid_points = handle.index.len(),
            "Active dataset replaced"
        );
        handle
    }

    /// The active dataset.
    pub fn current(&self) -> Result<Arc<DatasetHandle>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(GridError::NoDatasetLoaded)
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::{scenario_dataset, GridDatasetBuilder};

    #[test]
    fn test_empty_store() {
        let store = DatasetStore::new();
        assert!(!store.is_loaded());
        assert_eq!(store.current().unwrap_err(), GridError::NoDatasetLoaded);
    }

    #[test]
    fn test_replace_and_clear() {
        let store = DatasetStore::new();
        store.replace(DatasetHandle::new(scenario_dataset(), "a.nc").unwrap());
        assert!(store.is_loaded());
        assert_eq!(store.current().unwrap().filename, "a.nc");

        store.clear();
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_readers_keep_old_handle_across_replace() {
        let store = DatasetStore::new();
        store.replace(DatasetHandle::new(scenario_dataset(), "old.nc").unwrap());

        let held = store.current().unwrap();
        let other = GridDatasetBuilder::new(vec![0.0], vec![0.0], 1)
            .variable_fn("x", |_, _, _| 1.0)
            .build();
        store.replace(DatasetHandle::new(other, "new.nc").unwrap());

        assert_eq!(held.filename, "old.nc");
        assert_eq!(held.index.lats(), &[10.0, 20.0, 30.0]);
        assert_eq!(store.current().unwrap().filename, "new.nc");
    }

    #[test]
    fn test_extract_between_bounds() {
        let handle = DatasetHandle::new(scenario_dataset(), "s.nc").unwrap();
        let point = handle.nearest(22.0, 101.0).unwrap();
        let jan = |d: u32| Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap();

        let one_bound = handle.extract_between(point, Some(jan(3)), None).unwrap();
        assert_eq!(one_bound.series["temperature"].len(), 3);

        let both = handle
            .extract_between(point, Some(jan(2)), Some(jan(3)))
            .unwrap();
        assert_eq!(both.series["temperature"].len(), 2);

        let reversed = handle
            .extract_between(point, Some(jan(3)), Some(jan(1)))
            .unwrap_err();
        assert_eq!(
            reversed,
            GridError::InvalidDateRange {
                start: jan(3),
                end: jan(1)
            }
        );
    }
}
