//! Nearest grid point resolution.
//!
//! The search is separable: each axis is scanned independently for the value
//! closest to the query, and the two winners are combined. On regular
//! lat/lon grids this is the true nearest cell; on curvilinear grids it is an
//! approximation.

use grid_common::{GridDataset, GridPoint};

use crate::error::{GridError, Result};

/// Latitude and longitude axes of the active dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIndex {
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl GridIndex {
    /// Build an index, rejecting empty axes.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Result<Self> {
        if lats.is_empty() {
            return Err(GridError::EmptyAxis("latitude".to_string()));
        }
        if lons.is_empty() {
            return Err(GridError::EmptyAxis("longitude".to_string()));
        }
        Ok(Self { lats, lons })
    }

    pub fn from_dataset(dataset: &GridDataset) -> Result<Self> {
        Self::new(dataset.lat.values().to_vec(), dataset.lon.values().to_vec())
    }

    /// Snap an arbitrary coordinate to the nearest grid point.
    pub fn nearest(&self, lat: f64, lon: f64) -> Result<GridPoint> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GridError::InvalidCoordinate { lat, lon });
        }

        let lat_idx = nearest_index(&self.lats, lat);
        let lon_idx = nearest_index(&self.lons, lon);
        Ok(GridPoint::new(self.lats[lat_idx], self.lons[lon_idx]))
    }

    /// Axis indices of a point that lies exactly on the grid.
    pub fn locate(&self, point: GridPoint) -> Result<(usize, usize)> {
        let lat_idx = self.lats.iter().position(|&v| v == point.lat);
        let lon_idx = self.lons.iter().position(|&v| v == point.lon);

        match (lat_idx, lon_idx) {
            (Some(i), Some(j)) => Ok((i, j)),
            _ => Err(GridError::InvalidGridPoint {
                lat: point.lat,
                lon: point.lon,
            }),
        }
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Number of grid points (lat x lon).
    pub fn len(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every grid point, latitude-major.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.lats
            .iter()
            .flat_map(move |&lat| self.lons.iter().map(move |&lon| GridPoint::new(lat, lon)))
    }
}

/// Index of the value closest to `target`; the first minimum wins ties.
fn nearest_index(values: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;

    for (i, &v) in values.iter().enumerate() {
        let dist = (v - target).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }

    best
}
