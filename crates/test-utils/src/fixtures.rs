//! The reference scenario used across the test suite.
//!
//! Latitudes `[10, 20, 30]`, longitudes `[100, 110]`, three daily steps from
//! 2020-01-01. `temperature` (degC) reads `[5, missing, 7]` at (20, 100).

use grid_common::GridDataset;

use crate::generators::GridDatasetBuilder;

pub const SCENARIO_LATS: [f64; 3] = [10.0, 20.0, 30.0];
pub const SCENARIO_LONS: [f64; 2] = [100.0, 110.0];

/// Temperature at every (t, lat index, lon index) of the scenario.
pub fn scenario_temperature(t: usize, i: usize, j: usize) -> f64 {
    match (t, i, j) {
        (0, 1, 0) => 5.0,
        (1, 1, 0) => f64::NAN,
        (2, 1, 0) => 7.0,
        _ => (t * 100 + i * 10 + j) as f64,
    }
}

/// The scenario as an in-memory dataset.
pub fn scenario_dataset() -> GridDataset {
    GridDatasetBuilder::new(SCENARIO_LATS.to_vec(), SCENARIO_LONS.to_vec(), 3)
        .variable_fn("temperature", scenario_temperature)
        .with_units("temperature", "degC")
        .build()
}
