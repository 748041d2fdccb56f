//! Time-series extraction at a grid point.

use std::collections::BTreeMap;

use grid_common::{DateRange, GridDataset, GridPoint, Sample, TimeSeries, Variable};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::index::GridIndex;

/// Series extracted at one grid point, keyed by variable (and extra dimension indices).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub point: Option<GridPoint>,
    pub series: BTreeMap<String, TimeSeries>,
    /// Units of each series, for the keys that have them.
    pub units: BTreeMap<String, String>,
    /// Date window the samples were restricted to, if any.
    pub range: Option<DateRange>,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Extract every spatio-temporal variable at `point`.
///
/// `point` must lie exactly on the index axes. With a range, only samples
/// with `start <= t <= end` are kept.
pub fn extract(
    dataset: &GridDataset,
    index: &GridIndex,
    point: GridPoint,
    range: Option<&DateRange>,
) -> Result<Extraction> {
    let (lat_idx, lon_idx) = index.locate(point)?;

    let mut extraction = Extraction {
        point: Some(point),
        range: range.copied(),
        ..Default::default()
    };

    for var in &dataset.variables {
        let Some(layout) = Layout::of(var, dataset) else {
            debug!(variable = %var.name, "Skipping variable without time/lat/lon dimensions");
            continue;
        };

        for (key, offset) in layout.series_offsets(var, lat_idx, lon_idx) {
            let samples = dataset
                .time
                .times()
                .iter()
                .enumerate()
                .filter(|(_, t)| range.map_or(true, |r| r.contains(t)))
                .map(|(t, ts)| Sample::new(*ts, var.data()[offset + t * layout.time_stride]))
                .collect();

            if let Some(units) = &var.units {
                extraction.units.insert(key.clone(), units.clone());
            }
            extraction.series.insert(key, TimeSeries::new(samples));
        }
    }

    Ok(extraction)
}

/// Where the time, lat and lon dimensions sit inside a variable.
struct Layout {
    time_stride: usize,
    lat_stride: usize,
    lon_stride: usize,
    /// (dimension name, size, stride) of every other dimension.
    extra: Vec<(String, usize, usize)>,
}

impl Layout {
    fn of(var: &Variable, dataset: &GridDataset) -> Option<Self> {
        let t = var.dimension_index(&dataset.time.dimension)?;
        let y = var.dimension_index(&dataset.lat.dimension)?;
        let x = var.dimension_index(&dataset.lon.dimension)?;

        if var.shape[t] != dataset.time.len()
            || var.shape[y] != dataset.lat.len()
            || var.shape[x] != dataset.lon.len()
        {
            debug!(variable = %var.name, shape = ?var.shape, "Variable shape does not match axes");
            return None;
        }

        let strides = var.strides();
        let extra = var
            .dimensions
            .iter()
            .enumerate()
            .filter(|(i, _)| ![t, y, x].contains(i))
            .map(|(i, name)| (name.clone(), var.shape[i], strides[i]))
            .collect();

        Some(Self {
            time_stride: strides[t],
            lat_stride: strides[y],
            lon_stride: strides[x],
            extra,
        })
    }

    /// Series key and base offset for every combination of extra-dimension indices.
    fn series_offsets(&self, var: &Variable, lat_idx: usize, lon_idx: usize) -> Vec<(String, usize)> {
        let base = lat_idx * self.lat_stride + lon_idx * self.lon_stride;

        if self.extra.is_empty() {
            return vec![(var.name.clone(), base)];
        }
        if self.extra.iter().any(|(_, size, _)| *size == 0) {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut counters = vec![0usize; self.extra.len()];
        loop {
            let offset = base
                + counters
                    .iter()
                    .zip(&self.extra)
                    .map(|(c, (_, _, stride))| c * stride)
                    .sum::<usize>();
            let labels: Vec<String> = counters
                .iter()
                .zip(&self.extra)
                .map(|(c, (name, _, _))| format!("{}={}", name, c))
                .collect();
            out.push((format!("{}[{}]", var.name, labels.join(",")), offset));

            // Odometer increment, last dimension fastest
            let mut pos = self.extra.len();
            loop {
                if pos == 0 {
                    return out;
                }
                pos -= 1;
                counters[pos] += 1;
                if counters[pos] < self.extra[pos].1 {
                    break;
                }
                counters[pos] = 0;
            }
        }
    }
}
