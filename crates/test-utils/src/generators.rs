//! Builders for synthetic gridded datasets.
//!
//! Values are produced by closures over grid indices, so tests can compute
//! the expected series at any point without hard-coding arrays.

use chrono::{DateTime, Duration, TimeZone, Utc};
use grid_common::{CoordinateAxis, GridDataset, TimeAxis, Variable};

/// Daily timestamps starting at 2020-01-01T00:00:00Z.
pub fn daily_times(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    (0..n).map(|d| start + Duration::days(d as i64)).collect()
}

/// Builds a [`GridDataset`] with axes named `lat`, `lon` and `time`.
///
/// # Example
///
/// ```
/// use test_utils::GridDatasetBuilder;
///
/// let dataset = GridDatasetBuilder::new(vec![10.0, 20.0], vec![100.0], 3)
///     .variable_fn("t2m", |t, i, j| (t * 100 + i * 10 + j) as f64)
///     .with_units("t2m", "K")
///     .build();
/// assert_eq!(dataset.variables.len(), 1);
/// assert_eq!(dataset.time.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct GridDatasetBuilder {
    lats: Vec<f64>,
    lons: Vec<f64>,
    times: Vec<DateTime<Utc>>,
    variables: Vec<Variable>,
}

impl GridDatasetBuilder {
    /// Grid with the given axes and `n_times` daily time steps.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, n_times: usize) -> Self {
        Self {
            lats,
            lons,
            times: daily_times(n_times),
            variables: Vec::new(),
        }
    }

    /// Replace the time axis. Call before adding variables.
    pub fn times(mut self, times: Vec<DateTime<Utc>>) -> Self {
        self.times = times;
        self
    }

    /// Add a `(time, lat, lon)` variable with values `f(t, i, j)`.
    pub fn variable_fn(mut self, name: &str, f: impl Fn(usize, usize, usize) -> f64) -> Self {
        let (nt, ny, nx) = (self.times.len(), self.lats.len(), self.lons.len());
        let mut data = Vec::with_capacity(nt * ny * nx);
        for t in 0..nt {
            for i in 0..ny {
                for j in 0..nx {
                    data.push(f(t, i, j));
                }
            }
        }
        self.push(name, &["time", "lat", "lon"], vec![nt, ny, nx], data)
    }

    /// Add a `(time, level, lat, lon)` variable with values `f(t, k, i, j)`.
    pub fn level_variable(
        mut self,
        name: &str,
        n_levels: usize,
        f: impl Fn(usize, usize, usize, usize) -> f64,
    ) -> Self {
        let (nt, ny, nx) = (self.times.len(), self.lats.len(), self.lons.len());
        let mut data = Vec::with_capacity(nt * n_levels * ny * nx);
        for t in 0..nt {
            for k in 0..n_levels {
                for i in 0..ny {
                    for j in 0..nx {
                        data.push(f(t, k, i, j));
                    }
                }
            }
        }
        self.push(
            name,
            &["time", "level", "lat", "lon"],
            vec![nt, n_levels, ny, nx],
            data,
        )
    }

    /// Add a `(lat, lon)` variable with no time dimension.
    pub fn static_variable(self, name: &str, data: Vec<f64>) -> Self {
        let shape = vec![self.lats.len(), self.lons.len()];
        self.push(name, &["lat", "lon"], shape, data)
    }

    /// Set the units of a previously added variable.
    pub fn with_units(mut self, name: &str, units: &str) -> Self {
        if let Some(pos) = self.variables.iter().position(|v| v.name == name) {
            let var = self.variables.remove(pos).with_units(units);
            self.variables.insert(pos, var);
        }
        self
    }

    pub fn build(self) -> GridDataset {
        let lat = CoordinateAxis::new("lat", "lat", Some("degrees_north".to_string()), self.lats)
            .expect("valid latitude axis");
        let lon = CoordinateAxis::new("lon", "lon", Some("degrees_east".to_string()), self.lons)
            .expect("valid longitude axis");
        let time = TimeAxis::new("time", "time", self.times);

        let mut dataset = GridDataset::new(lat, lon, time);
        dataset.variables = self.variables;
        dataset
    }

    fn push(mut self, name: &str, dims: &[&str], shape: Vec<usize>, data: Vec<f64>) -> Self {
        let dims = dims.iter().map(|d| d.to_string()).collect();
        let var = Variable::new(name, dims, shape, data).expect("consistent variable shape");
        self.variables.push(var);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_times() {
        let times = daily_times(3);
        assert_eq!(times.len(), 3);
        assert_eq!(times[2] - times[0], Duration::days(2));
    }

    #[test]
    fn test_variable_layout() {
        let dataset = GridDatasetBuilder::new(vec![0.0, 1.0], vec![0.0, 1.0, 2.0], 2)
            .variable_fn("v", |t, i, j| (t * 100 + i * 10 + j) as f64)
            .build();
        let var = dataset.variable("v").unwrap();
        assert_eq!(var.shape, vec![2, 2, 3]);
        // t=1, i=1, j=2 is the last element
        assert_eq!(var.data()[11], 112.0);
    }

    #[test]
    fn test_with_units_keeps_order() {
        let dataset = GridDatasetBuilder::new(vec![0.0], vec![0.0], 1)
            .variable_fn("a", |_, _, _| 0.0)
            .variable_fn("b", |_, _, _| 0.0)
            .with_units("a", "K")
            .build();
        assert_eq!(dataset.variables[0].name, "a");
        assert_eq!(dataset.variables[0].units.as_deref(), Some("K"));
    }
}
