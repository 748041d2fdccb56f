//! Grid points and the time series extracted at them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time::{format_timestamp, parse_datetime};

/// A (latitude, longitude) pair taken exactly from the dataset's axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GridPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One (timestamp, value) sample. `None` marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(serialize_with = "serialize_ts", deserialize_with = "deserialize_ts")]
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Sample {
    /// Build a sample; NaN and infinities become `None`.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value: value.is_finite().then_some(value),
        }
    }
}

fn serialize_ts<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(dt))
}

fn deserialize_ts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_datetime(&s).map_err(serde::de::Error::custom)
}

/// Ordered samples for one variable at one grid point.
///
/// Serializes as a bare array of `{ "timestamp": ..., "value": ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Keep only the samples whose timestamp satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&DateTime<Utc>) -> bool) {
        self.samples.retain(|s| keep(&s.timestamp));
    }

    /// Apply `f` to every present value, leaving missing values untouched.
    pub fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for sample in &mut self.samples {
            sample.value = sample.value.map(&f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_non_finite_is_missing() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Sample::new(t, 5.0).value, Some(5.0));
        assert_eq!(Sample::new(t, f64::NAN).value, None);
        assert_eq!(Sample::new(t, f64::INFINITY).value, None);
    }

    #[test]
    fn test_series_wire_shape() {
        let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let series = TimeSeries::new(vec![Sample::new(t0, 5.0), Sample::new(t1, f64::NAN)]);

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "timestamp": "2020-01-01T00:00:00Z", "value": 5.0 },
                { "timestamp": "2020-01-02T00:00:00Z", "value": null },
            ])
        );
    }

    #[test]
    fn test_map_values_keeps_missing() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut series = TimeSeries::new(vec![Sample::new(t, 300.0), Sample::new(t, f64::NAN)]);
        series.map_values(|v| v - 273.15);
        assert!((series.samples[0].value.unwrap() - 26.85).abs() < 1e-9);
        assert_eq!(series.samples[1].value, None);
    }
}
