//! Time handling utilities for query bounds and wire formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("End date {end} is before start date {start}")]
    ReversedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Parse an ISO 8601 date or datetime.
///
/// Accepts RFC 3339 (`2020-01-02T06:00:00Z`, `2020-01-02T09:00:00+03:00`),
/// a naive datetime (`2020-01-02T06:00:00`, assumed UTC) and a bare date
/// (`2020-01-02`, midnight UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Format a timestamp the way it appears in time-series payloads.
///
/// RFC 3339 with a `Z` suffix. Fractional seconds are written only when
/// present, in groups of three digits.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// An inclusive `[start, end]` window over timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, rejecting `end < start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeParseError> {
        if end < start {
            return Err(TimeParseError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range only when both bounds are present.
    ///
    /// A missing bound means "no filtering", so `Ok(None)` is returned.
    pub fn from_bounds(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Option<Self>, TimeParseError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_datetime("2020-01-02T06:00:00Z").unwrap(), utc(2020, 1, 2, 6));
        assert_eq!(
            parse_datetime("2020-01-02T09:00:00+03:00").unwrap(),
            utc(2020, 1, 2, 6)
        );
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        assert_eq!(parse_datetime("2020-01-02T06:00:00").unwrap(), utc(2020, 1, 2, 6));
        assert_eq!(parse_datetime("2020-01-02T06:00").unwrap(), utc(2020, 1, 2, 6));
        assert_eq!(parse_datetime(" 2020-01-02 ").unwrap(), utc(2020, 1, 2, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(TimeParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&utc(2020, 1, 3, 0)), "2020-01-03T00:00:00Z");

        let half_second = utc(2020, 1, 3, 0) + chrono::Duration::milliseconds(500);
        assert_eq!(format_timestamp(&half_second), "2020-01-03T00:00:00.500Z");
        assert_ne!(format_timestamp(&half_second), format_timestamp(&utc(2020, 1, 3, 0)));
        assert_eq!(parse_datetime(&format_timestamp(&half_second)).unwrap(), half_second);
    }

    #[test]
    fn test_range_inclusive() {
        let range = DateRange::new(utc(2020, 1, 2, 0), utc(2020, 1, 3, 0)).unwrap();
        assert!(range.contains(&utc(2020, 1, 2, 0)));
        assert!(range.contains(&utc(2020, 1, 3, 0)));
        assert!(!range.contains(&utc(2020, 1, 1, 23)));
        assert!(!range.contains(&utc(2020, 1, 3, 1)));
    }

    #[test]
    fn test_reversed_range() {
        let err = DateRange::new(utc(2020, 1, 3, 0), utc(2020, 1, 2, 0)).unwrap_err();
        assert!(matches!(err, TimeParseError::ReversedRange { .. }));
    }

    #[test]
    fn test_from_bounds_requires_both() {
        assert_eq!(DateRange::from_bounds(Some(utc(2020, 1, 2, 0)), None).unwrap(), None);
        assert_eq!(DateRange::from_bounds(None, Some(utc(2020, 1, 2, 0))).unwrap(), None);
        assert!(DateRange::from_bounds(Some(utc(2020, 1, 2, 0)), Some(utc(2020, 1, 2, 0)))
            .unwrap()
            .is_some());
        assert!(DateRange::from_bounds(Some(utc(2020, 1, 3, 0)), Some(utc(2020, 1, 2, 0))).is_err());
    }
}
