//! Decoding of CF-convention time coordinates.
//!
//! Time values are stored as offsets from a reference date described by the
//! `units` attribute, e.g. `"hours since 1900-01-01 00:00:0.0"`.
//!
//! Gregorian calendars map directly onto UTC. The fixed-length-year model
//! calendars (`noleap`/`365_day`, `all_leap`/`366_day`) are decoded by
//! counting days in that calendar and then naming the resulting date in the
//! Gregorian one. `360_day` and `julian` are rejected.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::{NetCdfError, NetCdfResult};

/// Largest offset from the reference date we accept (about 3 million years).
const MAX_OFFSET_MS: f64 = 1e17;

const MS_PER_DAY: i64 = 86_400_000;

const NOLEAP_MONTHS: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const ALL_LEAP_MONTHS: [i64; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// CF calendar of a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// `standard`, `gregorian`, `proleptic_gregorian`, or no attribute.
    #[default]
    Gregorian,
    /// `noleap` / `365_day`: February always has 28 days.
    NoLeap,
    /// `all_leap` / `366_day`: February always has 29 days.
    AllLeap,
}

impl Calendar {
    /// Parse a `calendar` attribute; `None` means the CF default.
    pub fn parse(name: Option<&str>) -> NetCdfResult<Self> {
        let Some(name) = name else {
            return Ok(Self::Gregorian);
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::Gregorian),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Err(NetCdfError::UnsupportedCalendar(
                "360_day (30-day months have no Gregorian equivalent)".to_string(),
            )),
            _ => Err(NetCdfError::UnsupportedCalendar(name.to_string())),
        }
    }

    fn month_lengths(self) -> Option<&'static [i64; 12]> {
        match self {
            Self::Gregorian => None,
            Self::NoLeap => Some(&NOLEAP_MONTHS),
            Self::AllLeap => Some(&ALL_LEAP_MONTHS),
        }
    }
}

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "days" | "day" | "d" => Some(Self::Days),
            "weeks" | "week" => Some(Self::Weeks),
            _ => None,
        }
    }

    fn milliseconds(self) -> f64 {
        match self {
            Self::Seconds => 1_000.0,
            Self::Minutes => 60_000.0,
            Self::Hours => 3_600_000.0,
            Self::Days => 86_400_000.0,
            Self::Weeks => 604_800_000.0,
        }
    }
}

/// Parsed `"<unit> since <reference>"` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    pub unit: TimeUnit,
    pub reference: DateTime<Utc>,
}

impl CfTimeUnits {
    pub fn parse(units: &str) -> NetCdfResult<Self> {
        let invalid = || NetCdfError::InvalidTime(format!("unexpected time units format: '{}'", units));

        let mut parts = units.trim().splitn(3, char::is_whitespace);
        let unit = parts.next().and_then(TimeUnit::parse).ok_or_else(invalid)?;
        if !parts
            .next()
            .map(|s| s.eq_ignore_ascii_case("since"))
            .unwrap_or(false)
        {
            return Err(invalid());
        }
        let reference = parts
            .next()
            .and_then(parse_reference_date)
            .ok_or_else(invalid)?;

        Ok(Self { unit, reference })
    }

    /// Convert one raw offset to a timestamp in the Gregorian calendar.
    pub fn to_datetime(&self, offset: f64) -> NetCdfResult<DateTime<Utc>> {
        self.to_datetime_in(offset, Calendar::Gregorian)
    }

    /// Convert one raw offset to a timestamp, counting days in `calendar`.
    pub fn to_datetime_in(&self, offset: f64, calendar: Calendar) -> NetCdfResult<DateTime<Utc>> {
        let millis = self.offset_millis(offset)?;

        match calendar.month_lengths() {
            None => self
                .reference
                .checked_add_signed(Duration::milliseconds(millis))
                .ok_or_else(|| {
                    NetCdfError::InvalidTime(format!("time value {} out of range", offset))
                }),
            Some(months) => shift_fixed_year(self.reference, millis, months),
        }
    }

    fn offset_millis(&self, offset: f64) -> NetCdfResult<i64> {
        if !offset.is_finite() {
            return Err(NetCdfError::InvalidTime(format!(
                "non-finite time value {}",
                offset
            )));
        }

        let millis = (offset * self.unit.milliseconds()).round();
        if millis.abs() > MAX_OFFSET_MS {
            return Err(NetCdfError::InvalidTime(format!(
                "time value {} out of range",
                offset
            )));
        }

        Ok(millis as i64)
    }
}

/// Move `millis` away from `reference` in a calendar whose years all have the
/// same month lengths.
fn shift_fixed_year(
    reference: DateTime<Utc>,
    millis: i64,
    months: &[i64; 12],
) -> NetCdfResult<DateTime<Utc>> {
    let year_len: i64 = months.iter().sum();
    let ref_date = reference.date_naive();

    let month0 = ref_date.month0() as usize;
    let ref_day = ref_date.day() as i64;
    if ref_day > months[month0] {
        return Err(NetCdfError::InvalidTime(format!(
            "reference date {} does not exist in this calendar",
            ref_date
        )));
    }
    let ref_doy: i64 = months[..month0].iter().sum::<i64>() + ref_day - 1;

    let time_of_day = reference.num_seconds_from_midnight() as i64 * 1000
        + (reference.nanosecond() / 1_000_000) as i64;
    let total = time_of_day + millis;
    let day_index = ref_doy + total.div_euclid(MS_PER_DAY);
    let remainder = total.rem_euclid(MS_PER_DAY);

    let year = ref_date.year() as i64 + day_index.div_euclid(year_len);
    let mut doy = day_index.rem_euclid(year_len);
    let mut month = 0;
    while doy >= months[month] {
        doy -= months[month];
        month += 1;
    }

    let midnight = i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month as u32 + 1, doy as u32 + 1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            NetCdfError::InvalidTime(format!(
                "{}-{:02}-{:02} has no Gregorian equivalent",
                year,
                month + 1,
                doy + 1
            ))
        })?;

    Utc.from_utc_datetime(&midnight)
        .checked_add_signed(Duration::milliseconds(remainder))
        .ok_or_else(|| NetCdfError::InvalidTime(format!("{} out of range", midnight)))
}

/// Decode raw time offsets using the variable's `units` and `calendar` attributes.
pub fn decode_times(
    values: &[f64],
    units: &str,
    calendar: Option<&str>,
) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let calendar = Calendar::parse(calendar)?;
    let units = CfTimeUnits::parse(units)?;
    values
        .iter()
        .map(|&v| units.to_datetime_in(v, calendar))
        .collect()
}

/// Parse the reference date of a CF units string.
///
/// Handles `1970-01-01`, `1970-01-01 00:00:00`, `1970-01-01T00:00:00Z`,
/// `1900-1-1 0:0:0.0` and a trailing `UTC`/`Z`/`+00:00` zone.
fn parse_reference_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let s = s
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim_end_matches("+00:00")
        .trim_end_matches("+0000")
        .trim()
        .replacen('T', " ", 1);

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
