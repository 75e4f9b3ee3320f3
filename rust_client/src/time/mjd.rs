//! Modified Julian date representation and time-specification parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MJD of the Unix epoch, 1970-01-01T00:00:00 UTC.
pub const UNIX_EPOCH_MJD: f64 = 40587.0;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Julian dates above this value are taken to be JD rather than MJD.
const JD_MJD_BOUNDARY: f64 = 2_400_000.5;

/// A UTC instant as a modified Julian date.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ModifiedJulianDate(f64);

impl ModifiedJulianDate {
    /// Create a new MJD value.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Raw MJD value as f64.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Convert a UTC instant to MJD.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
        Self(secs / SECONDS_PER_DAY + UNIX_EPOCH_MJD)
    }

    /// Convert back to a UTC instant. `None` for values outside the
    /// representable chrono range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let secs = (self.0 - UNIX_EPOCH_MJD) * SECONDS_PER_DAY;
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round() as u32;
        DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(v: f64) -> Self {
        ModifiedJulianDate::new(v)
    }
}

impl From<DateTime<Utc>> for ModifiedJulianDate {
    fn from(dt: DateTime<Utc>) -> Self {
        ModifiedJulianDate::from_utc(dt)
    }
}

/// Parse an ISO 8601 instant, treating values without a timezone as UTC.
///
/// Accepts `T` or space separators, optional fractional seconds, optional
/// offset, and bare dates.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::TimeParse(text.to_string()))
}

/// Return the modified Julian date equivalent to a time specification.
///
/// Numeric input is treated as JD when it exceeds 2400000.5 and as MJD
/// otherwise; anything else must parse as an ISO 8601 instant (naive
/// values are treated as UTC).
pub fn mjd_from_str(spec: &str) -> Result<ModifiedJulianDate> {
    if let Ok(jd_or_mjd) = spec.trim().parse::<f64>() {
        let mjd = if jd_or_mjd > JD_MJD_BOUNDARY {
            jd_or_mjd - JD_MJD_BOUNDARY
        } else {
            jd_or_mjd
        };
        return Ok(ModifiedJulianDate::new(mjd));
    }
    parse_utc(spec).map(ModifiedJulianDate::from_utc)
}
