//! UTC timestamps and the astronomical time arguments derived from them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::EphemerisError;

/// Julian Day of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian Day of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// An absolute instant as milliseconds since the Unix epoch, always UTC.
///
/// UTC stands in for dynamical time; the ~69 s offset is below the
/// analytic model's accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub const fn millis(self) -> i64 {
        self.0
    }

    pub const fn plus_millis(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    pub fn julian_day(self) -> f64 {
        self.0 as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
    }

    pub fn days_since_j2000(self) -> f64 {
        self.julian_day() - J2000_JD
    }

    /// Julian centuries since J2000.0.
    pub fn centuries_since_j2000(self) -> f64 {
        self.days_since_j2000() / DAYS_PER_JULIAN_CENTURY
    }

    pub fn to_datetime(self) -> Result<DateTime<Utc>, EphemerisError> {
        DateTime::from_timestamp_millis(self.0).ok_or(EphemerisError::TimeOutOfRange(self.0))
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix.
    pub fn to_iso8601(self) -> Result<String, EphemerisError> {
        Ok(self
            .to_datetime()?
            .to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// `YYYY-MM-DD HH:MM`, the calendar format Horizons accepts.
    pub fn horizons_format(self) -> Result<String, EphemerisError> {
        Ok(self.to_datetime()?.format("%Y-%m-%d %H:%M").to_string())
    }

    /// Greenwich Mean Sidereal Time in radians, in `[0, 2π)`.
    pub fn gmst_radians(self) -> f64 {
        let days = self.days_since_j2000();
        let t = days / DAYS_PER_JULIAN_CENTURY;
        let degrees = 280.460_618_37 + 360.985_647_366_29 * days + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0;
        degrees.rem_euclid(360.0).to_radians()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}
