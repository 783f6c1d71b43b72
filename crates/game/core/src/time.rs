//! Wall-clock values passed into the engines.
//!
//! The engines never read a clock themselves. Callers hand in a [`Timestamp`]
//! on every operation, which keeps settlement math reproducible in tests and
//! makes a suspended host look like nothing more than a large `elapsed`.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Utc};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, zero if `earlier` is later.
    /// Saturates at `i64::MAX` for spans that do not fit.
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0).max(0)
    }

    /// Hours from `earlier` to `self`, zero if `earlier` is later.
    pub fn hours_since(self, earlier: Timestamp) -> f64 {
        hours_from_millis(self.millis_since(earlier))
    }

    pub fn add_hours(self, hours: f64) -> Self {
        self.add_millis(millis_from_hours(hours))
    }

    pub fn add_millis(self, ms: i64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Calendar day (`YYYY-MM-DD`) this instant falls on at the given offset.
    ///
    /// Out-of-range timestamps and offsets fall back to UTC / the epoch day.
    pub fn day_key(self, utc_offset_minutes: i32) -> String {
        let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        let utc = DateTime::from_timestamp_millis(self.0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        utc.with_timezone(&offset).format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

pub fn hours_from_millis(ms: i64) -> f64 {
    ms as f64 / MS_PER_HOUR as f64
}

/// Rounds to the nearest millisecond so that hour/ms round trips are stable.
pub fn millis_from_hours(hours: f64) -> i64 {
    (hours * MS_PER_HOUR as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_since_never_negative() {
        let a = Timestamp(10_000);
        let b = Timestamp(5_000);
        assert_eq!(b.hours_since(a), 0.0);
        assert_eq!(a.millis_since(b), 5_000);
    }

    #[test]
    fn day_key_respects_offset() {
        // 2024-03-01T23:30:00Z
        let ts = Timestamp(1_709_335_800_000);
        assert_eq!(ts.day_key(0), "2024-03-01");
        assert_eq!(ts.day_key(60), "2024-03-02");
        assert_eq!(ts.day_key(-60), "2024-03-01");
    }

    #[test]
    fn extreme_values_saturate() {
        assert_eq!(Timestamp(i64::MAX).millis_since(Timestamp(i64::MIN)), i64::MAX);
        assert_eq!(Timestamp(i64::MIN).millis_since(Timestamp(i64::MAX)), 0);
        assert_eq!(Timestamp(i64::MAX).add_millis(1), Timestamp(i64::MAX));
        assert_eq!(Timestamp(i64::MIN).add_hours(-1.0), Timestamp(i64::MIN));
        assert_eq!(Timestamp(0).add_hours(f64::INFINITY), Timestamp(i64::MAX));
    }

    #[test]
    fn add_hours_round_trips() {
        let start = Timestamp(1_000);
        assert_eq!(start.add_hours(2.0).hours_since(start), 2.0);
    }
}
