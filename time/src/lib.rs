//! A small wall-clock abstraction shared by every crate in this workspace.
//!
//! Modeled on the needs of the write path: callers never read
//! `SystemTime::now()` directly, they take a `&dyn TimeProvider` so tests can
//! swap in a [`MockProvider`] and get fully deterministic behavior (Graphite
//! rollups and TTL folding both depend on "now").

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

/// Number of seconds in a day, used to convert the "day-number" (compact
/// date) TTL representation into unix-seconds.
const SECONDS_PER_DAY: i64 = 86_400;

/// A point in time, stored as nanoseconds since the Unix epoch.
///
/// This is deliberately a thin wrapper rather than a re-export of
/// `chrono::DateTime` so the rest of the workspace depends on one type
/// regardless of which calendar library backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

impl Time {
    /// Construct from a unix nanosecond timestamp.
    pub const fn from_timestamp_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Construct from a unix millisecond timestamp.
    pub const fn from_timestamp_millis(millis: i64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Construct from a unix second timestamp.
    pub const fn from_timestamp(secs: i64) -> Self {
        Self(secs * 1_000_000_000)
    }

    /// Construct from a "day-number" (days since 1970-01-01), the compact
    /// date representation used by TTL expressions that resolve to a `Date`
    /// rather than a `DateTime`. This is the process-wide calendar
    /// conversion referenced by the TTL accumulator.
    pub fn from_day_number(days: i32) -> Self {
        Self(i64::from(days) * SECONDS_PER_DAY * 1_000_000_000)
    }

    /// Nanoseconds since the Unix epoch.
    pub const fn timestamp_nanos(&self) -> i64 {
        self.0
    }

    /// Seconds since the Unix epoch (truncating, matching the "unix-seconds"
    /// TTL representation).
    pub const fn timestamp(&self) -> i64 {
        self.0.div_euclid(1_000_000_000)
    }

    /// The calendar date/time in UTC.
    pub fn date_time(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.0)
    }

    /// The day-number (days since 1970-01-01) this instant falls on.
    pub fn day_number(&self) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
        (self.date_time().date_naive() - epoch).num_days() as i32
    }

    /// Construct midnight UTC of the given calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date");
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
        Self::from_day_number((date - epoch).num_days() as i32)
    }

    /// The `(year, month, day)` this instant falls on, in UTC.
    pub fn year_month_day(&self) -> (i32, u32, u32) {
        let d = self.date_time().date_naive();
        (d.year(), d.month(), d.day())
    }
}

/// Anything that can report the current wall-clock time.
///
/// Every call site that needs "now" (Graphite retention rollup, the default
/// timestamp applied to rows lacking one, space-reservation move-TTL checks)
/// takes a `&dyn TimeProvider` rather than reading the clock directly.
pub trait TimeProvider: std::fmt::Debug + Send + Sync + 'static {
    /// The current time.
    fn now(&self) -> Time;
}

/// A [`TimeProvider`] backed by the OS clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider {
    _private: (),
}

impl SystemProvider {
    /// Construct a new system-clock time provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeProvider for SystemProvider {
    fn now(&self) -> Time {
        Time::from_timestamp_nanos(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }
}

/// A [`TimeProvider`] that returns a fixed, externally-set time.
///
/// Used exclusively by tests that need deterministic "now" values (the
/// Graphite rollup tests in particular pin `now` to a known instant).
#[derive(Debug)]
pub struct MockProvider {
    now: Mutex<Time>,
}

impl MockProvider {
    /// Construct a provider that always reports `now`.
    pub fn new(now: Time) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Change the time this provider reports.
    pub fn set(&self, now: Time) {
        *self.now.lock() = now;
    }
}

impl TimeProvider for MockProvider {
    fn now(&self) -> Time {
        *self.now.lock()
    }
}

/// Convenience for call sites that want a shared, clonable provider handle.
pub type TimeProviderRef = Arc<dyn TimeProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_roundtrip() {
        let t = Time::from_timestamp_nanos(1_465_839_830_100_400_200);
        assert_eq!(t.timestamp_nanos(), 1_465_839_830_100_400_200);
    }

    #[test]
    fn day_number_roundtrips_through_from_day_number() {
        let t = Time::from_day_number(19_723); // 2023-12-25
        assert_eq!(t.day_number(), 19_723);
    }

    #[test]
    fn day_number_converts_to_midnight_unix_seconds() {
        let t = Time::from_day_number(1);
        assert_eq!(t.timestamp(), SECONDS_PER_DAY);
    }

    #[test]
    fn mock_provider_reports_fixed_time_until_set() {
        let p = MockProvider::new(Time::from_timestamp_nanos(42));
        assert_eq!(p.now().timestamp_nanos(), 42);
        p.set(Time::from_timestamp_nanos(43));
        assert_eq!(p.now().timestamp_nanos(), 43);
    }

    #[test]
    fn from_ymd_roundtrips_year_month_day() {
        let t = Time::from_ymd(2024, 1, 31);
        assert_eq!(t.year_month_day(), (2024, 1, 31));
    }
}
