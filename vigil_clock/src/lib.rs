//! Clocks and whole-second timestamps for token validation
//!
//! Time claims in a token (`exp`, `nbf`, `iat`) count whole seconds
//! since the Unix epoch, and a validator compares them against its
//! notion of "now". That notion has to be injectable: a policy can pin
//! a fixed instant, and tests need time to stand still. The [`Clock`]
//! trait is that seam; [`System`] reads the operating system clock and
//! [`TestClock`] reports whatever it was last told.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_must_use
)]
#![forbid(unsafe_code)]

use std::{fmt, time::SystemTime};

/// An instant, in whole seconds since the Unix epoch
///
/// Token time claims carry no useful sub-second resolution, so this is
/// a bare second count rather than a `SystemTime`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct UnixTime(pub u64);

impl UnixTime {
    /// The seconds elapsed since the epoch
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// This instant shifted later by `delta`, clamping at the end of
    /// the representable range rather than wrapping
    #[must_use]
    pub const fn saturating_add(self, delta: DurationSecs) -> UnixTime {
        UnixTime(self.0.saturating_add(delta.0))
    }

    /// This instant shifted earlier by `delta`, clamping at the epoch
    /// rather than wrapping
    #[must_use]
    pub const fn saturating_sub(self, delta: DurationSecs) -> UnixTime {
        UnixTime(self.0.saturating_sub(delta.0))
    }
}

impl From<SystemTime> for UnixTime {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(elapsed) => UnixTime(elapsed.as_secs()),
            // A clock reading from before 1970 is treated as the epoch.
            Err(_) => UnixTime(0),
        }
    }
}

impl fmt::Display for UnixTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A span of whole seconds
///
/// The only span a validator works with is its clock-skew tolerance,
/// which is bounded in minutes, so spans stay unsigned and coarse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DurationSecs(pub u64);

impl DurationSecs {
    /// No tolerance at all
    pub const ZERO: DurationSecs = DurationSecs(0);

    /// A span counted in minutes
    #[must_use]
    pub const fn from_mins(minutes: u64) -> Self {
        Self(minutes * 60)
    }

    /// The span in seconds
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DurationSecs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A source for the current time
pub trait Clock {
    /// The current time according to this source
    fn now(&self) -> UnixTime;
}

/// The operating system's clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    fn now(&self) -> UnixTime {
        SystemTime::now().into()
    }
}

/// A clock that stands still until told otherwise
#[derive(Clone, Copy, Debug, Default)]
pub struct TestClock {
    now: UnixTime,
}

impl TestClock {
    /// A clock pinned to `now`
    #[must_use]
    pub const fn new(now: UnixTime) -> Self {
        Self { now }
    }

    /// Moves the clock to `now`
    pub fn set(&mut self, now: UnixTime) {
        self.now = now;
    }

    /// Moves the clock forward by `delta`
    pub fn advance(&mut self, delta: DurationSecs) {
        self.now = self.now.saturating_add(delta);
    }
}

impl Clock for TestClock {
    fn now(&self) -> UnixTime {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn shifts_saturate_at_both_ends() {
        assert_eq!(
            UnixTime(100).saturating_add(DurationSecs(20)),
            UnixTime(120)
        );
        assert_eq!(UnixTime(100).saturating_sub(DurationSecs(20)), UnixTime(80));
        assert_eq!(UnixTime(10).saturating_sub(DurationSecs(20)), UnixTime(0));
        assert_eq!(
            UnixTime(u64::MAX).saturating_add(DurationSecs(1)),
            UnixTime(u64::MAX)
        );
    }

    #[test]
    fn instants_order_by_seconds() {
        assert!(UnixTime(5) < UnixTime(6));
        assert_eq!(UnixTime(7).as_secs(), 7);
    }

    #[test]
    fn spans_convert_from_minutes() {
        assert_eq!(DurationSecs::from_mins(10), DurationSecs(600));
        assert_eq!(DurationSecs::ZERO.as_secs(), 0);
    }

    #[test]
    fn system_time_converts_to_epoch_seconds() {
        let instant = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        assert_eq!(UnixTime::from(instant), UnixTime(42));
    }

    #[test]
    fn pre_epoch_readings_clamp_to_the_epoch() {
        let instant = SystemTime::UNIX_EPOCH - Duration::from_secs(5);
        assert_eq!(UnixTime::from(instant), UnixTime(0));
    }

    #[test]
    fn the_system_clock_reads_after_2020() {
        assert!(System.now() > UnixTime(1_577_836_800));
    }

    #[test]
    fn a_test_clock_stands_still_and_moves_on_demand() {
        let mut clock = TestClock::new(UnixTime(5));
        assert_eq!(clock.now(), UnixTime(5));
        assert_eq!(clock.now(), UnixTime(5));

        clock.advance(DurationSecs(10));
        assert_eq!(clock.now(), UnixTime(15));

        clock.set(UnixTime(0));
        assert_eq!(clock.now(), UnixTime(0));
    }
}
