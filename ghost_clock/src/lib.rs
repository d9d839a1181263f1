//! Utilities for telling time in milliseconds
//!
//! Token expiry is tracked with millisecond precision, so the types here
//! deal in milliseconds since the Unix epoch. The [`Clock`] trait allows
//! swapping the system clock for a [`TestClock`] that only moves when told to.

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

use std::{
    ops,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime},
};

/// Unix time in milliseconds
///
/// The number of milliseconds elapsed since the beginning of the Unix epoch
/// on 1970/01/01 at 00:00:00 UTC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct UnixMillis(pub u64);

impl UnixMillis {
    /// The beginning of the Unix epoch, which is always in the past
    pub const EPOCH: Self = Self(0);
}

impl From<SystemTime> for UnixMillis {
    #[inline]
    fn from(t: SystemTime) -> Self {
        // Times before the epoch collapse onto it.
        let millis = t
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        UnixMillis(u64::try_from(millis).unwrap_or(u64::MAX))
    }
}

/// A span of time in milliseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DurationMillis(pub u64);

impl DurationMillis {
    /// Constructs a duration from a whole number of seconds
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }
}

impl From<DurationMillis> for Duration {
    #[inline]
    fn from(d: DurationMillis) -> Self {
        Duration::from_millis(d.0)
    }
}

impl ops::Add<DurationMillis> for UnixMillis {
    type Output = UnixMillis;

    #[inline]
    fn add(self, rhs: DurationMillis) -> Self::Output {
        UnixMillis(self.0.saturating_add(rhs.0))
    }
}

impl ops::Sub<DurationMillis> for UnixMillis {
    type Output = UnixMillis;

    #[inline]
    fn sub(self, rhs: DurationMillis) -> Self::Output {
        UnixMillis(self.0.saturating_sub(rhs.0))
    }
}

impl ops::Sub for UnixMillis {
    type Output = DurationMillis;

    #[inline]
    fn sub(self, rhs: UnixMillis) -> Self::Output {
        DurationMillis(self.0.saturating_sub(rhs.0))
    }
}

/// Represents a clock, which can tell the current time
pub trait Clock {
    /// Gets the current time according to this clock
    fn now(&self) -> UnixMillis;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> UnixMillis {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> UnixMillis {
        (**self).now()
    }
}

/// The system clock as provided by `std::time::SystemTime`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    #[inline]
    fn now(&self) -> UnixMillis {
        UnixMillis::from(SystemTime::now())
    }
}

/// A test clock which only moves when told to
///
/// Clones share the same underlying instant, so a test can keep one handle
/// while handing another to the code under test.
#[derive(Clone, Debug, Default)]
pub struct TestClock(Arc<AtomicU64>);

impl Clock for TestClock {
    #[inline]
    fn now(&self) -> UnixMillis {
        UnixMillis(self.0.load(Ordering::Acquire))
    }
}

impl TestClock {
    /// Creates a new test clock with the specified time
    pub fn new(time: UnixMillis) -> Self {
        Self(Arc::new(AtomicU64::new(time.0)))
    }

    /// Updates the clock's current time to `val`
    pub fn set(&self, val: UnixMillis) {
        self.0.store(val.0, Ordering::Release);
    }

    /// Moves the clock forward by `inc`
    pub fn advance(&self, inc: DurationMillis) {
        self.0.fetch_add(inc.0, Ordering::AcqRel);
    }
}
