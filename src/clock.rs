//! Clock source selection for elapsed-time measurement
//!
//! Which clock backs the stopwatch is a capability of the host, not a
//! configuration knob. Preference order: a raw monotonic hardware timer when
//! the OS exposes one, else the monotonic high-resolution clock, else
//! wall-clock time. On any std host the monotonic clock exists, so the
//! wall-clock arm is the fallback of last resort and stays exercised only by
//! tests.

use std::time::{Duration, Instant, SystemTime};

/// The clock a stopwatch reads. Probe with [`ClockSource::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Raw monotonic hardware timer (`CLOCK_MONOTONIC_RAW`), immune to NTP
    /// slewing.
    MonotonicRaw,
    /// Monotonic high-resolution clock (std `Instant`).
    Monotonic,
    /// Wall-clock time; subject to adjustment, millisecond-grade.
    Wall,
}

impl ClockSource {
    /// Probe the host for the best available clock, in preference order.
    pub fn detect() -> Self {
        if raw_clock_available() {
            ClockSource::MonotonicRaw
        } else {
            ClockSource::Monotonic
        }
    }

    /// Read the current time on this clock.
    pub fn now(self) -> Timestamp {
        match self {
            ClockSource::MonotonicRaw => match raw_now() {
                Some(t) => Timestamp::Raw(t),
                // Raw clock vanished between detect and read; degrade.
                None => Timestamp::Monotonic(Instant::now()),
            },
            ClockSource::Monotonic => Timestamp::Monotonic(Instant::now()),
            ClockSource::Wall => Timestamp::Wall(SystemTime::now()),
        }
    }
}

/// A start-time reading, tagged with the clock that produced it.
///
/// Elapsed time is only meaningful against the same clock, which the tag
/// enforces.
#[derive(Debug, Clone, Copy)]
pub enum Timestamp {
    /// Reading from the raw monotonic hardware timer.
    Raw(Duration),
    /// Reading from the monotonic high-resolution clock.
    Monotonic(Instant),
    /// Reading from the wall clock.
    Wall(SystemTime),
}

impl Timestamp {
    /// Milliseconds elapsed since this reading, on the same clock.
    ///
    /// Never negative: clock anomalies saturate to zero rather than
    /// producing a nonsense elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        let elapsed = match self {
            Timestamp::Raw(start) => raw_now()
                .map(|now| now.saturating_sub(*start))
                .unwrap_or_default(),
            Timestamp::Monotonic(start) => start.elapsed(),
            Timestamp::Wall(start) => SystemTime::now()
                .duration_since(*start)
                .unwrap_or_default(),
        };
        elapsed.as_secs_f64() * 1000.0
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn raw_clock_available() -> bool {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_getres(libc::CLOCK_MONOTONIC_RAW, &mut ts) };
    rc == 0
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn raw_now() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts) };
    (rc == 0).then(|| Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn raw_clock_available() -> bool {
    false
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn raw_now() -> Option<Duration> {
    None
}
