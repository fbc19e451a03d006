//! Whole-machine readings: wall clock, sleep requests and memory totals.

use crate::error::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// File-time ticks (100 ns) between 1601-01-01 and 1970-01-01.
pub const FILE_TIME_UNIX_EPOCH: u64 = 116_444_736_000_000_000;
/// File-time ticks per second.
pub const FILE_TIME_TICKS_PER_SECOND: f64 = 10_000_000.0;

/// Seconds since the Unix epoch as a double.
///
/// Follows the wall clock, so it is non-decreasing only while nobody adjusts
/// the system time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ClockReading(f64);

impl ClockReading {
    /// Combines whole seconds with a sub-second part given in microseconds.
    pub fn from_micros_parts(seconds: i64, micros: i64) -> Self {
        ClockReading(seconds as f64 + micros as f64 / 1e6)
    }

    /// Seconds and nanoseconds since the Unix epoch, as `clock_gettime` gives them.
    pub fn from_unix_parts(seconds: i64, nanos: i64) -> Result<Self> {
        if seconds < 0 {
            return Err(Error::ClockBeforeEpoch);
        }
        Ok(ClockReading(seconds as f64 + nanos as f64 / 1e9))
    }

    /// Converts Windows file-time ticks into Unix seconds.
    pub fn from_file_time(ticks: u64) -> Result<Self> {
        let since_unix = ticks
            .checked_sub(FILE_TIME_UNIX_EPOCH)
            .ok_or(Error::ClockBeforeEpoch)?;
        Ok(ClockReading(since_unix as f64 / FILE_TIME_TICKS_PER_SECOND))
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Elapsed time from `earlier` to `self`, zero if the clock went backwards.
    pub fn since(self, earlier: ClockReading) -> Duration {
        Duration::from_secs_f64((self.0 - earlier.0).max(0.0))
    }
}

/// Longest single Win32 `Sleep`; `u32::MAX` means INFINITE there.
pub const MAX_SLEEP_CHUNK_MILLIS: u32 = u32::MAX - 1;

/// A sleep duration after argument coercion, always at least 1 µs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    micros: u64,
}

impl SleepRequest {
    pub const MIN_MICROS: u64 = 1;

    /// Builds a request, raising anything below one microsecond to one.
    pub fn from_micros(micros: i64) -> Self {
        SleepRequest {
            micros: u64::try_from(micros).unwrap_or(0).max(Self::MIN_MICROS),
        }
    }

    pub fn micros(self) -> u64 {
        self.micros
    }

    pub fn duration(self) -> Duration {
        Duration::from_micros(self.micros)
    }

    /// Whole milliseconds for primitives with millisecond granularity.
    ///
    /// Rounds up so the thread never sleeps less than requested; the flag is
    /// true when the request was not already a whole number of milliseconds.
    pub fn millis_rounded_up(self) -> (u64, bool) {
        let millis = self.micros.div_ceil(1000);
        let rounded = self.micros % 1000 != 0;
        (millis, rounded)
    }

    /// The rounded-up milliseconds split into pieces no longer than
    /// [`MAX_SLEEP_CHUNK_MILLIS`].
    pub fn millis_chunks(self) -> impl Iterator<Item = u32> {
        let mut remaining = self.millis_rounded_up().0;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let chunk = remaining.min(u64::from(MAX_SLEEP_CHUNK_MILLIS));
            remaining -= chunk;
            u32::try_from(chunk).ok()
        })
    }
}

/// Machine-wide RAM and swap accounting in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemMemory {
    pub total_ram: u64,
    pub free_ram: u64,
    pub used_ram: u64,
    pub total_swap: u64,
    pub free_swap: u64,
}

impl SystemMemory {
    /// Builds a snapshot from byte totals; `used_ram` is derived as total − free.
    pub fn from_totals(total_ram: u64, free_ram: u64, total_swap: u64, free_swap: u64) -> Self {
        SystemMemory {
            total_ram,
            free_ram,
            used_ram: total_ram.saturating_sub(free_ram),
            total_swap,
            free_swap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_time_at_unix_epoch_is_zero() {
        let reading = ClockReading::from_file_time(FILE_TIME_UNIX_EPOCH).unwrap();
        assert_eq!(reading.seconds(), 0.0);
    }

    #[test]
    fn file_time_converts_ticks_to_seconds() {
        // 2024-01-01T00:00:00Z plus half a second
        let ticks = FILE_TIME_UNIX_EPOCH + 1_704_067_200 * 10_000_000 + 5_000_000;
        let reading = ClockReading::from_file_time(ticks).unwrap();
        assert!((reading.seconds() - 1_704_067_200.5).abs() < 1e-6);
    }

    #[test]
    fn file_time_before_epoch_is_rejected() {
        assert!(matches!(
            ClockReading::from_file_time(FILE_TIME_UNIX_EPOCH - 1),
            Err(Error::ClockBeforeEpoch)
        ));
    }

    #[test]
    fn micros_parts_combine() {
        let reading = ClockReading::from_micros_parts(10, 250_000);
        assert_eq!(reading.seconds(), 10.25);
    }

    #[test]
    fn since_never_goes_negative() {
        let later = ClockReading::from_micros_parts(5, 0);
        let earlier = ClockReading::from_micros_parts(6, 0);
        assert_eq!(later.since(earlier), Duration::ZERO);
    }

    #[test]
    fn sleep_request_floors_at_one_microsecond() {
        assert_eq!(SleepRequest::from_micros(0).micros(), 1);
        assert_eq!(SleepRequest::from_micros(-40).micros(), 1);
        assert_eq!(SleepRequest::from_micros(1500).micros(), 1500);
    }

    #[test]
    fn millisecond_rounding_is_upward_and_flagged() {
        assert_eq!(SleepRequest::from_micros(1).millis_rounded_up(), (1, true));
        assert_eq!(SleepRequest::from_micros(999).millis_rounded_up(), (1, true));
        assert_eq!(SleepRequest::from_micros(2000).millis_rounded_up(), (2, false));
        assert_eq!(SleepRequest::from_micros(2001).millis_rounded_up(), (3, true));
    }

    #[test]
    fn long_sleeps_never_ask_for_an_infinite_wait() {
        let huge = SleepRequest::from_micros(i64::MAX);
        assert!(huge.millis_chunks().take(1_000).all(|ms| ms != u32::MAX));
        assert_eq!(huge.millis_chunks().next(), Some(MAX_SLEEP_CHUNK_MILLIS));
    }

    #[test]
    fn chunks_add_up_to_the_rounded_request() {
        let just_over = SleepRequest::from_micros(i64::from(u32::MAX) * 1000);
        let chunks: Vec<u32> = just_over.millis_chunks().collect();
        assert_eq!(chunks, vec![MAX_SLEEP_CHUNK_MILLIS, 1]);

        let short: Vec<u32> = SleepRequest::from_micros(1500).millis_chunks().collect();
        assert_eq!(short, vec![2]);
    }

    #[test]
    fn unix_parts_before_epoch_are_rejected() {
        assert!(matches!(
            ClockReading::from_unix_parts(-1, 999_999_999),
            Err(Error::ClockBeforeEpoch)
        ));
        let reading = ClockReading::from_unix_parts(3, 500_000_000).unwrap();
        assert_eq!(reading.seconds(), 3.5);
    }

    #[test]
    fn used_ram_is_total_minus_free() {
        let mem = SystemMemory::from_totals(8_000, 3_000, 2_000, 2_000);
        assert_eq!(mem.used_ram, 5_000);
        assert_eq!(mem.used_ram + mem.free_ram, mem.total_ram);
    }
}
