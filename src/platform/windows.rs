use std::time::Duration;

use tracing::debug;

use super::Platform;
use crate::error::Result;
use crate::query::capability::Capabilities;
use crate::system::{ClockReading, SleepRequest};

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
type DWORD = u32;

#[repr(C)]
#[derive(Default)]
#[allow(non_snake_case, clippy::upper_case_acronyms)]
struct FILETIME {
    dwLowDateTime: DWORD,
    dwHighDateTime: DWORD,
}

#[allow(non_snake_case)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn GetSystemTimeAsFileTime(lpSystemTimeAsFileTime: *mut FILETIME);
    fn Sleep(dwMilliseconds: DWORD);
}

/// Backend for the Windows family: clock and sleep only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub const fn new() -> Self {
        WindowsPlatform
    }
}

impl Platform for WindowsPlatform {
    fn capabilities(&self) -> Capabilities {
        Capabilities::TIME
    }

    fn wall_clock(&self) -> Result<ClockReading> {
        let mut file_time = FILETIME::default();
        // GetSystemTimeAsFileTime has no failure path; the only bad reading
        // is one before 1970, which from_file_time rejects.
        unsafe { GetSystemTimeAsFileTime(&mut file_time) };
        let ticks =
            (u64::from(file_time.dwHighDateTime) << 32) | u64::from(file_time.dwLowDateTime);
        ClockReading::from_file_time(ticks)
    }

    fn sleep(&self, request: SleepRequest) -> Duration {
        let (millis, rounded) = request.millis_rounded_up();
        if rounded {
            debug!(
                requested_us = request.micros(),
                slept_ms = millis,
                "Sleep has millisecond granularity; rounded up"
            );
        }
        for chunk in request.millis_chunks() {
            unsafe { Sleep(chunk) };
        }
        Duration::from_millis(millis)
    }
}
