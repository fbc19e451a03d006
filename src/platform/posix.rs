use std::time::Duration;

use libc::{PRIO_PROCESS, c_long, getpriority, setpriority};
use nix::errno::Errno;
use nix::sys::resource::{self, UsageWho};
use nix::sys::time::TimeVal;
use nix::time::{ClockId, clock_gettime};
use nix::unistd;

use super::Platform;
use crate::error::{Error, Result};
use crate::process::{ProcessId, ResourceUsage};
use crate::query::capability::{Capabilities, Operation};
use crate::system::{ClockReading, SleepRequest};

/// Backend for Linux, the BSDs and macOS.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixPlatform;

impl PosixPlatform {
    pub const fn new() -> Self {
        PosixPlatform
    }
}

// A negative counter never comes out of a healthy kernel; clamp rather than wrap.
fn counter(value: c_long) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn seconds(tv: TimeVal) -> f64 {
    tv.tv_sec() as f64 + tv.tv_usec() as f64 / 1e6
}

// ru_maxrss is kilobytes on Linux and the BSDs, bytes on macOS.
#[cfg(target_os = "macos")]
fn max_rss_kb(raw: c_long) -> u64 {
    counter(raw) / 1024
}

#[cfg(not(target_os = "macos"))]
fn max_rss_kb(raw: c_long) -> u64 {
    counter(raw)
}

impl Platform for PosixPlatform {
    fn capabilities(&self) -> Capabilities {
        if cfg!(any(target_os = "linux", target_os = "android")) {
            Capabilities::all()
        } else {
            Capabilities::all().without(Operation::SystemMemory)
        }
    }

    fn wall_clock(&self) -> Result<ClockReading> {
        let now = clock_gettime(ClockId::CLOCK_REALTIME)
            .map_err(|e| Error::os("clock_gettime", e))?;
        ClockReading::from_unix_parts(now.tv_sec() as i64, now.tv_nsec() as i64)
    }

    fn sleep(&self, request: SleepRequest) -> Duration {
        let duration = request.duration();
        std::thread::sleep(duration);
        duration
    }

    fn resource_usage(&self) -> Result<ResourceUsage> {
        let usage =
            resource::getrusage(UsageWho::RUSAGE_SELF).map_err(|e| Error::os("getrusage", e))?;

        Ok(ResourceUsage {
            user_time: seconds(usage.user_time()),
            system_time: seconds(usage.system_time()),
            max_rss_kb: max_rss_kb(usage.max_rss()),
            major_page_faults: counter(usage.major_page_faults()),
            minor_page_faults: counter(usage.minor_page_faults()),
            voluntary_context_switches: counter(usage.voluntary_context_switches()),
            involuntary_context_switches: counter(usage.involuntary_context_switches()),
        })
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn system_memory(&self) -> Result<crate::system::SystemMemory> {
        // SysInfo scales every total by mem_unit already.
        let info = nix::sys::sysinfo::sysinfo().map_err(|e| Error::os("sysinfo", e))?;
        Ok(crate::system::SystemMemory::from_totals(
            info.ram_total(),
            info.ram_unused(),
            info.swap_total(),
            info.swap_free(),
        ))
    }

    fn process_id(&self) -> Result<ProcessId> {
        let pid = unistd::getpid().as_raw();
        u32::try_from(pid)
            .map(ProcessId)
            .map_err(|_| Error::os("getpid", format!("negative pid {}", pid)))
    }

    fn priority(&self) -> Result<i32> {
        // -1 is a legal nice value, so only errno tells failure apart.
        let value = unsafe {
            Errno::clear();
            getpriority(PRIO_PROCESS, 0)
        };
        match Errno::last() {
            Errno::UnknownErrno => Ok(value),
            errno if value == -1 => Err(Error::os("getpriority", errno)),
            _ => Ok(value),
        }
    }

    // Linux applies PRIO_PROCESS/0 to the calling thread only.
    fn set_priority(&self, priority: i32) -> Result<()> {
        let res = unsafe { setpriority(PRIO_PROCESS, 0, priority) };

        if res == 0 {
            Ok(())
        } else {
            Err(Error::os("setpriority", Errno::last()))
        }
    }
}
