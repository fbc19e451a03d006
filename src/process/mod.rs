use serde::Serialize;
use std::fmt;

mod usage;

pub use usage::{MemoryUsage, ProcessInfo};

/// OS-assigned identifier of the calling process, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Cumulative self-accounting of the calling process since it started.
///
/// A snapshot taken on one thread while others run; fields are not atomic
/// with respect to each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceUsage {
    /// User CPU time in seconds.
    pub user_time: f64,
    /// System CPU time in seconds.
    pub system_time: f64,
    /// Peak resident set size in kilobytes.
    pub max_rss_kb: u64,
    pub major_page_faults: u64,
    pub minor_page_faults: u64,
    pub voluntary_context_switches: u64,
    pub involuntary_context_switches: u64,
}

impl ResourceUsage {
    /// The rss/page-fault view registered as `memory_usage`.
    pub fn memory(&self) -> MemoryUsage {
        MemoryUsage {
            rss_kb: self.max_rss_kb,
            major_page_faults: self.major_page_faults,
            minor_page_faults: self.minor_page_faults,
        }
    }

    /// The CPU-time/context-switch view registered as `process_info`.
    pub fn process_info(&self) -> ProcessInfo {
        ProcessInfo {
            user_time: self.user_time,
            system_time: self.system_time,
            max_rss_kb: self.max_rss_kb,
            voluntary_context_switches: self.voluntary_context_switches,
            involuntary_context_switches: self.involuntary_context_switches,
        }
    }

    /// Total CPU time (user + system) in seconds.
    pub fn cpu_time(&self) -> f64 {
        self.user_time + self.system_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResourceUsage {
        ResourceUsage {
            user_time: 1.5,
            system_time: 0.25,
            max_rss_kb: 20_480,
            major_page_faults: 3,
            minor_page_faults: 1_200,
            voluntary_context_switches: 40,
            involuntary_context_switches: 7,
        }
    }

    #[test]
    fn memory_view_carries_rss_and_faults() {
        let mem = sample().memory();
        assert_eq!(mem.rss_kb, 20_480);
        assert_eq!(mem.major_page_faults, 3);
        assert_eq!(mem.minor_page_faults, 1_200);
    }

    #[test]
    fn process_info_view_carries_times_and_switches() {
        let info = sample().process_info();
        assert_eq!(info.user_time, 1.5);
        assert_eq!(info.system_time, 0.25);
        assert_eq!(info.max_rss_kb, 20_480);
        assert_eq!(info.voluntary_context_switches, 40);
        assert_eq!(info.involuntary_context_switches, 7);
        assert_eq!(sample().cpu_time(), 1.75);
    }
}
