use serde::Serialize;

/// Memory-oriented subset of [`ResourceUsage`](super::ResourceUsage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    /// Peak resident set size in kilobytes (`ru_maxrss`).
    pub rss_kb: u64,
    pub major_page_faults: u64,
    pub minor_page_faults: u64,
}

/// Process statistics with the CPU time split into user and system parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub user_time: f64,
    pub system_time: f64,
    pub max_rss_kb: u64,
    pub voluntary_context_switches: u64,
    pub involuntary_context_switches: u64,
}
