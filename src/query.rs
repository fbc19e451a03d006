use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::platform::{NativePlatform, Platform};
use crate::process::{MemoryUsage, ProcessId, ProcessInfo, ResourceUsage};
use crate::runtime::{GcReport, HostCollector};
use crate::system::{ClockReading, SleepRequest, SystemMemory};

pub mod capability;
pub mod registry;

use capability::{Capabilities, Operation};

/// Host OS queries over one platform backend.
///
/// Holds no state between calls; every record is a fresh snapshot owned by
/// the caller. Any number of threads may call into one instance.
#[derive(Debug, Clone, Default)]
pub struct SystemQuery<P: Platform = NativePlatform> {
    platform: P,
}

impl SystemQuery<NativePlatform> {
    pub fn native() -> Self {
        SystemQuery::new(NativePlatform::default())
    }
}

impl<P: Platform> SystemQuery<P> {
    pub fn new(platform: P) -> Self {
        SystemQuery { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn capabilities(&self) -> Capabilities {
        self.platform.capabilities()
    }

    pub fn supports(&self, op: Operation) -> bool {
        self.capabilities().contains(op)
    }

    fn require(&self, op: Operation) -> Result<()> {
        if self.supports(op) {
            Ok(())
        } else {
            Err(Error::Unsupported(op))
        }
    }

    // Unavailable data is a `None`, never an error; the cause goes to the log.
    fn snapshot<T>(&self, op: Operation, read: impl FnOnce(&P) -> Result<T>) -> Option<T> {
        if !self.supports(op) {
            debug!(%op, "Query not supported on this platform");
            return None;
        }
        match read(&self.platform) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(%op, error = %e, "Query returned no data");
                None
            }
        }
    }

    /// Wall-clock seconds since the Unix epoch.
    pub fn high_resolution_clock(&self) -> Result<ClockReading> {
        self.platform.wall_clock()
    }

    /// Blocks the calling thread only. Returns the duration handed to the OS,
    /// which is `request` rounded up to whole milliseconds on Windows.
    pub fn sleep_microseconds(&self, request: SleepRequest) -> Duration {
        self.platform.sleep(request)
    }

    /// Full self-accounting snapshot, `None` when the kernel query fails.
    pub fn process_resource_usage(&self) -> Option<ResourceUsage> {
        self.snapshot(Operation::MemoryUsage, P::resource_usage)
    }

    /// The `memory_usage` view: peak rss and page faults.
    pub fn memory_usage(&self) -> Option<MemoryUsage> {
        self.process_resource_usage().map(|usage| usage.memory())
    }

    pub fn system_memory_stats(&self) -> Option<SystemMemory> {
        self.snapshot(Operation::SystemMemory, P::system_memory)
    }

    /// Asks the host to collect, then reports its live heap in kilobytes.
    pub fn force_garbage_collect<C: HostCollector + ?Sized>(
        &self,
        collector: &mut C,
    ) -> Result<GcReport> {
        self.require(Operation::GcCollect)?;
        collector.collect_full();
        Ok(GcReport::from_bytes(collector.heap_bytes()))
    }

    pub fn process_info(&self) -> Option<ProcessInfo> {
        self.snapshot(Operation::ProcessInfo, P::resource_usage)
            .map(|usage| usage.process_info())
    }

    pub fn get_process_id(&self) -> Result<ProcessId> {
        self.require(Operation::GetPid)?;
        self.platform.process_id()
    }

    /// Current scheduling priority (nice value) of this process.
    pub fn process_priority(&self) -> Option<i32> {
        self.snapshot(Operation::SetPriority, P::priority)
    }

    /// `true` if the kernel applied the new priority. Refusals, typically a
    /// missing privilege to lower the nice value, come back as `false`.
    pub fn set_process_priority(&self, priority: i32) -> bool {
        if !self.supports(Operation::SetPriority) {
            debug!(priority, "Priority change not supported on this platform");
            return false;
        }
        match self.platform.set_priority(priority) {
            Ok(()) => true,
            Err(e) => {
                warn!(priority, error = %e, "Priority change refused");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted backend with every operation and call tracking.
    #[derive(Debug)]
    pub(crate) struct FakePlatform {
        pub caps: Capabilities,
        pub fail: bool,
        pub priority: Mutex<i32>,
        pub slept: Mutex<Vec<u64>>,
    }

    impl Default for FakePlatform {
        fn default() -> Self {
            FakePlatform {
                caps: Capabilities::all(),
                fail: false,
                priority: Mutex::new(0),
                slept: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakePlatform {
        pub fn failing() -> Self {
            FakePlatform {
                fail: true,
                ..FakePlatform::default()
            }
        }

        pub fn time_only() -> Self {
            FakePlatform {
                caps: Capabilities::TIME,
                ..FakePlatform::default()
            }
        }

        fn check(&self, call: &'static str) -> Result<()> {
            if self.fail {
                Err(Error::os(call, "EPERM"))
            } else {
                Ok(())
            }
        }
    }

    impl Platform for FakePlatform {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn wall_clock(&self) -> Result<ClockReading> {
            Ok(ClockReading::from_micros_parts(1_700_000_000, 500_000))
        }

        fn sleep(&self, request: SleepRequest) -> Duration {
            self.slept.lock().unwrap().push(request.micros());
            request.duration()
        }

        fn resource_usage(&self) -> Result<ResourceUsage> {
            self.check("getrusage")?;
            Ok(ResourceUsage {
                user_time: 0.5,
                system_time: 0.125,
                max_rss_kb: 8_192,
                major_page_faults: 1,
                minor_page_faults: 900,
                voluntary_context_switches: 12,
                involuntary_context_switches: 4,
            })
        }

        fn system_memory(&self) -> Result<SystemMemory> {
            self.check("sysinfo")?;
            Ok(SystemMemory::from_totals(16 << 30, 6 << 30, 2 << 30, 1 << 30))
        }

        fn process_id(&self) -> Result<ProcessId> {
            Ok(ProcessId(4242))
        }

        fn priority(&self) -> Result<i32> {
            self.check("getpriority")?;
            Ok(*self.priority.lock().unwrap())
        }

        fn set_priority(&self, priority: i32) -> Result<()> {
            self.check("setpriority")?;
            *self.priority.lock().unwrap() = priority;
            Ok(())
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeHeap {
        pub live: usize,
        pub garbage: usize,
        pub collections: u32,
    }

    impl HostCollector for FakeHeap {
        fn collect_full(&mut self) {
            self.garbage = 0;
            self.collections += 1;
        }

        fn heap_bytes(&self) -> usize {
            self.live + self.garbage
        }
    }

    #[test]
    fn snapshots_present_when_backend_succeeds() {
        let query = SystemQuery::new(FakePlatform::default());
        let usage = query.process_resource_usage().unwrap();
        assert_eq!(usage.max_rss_kb, 8_192);
        assert_eq!(query.memory_usage().unwrap().minor_page_faults, 900);
        assert_eq!(query.process_info().unwrap().voluntary_context_switches, 12);
        let mem = query.system_memory_stats().unwrap();
        assert_eq!(mem.used_ram, 10 << 30);
    }

    #[test]
    fn failed_queries_are_unavailable_not_errors() {
        let query = SystemQuery::new(FakePlatform::failing());
        assert!(query.process_resource_usage().is_none());
        assert!(query.memory_usage().is_none());
        assert!(query.process_info().is_none());
        assert!(query.system_memory_stats().is_none());
        assert!(query.process_priority().is_none());
        assert!(!query.set_process_priority(5));
    }

    #[test]
    fn time_only_backend_refuses_process_queries() {
        let query = SystemQuery::new(FakePlatform::time_only());
        assert!(query.supports(Operation::Clock));
        assert!(!query.supports(Operation::GetPid));
        assert!(query.process_resource_usage().is_none());
        assert!(matches!(
            query.get_process_id(),
            Err(Error::Unsupported(Operation::GetPid))
        ));
        assert!(matches!(
            query.force_garbage_collect(&mut FakeHeap::default()),
            Err(Error::Unsupported(Operation::GcCollect))
        ));
        assert!(!query.set_process_priority(1));
        assert!(query.high_resolution_clock().is_ok());
    }

    #[test]
    fn gc_collects_before_measuring() {
        let query = SystemQuery::new(FakePlatform::default());
        let mut heap = FakeHeap {
            live: 4096,
            garbage: 8192,
            collections: 0,
        };
        let report = query.force_garbage_collect(&mut heap).unwrap();
        assert_eq!(heap.collections, 1);
        assert_eq!(report.kilobytes(), 4.0);
    }

    #[test]
    fn priority_change_is_visible_to_priority_query() {
        let query = SystemQuery::new(FakePlatform::default());
        assert!(query.set_process_priority(7));
        assert_eq!(query.process_priority(), Some(7));
    }
}
