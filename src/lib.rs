//! Host operating-system queries for an embedding scripting runtime.
//!
//! [`SystemQuery`] wraps one [`Platform`] backend chosen at build time
//! ([`NativePlatform`]): the POSIX family provides all eight operations, the
//! Windows family only the clock and sleep. [`Registry`] exposes the same
//! operations under their host-visible names with loosely typed arguments.

pub mod args;
pub mod config;
pub mod error;
pub mod platform;
pub mod process;
pub mod query;
pub mod runtime;
pub mod system;

pub use args::ArgumentCoercion;
pub use config::{ArgumentPolicy, Config};
pub use error::{Error, Result};
pub use platform::{NativePlatform, Platform};
pub use process::{MemoryUsage, ProcessId, ProcessInfo, ResourceUsage};
pub use query::SystemQuery;
pub use query::capability::{Capabilities, Operation};
pub use query::registry::Registry;
pub use runtime::{AllocatorHeap, CountingAllocator, GcReport, HostCollector};
pub use system::{ClockReading, SleepRequest, SystemMemory};
