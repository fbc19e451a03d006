//! OS backends.
//!
//! Each backend translates one kernel/libc call per method. Methods a family
//! has no facility for keep the default body and stay out of the backend's
//! [`Capabilities`].

use std::fmt::Debug;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::process::{ProcessId, ResourceUsage};
use crate::query::capability::{Capabilities, Operation};
use crate::system::{ClockReading, SleepRequest, SystemMemory};

#[cfg(unix)]
mod posix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use posix::PosixPlatform;
#[cfg(windows)]
pub use windows::WindowsPlatform;

/// The backend selected for the build target.
#[cfg(unix)]
pub type NativePlatform = PosixPlatform;
#[cfg(windows)]
pub type NativePlatform = WindowsPlatform;

pub trait Platform: Debug + Send + Sync + 'static {
    /// Operations this backend implements. Fixed for the life of the backend.
    fn capabilities(&self) -> Capabilities;

    /// Wall clock as Unix seconds. A clock set before 1970 is
    /// `Error::ClockBeforeEpoch` on every backend.
    fn wall_clock(&self) -> Result<ClockReading>;

    /// Suspends the calling thread and returns the duration actually requested
    /// from the OS, which may be coarser than `request`.
    fn sleep(&self, request: SleepRequest) -> Duration;

    fn resource_usage(&self) -> Result<ResourceUsage> {
        Err(Error::Unsupported(Operation::MemoryUsage))
    }

    fn system_memory(&self) -> Result<SystemMemory> {
        Err(Error::Unsupported(Operation::SystemMemory))
    }

    fn process_id(&self) -> Result<ProcessId> {
        Err(Error::Unsupported(Operation::GetPid))
    }

    fn priority(&self) -> Result<i32> {
        Err(Error::Unsupported(Operation::SetPriority))
    }

    fn set_priority(&self, _priority: i32) -> Result<()> {
        Err(Error::Unsupported(Operation::SetPriority))
    }
}
