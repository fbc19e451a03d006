use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Every operation the module can register, by its host-visible name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Clock,
    Usleep,
    MemoryUsage,
    SystemMemory,
    GcCollect,
    ProcessInfo,
    GetPid,
    SetPriority,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Clock,
        Operation::Usleep,
        Operation::MemoryUsage,
        Operation::SystemMemory,
        Operation::GcCollect,
        Operation::ProcessInfo,
        Operation::GetPid,
        Operation::SetPriority,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Clock => "clock",
            Operation::Usleep => "usleep",
            Operation::MemoryUsage => "memory_usage",
            Operation::SystemMemory => "system_memory",
            Operation::GcCollect => "gc_collect",
            Operation::ProcessInfo => "process_info",
            Operation::GetPid => "get_pid",
            Operation::SetPriority => "set_priority",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

/// Static set of operations a backend provides.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    bits: u16,
}

impl Capabilities {
    pub const EMPTY: Self = Self { bits: 0 };

    /// Clock and sleep, the part every platform family provides.
    pub const TIME: Self = Self::EMPTY.with(Operation::Clock).with(Operation::Usleep);

    pub const fn all() -> Self {
        let mut caps = Self::EMPTY;
        let mut i = 0;
        while i < Operation::ALL.len() {
            caps = caps.with(Operation::ALL[i]);
            i += 1;
        }
        caps
    }

    #[must_use]
    pub const fn with(self, op: Operation) -> Self {
        Self {
            bits: self.bits | op.bit(),
        }
    }

    #[must_use]
    pub const fn without(self, op: Operation) -> Self {
        Self {
            bits: self.bits & !op.bit(),
        }
    }

    pub const fn contains(self, op: Operation) -> bool {
        self.bits & op.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }

    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Operation::name)).finish()
    }
}
