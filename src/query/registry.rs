//! The flat namespace a host runtime registers: operation name → call.
//!
//! Arguments and results are host values (`serde_json::Value`): records come
//! back as objects, absent data as `null`.

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use super::SystemQuery;
use super::capability::{Capabilities, Operation};
use crate::args::ArgumentCoercion;
use crate::error::{Error, Result};
use crate::platform::{NativePlatform, Platform};
use crate::runtime::{AllocatorHeap, HostCollector};

pub struct Registry<P: Platform = NativePlatform, C: HostCollector = AllocatorHeap> {
    query: SystemQuery<P>,
    collector: C,
    coercion: ArgumentCoercion,
}

impl Registry {
    /// Native backend, default coercion and the allocator-backed heap.
    ///
    /// `gc_collect` then reports 0 KB unless the embedder installs
    /// [`CountingAllocator`](crate::runtime::CountingAllocator) as its global
    /// allocator; [`AllocatorHeap`] has nothing to sweep. Hosts with a real
    /// collector should pass it to [`Registry::new`] instead.
    pub fn native() -> Self {
        Registry::new(SystemQuery::native(), AllocatorHeap, ArgumentCoercion::default())
    }
}

fn record<T: Serialize>(snapshot: Option<T>) -> Result<Value> {
    match snapshot {
        Some(value) => Ok(serde_json::to_value(value)?),
        None => Ok(Value::Null),
    }
}

impl<P: Platform, C: HostCollector> Registry<P, C> {
    pub fn new(query: SystemQuery<P>, collector: C, coercion: ArgumentCoercion) -> Self {
        Registry {
            query,
            collector,
            coercion,
        }
    }

    pub fn query(&self) -> &SystemQuery<P> {
        &self.query
    }

    pub fn capabilities(&self) -> Capabilities {
        self.query.capabilities()
    }

    /// Names this registry will accept, in registration order.
    pub fn supported(&self) -> Vec<&'static str> {
        self.capabilities().iter().map(Operation::name).collect()
    }

    /// `false` for unknown names as well as unsupported ones.
    pub fn is_supported(&self, name: &str) -> bool {
        name.parse::<Operation>()
            .map(|op| self.query.supports(op))
            .unwrap_or(false)
    }

    /// Runs operation `name` with positional `args`. Extra arguments are ignored.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let op: Operation = name.parse()?;
        if !self.query.supports(op) {
            return Err(Error::Unsupported(op));
        }
        trace!(%op, argc = args.len(), "Dispatching");

        match op {
            Operation::Clock => Ok(serde_json::to_value(self.query.high_resolution_clock()?)?),
            Operation::Usleep => {
                let request = self.coercion.sleep_request(args.first())?;
                self.query.sleep_microseconds(request);
                Ok(Value::Null)
            }
            Operation::MemoryUsage => record(self.query.memory_usage()),
            Operation::SystemMemory => record(self.query.system_memory_stats()),
            Operation::GcCollect => {
                let report = self.query.force_garbage_collect(&mut self.collector)?;
                Ok(serde_json::to_value(report)?)
            }
            Operation::ProcessInfo => record(self.query.process_info()),
            Operation::GetPid => Ok(serde_json::to_value(self.query.get_process_id()?)?),
            Operation::SetPriority => {
                let priority = self.coercion.priority(args.first())?;
                Ok(Value::Bool(self.query.set_process_priority(priority)))
            }
        }
    }
}
