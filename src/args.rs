//! Default substitution for host arguments.
//!
//! Host values arrive loosely typed. The rules here decide what counts as a
//! number and what stands in when an argument is missing or unusable; the
//! operations themselves only ever see typed values.

use serde_json::Value;
use tracing::debug;

use crate::config::{ArgumentConfig, ArgumentPolicy};
use crate::error::{Error, Result};
use crate::query::capability::Operation;
use crate::system::SleepRequest;

/// Reads a host value as a number.
///
/// Numbers and strings holding a finite decimal number qualify, mirroring
/// hosts that coerce numeric strings implicitly.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentCoercion {
    policy: ArgumentPolicy,
    default_sleep_micros: i64,
    default_priority: i32,
}

impl Default for ArgumentCoercion {
    fn default() -> Self {
        ArgumentCoercion::new(&ArgumentConfig::default())
    }
}

impl ArgumentCoercion {
    pub fn new(config: &ArgumentConfig) -> Self {
        ArgumentCoercion {
            policy: config.policy,
            default_sleep_micros: config.default_sleep_micros,
            default_priority: config.default_priority,
        }
    }

    pub fn policy(&self) -> ArgumentPolicy {
        self.policy
    }

    // None: use the default. Fractions truncate toward zero; `as` saturates.
    fn integer(&self, operation: Operation, arg: Option<&Value>) -> Result<Option<i64>> {
        let value = match arg {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };
        match as_number(value) {
            Some(n) => Ok(Some(n.trunc() as i64)),
            None if self.policy == ArgumentPolicy::Strict => Err(Error::InvalidArgument {
                operation,
                reason: format!("expected a number, got {}", value),
            }),
            None => {
                debug!(%operation, %value, "Non-numeric argument replaced by default");
                Ok(None)
            }
        }
    }

    /// Duration for `usleep`, in microseconds. Anything below 1 becomes 1.
    pub fn sleep_request(&self, arg: Option<&Value>) -> Result<SleepRequest> {
        let micros = self
            .integer(Operation::Usleep, arg)?
            .unwrap_or(self.default_sleep_micros);
        Ok(SleepRequest::from_micros(micros))
    }

    /// Priority for `set_priority`, clamped into the `i32` range.
    pub fn priority(&self, arg: Option<&Value>) -> Result<i32> {
        Ok(self
            .integer(Operation::SetPriority, arg)?
            .map(|n| n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            .unwrap_or(self.default_priority))
    }
}
