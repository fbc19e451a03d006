//! Error types shared by every query.

use crate::query::capability::Operation;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The kernel or libc call behind an operation failed
    #[error("{call} failed: {reason}")]
    Os { call: &'static str, reason: String },

    /// The operation exists but this platform family does not provide it
    #[error("operation `{0}` is not supported on this platform")]
    Unsupported(Operation),

    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// Rejected argument under the strict coercion policy
    #[error("invalid argument for `{operation}`: {reason}")]
    InvalidArgument { operation: Operation, reason: String },

    /// The wall clock reads earlier than 1970-01-01
    #[error("system clock reads before the Unix epoch")]
    ClockBeforeEpoch,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn os(call: &'static str, reason: impl ToString) -> Self {
        Error::Os {
            call,
            reason: reason.to_string(),
        }
    }
}
