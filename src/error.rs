//! Error types for interpose

use thiserror::Error;

use crate::event::Boundary;

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Misuse of a proxy, its contract description, or an invocation event.
///
/// Failures raised by the wrapped target never appear here; they keep
/// the contract's own error type all the way back to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The wrapper dispatched an operation the contract does not declare
    #[error("operation `{operation}` is not declared by contract `{contract}`")]
    UnknownOperation {
        contract: &'static str,
        operation: String,
    },
    /// Two operations of one contract share a name
    #[error("contract `{contract}` declares operation `{operation}` more than once")]
    DuplicateOperation {
        contract: &'static str,
        operation: &'static str,
    },
    /// An interceptor tried to store a result of the wrong type
    #[error("operation `{operation}` returns `{expected}`, cannot store a `{found}`")]
    ResultTypeMismatch {
        operation: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// An interceptor tried to store a result where no result exists
    #[error("operation `{operation}` has no result to replace at the {boundary} boundary")]
    ResultUnavailable {
        operation: &'static str,
        boundary: Boundary,
    },
    /// Proxy configuration could not be parsed
    #[error("invalid proxy configuration: {0}")]
    Config(String),
}
