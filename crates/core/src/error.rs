//! Error types for interface binding and dispatch.
//!
//! All errors surfaced by a bound instance are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Comparable**: `Clone + PartialEq`, so a caller can match the exact
//!   failure an executor produced
//! - **Pass-through**: failures raised by executors and default bodies reach
//!   the caller as the same value, never re-wrapped by the dispatch layer

use serde::{Deserialize, Serialize};

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Binding and dispatch errors.
///
/// # Categories
///
/// | Category | Variants | Raised |
/// |----------|----------|--------|
/// | Structural | `InvalidInterface`, `UnsupportedPlatform` | Factory construction, first default-body use |
/// | Call shape | `UnknownOperation`, `AmbiguousOperation`, `ArityMismatch`, `ArgumentType` | Before routing |
/// | Resolution | `StatementNotFound`, `Config` | Executor creation, config loading |
/// | Result shape | `TooManyResults`, `NullResult` | After the session returns |
/// | Delegated | `Session`, `Operation` | Produced by collaborators, passed through |
/// | System | `Internal` | Invariant violation |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Structural ====================
    /// The descriptor cannot support dispatch
    #[error("invalid interface {interface}: {reason}")]
    InvalidInterface { interface: String, reason: String },

    /// The runtime cannot invoke a default body for this operation
    #[error("unsupported platform for {operation}: {reason}")]
    UnsupportedPlatform { operation: String, reason: String },

    // ==================== Call Shape ====================
    /// No operation with this key or name is declared
    #[error("unknown operation {operation} on interface {interface}")]
    UnknownOperation { interface: String, operation: String },

    /// Several overloads share this name; call by key instead
    #[error("ambiguous operation {operation} on interface {interface}: {candidates} overloads")]
    AmbiguousOperation {
        interface: String,
        operation: String,
        candidates: usize,
    },

    /// Wrong number of arguments
    #[error("{operation} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    /// Argument does not conform to the declared parameter type
    #[error("{operation}: parameter {param} expects {expected}, got {actual}")]
    ArgumentType {
        operation: String,
        param: String,
        expected: String,
        actual: String,
    },

    // ==================== Resolution ====================
    /// The configuration declares no statement for this operation
    #[error("statement not found: {statement}")]
    StatementNotFound { statement: String },

    /// Configuration could not be read or parsed
    #[error("config error: {reason}")]
    Config { reason: String },

    // ==================== Result Shape ====================
    /// A single-result operation received several rows
    #[error("{operation} expected at most one result, got {count}")]
    TooManyResults { operation: String, count: usize },

    /// A non-nullable single-result operation received nothing
    #[error("{operation} returned null but its result is not nullable")]
    NullResult { operation: String },

    // ==================== Delegated ====================
    /// Failure reported by the session collaborator
    #[error("session error: {reason}")]
    Session { reason: String },

    /// Business-level failure raised by an operation body or executor
    #[error("{operation} failed: {reason}")]
    Operation { operation: String, reason: String },

    // ==================== System ====================
    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Shorthand for a business-level operation failure.
    pub fn operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Operation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a session failure.
    pub fn session(reason: impl Into<String>) -> Self {
        Error::Session {
            reason: reason.into(),
        }
    }

    /// Shorthand for an internal error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Error::Internal {
            reason: reason.into(),
        }
    }

    /// True for failures that are fixed properties of the interface or
    /// platform, as opposed to per-call conditions.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::InvalidInterface { .. } | Error::UnsupportedPlatform { .. }
        )
    }
}
