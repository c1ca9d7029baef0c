//! The session contract
//!
//! A [`Session`] is the external collaborator that owns the connection to a
//! backing store. The dispatch layer only ever hands it to executors; it never
//! calls [`Session::execute`] itself.

use crate::config::{Configuration, StatementKind};
use crate::error::Result;
use crate::value::Value;
use std::fmt;

/// A resolved statement ready to be run by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementCommand {
    /// Statement id, `"<Interface>.<operation>"`
    pub id: String,
    /// Statement kind
    pub kind: StatementKind,
}

impl fmt::Display for StatementCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.kind, self.id)
    }
}

/// Handle to the data-access collaborator.
///
/// Implementations decide their own thread-safety story; the `Send + Sync`
/// bound only allows bound instances to be moved between threads.
///
/// # Result conventions
///
/// - `Select` returns a `Value::Array` of rows (a bare value is treated as a
///   single row)
/// - `Insert`/`Update`/`Delete` return `Value::Int` row counts
/// - `Flush` returns whatever the session reports
pub trait Session: Send + Sync {
    /// Static metadata executors are built from.
    fn configuration(&self) -> &Configuration;

    /// Run a statement with its parameter object.
    fn execute(&self, command: &StatementCommand, parameter: Value) -> Result<Value>;
}
