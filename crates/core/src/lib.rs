//! Core types for Tether
//!
//! This crate defines the foundational types shared by the binding layer and
//! by session implementations:
//! - Value / ValueType: dynamic arguments and results
//! - OperationKey / OperationSignature: identity and shape of an operation
//! - Configuration: settings plus the statement registry (TOML loadable)
//! - Session: the data-access collaborator contract
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod value;

pub use config::{Configuration, Settings, StatementKind, StatementSpec};
pub use error::{Error, Result};
pub use session::{Session, StatementCommand};
pub use types::{Access, OperationKey, OperationSignature, ParamSpec, ReturnShape};
pub use value::{Value, ValueType};
