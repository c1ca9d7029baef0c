//! Operation identity and signatures
//!
//! This module defines:
//! - OperationKey: cache key identifying one declared operation
//! - ParamSpec / ReturnShape: the typed shape of an operation
//! - OperationSignature: name + parameters + return shape
//! - Access: declared visibility of a default body

use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Unique identifier of a declared operation within an interface.
///
/// Identity is `(interface, name, parameter types)`, so overloads that differ
/// only in parameter types are distinct keys. Cloning is cheap: the
/// components are reference-counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    interface: Arc<str>,
    name: Arc<str>,
    params: Arc<[ValueType]>,
}

impl OperationKey {
    /// Create a key for `interface.name(params...)`.
    pub fn new(
        interface: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        params: impl Into<Arc<[ValueType]>>,
    ) -> Self {
        Self {
            interface: interface.into(),
            name: name.into(),
            params: params.into(),
        }
    }

    /// Interface the operation is declared on
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, in order
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Statement id conventionally associated with this operation:
    /// `"<Interface>.<name>"`.
    pub fn statement_id(&self) -> String {
        format!("{}.{}", self.interface, self.name)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.interface, self.name)?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ty)?;
        }
        f.write_str(")")
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Declared name, if the interface gives one
    pub name: Option<String>,
    /// Declared type
    pub ty: ValueType,
}

impl ParamSpec {
    /// A named parameter
    pub fn named(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    /// A positional parameter with no declared name
    pub fn positional(ty: ValueType) -> Self {
        Self { name: None, ty }
    }
}

/// How an operation's result is shaped before it reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// No result; the caller receives `Value::Null`
    Unit,
    /// Exactly one value
    One,
    /// Zero or one value; `Null` when absent
    Optional,
    /// A list of values
    Many,
    /// Number of rows a write touched
    RowCount,
    /// Whether a write touched any rows
    Affected,
}

impl ReturnShape {
    /// True for shapes that accept a single row
    pub fn is_single(self) -> bool {
        matches!(self, ReturnShape::One | ReturnShape::Optional)
    }
}

/// Declared visibility of a default body.
///
/// The default lookup opens every level. A restricted lookup may refuse
/// some levels, which fails only the operations declared with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible within the declaring package
    Package,
    /// Visible only to the declaring interface
    Private,
}

/// Full signature of one declared operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    key: OperationKey,
    params: Vec<ParamSpec>,
    returns: ReturnShape,
}

impl OperationSignature {
    /// Build a signature; the key is derived from the parameter types.
    pub fn new(
        interface: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        params: Vec<ParamSpec>,
        returns: ReturnShape,
    ) -> Self {
        let types: Vec<ValueType> = params.iter().map(|p| p.ty).collect();
        Self {
            key: OperationKey::new(interface, name, types),
            params,
            returns,
        }
    }

    /// Cache key for this operation
    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    /// Operation name
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Declared parameters
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Declared number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared result shape
    pub fn returns(&self) -> ReturnShape {
        self.returns
    }
}
