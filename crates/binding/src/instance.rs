//! Bound instances
//!
//! A [`BoundInstance`] is what a caller holds after binding an interface to a
//! session. It is a cheap, cloneable handle to one [`InterceptingHandler`];
//! clones share the handler and therefore compare equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tether_core::{OperationKey, Result, Value};

use crate::descriptor::InterfaceDescriptor;
use crate::handler::{InterceptingHandler, UniversalOp};

/// Implementation of an interface whose every call is routed through an
/// [`InterceptingHandler`].
#[derive(Clone)]
pub struct BoundInstance {
    handler: Arc<InterceptingHandler>,
}

impl BoundInstance {
    pub(crate) fn new(handler: InterceptingHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Interface this instance implements
    pub fn descriptor(&self) -> &InterfaceDescriptor {
        self.handler.descriptor()
    }

    /// Handler every call is routed through
    pub fn handler(&self) -> &InterceptingHandler {
        &self.handler
    }

    /// Identity of the handler behind this instance
    pub fn handler_id(&self) -> u64 {
        self.handler.id()
    }

    /// Invoke the operation identified by `key`.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` when the interface does not declare `key`, argument
    /// errors when `args` do not fit the signature, and otherwise whatever
    /// the default body or executor returned.
    pub fn invoke(&self, key: &OperationKey, args: Vec<Value>) -> Result<Value> {
        self.handler.invoke(self, key, args)
    }

    /// Invoke an operation by name.
    ///
    /// Identity operations (`to_string`, `hash_code`, `equals`) are answered
    /// locally. Other names must resolve to exactly one declared operation.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        self.handler.invoke_named(self, name, args)
    }

    /// Key of the single operation named `name`.
    pub fn key(&self, name: &str) -> Result<OperationKey> {
        Ok(self.descriptor().operation_named(name)?.key().clone())
    }
}

impl PartialEq for BoundInstance {
    fn eq(&self, other: &Self) -> bool {
        self.handler.universal(UniversalOp::Equals, Some(other)) == Value::Bool(true)
    }
}

impl Eq for BoundInstance {}

impl Hash for BoundInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Value::Int(code) = self.handler.universal(UniversalOp::HashCode, None) {
            code.hash(state);
        }
    }
}

impl fmt::Display for BoundInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handler.universal(UniversalOp::ToString, None) {
            Value::String(s) => f.write_str(&s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Debug for BoundInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundInstance")
            .field("interface", &self.descriptor().name())
            .field("handler", &self.handler.id())
            .finish()
    }
}
