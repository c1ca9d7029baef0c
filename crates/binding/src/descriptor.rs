//! Interface descriptors
//!
//! An [`InterfaceDescriptor`] is the static description of an abstract
//! interface: its name and the ordered set of operations it declares. Each
//! operation is either abstract (delegated to an executor) or carries a
//! default body that receives the bound instance as an explicit receiver.
//!
//! ```text
//! let greeter = InterfaceDescriptor::builder("Greeter")
//!     .operation("hello", vec![ParamSpec::named("name", ValueType::String)], ReturnShape::One)
//!     .default_operation(
//!         "loud",
//!         vec![ParamSpec::named("name", ValueType::String)],
//!         ReturnShape::One,
//!         |this, args| { ... this.call("hello", args.to_vec()) ... },
//!     )
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tether_core::{
    Access, Error, OperationKey, OperationSignature, ParamSpec, Result, ReturnShape, Value,
};

use crate::handler::UniversalOp;
use crate::instance::BoundInstance;

/// Executable fallback body of a default operation.
///
/// The first parameter is the bound instance the call arrived on, so a body
/// can call other operations of the same interface and have them dispatched
/// like any external call.
pub type DefaultBody = Arc<dyn Fn(&BoundInstance, &[Value]) -> Result<Value> + Send + Sync>;

/// A default body together with its declared access level.
#[derive(Clone)]
pub struct DefaultMethod {
    body: DefaultBody,
    access: Access,
}

impl DefaultMethod {
    /// Declared access level of the body
    pub fn access(&self) -> Access {
        self.access
    }

    pub(crate) fn body(&self) -> &DefaultBody {
        &self.body
    }
}

impl fmt::Debug for DefaultMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMethod")
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// One declared operation.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    signature: OperationSignature,
    default: Option<DefaultMethod>,
}

impl OperationDescriptor {
    /// Signature of the operation
    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    /// Cache key of the operation
    pub fn key(&self) -> &OperationKey {
        self.signature.key()
    }

    /// Default body, if the interface supplies one
    pub fn default_method(&self) -> Option<&DefaultMethod> {
        self.default.as_ref()
    }

    /// True when calls run the default body instead of an executor
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Immutable description of an abstract interface.
#[derive(Debug)]
pub struct InterfaceDescriptor {
    name: Arc<str>,
    operations: Vec<OperationDescriptor>,
    by_key: HashMap<OperationKey, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl InterfaceDescriptor {
    /// Start describing an interface.
    pub fn builder(name: impl Into<String>) -> InterfaceDescriptorBuilder {
        InterfaceDescriptorBuilder {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Interface name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared operations in declaration order
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Number of declared operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True when the interface declares nothing invocable
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Look up an operation by key.
    pub fn operation(&self, key: &OperationKey) -> Option<&OperationDescriptor> {
        self.by_key.get(key).map(|&i| &self.operations[i])
    }

    /// Look up an operation by name.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` when nothing has this name, `AmbiguousOperation`
    /// when several overloads do.
    pub fn operation_named(&self, name: &str) -> Result<&OperationDescriptor> {
        match self.by_name.get(name).map(Vec::as_slice) {
            Some([index]) => Ok(&self.operations[*index]),
            Some(candidates) if !candidates.is_empty() => Err(Error::AmbiguousOperation {
                interface: self.name.to_string(),
                operation: name.to_string(),
                candidates: candidates.len(),
            }),
            _ => Err(Error::UnknownOperation {
                interface: self.name.to_string(),
                operation: name.to_string(),
            }),
        }
    }

    /// Number of operations carrying a default body
    pub fn default_count(&self) -> usize {
        self.operations.iter().filter(|op| op.has_default()).count()
    }
}

/// Builder for [`InterfaceDescriptor`].
pub struct InterfaceDescriptorBuilder {
    name: String,
    operations: Vec<OperationDescriptor>,
}

impl InterfaceDescriptorBuilder {
    /// Declare an operation that is delegated to an executor.
    pub fn operation(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        returns: ReturnShape,
    ) -> Self {
        let name: String = name.into();
        let signature = OperationSignature::new(self.name.as_str(), name, params, returns);
        self.operations.push(OperationDescriptor {
            signature,
            default: None,
        });
        self
    }

    /// Declare a public operation with a default body.
    pub fn default_operation<F>(
        self,
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        returns: ReturnShape,
        body: F,
    ) -> Self
    where
        F: Fn(&BoundInstance, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.default_operation_with_access(name, params, returns, Access::Public, body)
    }

    /// Declare an operation with a default body and an explicit access level.
    pub fn default_operation_with_access<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        returns: ReturnShape,
        access: Access,
        body: F,
    ) -> Self
    where
        F: Fn(&BoundInstance, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let name: String = name.into();
        let signature = OperationSignature::new(self.name.as_str(), name, params, returns);
        self.operations.push(OperationDescriptor {
            signature,
            default: Some(DefaultMethod {
                body: Arc::new(body),
                access,
            }),
        });
        self
    }

    /// Validate and freeze the descriptor.
    ///
    /// # Errors
    ///
    /// `InvalidInterface` when the interface name or an operation name is
    /// empty, when two operations share an [`OperationKey`], or when an
    /// operation shadows one of the identity operations every bound instance
    /// answers itself.
    pub fn build(self) -> Result<InterfaceDescriptor> {
        let invalid = |reason: String| Error::InvalidInterface {
            interface: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("interface name is empty".to_string()));
        }

        let mut by_key = HashMap::with_capacity(self.operations.len());
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, op) in self.operations.iter().enumerate() {
            let name = op.signature.name();
            if name.trim().is_empty() {
                return Err(invalid(format!("operation #{} has an empty name", index)));
            }
            if UniversalOp::from_name(name, op.signature.arity()).is_some() {
                return Err(invalid(format!(
                    "operation {} shadows a built-in identity operation",
                    op.key()
                )));
            }
            if by_key.insert(op.key().clone(), index).is_some() {
                return Err(invalid(format!("operation {} is declared twice", op.key())));
            }
            by_name.entry(name.to_string()).or_default().push(index);
        }

        Ok(InterfaceDescriptor {
            name: Arc::from(self.name.as_str()),
            operations: self.operations,
            by_key,
            by_name,
        })
    }
}
