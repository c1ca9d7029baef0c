//! Call interception and routing.
//!
//! Every call made against a [`BoundInstance`] lands in its
//! [`InterceptingHandler`], which classifies it in this order:
//!
//! 1. **Identity operations** (`equals`, `hash_code`, `to_string`) are
//!    answered by the handler itself. They never touch the executor cache.
//! 2. **Default operations** run their default body with the bound instance
//!    as receiver. Calls the body makes on that receiver come back through
//!    this same routine.
//! 3. **Delegated operations** resolve their executor through the shared
//!    cache (created on first use) and run it with the handler's session.
//!
//! Failures from a default body or an executor are returned unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tether_core::{
    Configuration, Error, OperationKey, OperationSignature, Result, Session, Value,
};
use tracing::{debug, trace, warn};

use crate::cache::ExecutorCache;
use crate::descriptor::{InterfaceDescriptor, OperationDescriptor};
use crate::executor::{ExecutorFactory, OperationExecutor};
use crate::instance::BoundInstance;
use crate::lookup::{DefaultMethodHandle, DefaultMethodLookup, InvocationFailure};

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// The universal operations every bound instance answers locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniversalOp {
    /// Identity comparison with another bound instance
    Equals,
    /// Identity hash
    HashCode,
    /// Human-readable identity
    ToString,
}

impl UniversalOp {
    /// Name the operation is reachable under
    pub fn name(self) -> &'static str {
        match self {
            UniversalOp::Equals => "equals",
            UniversalOp::HashCode => "hash_code",
            UniversalOp::ToString => "to_string",
        }
    }

    /// Number of arguments the operation takes
    pub fn arity(self) -> usize {
        match self {
            UniversalOp::Equals => 1,
            UniversalOp::HashCode | UniversalOp::ToString => 0,
        }
    }

    /// Classify a call by name and argument count.
    pub fn from_name(name: &str, arity: usize) -> Option<Self> {
        [UniversalOp::Equals, UniversalOp::HashCode, UniversalOp::ToString]
            .into_iter()
            .find(|op| op.name() == name && op.arity() == arity)
    }
}

/// State shared by a binding factory and every handler it creates.
pub(crate) struct Binding {
    pub(crate) descriptor: Arc<InterfaceDescriptor>,
    pub(crate) executors: ExecutorCache,
    defaults: DashMap<OperationKey, Result<DefaultMethodHandle>>,
    executor_factory: Arc<dyn ExecutorFactory>,
    lookup: Arc<dyn DefaultMethodLookup>,
}

impl Binding {
    pub(crate) fn new(
        descriptor: Arc<InterfaceDescriptor>,
        executor_factory: Arc<dyn ExecutorFactory>,
        lookup: Arc<dyn DefaultMethodLookup>,
    ) -> Self {
        Self {
            descriptor,
            executors: ExecutorCache::new(),
            defaults: DashMap::new(),
            executor_factory,
            lookup,
        }
    }

    /// Resolve (once) the invocable handle of a default body.
    ///
    /// A refusal is remembered, so the lookup is consulted once per
    /// operation and later calls report the same failure.
    fn default_handle(&self, operation: &OperationDescriptor) -> Result<DefaultMethodHandle> {
        if let Some(resolved) = self.defaults.get(operation.key()) {
            return resolved.value().clone();
        }
        let resolved = self
            .defaults
            .entry(operation.key().clone())
            .or_insert_with(|| {
                let resolved = self.lookup.resolve(&self.descriptor, operation);
                match &resolved {
                    Ok(handle) => debug!(
                        target: "tether::binding",
                        operation = %operation.key(),
                        access = ?handle.access(),
                        "default body resolved"
                    ),
                    Err(e) => warn!(
                        target: "tether::binding",
                        operation = %operation.key(),
                        error = %e,
                        "default body unavailable"
                    ),
                }
                resolved
            });
        resolved.value().clone()
    }

    fn executor(
        &self,
        signature: &OperationSignature,
        configuration: &Configuration,
    ) -> Result<Arc<dyn OperationExecutor>> {
        self.executors.get_or_try_insert_with(signature.key(), || {
            self.executor_factory
                .create(&self.descriptor, signature, configuration)
        })
    }
}

/// Routes calls made against one bound instance.
///
/// A handler owns its session and shares the executor cache of the factory
/// that created it. It keeps no per-call state.
pub struct InterceptingHandler {
    id: u64,
    session: Arc<dyn Session>,
    binding: Arc<Binding>,
}

impl InterceptingHandler {
    pub(crate) fn new(session: Arc<dyn Session>, binding: Arc<Binding>) -> Self {
        Self {
            id: NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed),
            session,
            binding,
        }
    }

    /// Process-unique identity of this handler
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Session every delegated call runs against
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Interface this handler dispatches for
    pub fn descriptor(&self) -> &InterfaceDescriptor {
        &self.binding.descriptor
    }

    /// Answer an identity operation.
    pub fn universal(&self, op: UniversalOp, other: Option<&BoundInstance>) -> Value {
        trace!(target: "tether::dispatch", handler = self.id, op = op.name(), "identity operation");
        match op {
            UniversalOp::Equals => {
                Value::Bool(other.map_or(false, |o| o.handler().id() == self.id))
            }
            UniversalOp::HashCode => Value::Int(self.id as i64),
            UniversalOp::ToString => Value::String(format!(
                "{}$Bound@{:x}",
                self.binding.descriptor.name(),
                self.id
            )),
        }
    }

    /// Route a call addressed by key.
    pub(crate) fn invoke(
        &self,
        proxy: &BoundInstance,
        key: &OperationKey,
        args: Vec<Value>,
    ) -> Result<Value> {
        let operation =
            self.binding
                .descriptor
                .operation(key)
                .ok_or_else(|| Error::UnknownOperation {
                    interface: self.binding.descriptor.name().to_string(),
                    operation: key.to_string(),
                })?;
        self.route(proxy, operation, args)
    }

    /// Route a call addressed by name.
    pub(crate) fn invoke_named(
        &self,
        proxy: &BoundInstance,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        if let Some(op) = UniversalOp::from_name(name, args.len()) {
            // A plain value is never the same object as a bound instance
            return Ok(self.universal(op, None));
        }
        let operation = self.binding.descriptor.operation_named(name)?;
        self.route(proxy, operation, args)
    }

    fn route(
        &self,
        proxy: &BoundInstance,
        operation: &OperationDescriptor,
        args: Vec<Value>,
    ) -> Result<Value> {
        check_arguments(operation.signature(), &args)?;

        if operation.has_default() {
            let handle = self.binding.default_handle(operation)?;
            trace!(target: "tether::dispatch", operation = %operation.key(), "default body");
            return handle
                .invoke(proxy, &args)
                .map_err(InvocationFailure::into_error);
        }

        let executor = self
            .binding
            .executor(operation.signature(), self.session.configuration())?;
        trace!(target: "tether::dispatch", operation = %operation.key(), "delegated");
        executor.execute(self.session.as_ref(), args)
    }
}

fn check_arguments(signature: &OperationSignature, args: &[Value]) -> Result<()> {
    if args.len() != signature.arity() {
        return Err(Error::ArityMismatch {
            operation: signature.key().to_string(),
            expected: signature.arity(),
            actual: args.len(),
        });
    }
    for (index, (param, arg)) in signature.params().iter().zip(args).enumerate() {
        if !arg.conforms_to(param.ty) {
            return Err(Error::ArgumentType {
                operation: signature.key().to_string(),
                param: param.name.clone().unwrap_or_else(|| format!("#{}", index)),
                expected: param.ty.to_string(),
                actual: arg.type_name().to_string(),
            });
        }
    }
    Ok(())
}
