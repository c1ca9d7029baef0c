//! Binding factory
//!
//! A [`BindingFactory`] is created once per interface. It validates the
//! descriptor, owns the executor cache, and hands out [`BoundInstance`]s that
//! route calls to a session.
//!
//! ```ignore
//! use tether_binding::{BindingFactory, InterfaceDescriptor};
//!
//! // 1. Defaults: statement executors, process-wide lookup
//! let factory = BindingFactory::new(descriptor)?;
//!
//! // 2. Builder for custom executors or a restricted lookup
//! let factory = BindingFactory::builder(descriptor)
//!     .executor_factory(Arc::new(MyExecutors))
//!     .lookup(Arc::new(ModeRestrictedLookup::new([Access::Public])))
//!     .build()?;
//!
//! let greeter = factory.bind(session);
//! greeter.call("hello", vec!["Amy".into()])?;
//! ```
//!
//! # Cache sharing
//!
//! Every instance bound by one factory shares that factory's executor cache,
//! whatever session it was bound to. The first call of an operation decides
//! its executor, built against the configuration of the session that made
//! the call.

use std::fmt;
use std::sync::Arc;

use tether_core::{Error, OperationKey, Result, Session};
use tracing::info;

use crate::cache::ExecutorCache;
use crate::descriptor::InterfaceDescriptor;
use crate::executor::{ExecutorFactory, OperationExecutor, StatementExecutorFactory};
use crate::handler::{Binding, InterceptingHandler};
use crate::instance::BoundInstance;
use crate::lookup::{platform_lookup, DefaultMethodLookup};

/// Creates bound instances of one interface.
#[derive(Clone)]
pub struct BindingFactory {
    binding: Arc<Binding>,
}

impl BindingFactory {
    /// Factory with the default executor factory and lookup.
    ///
    /// # Errors
    ///
    /// `InvalidInterface` when the descriptor declares no operations, and
    /// `UnsupportedPlatform` when the process lookup cannot serve it.
    pub fn new(descriptor: impl Into<Arc<InterfaceDescriptor>>) -> Result<Self> {
        Self::builder(descriptor).build()
    }

    /// Start configuring a factory for `descriptor`.
    pub fn builder(descriptor: impl Into<Arc<InterfaceDescriptor>>) -> BindingFactoryBuilder {
        BindingFactoryBuilder {
            descriptor: descriptor.into(),
            executor_factory: None,
            lookup: None,
        }
    }

    /// Bind the interface to `session`.
    ///
    /// Each call creates a new handler, so instances from separate binds are
    /// never equal to each other.
    pub fn bind(&self, session: Arc<dyn Session>) -> BoundInstance {
        BoundInstance::new(InterceptingHandler::new(session, Arc::clone(&self.binding)))
    }

    /// Interface this factory binds
    pub fn descriptor(&self) -> &InterfaceDescriptor {
        &self.binding.descriptor
    }

    /// Read-only view of the shared executor cache
    pub fn executor_cache(&self) -> &ExecutorCache {
        &self.binding.executors
    }

    /// Number of executors created so far
    pub fn cached_executors(&self) -> usize {
        self.binding.executors.len()
    }

    /// Whether the executor for `key` has been created
    pub fn is_cached(&self, key: &OperationKey) -> bool {
        self.binding.executors.contains(key)
    }

    /// The cached executor for `key`, if any
    pub fn cached_executor(&self, key: &OperationKey) -> Option<Arc<dyn OperationExecutor>> {
        self.binding.executors.get(key)
    }

    /// Keys with a cached executor, sorted
    pub fn cached_keys(&self) -> Vec<OperationKey> {
        self.binding.executors.keys()
    }
}

impl fmt::Debug for BindingFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingFactory")
            .field("interface", &self.descriptor().name())
            .field("operations", &self.descriptor().len())
            .field("cached_executors", &self.cached_executors())
            .finish()
    }
}

/// Builder for [`BindingFactory`].
pub struct BindingFactoryBuilder {
    descriptor: Arc<InterfaceDescriptor>,
    executor_factory: Option<Arc<dyn ExecutorFactory>>,
    lookup: Option<Arc<dyn DefaultMethodLookup>>,
}

impl BindingFactoryBuilder {
    /// Use `factory` to build executors for delegated operations.
    ///
    /// Defaults to [`StatementExecutorFactory`].
    pub fn executor_factory(mut self, factory: Arc<dyn ExecutorFactory>) -> Self {
        self.executor_factory = Some(factory);
        self
    }

    /// Use `lookup` to open default bodies.
    ///
    /// Defaults to [`platform_lookup`].
    pub fn lookup(mut self, lookup: Arc<dyn DefaultMethodLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Validate and create the factory.
    pub fn build(self) -> Result<BindingFactory> {
        if self.descriptor.is_empty() {
            return Err(Error::InvalidInterface {
                interface: self.descriptor.name().to_string(),
                reason: "interface declares no operations".to_string(),
            });
        }

        let lookup = self.lookup.unwrap_or_else(platform_lookup);
        lookup.probe(&self.descriptor)?;

        let executor_factory = self
            .executor_factory
            .unwrap_or_else(|| Arc::new(StatementExecutorFactory) as Arc<dyn ExecutorFactory>);

        info!(
            target: "tether::binding",
            interface = self.descriptor.name(),
            operations = self.descriptor.len(),
            defaults = self.descriptor.default_count(),
            "binding factory created"
        );

        Ok(BindingFactory {
            binding: Arc::new(Binding::new(self.descriptor, executor_factory, lookup)),
        })
    }
}
