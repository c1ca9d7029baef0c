//! Interface binding and call dispatch
//!
//! This crate turns an [`InterfaceDescriptor`] into callable
//! [`BoundInstance`]s:
//! - BindingFactory: validates a descriptor and binds it to sessions
//! - InterceptingHandler: routes every call (identity, default body, executor)
//! - ExecutorCache: one executor per operation, shared by all bound instances
//! - DefaultMethodLookup: decides which default bodies may be invoked
//! - StatementExecutor: the default executor, backed by configured statements
//!
//! ```text
//! let greeter = InterfaceDescriptor::builder("Greeter")
//!     .operation("hello", vec![ParamSpec::named("name", ValueType::String)], ReturnShape::One)
//!     .build()?;
//!
//! let factory = BindingFactory::new(greeter)?;
//! let bound = factory.bind(session);
//! let reply = bound.call("hello", vec![Value::from("Amy")])?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod descriptor;
pub mod executor;
pub mod factory;
pub mod handler;
pub mod instance;
pub mod lookup;
pub mod params;

pub use cache::ExecutorCache;
pub use descriptor::{
    DefaultBody, DefaultMethod, InterfaceDescriptor, InterfaceDescriptorBuilder,
    OperationDescriptor,
};
pub use executor::{ExecutorFactory, OperationExecutor, StatementExecutor, StatementExecutorFactory};
pub use factory::{BindingFactory, BindingFactoryBuilder};
pub use handler::{InterceptingHandler, UniversalOp};
pub use instance::BoundInstance;
pub use lookup::{
    platform_lookup, DefaultMethodHandle, DefaultMethodLookup, InvocationFailure,
    ModeRestrictedLookup, PrivateLookup,
};
pub use params::{ParamNameResolver, GENERIC_NAME_PREFIX};
