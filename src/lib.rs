//! Tether - interface binding and call dispatch for data-access mappers
//!
//! Describe an interface once, bind it to a session, and call it. Abstract
//! operations run configured statements; default operations run their body
//! with the bound instance as receiver.
//!
//! # Quick Start
//!
//! ```ignore
//! use tether::{BindingFactory, InterfaceDescriptor, ParamSpec, ReturnShape, Value, ValueType};
//!
//! let greeter = InterfaceDescriptor::builder("Greeter")
//!     .operation("hello", vec![ParamSpec::named("name", ValueType::String)], ReturnShape::One)
//!     .default_operation(
//!         "loud",
//!         vec![ParamSpec::named("name", ValueType::String)],
//!         ReturnShape::One,
//!         |this, args| {
//!             let reply = this.call("hello", args.to_vec())?;
//!             Ok(Value::String(reply.to_string().to_uppercase()))
//!         },
//!     )
//!     .build()?;
//!
//! let factory = BindingFactory::new(greeter)?;
//! let bound = factory.bind(session);
//! assert_eq!(bound.call("loud", vec!["Amy".into()])?, Value::from("HI, AMY"));
//! ```
//!
//! # Architecture
//!
//! `tether-core` holds the value model, errors, configuration and the
//! session contract. `tether-binding` holds descriptors, factories, handlers
//! and the executor cache. Both are re-exported here.

pub use tether_binding::*;
pub use tether_core::*;
