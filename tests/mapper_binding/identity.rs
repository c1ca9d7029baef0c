//! Identity Operation Tests
//!
//! `equals`, `hash_code` and `to_string` are answered by the handler and
//! never resolve an executor or reach the session.

use crate::common::*;
use std::collections::HashSet;
use std::sync::Arc;

use tether::{BindingFactory, Value};

#[test]
fn identity_operations_skip_the_cache() {
    let counting = Arc::new(CountingFactory::new());
    let session = Arc::new(greeter_session());
    let factory = BindingFactory::builder(greeter_descriptor())
        .executor_factory(counting.clone())
        .build()
        .unwrap();
    let greeter = factory.bind(session.clone());

    greeter.call("to_string", vec![]).unwrap();
    greeter.call("hash_code", vec![]).unwrap();
    greeter.call("equals", vec![Value::Null]).unwrap();
    let _ = greeter.to_string();
    let _ = greeter == greeter.clone();

    assert_eq!(counting.created(), 0);
    assert_eq!(factory.cached_executors(), 0);
    assert_eq!(session.call_count(), 0);
}

#[test]
fn to_string_names_interface_and_handler() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    let expected = format!("Greeter$Bound@{:x}", greeter.handler_id());
    assert_eq!(greeter.to_string(), expected);
    assert_eq!(greeter.call("to_string", vec![]).unwrap(), Value::String(expected));
}

#[test]
fn hash_code_is_handler_identity() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    assert_eq!(
        greeter.call("hash_code", vec![]).unwrap(),
        Value::Int(greeter.handler_id() as i64)
    );
    assert_eq!(
        greeter.clone().call("hash_code", vec![]).unwrap(),
        greeter.call("hash_code", vec![]).unwrap()
    );
}

#[test]
fn equality_follows_handler_identity() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let session = Arc::new(greeter_session());
    let a = factory.bind(session.clone());
    let b = factory.bind(session);

    assert_eq!(a, a.clone());
    assert_ne!(a, b);

    let set: HashSet<_> = [a.clone(), a.clone(), b.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn equals_with_plain_value_is_false() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    let as_value = Value::Int(greeter.handler_id() as i64);
    assert_eq!(
        greeter.call("equals", vec![as_value]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn debug_output_names_interface() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    let rendered = format!("{:?}", greeter);
    assert!(rendered.contains("Greeter"));
    assert!(rendered.contains(&greeter.handler_id().to_string()));
}
