//! Failure Tests
//!
//! Errors raised by executors, sessions and default bodies reach the caller
//! unchanged. Malformed calls and descriptors are rejected up front.

use crate::common::*;
use std::sync::Arc;

use tether::{
    BindingFactory, Configuration, Error, InterfaceDescriptor, OperationKey, ParamSpec,
    ReturnShape, StatementKind, Value, ValueType,
};

#[test]
fn executor_error_passes_through() {
    let original = Error::operation("Greeter.hello", "greeting quota exceeded");
    let factory = BindingFactory::builder(greeter_descriptor())
        .executor_factory(Arc::new(FailingFactory(original.clone())))
        .build()
        .unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    assert_eq!(
        greeter.call("hello", vec![Value::from("a")]).unwrap_err(),
        original
    );
    // Through a default body as well
    assert_eq!(
        greeter.call("loud", vec![Value::from("a")]).unwrap_err(),
        original
    );
}

#[test]
fn session_error_passes_through() {
    let config = Configuration::new().with_statement("Greeter.hello", StatementKind::Select);
    let session = MemorySession::new(config)
        .on("Greeter.hello", |_| Err(Error::session("connection reset")));
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(session));

    assert_eq!(
        greeter.call("hello", vec![Value::from("a")]).unwrap_err(),
        Error::session("connection reset")
    );
}

#[test]
fn default_body_error_is_not_wrapped() {
    let descriptor = InterfaceDescriptor::builder("Validator")
        .default_operation(
            "check",
            vec![ParamSpec::positional(ValueType::Int)],
            ReturnShape::One,
            |_, args| match args[0].as_int() {
                Some(n) if n >= 0 => Ok(Value::Bool(true)),
                _ => Err(Error::operation("Validator.check", "negative input")),
            },
        )
        .build()
        .unwrap();
    let factory = BindingFactory::new(descriptor).unwrap();
    let validator = factory.bind(Arc::new(MemorySession::new(Configuration::new())));

    assert_eq!(
        validator.call("check", vec![Value::Int(1)]).unwrap(),
        Value::Bool(true)
    );
    match validator.call("check", vec![Value::Int(-1)]) {
        Err(Error::Operation { operation, reason }) => {
            assert_eq!(operation, "Validator.check");
            assert_eq!(reason, "negative input");
        }
        other => panic!("Expected Operation error, got {:?}", other),
    }
}

#[test]
fn empty_descriptor_is_invalid() {
    let empty = InterfaceDescriptor::builder("Empty").build().unwrap();
    match BindingFactory::new(empty) {
        Err(err @ Error::InvalidInterface { .. }) => assert!(err.is_structural()),
        other => panic!("Expected InvalidInterface, got {:?}", other),
    }
}

#[test]
fn unknown_operation() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    assert!(matches!(
        greeter.call("goodbye", vec![]),
        Err(Error::UnknownOperation { .. })
    ));

    let foreign = OperationKey::new("Other", "hello", vec![ValueType::String]);
    assert!(matches!(
        greeter.invoke(&foreign, vec![Value::from("a")]),
        Err(Error::UnknownOperation { .. })
    ));
}

#[test]
fn wrong_arity_rejected_before_dispatch() {
    let counting = Arc::new(CountingFactory::new());
    let factory = BindingFactory::builder(greeter_descriptor())
        .executor_factory(counting.clone())
        .build()
        .unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    match greeter.call("hello", vec![]) {
        Err(Error::ArityMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("Expected ArityMismatch, got {:?}", other),
    }
    assert_eq!(counting.created(), 0);
}

#[test]
fn wrong_argument_type_rejected() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));

    match greeter.call("loud", vec![Value::Int(7)]) {
        Err(Error::ArgumentType {
            param,
            expected,
            actual,
            ..
        }) => {
            assert_eq!(param, "name");
            assert_eq!(expected, "String");
            assert_eq!(actual, "Int");
        }
        other => panic!("Expected ArgumentType, got {:?}", other),
    }
}

#[test]
fn overloads_need_a_key() {
    let descriptor = InterfaceDescriptor::builder("Finder")
        .operation(
            "find",
            vec![ParamSpec::named("id", ValueType::Int)],
            ReturnShape::Optional,
        )
        .operation(
            "find",
            vec![ParamSpec::named("name", ValueType::String)],
            ReturnShape::Optional,
        )
        .build()
        .unwrap();
    let config = Configuration::new().with_statement("Finder.find", StatementKind::Select);
    let session = MemorySession::new(config).on("Finder.find", |p| Ok(p.clone()));
    let factory = BindingFactory::new(descriptor).unwrap();
    let finder = factory.bind(Arc::new(session));

    assert!(matches!(
        finder.call("find", vec![Value::Int(1)]),
        Err(Error::AmbiguousOperation { candidates: 2, .. })
    ));

    let by_id = OperationKey::new("Finder", "find", vec![ValueType::Int]);
    let by_name = OperationKey::new("Finder", "find", vec![ValueType::String]);
    assert!(finder.invoke(&by_id, vec![Value::Int(1)]).is_ok());
    assert!(finder.invoke(&by_name, vec![Value::from("x")]).is_ok());

    // Overloads are distinct cache entries
    assert_eq!(factory.cached_keys(), vec![by_id, by_name]);
}
