//! Executor Cache Tests
//!
//! Every instance bound by one factory shares one executor per operation,
//! and concurrent first calls agree on that executor.

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tether::{BindingFactory, Configuration, Error, Session, Value};

#[test]
fn executor_shared_across_binds() {
    let counting = Arc::new(CountingFactory::new());
    let factory = BindingFactory::builder(greeter_descriptor())
        .executor_factory(counting.clone())
        .build()
        .unwrap();

    let a = factory.bind(Arc::new(greeter_session()));
    a.call("hello", vec![Value::from("a")]).unwrap();
    let first = factory.cached_executor(&hello_key()).unwrap();

    let b = factory.bind(Arc::new(greeter_session()));
    b.call("hello", vec![Value::from("b")]).unwrap();
    let second = factory.cached_executor(&hello_key()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(counting.created(), 1);
    assert_eq!(factory.cached_executors(), 1);
}

#[test]
fn concurrent_first_calls_create_one_executor() {
    const THREADS: usize = 128;

    let counting = Arc::new(CountingFactory::with_delay(Duration::from_millis(5)));
    let factory = BindingFactory::builder(greeter_descriptor())
        .executor_factory(counting.clone())
        .build()
        .unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let factory = factory.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // Separate bound instance and session per thread
                let greeter = factory.bind(Arc::new(greeter_session()));
                barrier.wait();
                greeter
                    .call("hello", vec![Value::String(format!("t{}", i))])
                    .unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let reply = handle.join().unwrap();
        assert_eq!(reply, Value::String(format!("Hi, t{}", i)));
    }

    assert_eq!(counting.created(), 1, "executor must be created exactly once");
    assert_eq!(factory.cached_keys(), vec![hello_key()]);
}

#[test]
fn concurrent_default_calls_resolve_one_executor() {
    const THREADS: usize = 32;

    let counting = Arc::new(CountingFactory::with_delay(Duration::from_millis(2)));
    let factory = BindingFactory::builder(greeter_descriptor())
        .executor_factory(counting.clone())
        .build()
        .unwrap();
    let greeter = factory.bind(Arc::new(greeter_session()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let greeter = greeter.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                greeter.call("loud", vec![Value::from("amy")]).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::from("HI, AMY"));
    }
    assert_eq!(counting.created(), 1);
}

#[test]
fn failed_resolution_is_retried() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();

    let bare: Arc<dyn Session> = Arc::new(MemorySession::new(Configuration::new()));
    let err = factory
        .bind(bare)
        .call("hello", vec![Value::from("a")])
        .unwrap_err();
    assert_eq!(
        err,
        Error::StatementNotFound {
            statement: "Greeter.hello".into()
        }
    );
    assert_eq!(factory.cached_executors(), 0);

    let reply = factory
        .bind(Arc::new(greeter_session()))
        .call("hello", vec![Value::from("a")])
        .unwrap();
    assert_eq!(reply, Value::from("Hi, a"));
    assert!(factory.is_cached(&hello_key()));
}

#[test]
fn separate_factories_have_separate_caches() {
    let one = BindingFactory::new(greeter_descriptor()).unwrap();
    let two = BindingFactory::new(greeter_descriptor()).unwrap();

    one.bind(Arc::new(greeter_session()))
        .call("hello", vec![Value::from("a")])
        .unwrap();

    assert!(one.is_cached(&hello_key()));
    assert!(!two.is_cached(&hello_key()));
}

#[test]
fn cloned_factory_shares_cache() {
    let factory = BindingFactory::new(greeter_descriptor()).unwrap();
    let clone = factory.clone();

    clone
        .bind(Arc::new(greeter_session()))
        .call("hello", vec![Value::from("a")])
        .unwrap();

    assert!(factory.is_cached(&hello_key()));
    assert_eq!(factory.executor_cache().len(), 1);
}
