//! Common test utilities for mapper binding tests

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tether::{
    BoundInstance, Configuration, Error, ExecutorFactory, InterfaceDescriptor, OperationExecutor,
    OperationKey, OperationSignature, ParamSpec, Result, ReturnShape, Session, StatementCommand,
    StatementExecutorFactory, StatementKind, Value, ValueType,
};

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .try_init();
}

type StatementHandler = Box<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// In-memory session answering statements with registered closures.
pub struct MemorySession {
    config: Configuration,
    handlers: HashMap<String, StatementHandler>,
    calls: Mutex<Vec<(StatementCommand, Value)>>,
}

impl MemorySession {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on<F>(mut self, id: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(id.to_string(), Box::new(handler));
        self
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<(StatementCommand, Value)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Session for MemorySession {
    fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn execute(&self, command: &StatementCommand, parameter: Value) -> Result<Value> {
        self.calls.lock().push((command.clone(), parameter.clone()));
        let handler = self
            .handlers
            .get(&command.id)
            .ok_or_else(|| Error::session(format!("no handler for {}", command.id)))?;
        handler(&parameter)
    }
}

// ============================================================================
// Greeter
// ============================================================================

pub fn name_param() -> Vec<ParamSpec> {
    vec![ParamSpec::named("name", ValueType::String)]
}

pub fn hello_key() -> OperationKey {
    OperationKey::new("Greeter", "hello", vec![ValueType::String])
}

pub fn loud_key() -> OperationKey {
    OperationKey::new("Greeter", "loud", vec![ValueType::String])
}

/// Default body of `Greeter.loud`: upper-cased `hello`.
pub fn loud(this: &BoundInstance, args: &[Value]) -> Result<Value> {
    let reply = this.call("hello", args.to_vec())?;
    let text = reply
        .into_string()
        .ok_or_else(|| Error::operation("Greeter.loud", "hello returned a non-string"))?;
    Ok(Value::String(text.to_uppercase()))
}

pub fn greeter_descriptor() -> InterfaceDescriptor {
    InterfaceDescriptor::builder("Greeter")
        .operation("hello", name_param(), ReturnShape::One)
        .default_operation("loud", name_param(), ReturnShape::One, loud)
        .build()
        .unwrap()
}

/// Session whose `Greeter.hello` statement answers `"Hi, <name>"`.
pub fn greeter_session() -> MemorySession {
    let config = Configuration::new().with_statement("Greeter.hello", StatementKind::Select);
    MemorySession::new(config).on("Greeter.hello", |param| {
        let name = param
            .as_object()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::session("missing name"))?;
        Ok(Value::Array(vec![Value::String(format!("Hi, {}", name))]))
    })
}

// ============================================================================
// Executor factories
// ============================================================================

/// Statement executor factory that counts how often it is asked to build.
pub struct CountingFactory {
    created: AtomicUsize,
    delay: Duration,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            created: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ExecutorFactory for CountingFactory {
    fn create(
        &self,
        interface: &InterfaceDescriptor,
        signature: &OperationSignature,
        configuration: &Configuration,
    ) -> Result<Arc<dyn OperationExecutor>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        StatementExecutorFactory.create(interface, signature, configuration)
    }
}

/// Executor that always fails with the same error.
pub struct FailingExecutor(pub Error);

impl OperationExecutor for FailingExecutor {
    fn execute(&self, _session: &dyn Session, _args: Vec<Value>) -> Result<Value> {
        Err(self.0.clone())
    }
}

/// Factory handing out [`FailingExecutor`]s.
pub struct FailingFactory(pub Error);

impl ExecutorFactory for FailingFactory {
    fn create(
        &self,
        _interface: &InterfaceDescriptor,
        _signature: &OperationSignature,
        _configuration: &Configuration,
    ) -> Result<Arc<dyn OperationExecutor>> {
        Ok(Arc::new(FailingExecutor(self.0.clone())))
    }
}
