//! Operation executors
//!
//! An [`OperationExecutor`] is the resolved, reusable unit of work behind one
//! delegated operation. Executors are built by an [`ExecutorFactory`] the
//! first time their operation is called and then live in the factory's
//! executor cache.
//!
//! The default factory, [`StatementExecutorFactory`], maps each operation to
//! the statement `"<Interface>.<operation>"` in the session configuration and
//! builds a [`StatementExecutor`] that runs it and shapes the result.

use std::fmt;
use std::sync::Arc;

use tether_core::{
    Configuration, Error, OperationSignature, Result, ReturnShape, Session, StatementCommand,
    StatementKind, Value,
};

use crate::descriptor::InterfaceDescriptor;
use crate::params::ParamNameResolver;

/// Resolved unit of work for one delegated operation.
pub trait OperationExecutor: Send + Sync {
    /// Run the operation against `session` with the call's arguments.
    fn execute(&self, session: &dyn Session, args: Vec<Value>) -> Result<Value>;
}

/// Builds executors for delegated operations.
pub trait ExecutorFactory: Send + Sync {
    /// Build the executor for `signature`, declared on `interface`.
    ///
    /// Called at most once per operation per binding factory.
    fn create(
        &self,
        interface: &InterfaceDescriptor,
        signature: &OperationSignature,
        configuration: &Configuration,
    ) -> Result<Arc<dyn OperationExecutor>>;
}

/// Default [`ExecutorFactory`]: one statement per operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementExecutorFactory;

impl ExecutorFactory for StatementExecutorFactory {
    fn create(
        &self,
        interface: &InterfaceDescriptor,
        signature: &OperationSignature,
        configuration: &Configuration,
    ) -> Result<Arc<dyn OperationExecutor>> {
        let executor = StatementExecutor::new(interface, signature, configuration)?;
        Ok(Arc::new(executor))
    }
}

/// Executor that runs one configured statement.
pub struct StatementExecutor {
    operation: String,
    command: StatementCommand,
    returns: ReturnShape,
    params: ParamNameResolver,
    nullable: bool,
}

impl StatementExecutor {
    /// Resolve the statement for `signature` in `configuration`.
    ///
    /// # Errors
    ///
    /// - `StatementNotFound` when the configuration has no matching statement
    /// - `InvalidInterface` when a write statement is declared with a return
    ///   shape other than `Unit`, `RowCount` or `Affected`, or a select with a
    ///   row-count shape
    pub fn new(
        interface: &InterfaceDescriptor,
        signature: &OperationSignature,
        configuration: &Configuration,
    ) -> Result<Self> {
        let id = signature.key().statement_id();
        let spec = configuration
            .statement(&id)
            .ok_or_else(|| Error::StatementNotFound {
                statement: id.clone(),
            })?;

        let returns = signature.returns();
        let supported = match spec.kind {
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete => matches!(
                returns,
                ReturnShape::Unit | ReturnShape::RowCount | ReturnShape::Affected
            ),
            StatementKind::Select => {
                !matches!(returns, ReturnShape::RowCount | ReturnShape::Affected)
            }
            StatementKind::Flush => true,
        };
        if !supported {
            return Err(Error::InvalidInterface {
                interface: interface.name().to_string(),
                reason: format!(
                    "{} returns {:?}, which a {:?} statement cannot produce",
                    signature.key(),
                    returns,
                    spec.kind
                ),
            });
        }

        Ok(Self {
            operation: signature.key().to_string(),
            command: StatementCommand { id, kind: spec.kind },
            returns,
            params: ParamNameResolver::new(signature, configuration.settings()),
            nullable: configuration.settings().nullable_single_results,
        })
    }

    /// The statement this executor runs
    pub fn command(&self) -> &StatementCommand {
        &self.command
    }

    fn row_count(&self, raw: Value) -> Result<i64> {
        match raw {
            Value::Int(count) => Ok(count),
            Value::Null => Ok(0),
            other => Err(Error::Session {
                reason: format!(
                    "{} returned {} where a row count was expected",
                    self.command,
                    other.type_name()
                ),
            }),
        }
    }

    fn shape_select(&self, raw: Value) -> Result<Value> {
        match self.returns {
            ReturnShape::Unit => Ok(Value::Null),
            ReturnShape::Many => Ok(match raw {
                Value::Array(rows) => Value::Array(rows),
                Value::Null => Value::Array(Vec::new()),
                row => Value::Array(vec![row]),
            }),
            _ => {
                let single = match raw {
                    Value::Array(mut rows) => match rows.len() {
                        0 => Value::Null,
                        1 => rows.remove(0),
                        count => {
                            return Err(Error::TooManyResults {
                                operation: self.operation.clone(),
                                count,
                            })
                        }
                    },
                    row => row,
                };
                if single.is_null() && self.returns == ReturnShape::One && !self.nullable {
                    return Err(Error::NullResult {
                        operation: self.operation.clone(),
                    });
                }
                Ok(single)
            }
        }
    }

    fn shape_write(&self, raw: Value) -> Result<Value> {
        let count = self.row_count(raw)?;
        Ok(match self.returns {
            ReturnShape::RowCount => Value::Int(count),
            ReturnShape::Affected => Value::Bool(count > 0),
            _ => Value::Null,
        })
    }
}

impl OperationExecutor for StatementExecutor {
    fn execute(&self, session: &dyn Session, args: Vec<Value>) -> Result<Value> {
        let param = self.params.resolve(args);
        let raw = session.execute(&self.command, param)?;
        match self.command.kind {
            StatementKind::Select => self.shape_select(raw),
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete => {
                self.shape_write(raw)
            }
            StatementKind::Flush => Ok(raw),
        }
    }
}

impl fmt::Debug for StatementExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementExecutor")
            .field("command", &self.command)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}
