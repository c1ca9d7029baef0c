//! Argument list to parameter object conversion.
//!
//! A session receives a single parameter value per statement. The resolver
//! decides how a call's argument list becomes that value:
//!
//! - no arguments: `Null`
//! - one argument without a declared name: the argument itself (an array is
//!   wrapped as `{"collection", "list"}` when `wrap_collections` is set)
//! - otherwise: an object with each parameter's name plus the generic
//!   aliases `param1..paramN`

use std::collections::HashMap;

use tether_core::{OperationSignature, Settings, Value};

/// Prefix of the generic positional aliases
pub const GENERIC_NAME_PREFIX: &str = "param";

/// Resolves the parameter object for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamNameResolver {
    names: Vec<String>,
    has_declared_names: bool,
    wrap_collections: bool,
}

impl ParamNameResolver {
    /// Build the resolver for `signature` under `settings`.
    pub fn new(signature: &OperationSignature, settings: &Settings) -> Self {
        let has_declared_names = signature.params().iter().any(|p| p.name.is_some());
        let names = signature
            .params()
            .iter()
            .enumerate()
            .map(|(i, p)| match &p.name {
                Some(name) if settings.use_actual_param_names => name.clone(),
                _ => i.to_string(),
            })
            .collect();
        Self {
            names,
            has_declared_names,
            wrap_collections: settings.wrap_collections,
        }
    }

    /// Names under which arguments are exposed, in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Convert an argument list into the parameter object.
    pub fn resolve(&self, args: Vec<Value>) -> Value {
        if args.is_empty() {
            return Value::Null;
        }
        if args.len() == 1 && !self.has_declared_names {
            let mut args = args;
            return self.wrap_single(args.remove(0));
        }

        let mut param = HashMap::with_capacity(args.len() * 2);
        for (i, arg) in args.into_iter().enumerate() {
            let generic = format!("{}{}", GENERIC_NAME_PREFIX, i + 1);
            match self.names.get(i) {
                Some(name) if *name != generic => {
                    param.insert(name.clone(), arg.clone());
                    // A declared name wins over a generic alias of the same spelling
                    param.entry(generic).or_insert(arg);
                }
                _ => {
                    param.insert(generic, arg);
                }
            }
        }
        Value::Object(param)
    }

    fn wrap_single(&self, arg: Value) -> Value {
        match arg {
            Value::Array(items) if self.wrap_collections => {
                let mut wrapped = HashMap::with_capacity(2);
                wrapped.insert("collection".to_string(), Value::Array(items.clone()));
                wrapped.insert("list".to_string(), Value::Array(items));
                Value::Object(wrapped)
            }
            other => other,
        }
    }
}
