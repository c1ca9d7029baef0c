//! Default-body invocation support
//!
//! A default body is stored as an ordinary function that takes the bound
//! instance as its first argument. Before a handler can run one it asks a
//! [`DefaultMethodLookup`] for a [`DefaultMethodHandle`]: the lookup decides
//! whether the body may be invoked at all given its declared [`Access`].
//!
//! Two lookups ship with the crate:
//!
//! | Lookup | Opens | Use |
//! |--------|-------|-----|
//! | [`PrivateLookup`] | every access level | process default, see [`platform_lookup`] |
//! | [`ModeRestrictedLookup`] | a fixed set of levels | runtimes that cannot reach private bodies |
//!
//! A lookup refusal is fatal for that operation only. A lookup whose
//! [`DefaultMethodLookup::probe`] fails is fatal for the whole factory and is
//! reported when the factory is constructed.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tether_core::{Access, Error, OperationKey, Result, Value};

use crate::descriptor::{DefaultBody, InterfaceDescriptor, OperationDescriptor};
use crate::instance::BoundInstance;

/// Failure envelope produced by invoking a default body.
///
/// `Target` carries the failure the body itself raised; `Rejected` means the
/// invocation never reached the body. Handlers unwrap the envelope with
/// [`InvocationFailure::into_error`] so callers only ever see the original
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationFailure {
    /// The body ran and failed
    Target(Error),
    /// The invocation was refused before the body ran
    Rejected {
        /// Operation being invoked
        operation: String,
        /// Why the invocation was refused
        reason: String,
    },
}

impl InvocationFailure {
    /// Unwrap the envelope into the error the caller should observe.
    pub fn into_error(self) -> Error {
        match self {
            InvocationFailure::Target(err) => err,
            InvocationFailure::Rejected { operation, reason } => Error::Internal {
                reason: format!("default body of {} was not invoked: {}", operation, reason),
            },
        }
    }
}

/// Invocable form of one default body.
#[derive(Clone)]
pub struct DefaultMethodHandle {
    key: OperationKey,
    access: Access,
    body: DefaultBody,
}

impl DefaultMethodHandle {
    /// Key of the operation this handle invokes
    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    /// Declared access level of the body
    pub fn access(&self) -> Access {
        self.access
    }

    /// Run the body with `receiver` as its bound instance.
    pub fn invoke(
        &self,
        receiver: &BoundInstance,
        args: &[Value],
    ) -> std::result::Result<Value, InvocationFailure> {
        if receiver.descriptor().name() != self.key.interface() {
            return Err(InvocationFailure::Rejected {
                operation: self.key.to_string(),
                reason: format!(
                    "receiver implements {}, not {}",
                    receiver.descriptor().name(),
                    self.key.interface()
                ),
            });
        }
        (self.body)(receiver, args).map_err(InvocationFailure::Target)
    }
}

impl fmt::Debug for DefaultMethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMethodHandle")
            .field("key", &self.key)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// Strategy that turns a declared default body into an invocable handle.
pub trait DefaultMethodLookup: Send + Sync {
    /// Check, once per factory, that this lookup can serve `interface` at all.
    fn probe(&self, _interface: &InterfaceDescriptor) -> Result<()> {
        Ok(())
    }

    /// Resolve the handle for one operation.
    ///
    /// # Errors
    ///
    /// `UnsupportedPlatform` when this lookup cannot open the body.
    fn resolve(
        &self,
        interface: &InterfaceDescriptor,
        operation: &OperationDescriptor,
    ) -> Result<DefaultMethodHandle>;
}

fn open_handle(operation: &OperationDescriptor) -> Result<DefaultMethodHandle> {
    let method = operation.default_method().ok_or_else(|| Error::Internal {
        reason: format!("{} has no default body", operation.key()),
    })?;
    Ok(DefaultMethodHandle {
        key: operation.key().clone(),
        access: method.access(),
        body: Arc::clone(method.body()),
    })
}

/// Lookup with full access: every declared body can be invoked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivateLookup;

impl DefaultMethodLookup for PrivateLookup {
    fn resolve(
        &self,
        _interface: &InterfaceDescriptor,
        operation: &OperationDescriptor,
    ) -> Result<DefaultMethodHandle> {
        open_handle(operation)
    }
}

/// Lookup limited to a fixed set of access levels.
#[derive(Debug, Clone, Default)]
pub struct ModeRestrictedLookup {
    allowed: Vec<Access>,
}

impl ModeRestrictedLookup {
    /// Lookup that can open exactly `allowed`.
    pub fn new(allowed: impl IntoIterator<Item = Access>) -> Self {
        let mut allowed: Vec<Access> = allowed.into_iter().collect();
        allowed.dedup();
        Self { allowed }
    }

    /// Whether bodies with this access level can be opened
    pub fn allows(&self, access: Access) -> bool {
        self.allowed.contains(&access)
    }
}

impl DefaultMethodLookup for ModeRestrictedLookup {
    fn probe(&self, interface: &InterfaceDescriptor) -> Result<()> {
        if self.allowed.is_empty() && interface.default_count() > 0 {
            return Err(Error::UnsupportedPlatform {
                operation: interface.name().to_string(),
                reason: "no access level is available for default bodies".to_string(),
            });
        }
        Ok(())
    }

    fn resolve(
        &self,
        _interface: &InterfaceDescriptor,
        operation: &OperationDescriptor,
    ) -> Result<DefaultMethodHandle> {
        let handle = open_handle(operation)?;
        if !self.allows(handle.access()) {
            return Err(Error::UnsupportedPlatform {
                operation: operation.key().to_string(),
                reason: format!("{:?} default bodies cannot be opened", handle.access()),
            });
        }
        Ok(handle)
    }
}

static PLATFORM_LOOKUP: Lazy<Arc<dyn DefaultMethodLookup>> =
    Lazy::new(|| Arc::new(PrivateLookup) as Arc<dyn DefaultMethodLookup>);

/// The process-wide lookup used by factories that do not configure one.
pub fn platform_lookup() -> Arc<dyn DefaultMethodLookup> {
    Arc::clone(&*PLATFORM_LOOKUP)
}
