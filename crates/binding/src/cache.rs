//! Executor cache shared by every handler of one binding factory.
//!
//! # Invariant
//!
//! For a given cache at most one executor is ever installed per
//! [`OperationKey`], even when many threads miss on the same key at once.
//! Creation runs under the key's shard lock via DashMap's entry API; the
//! returned `Arc` is cloned out so no lock is held while the executor runs.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tether_core::{OperationKey, Result};
use tracing::debug;

use crate::executor::OperationExecutor;

/// Concurrent `OperationKey -> OperationExecutor` map.
#[derive(Clone, Default)]
pub struct ExecutorCache {
    entries: Arc<DashMap<OperationKey, Arc<dyn OperationExecutor>>>,
}

impl ExecutorCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the cached executor for `key`, creating it with `create` on a
    /// miss.
    ///
    /// A failed `create` installs nothing; the next call retries.
    pub(crate) fn get_or_try_insert_with<F>(
        &self,
        key: &OperationKey,
        create: F,
    ) -> Result<Arc<dyn OperationExecutor>>
    where
        F: FnOnce() -> Result<Arc<dyn OperationExecutor>>,
    {
        if let Some(existing) = self.entries.get(key) {
            return Ok(Arc::clone(existing.value()));
        }

        match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let executor = create()?;
                debug!(target: "tether::binding", operation = %key, "executor created");
                Ok(Arc::clone(entry.insert(executor).value()))
            }
        }
    }

    /// Cached executor for `key`, if one has been created
    pub fn get(&self, key: &OperationKey) -> Option<Arc<dyn OperationExecutor>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an executor exists for `key`
    pub fn contains(&self, key: &OperationKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached executors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys with a cached executor, sorted
    pub fn keys(&self) -> Vec<OperationKey> {
        let mut keys: Vec<OperationKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}
