//! In-process implementation of the counter store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::domain::entities::{DomainRecord, Event};
use crate::domain::repositories::{CounterStore, StoreError};

/// Counter store backed by a map behind a single reader/writer lock.
///
/// Clones share the same map, so one instance created at startup serves the
/// whole process. Readers take the shared lock; [`insert`](CounterStore::insert)
/// performs its read-modify-write entirely under the exclusive lock, so
/// concurrent events for the same domain are never lost.
///
/// The lock is never held across an `.await`.
///
/// Nothing is persisted across restarts.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    records: Arc<RwLock<HashMap<String, DomainRecord>>>,
}

impl MemoryCounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using in-memory counter store");
        Self::default()
    }

    /// Number of domains currently tracked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if a writer panicked while holding the lock.
    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len())
    }

    /// Returns `true` if no domain has been recorded yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if a writer panicked while holding the lock.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn query(&self, domain: &str) -> Result<DomainRecord, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;

        Ok(records
            .get(domain)
            .cloned()
            .unwrap_or_else(|| DomainRecord::empty(domain)))
    }

    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;

        records
            .entry(event.domain.clone())
            .or_insert_with(|| DomainRecord::empty(&event.domain))
            .increment(event.kind);

        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.records.is_poisoned()
    }
}
