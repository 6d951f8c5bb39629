//! Storage contract for per-domain counters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{DomainRecord, Event};

/// Errors produced by counter stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The event kind is not one of the known delivery outcomes.
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    /// The backing database failed or is unreachable.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The in-process lock was poisoned by a panicking writer.
    #[error("counter store lock poisoned")]
    Poisoned,
}

/// Storage-agnostic access to domain counters.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryCounterStore`] - in-process map
/// - [`crate::infrastructure::persistence::PgCounterStore`] - PostgreSQL table
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_counter.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Returns a copy of the record for `domain`.
    ///
    /// A domain that has never been seen yields [`DomainRecord::empty`],
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] or [`StoreError::Poisoned`] when the
    /// backend cannot be read.
    async fn query(&self, domain: &str) -> Result<DomainRecord, StoreError>;

    /// Creates the record for `event.domain` if absent, then increments the
    /// counter selected by `event.kind`, as one atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] or [`StoreError::Poisoned`] when the
    /// backend cannot be written. Counters are unchanged on error.
    async fn insert(&self, event: &Event) -> Result<(), StoreError>;

    /// Checks whether the backend can currently serve requests.
    async fn health_check(&self) -> bool;
}
