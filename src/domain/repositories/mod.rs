//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`CounterStore`] - per-domain bounce/delivery counters

pub mod counter_store;

pub use counter_store::{CounterStore, StoreError};

#[cfg(test)]
pub use counter_store::MockCounterStore;
