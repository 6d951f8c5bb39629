//! Counter store implementations.
//!
//! # Stores
//!
//! - [`MemoryCounterStore`] - process-local map guarded by one lock
//! - [`PgCounterStore`] - PostgreSQL `domains` table with atomic upserts
//!
//! [`database`] builds the PostgreSQL pool and checks readiness at startup.

pub mod database;
pub mod memory_counter_store;
pub mod pg_counter_store;

pub use memory_counter_store::MemoryCounterStore;
pub use pg_counter_store::PgCounterStore;
