//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Domain records and delivery events
//! - [`classifier`] - Catch-all classification rules
//! - [`repositories`] - Counter store contract
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//! Storage implementations are provided by [`crate::infrastructure::persistence`].

pub mod classifier;
pub mod entities;
pub mod repositories;
