//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::CounterStore`] trait
//! and give HTTP handlers and the admin CLI a storage-independent API.
//!
//! # Available Services
//!
//! - [`services::event_router::EventRouter`] - event ingestion and classification

pub mod services;
