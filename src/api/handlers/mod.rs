//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod domains;
pub mod events;
pub mod health;

pub use domains::classify_handler;
pub use events::record_event_handler;
pub use health::health_handler;
