//! Business logic services for the application layer.

pub mod event_router;

pub use event_router::EventRouter;
