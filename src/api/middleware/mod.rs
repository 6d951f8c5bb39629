//! Request pipeline stages, outermost first.
//!
//! - [`context`] - seeds the per-request context and forwards shutdown escalations
//! - [`log_request`] - request started / finished log lines
//! - [`errors`] - turns handler failures into client-facing responses

pub mod context;
pub mod errors;
pub mod log_request;
