//! Core domain entities.
//!
//! - [`DomainRecord`] - bounce/delivery counters for one mail domain
//! - [`Event`] - a single observed delivery outcome
//!
//! Entities are plain data. Classification lives in [`crate::domain::classifier`].

pub mod domain_record;
pub mod event;

pub use domain_record::DomainRecord;
pub use event::{Event, EventKind};
