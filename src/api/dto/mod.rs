//! Data Transfer Objects for API responses.
//!
//! Classification lookups answer with a bare JSON string and event
//! ingestion has no body, so only the health check needs a DTO.

pub mod health;
