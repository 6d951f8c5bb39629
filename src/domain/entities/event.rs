//! Delivery outcome events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::repositories::StoreError;

/// The observed outcome of a single delivery attempt.
///
/// Closed set: parsing anything other than `bounced` or `delivered`
/// fails with [`StoreError::UnknownEventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Bounced,
    Delivered,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bounced => "bounced",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bounced" => Ok(Self::Bounced),
            "delivered" => Ok(Self::Delivered),
            other => Err(StoreError::UnknownEventKind(other.to_string())),
        }
    }
}

/// A single bounce or delivery observed for a domain.
///
/// Events are transient: only their effect on the domain's counters is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub domain: String,
    pub kind: EventKind,
}

impl Event {
    pub fn new(domain: impl Into<String>, kind: EventKind) -> Self {
        Self {
            domain: domain.into(),
            kind,
        }
    }

    pub fn bounced(domain: impl Into<String>) -> Self {
        Self::new(domain, EventKind::Bounced)
    }

    pub fn delivered(domain: impl Into<String>) -> Self {
        Self::new(domain, EventKind::Delivered)
    }

    /// Builds an event from the textual kind used in request paths.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEventKind`] if `kind` is not a known outcome.
    pub fn parse(domain: impl Into<String>, kind: &str) -> Result<Self, StoreError> {
        Ok(Self::new(domain, kind.parse()?))
    }
}
