//! Catch-all classification of domain records.

use serde::Serialize;
use std::fmt;

use crate::domain::entities::DomainRecord;

/// Default number of deliveries (with zero bounces) that marks a domain catch-all.
pub const DEFAULT_CATCH_ALL_THRESHOLD: u64 = 1_000;

/// Outcome of classifying a domain. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    #[serde(rename = "catch-all")]
    CatchAll,
    #[serde(rename = "not catch-all")]
    NotCatchAll,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatchAll => "catch-all",
            Self::NotCatchAll => "not catch-all",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds used by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Minimum delivered count for a bounce-free domain to be catch-all.
    pub catch_all_delivered: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            catch_all_delivered: DEFAULT_CATCH_ALL_THRESHOLD,
        }
    }
}

/// Classifies a record.
///
/// A single bounce disqualifies the domain regardless of how many deliveries
/// it has. Otherwise the domain is catch-all once deliveries reach the threshold.
pub fn classify(record: &DomainRecord, thresholds: &Thresholds) -> Classification {
    if record.bounced > 0 {
        return Classification::NotCatchAll;
    }

    if record.delivered >= thresholds.catch_all_delivered {
        return Classification::CatchAll;
    }

    Classification::Unknown
}
