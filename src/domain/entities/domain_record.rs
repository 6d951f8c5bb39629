//! Per-domain counter record.

use serde::Serialize;

use super::event::EventKind;

/// Bounce and delivery counters for a single mail domain.
///
/// Records are owned by a [`crate::domain::repositories::CounterStore`];
/// every read hands out a copy, so callers can never mutate stored state
/// outside of [`CounterStore::insert`](crate::domain::repositories::CounterStore::insert).
///
/// Counters only grow. There is no decrement or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainRecord {
    pub name: String,
    pub bounced: u64,
    pub delivered: u64,
}

impl DomainRecord {
    /// Creates a zero-valued record for `name`.
    ///
    /// This is also what stores return for a domain they have never seen:
    /// an unknown domain and a domain with zero events look the same.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounced: 0,
            delivered: 0,
        }
    }

    /// Creates a record with explicit counter values.
    pub fn new(name: impl Into<String>, bounced: u64, delivered: u64) -> Self {
        Self {
            name: name.into(),
            bounced,
            delivered,
        }
    }

    /// Applies a single event of `kind` to the matching counter.
    pub fn increment(&mut self, kind: EventKind) {
        match kind {
            EventKind::Bounced => self.bounced = self.bounced.saturating_add(1),
            EventKind::Delivered => self.delivered = self.delivered.saturating_add(1),
        }
    }

    /// Total number of events seen for this domain.
    pub fn total(&self) -> u64 {
        self.bounced.saturating_add(self.delivered)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record() {
        let record = DomainRecord::empty("example.com");

        assert_eq!(record.name, "example.com");
        assert_eq!(record.bounced, 0);
        assert_eq!(record.delivered, 0);
        assert!(record.is_empty());
    }

    #[test]
    fn test_increment_selects_counter() {
        let mut record = DomainRecord::empty("example.com");

        record.increment(EventKind::Delivered);
        record.increment(EventKind::Delivered);
        record.increment(EventKind::Bounced);

        assert_eq!(record.delivered, 2);
        assert_eq!(record.bounced, 1);
        assert_eq!(record.total(), 3);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_increment_saturates() {
        let mut record = DomainRecord::new("example.com", u64::MAX, 0);

        record.increment(EventKind::Bounced);

        assert_eq!(record.bounced, u64::MAX);
    }

    #[test]
    fn test_record_serialization() {
        let record = DomainRecord::new("mail.test", 3, 7);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "mail.test");
        assert_eq!(json["bounced"], 3);
        assert_eq!(json["delivered"], 7);
    }
}
