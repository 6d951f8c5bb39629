//! Event ingestion and domain classification service.

use std::sync::Arc;
use tracing::debug;

use crate::domain::classifier::{Classification, Thresholds, classify};
use crate::domain::entities::{DomainRecord, Event, EventKind};
use crate::domain::repositories::CounterStore;
use crate::error::AppError;

/// Routes delivery outcomes into the counter store and answers
/// classification lookups.
///
/// Store errors are converted to [`AppError`] here so handlers never see
/// (or forward) storage-layer error text.
pub struct EventRouter {
    store: Arc<dyn CounterStore>,
    thresholds: Thresholds,
}

impl EventRouter {
    pub fn new(store: Arc<dyn CounterStore>, thresholds: Thresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Records one delivery outcome for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store cannot be written, or
    /// [`AppError::Shutdown`] if the store has lost integrity.
    pub async fn record_outcome(&self, domain: &str, kind: EventKind) -> Result<(), AppError> {
        let event = Event::new(domain, kind);
        self.store.insert(&event).await?;

        debug!(domain = %event.domain, kind = %event.kind, "event recorded");
        Ok(())
    }

    /// Records an outcome given as a URL path segment.
    ///
    /// # Errors
    ///
    /// Returns a `400 Bad Request` error if `kind` is not a known outcome;
    /// no counter is touched in that case. Otherwise as [`Self::record_outcome`].
    pub async fn record_outcome_str(&self, domain: &str, kind: &str) -> Result<(), AppError> {
        let event = Event::parse(domain, kind)?;
        self.record_outcome(&event.domain, event.kind).await
    }

    /// Classifies `domain` from its current counters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store cannot be read.
    pub async fn lookup(&self, domain: &str) -> Result<Classification, AppError> {
        let (_, classification) = self.inspect(domain).await?;
        Ok(classification)
    }

    /// Returns the counters for `domain` together with their classification,
    /// both taken from a single store read.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store cannot be read.
    pub async fn inspect(
        &self,
        domain: &str,
    ) -> Result<(DomainRecord, Classification), AppError> {
        let record = self.snapshot(domain).await?;
        let classification = classify(&record, &self.thresholds);
        Ok((record, classification))
    }

    /// Returns a copy of the current counters for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store cannot be read.
    pub async fn snapshot(&self, domain: &str) -> Result<DomainRecord, AppError> {
        Ok(self.store.query(domain).await?)
    }

    /// Whether the counter store can currently serve requests.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockCounterStore, StoreError};
    use axum::http::StatusCode;

    fn router(mock: MockCounterStore) -> EventRouter {
        EventRouter::new(Arc::new(mock), Thresholds::default())
    }

    #[tokio::test]
    async fn test_record_outcome_inserts_event() {
        let mut mock = MockCounterStore::new();
        mock.expect_insert()
            .withf(|event| event.domain == "test.com" && event.kind == EventKind::Bounced)
            .times(1)
            .returning(|_| Ok(()));

        let result = router(mock)
            .record_outcome("test.com", EventKind::Bounced)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_record_outcome_str_rejects_unknown_kind() {
        let mut mock = MockCounterStore::new();
        mock.expect_insert().times(0);

        let err = router(mock)
            .record_outcome_str("test.com", "opened")
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_response().error, "unknown event kind: opened");
    }

    #[tokio::test]
    async fn test_record_outcome_str_parses_kind() {
        let mut mock = MockCounterStore::new();
        mock.expect_insert()
            .withf(|event| event.kind == EventKind::Delivered)
            .times(1)
            .returning(|_| Ok(()));

        assert!(
            router(mock)
                .record_outcome_str("test.com", "delivered")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_record_outcome_database_error_is_internal() {
        let mut mock = MockCounterStore::new();
        mock.expect_insert()
            .times(1)
            .returning(|_| Err(StoreError::Database(sqlx::Error::PoolTimedOut)));

        let err = router(mock)
            .record_outcome("test.com", EventKind::Delivered)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_lookup_classifies_record() {
        let mut mock = MockCounterStore::new();
        mock.expect_query()
            .withf(|domain| domain == "big.com")
            .times(1)
            .returning(|d| Ok(DomainRecord::new(d, 0, 1_000)));

        let result = router(mock).lookup("big.com").await.unwrap();

        assert_eq!(result, Classification::CatchAll);
    }

    #[tokio::test]
    async fn test_lookup_unknown_domain() {
        let mut mock = MockCounterStore::new();
        mock.expect_query()
            .times(1)
            .returning(|d| Ok(DomainRecord::empty(d)));

        let result = router(mock).lookup("blah").await.unwrap();

        assert_eq!(result, Classification::Unknown);
    }

    #[tokio::test]
    async fn test_lookup_uses_configured_threshold() {
        let mut mock = MockCounterStore::new();
        mock.expect_query()
            .times(1)
            .returning(|d| Ok(DomainRecord::new(d, 0, 5)));

        let router = EventRouter::new(
            Arc::new(mock),
            Thresholds {
                catch_all_delivered: 5,
            },
        );

        assert_eq!(
            router.lookup("small.com").await.unwrap(),
            Classification::CatchAll
        );
    }

    #[tokio::test]
    async fn test_inspect_reads_store_once() {
        let mut mock = MockCounterStore::new();
        mock.expect_query()
            .withf(|domain| domain == "mixed.com")
            .times(1)
            .returning(|d| Ok(DomainRecord::new(d, 2, 1_500)));

        let (record, classification) = router(mock).inspect("mixed.com").await.unwrap();

        assert_eq!(record.delivered, 1_500);
        assert_eq!(record.bounced, 2);
        assert_eq!(classification, Classification::NotCatchAll);
    }

    #[tokio::test]
    async fn test_lookup_poisoned_store_requests_shutdown() {
        let mut mock = MockCounterStore::new();
        mock.expect_query()
            .times(1)
            .returning(|_| Err(StoreError::Poisoned));

        let err = router(mock).lookup("any.com").await.unwrap_err();

        assert!(err.is_shutdown());
    }
}
