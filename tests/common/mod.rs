#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use catchall_detector::config::HttpTimeouts;
use catchall_detector::domain::classifier::Thresholds;
use catchall_detector::domain::entities::{DomainRecord, Event};
use catchall_detector::domain::repositories::{CounterStore, StoreError};
use catchall_detector::infrastructure::persistence::MemoryCounterStore;
use catchall_detector::routes::build_router;
use catchall_detector::shutdown::ShutdownCoordinator;
use catchall_detector::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const TIMEOUTS: HttpTimeouts = HttpTimeouts {
    request: Duration::from_secs(5),
    read: Duration::from_secs(5),
    write: Duration::from_secs(5),
};

/// Store whose every call fails like an unreachable database.
pub struct FailingStore;

#[async_trait]
impl CounterStore for FailingStore {
    async fn query(&self, _domain: &str) -> Result<DomainRecord, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn insert(&self, _event: &Event) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Store that reports a lost integrity guarantee.
pub struct PoisonedStore;

#[async_trait]
impl CounterStore for PoisonedStore {
    async fn query(&self, _domain: &str) -> Result<DomainRecord, StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn insert(&self, _event: &Event) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Store that answers only after `delay`.
pub struct SlowStore {
    pub delay: Duration,
}

#[async_trait]
impl CounterStore for SlowStore {
    async fn query(&self, domain: &str) -> Result<DomainRecord, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(DomainRecord::empty(domain))
    }

    async fn insert(&self, _event: &Event) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn create_test_state(store: Arc<dyn CounterStore>) -> AppState {
    AppState::new(store, Thresholds::default(), ShutdownCoordinator::new())
}

/// State backed by a fresh in-memory store, returned alongside for inspection.
pub fn create_memory_state() -> (AppState, MemoryCounterStore) {
    let store = MemoryCounterStore::new();
    (create_test_state(Arc::new(store.clone())), store)
}

pub fn make_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state, TIMEOUTS)).unwrap()
}

pub async fn record_events(server: &TestServer, domain: &str, kind: &str, count: usize) {
    for _ in 0..count {
        server
            .put(&format!("/v1/events/{domain}/{kind}"))
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);
    }
}
