//! PostgreSQL implementation of the counter store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{DomainRecord, Event, EventKind};
use crate::domain::repositories::{CounterStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS domains (
        id        BIGSERIAL PRIMARY KEY,
        domain    TEXT   NOT NULL UNIQUE,
        bounced   BIGINT NOT NULL DEFAULT 0 CHECK (bounced >= 0),
        delivered BIGINT NOT NULL DEFAULT 0 CHECK (delivered >= 0)
    )
"#;

#[derive(sqlx::FromRow)]
struct DomainRow {
    domain: String,
    bounced: i64,
    delivered: i64,
}

impl From<DomainRow> for DomainRecord {
    fn from(row: DomainRow) -> Self {
        DomainRecord::new(
            row.domain,
            u64::try_from(row.bounced).unwrap_or_default(),
            u64::try_from(row.delivered).unwrap_or_default(),
        )
    }
}

/// PostgreSQL repository for domain counters.
///
/// Each event is applied with a single `INSERT ... ON CONFLICT DO UPDATE`
/// statement, so creating the row and incrementing the counter happen
/// atomically inside the database. Concurrent first events for the same
/// domain cannot both insert, and concurrent increments cannot overwrite
/// each other.
pub struct PgCounterStore {
    pool: Arc<PgPool>,
}

impl PgCounterStore {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Creates the `domains` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn query(&self, domain: &str) -> Result<DomainRecord, StoreError> {
        let row = sqlx::query_as::<_, DomainRow>(
            r#"
            SELECT domain, bounced, delivered
            FROM domains
            WHERE domain = $1
            "#,
        )
        .bind(domain)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row
            .map(DomainRecord::from)
            .unwrap_or_else(|| DomainRecord::empty(domain)))
    }

    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        let (bounced, delivered): (i64, i64) = match event.kind {
            EventKind::Bounced => (1, 0),
            EventKind::Delivered => (0, 1),
        };

        sqlx::query(
            r#"
            INSERT INTO domains (domain, bounced, delivered)
            VALUES ($1, $2, $3)
            ON CONFLICT (domain) DO UPDATE SET
                bounced   = domains.bounced + EXCLUDED.bounced,
                delivered = domains.delivered + EXCLUDED.delivered
            "#,
        )
        .bind(&event.domain)
        .bind(bounced)
        .bind(delivered)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, bool>("SELECT true")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
