//! PostgreSQL pool construction and startup readiness check.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::Config;

/// Builds a connection pool from the configured pool settings.
///
/// The pool connects lazily; call [`status_check`] to wait until the database
/// actually answers.
///
/// # Errors
///
/// Returns an error if the database URL cannot be parsed.
pub fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres store backend")?;

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect_lazy(database_url)
        .context("Invalid database connection string")
}

/// Waits until the database accepts a full `SELECT true` round trip.
///
/// Retries with exponential backoff (100ms, 200ms, 400ms, ... capped at 1s)
/// until `deadline` expires.
///
/// # Errors
///
/// Returns an error if the database did not answer before the deadline.
pub async fn status_check(pool: &PgPool, deadline: Duration) -> Result<()> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(1))
        .map(jitter);

    let attempt = Retry::start(strategy, || async {
        let ready = sqlx::query_scalar::<_, bool>("SELECT true")
            .fetch_one(pool)
            .await;
        if let Err(e) = &ready {
            tracing::debug!(error = %e, "Database not ready yet");
        }
        ready
    });

    let ready = tokio::time::timeout(deadline, attempt)
        .await
        .with_context(|| format!("Database not ready within {}ms", deadline.as_millis()))?
        .context("Database readiness query failed")?;

    if !ready {
        anyhow::bail!("Database readiness query returned false");
    }

    Ok(())
}
