//! HTTP server initialization and runtime setup.
//!
//! Handles counter store selection, database readiness, shutdown
//! coordination and the Axum server lifecycle.

use crate::config::{Config, StoreBackend};
use crate::connection::IdleTimeoutListener;
use crate::domain::repositories::CounterStore;
use crate::infrastructure::persistence::{MemoryCounterStore, PgCounterStore, database};
use crate::routes::app_router;
use crate::shutdown::{ShutdownCoordinator, forward_os_signals};
use crate::state::AppState;

use anyhow::{Context, Result, bail};
use axum::extract::Request;
use axum::{Router, ServiceExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::normalize_path::NormalizePath;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Counter store (in-memory, or PostgreSQL with readiness check and schema)
/// - Shutdown coordinator and OS signal forwarding
/// - Axum HTTP server
///
/// Returns once the server has drained after a shutdown request.
///
/// # Errors
///
/// Returns an error if:
/// - The database is not reachable within the readiness deadline
/// - Server bind fails
/// - Server runtime error occurs
/// - In-flight requests do not finish within the grace period
pub async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;

    let coordinator = ShutdownCoordinator::new();
    tokio::spawn(forward_os_signals(coordinator.clone()));

    let state = AppState::new(store, config.thresholds(), coordinator.clone());
    let app = app_router(state, config.http_timeouts());

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    serve(
        IdleTimeoutListener::new(listener, config.idle_timeout()),
        app,
        coordinator,
        config.shutdown_grace(),
    )
    .await
}

/// Serves `app` until `coordinator` receives a shutdown request, then drains.
///
/// Once shutdown is requested the listener stops accepting, idle
/// connections are closed and in-flight requests get `grace` to finish.
/// The coordinator ends in [`ShutdownState::Terminated`] on every path.
///
/// # Errors
///
/// Returns an error if the server stops on its own, or if in-flight
/// requests are still running when the grace period ends. In the latter
/// case the server task is aborted and whatever connections remain go down
/// with the runtime.
///
/// [`ShutdownState::Terminated`]: crate::shutdown::ShutdownState::Terminated
pub async fn serve(
    listener: IdleTimeoutListener,
    app: NormalizePath<Router>,
    coordinator: ShutdownCoordinator,
    grace: Duration,
) -> Result<()> {
    let drain = coordinator.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(async move { drain.draining().await })
            .await
    });

    tokio::select! {
        finished = &mut server => {
            coordinator.terminate();
            finished.context("Server task panicked")??;
            bail!("Server stopped without a shutdown request");
        }
        reason = coordinator.requested() => {
            tracing::info!(%reason, "Draining connections");
        }
    }

    coordinator.begin_drain();

    match tokio::time::timeout(grace, &mut server).await {
        Ok(finished) => {
            coordinator.terminate();
            finished.context("Server task panicked")??;
            tracing::info!("Server shut down gracefully");
            Ok(())
        }
        Err(_) => {
            server.abort();
            coordinator.terminate();
            bail!("In-flight requests did not finish within {}ms", grace.as_millis());
        }
    }
}

/// Builds the counter store selected by `STORE_BACKEND`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn CounterStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Counter store: in-memory");
            Ok(Arc::new(MemoryCounterStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = database::connect(config)?;
            database::status_check(&pool, config.db_ready_timeout())
                .await
                .context("Database is not ready")?;
            tracing::info!("Connected to database");

            let store = PgCounterStore::new(Arc::new(pool));
            store
                .ensure_schema()
                .await
                .context("Failed to create the domains table")?;
            tracing::info!("Counter store: PostgreSQL");

            Ok(Arc::new(store))
        }
    }
}
