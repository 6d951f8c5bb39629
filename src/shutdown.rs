//! Process-wide shutdown coordination.
//!
//! State machine: `Running -> ShutdownRequested -> Draining -> Terminated`.
//!
//! The state lives in a single `watch` channel. Anything holding a
//! [`ShutdownCoordinator`] can request shutdown (OS signals, or a request
//! pipeline that caught a shutdown error); the process owner in
//! [`crate::server::serve`] waits for the request, drains the listener and
//! then marks the process terminated. Transitions only move forward.

use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownState {
    /// Serving requests normally.
    Running,
    /// Shutdown was asked for; the process owner has not started draining.
    ShutdownRequested,
    /// The listener no longer accepts connections; in-flight requests finish.
    Draining,
    /// Final.
    Terminated,
}

/// Why shutdown was requested. The first request wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The process received an OS signal.
    Signal(&'static str),
    /// A request handler raised a shutdown error.
    Fatal(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(name) => write!(f, "received {name}"),
            Self::Fatal(reason) => write!(f, "fatal error: {reason}"),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: watch::Sender<ShutdownState>,
    reason: OnceLock<ShutdownReason>,
}

/// Shared handle on the shutdown state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

impl ShutdownCoordinator {
    /// Creates a coordinator in the `Running` state.
    #[must_use]
    pub fn new() -> Self {
        let (state, _rx) = watch::channel(ShutdownState::Running);
        Self {
            inner: Arc::new(Inner {
                state,
                reason: OnceLock::new(),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> ShutdownState {
        *self.inner.state.borrow()
    }

    /// The reason recorded by the first shutdown request, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&ShutdownReason> {
        self.inner.reason.get()
    }

    /// Requests graceful shutdown.
    ///
    /// Returns `true` if this call moved the state out of `Running`.
    /// Later requests are ignored, including their reason.
    pub fn request(&self, reason: ShutdownReason) -> bool {
        let accepted = self.inner.state.send_if_modified(|state| {
            if *state < ShutdownState::ShutdownRequested {
                // Set under the channel lock so waiters always see the reason.
                let _ = self.inner.reason.set(reason.clone());
                *state = ShutdownState::ShutdownRequested;
                true
            } else {
                false
            }
        });
        if accepted {
            info!(%reason, "shutdown requested");
        } else {
            warn!(%reason, state = ?self.state(), "shutdown already in progress");
        }
        accepted
    }

    /// Moves to `Draining`, releasing everything waiting on [`draining`](Self::draining).
    pub fn begin_drain(&self) -> bool {
        self.advance(ShutdownState::Draining)
    }

    /// Moves to the final `Terminated` state.
    pub fn terminate(&self) -> bool {
        self.advance(ShutdownState::Terminated)
    }

    /// Resolves once shutdown has been requested, yielding the reason.
    pub async fn requested(&self) -> ShutdownReason {
        self.wait_for(ShutdownState::ShutdownRequested).await;
        self.reason()
            .cloned()
            .unwrap_or(ShutdownReason::Fatal("shutdown without reason".to_string()))
    }

    /// Resolves once draining has begun. Used as the listener's graceful
    /// shutdown trigger.
    pub async fn draining(&self) {
        self.wait_for(ShutdownState::Draining).await;
    }

    async fn requested_silently(&self) {
        self.wait_for(ShutdownState::ShutdownRequested).await;
    }

    async fn wait_for(&self, target: ShutdownState) {
        let mut rx = self.inner.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| *state >= target).await;
    }

    fn advance(&self, target: ShutdownState) -> bool {
        self.inner.state.send_if_modified(|state| {
            if *state < target {
                *state = target;
                true
            } else {
                false
            }
        })
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards SIGINT / SIGTERM (and SIGQUIT on unix) to the coordinator.
pub async fn forward_os_signals(coordinator: ShutdownCoordinator) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = unix_signal(tokio::signal::unix::SignalKind::terminate());
    #[cfg(unix)]
    let quit = unix_signal(tokio::signal::unix::SignalKind::quit());

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    #[cfg(not(unix))]
    let quit = std::future::pending::<()>();

    let name = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
        () = quit => "SIGQUIT",
        () = coordinator.requested_silently() => return,
    };

    coordinator.request(ShutdownReason::Signal(name));
}

#[cfg(unix)]
async fn unix_signal(kind: tokio::signal::unix::SignalKind) {
    match tokio::signal::unix::signal(kind) {
        Ok(mut signal) => {
            signal.recv().await;
        }
        Err(e) => {
            tracing::error!("Failed to install signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
