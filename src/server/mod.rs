//! HTTP surface.
//!
//! Two routes: `POST /api/check-claim` runs a claim through the
//! [`ClaimChecker`] behind the per-client [`RateLimiter`], and `GET /health`
//! answers `{"status":"ok"}`.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::pipeline::{ClaimChecker, RateLimiter};

pub use routes::{ClaimRequest, ClientKey};

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    checker: ClaimChecker,
    limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates state around an explicit limiter.
    #[must_use]
    pub const fn new(checker: ClaimChecker, limiter: Arc<RateLimiter>) -> Self {
        Self { checker, limiter }
    }

    /// Creates state with a limiter sized from the checker's configuration.
    #[must_use]
    pub fn from_checker(checker: ClaimChecker) -> Self {
        let config = checker.config();
        let limiter = Arc::new(RateLimiter::new(config.rate_limit, config.rate_window));
        Self::new(checker, limiter)
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/check-claim", post(routes::check_claim))
        .with_state(state)
}

/// Serves on `listener` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "claim check server listening");
    }
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
