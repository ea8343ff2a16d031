//! Request handlers.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::AppState;
use crate::pipeline::ErrorBody;

/// Body of `POST /api/check-claim`.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    /// Claim text; must not be blank.
    pub claim: String,
}

/// Rate-limit key of the calling client: its peer IP, or `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string());
        Ok(Self(key))
    }
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn check_claim(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    Json(request): Json<ClaimRequest>,
) -> Response {
    if request.claim.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody::new("Claim must not be empty")),
        )
            .into_response();
    }
    if state.limiter.is_limited(&client) {
        warn!(client = %client, "rate limit exceeded");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }

    let outcome = state.checker.check(&request.claim).await;
    let status = if outcome.error_message().is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(outcome.to_body())).into_response()
}
