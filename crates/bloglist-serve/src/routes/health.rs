//! Health check endpoints.

use axum::{Extension, Json};
use serde::Serialize;

use crate::auth::Claims;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Public health check endpoint.
///
/// Returns basic service health without authentication.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    message: &'static str,
    username: String,
}

/// Authenticated ping endpoint.
///
/// Lets clients check that their token is still accepted.
pub async fn authenticated_ping(Extension(claims): Extension<Claims>) -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        username: claims.username,
    })
}
