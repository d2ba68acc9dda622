//! Whole-request timeout middleware

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::route_path;
use crate::api::types::ApiError;

/// Abort requests that run longer than the configured limit
///
/// The handler future is dropped on expiry, which rolls back any open store
/// transaction, and the client receives a `504` with code `timeout`.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = route_path(&request);

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(
                method = %method,
                path = %path,
                timeout_ms = limit.as_millis() as u64,
                "Request timed out"
            );
            ApiError::gateway_timeout("request timed out").into_response()
        }
    }
}
