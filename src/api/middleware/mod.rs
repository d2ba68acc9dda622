//! API middleware components

pub mod logging;
pub mod metrics;
pub mod security;
pub mod timeout;

pub use logging::{logging_middleware, REQUEST_ID_HEADER};
pub use metrics::metrics_middleware;
pub use security::security_headers_middleware;
pub use timeout::timeout_middleware;

use axum::{body::Body, extract::MatchedPath, http::Request};

/// Route pattern when matched, raw path otherwise
pub(crate) fn route_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}
