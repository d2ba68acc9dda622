use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, security_headers_middleware, timeout_middleware,
};
use super::state::AppState;
use super::v1;

/// Create a minimal router without state
///
/// `/ready` and the v1 API need state and are not available here.
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
///
/// Every request is bounded by `request_timeout`.
pub fn create_router_with_state(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Library API
        .nest("/v1", v1::create_v1_router())
        // Add state and middleware
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            timeout_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, HeaderMap, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::REQUEST_ID_HEADER;
    use crate::infrastructure::in_memory::InMemoryLibraryStore;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn app() -> Router {
        let store = Arc::new(InMemoryLibraryStore::new());
        create_router_with_state(crate::in_memory_app_state(store), TIMEOUT)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, headers, json)
    }

    async fn create_book(app: &Router, title: &str, amount: i32) -> i64 {
        let (status, _, body) = send(
            app,
            Method::POST,
            "/v1/books",
            Some(json!({"title": title, "author": "Frank Herbert", "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn create_user(app: &Router, username: &str) -> i64 {
        let (status, _, body) = send(
            app,
            Method::POST,
            "/v1/users",
            Some(json!({
                "username": username,
                "password": "secret",
                "email": format!("{}@email.com", username),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app();

        let (status, _, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _, body) = send(&app, Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "store");

        let (status, _, _) = send(&app, Method::GET, "/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stateless_router() {
        let (status, _, _) = send(&create_router(), Method::GET, "/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_get_book() {
        let app = app();
        let id = create_book(&app, "Dune", 2).await;
        assert_eq!(id, 1);

        let (status, headers, body) =
            send(&app, Method::GET, &format!("/v1/books/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["author"], "Frank Herbert");
        assert_eq!(body["amount"], 2);
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_empty_catalogue_is_not_found() {
        let app = app();

        let (status, _, body) = send(&app, Method::GET, "/v1/books", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
        assert_eq!(body["error"]["code"], "book_not_found");
    }

    #[tokio::test]
    async fn test_search_books_by_title() {
        let app = app();
        create_book(&app, "Dune", 1).await;
        create_book(&app, "Emma", 1).await;

        let (status, _, body) = send(&app, Method::GET, "/v1/books?title=dun", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Dune");

        let (status, _, body) = send(&app, Method::GET, "/v1/books", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_book_id() {
        let app = app();

        let (status, _, body) = send(&app, Method::GET, "/v1/books/ID", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "book id should be a positive integer");

        let (status, _, _) = send(&app, Method::DELETE, "/v1/books/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = app();

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/v1/books",
            Some(json!({"title": 7, "author": "x", "amount": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request_body");
    }

    #[tokio::test]
    async fn test_book_validation_error() {
        let app = app();

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/v1/books",
            Some(json!({"title": "Dune", "author": "Herbert", "amount": 0})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation");
    }

    #[tokio::test]
    async fn test_update_and_delete_book() {
        let app = app();
        let id = create_book(&app, "Dune", 1).await;
        let uri = format!("/v1/books/{}", id);

        let (status, _, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"title": "Dune Messiah", "author": "Frank Herbert", "amount": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, _, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body["title"], "Dune Messiah");
        assert!(body.get("updated_at").is_some());

        let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "book_not_found");
    }

    #[tokio::test]
    async fn test_update_missing_book() {
        let app = app();

        let (status, _, body) = send(
            &app,
            Method::PUT,
            "/v1/books/99",
            Some(json!({"title": "Dune", "author": "Frank Herbert", "amount": 3})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "book_not_found");
    }

    #[tokio::test]
    async fn test_user_lifecycle_hides_password() {
        let app = app();
        let id = create_user(&app, "reader").await;
        let uri = format!("/v1/users/{}", id);

        let (status, _, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "reader");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());

        let (status, _, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"username": "reader", "password": "changed", "email": "new@email.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "user_not_found");
    }

    #[tokio::test]
    async fn test_duplicate_user_is_bad_request() {
        let app = app();
        create_user(&app, "reader").await;

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/v1/users",
            Some(json!({"username": "reader", "password": "secret", "email": "reader@email.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "already_exists");
    }

    #[tokio::test]
    async fn test_invalid_user_email() {
        let app = app();

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/v1/users",
            Some(json!({"username": "reader", "password": "secret", "email": "a.b.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "invalid email address");
    }

    #[tokio::test]
    async fn test_loan_flow() {
        let app = app();
        let user = create_user(&app, "reader").await;
        let book = create_book(&app, "Dune", 1).await;
        let loan = json!({"user_id": user, "book_id": book});

        let (status, _, _) = send(&app, Method::POST, "/v1/loans/borrow", Some(loan.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) =
            send(&app, Method::POST, "/v1/loans/borrow", Some(loan.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "return_first");

        let (_, _, body) = send(&app, Method::GET, &format!("/v1/books/{}", book), None).await;
        assert_eq!(body["amount"], 0);

        let (status, _, body) =
            send(&app, Method::GET, &format!("/v1/loans/{}", user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["book_id"], book);
        assert_eq!(body[0]["is_returned"], false);

        let (status, _, _) = send(&app, Method::POST, "/v1/loans/return", Some(loan.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) = send(&app, Method::POST, "/v1/loans/return", Some(loan)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "loan_already_returned");

        let (_, _, body) = send(&app, Method::GET, &format!("/v1/books/{}", book), None).await;
        assert_eq!(body["amount"], 1);
    }

    #[tokio::test]
    async fn test_borrow_unavailable_book() {
        let app = app();
        let first = create_user(&app, "first").await;
        let second = create_user(&app, "second").await;
        let book = create_book(&app, "Dune", 1).await;

        let (status, _, _) = send(
            &app,
            Method::POST,
            "/v1/loans/borrow",
            Some(json!({"user_id": first, "book_id": book})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/v1/loans/borrow",
            Some(json!({"user_id": second, "book_id": book})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "book_unavailable");
    }

    #[tokio::test]
    async fn test_borrow_with_invalid_ids() {
        let app = app();

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/v1/loans/borrow",
            Some(json!({"user_id": 0, "book_id": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "user ID and book ID should be positive integers"
        );
    }

    #[tokio::test]
    async fn test_user_without_loans() {
        let app = app();
        let user = create_user(&app, "reader").await;

        let (status, _, body) =
            send(&app, Method::GET, &format!("/v1/loans/{}", user), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "no_loans_found");
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let store =
            Arc::new(InMemoryLibraryStore::new().with_latency(Duration::from_millis(200)));
        let app = create_router_with_state(
            crate::in_memory_app_state(store),
            Duration::from_millis(20),
        );

        let (status, _, body) = send(&app, Method::GET, "/v1/books", None).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["type"], "timeout_error");
        assert_eq!(body["error"]["code"], "timeout");
    }
}
