//! Library v1 API endpoints

pub mod books;
pub mod loans;
pub mod users;

use std::str::FromStr;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::state::AppState;
use super::types::ApiError;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/users", post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/loans/borrow", post(loans::borrow_book))
        .route("/loans/return", post(loans::return_book))
        .route("/loans/{user_id}", get(loans::search_user_loans))
}

/// Body of a `201 Created` response
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Parse a path segment into a typed id, rejecting it as a bad request
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ApiError::bad_request(e.to_string()).with_code("validation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookId;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_id() {
        let id: BookId = parse_id("4").unwrap();
        assert_eq!(id.as_i64(), 4);
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let err = parse_id::<BookId>("ID").unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.response.error.message,
            "book id should be a positive integer"
        );
    }
}
