//! Book catalogue endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_id, CreatedResponse};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::book::{Book, BookId};
use crate::infrastructure::book::{CreateBookRequest, UpdateBookRequest};

/// Query parameters for listing books
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    /// Case-insensitive title fragment
    #[serde(default)]
    pub title: Option<String>,
}

/// Request body for creating or replacing a book
#[derive(Debug, Clone, Deserialize)]
pub struct BookApiRequest {
    pub title: String,
    pub author: String,
    pub amount: i32,
}

/// Book response
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub amount: i32,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().as_i64(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            amount: book.amount(),
            created_at: book.created_at().to_rfc3339(),
            updated_at: book.updated_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// GET /v1/books
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = match query.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => {
            debug!(title = %title, "Searching books");
            state.book_service.search(title).await?
        }
        _ => {
            debug!("Listing books");
            state.book_service.list().await?
        }
    };

    Ok(Json(books.iter().map(BookResponse::from).collect()))
}

/// GET /v1/books/{id}
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let id: BookId = parse_id(&id)?;
    debug!(book_id = %id, "Getting book");

    let book = state.book_service.get(id).await?;

    Ok(Json(BookResponse::from(&book)))
}

/// POST /v1/books
pub async fn create_book(
    State(state): State<AppState>,
    Json(request): Json<BookApiRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(title = %request.title, "Creating book");

    let id = state
        .book_service
        .create(CreateBookRequest {
            title: request.title,
            author: request.author,
            amount: request.amount,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.as_i64() })))
}

/// PUT /v1/books/{id}
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BookApiRequest>,
) -> Result<StatusCode, ApiError> {
    let id: BookId = parse_id(&id)?;
    debug!(book_id = %id, "Updating book");

    state
        .book_service
        .update(
            id,
            UpdateBookRequest {
                title: request.title,
                author: request.author,
                amount: request.amount,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/books/{id}
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: BookId = parse_id(&id)?;
    debug!(book_id = %id, "Deleting book");

    state.book_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
