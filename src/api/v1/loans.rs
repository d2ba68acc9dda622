//! Loan endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parse_id;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::loan::{Loan, LoanKey};
use crate::domain::user::UserId;

/// Request body for borrowing or returning a book
#[derive(Debug, Clone, Deserialize)]
pub struct LoanApiRequest {
    pub user_id: i64,
    pub book_id: i64,
}

impl LoanApiRequest {
    fn key(&self) -> Result<LoanKey, ApiError> {
        LoanKey::new(self.user_id, self.book_id)
            .map_err(|e| ApiError::bad_request(e.to_string()).with_code("validation"))
    }
}

/// Loan response
#[derive(Debug, Clone, Serialize)]
pub struct LoanResponse {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub is_returned: bool,
    pub created_at: String,
}

impl From<&Loan> for LoanResponse {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id().as_i64(),
            user_id: loan.user_id().as_i64(),
            book_id: loan.book_id().as_i64(),
            is_returned: loan.is_returned(),
            created_at: loan.created_at().to_rfc3339(),
        }
    }
}

/// GET /v1/loans/{user_id}
pub async fn search_user_loans(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    debug!(user_id = %user_id, "Searching user loans");

    let loans = state.loan_service.search(user_id).await?;

    Ok(Json(loans.iter().map(LoanResponse::from).collect()))
}

/// POST /v1/loans/borrow
pub async fn borrow_book(
    State(state): State<AppState>,
    Json(request): Json<LoanApiRequest>,
) -> Result<StatusCode, ApiError> {
    let key = request.key()?;

    state.loan_service.borrow(key).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/loans/return
pub async fn return_book(
    State(state): State<AppState>,
    Json(request): Json<LoanApiRequest>,
) -> Result<StatusCode, ApiError> {
    let key = request.key()?;

    state.loan_service.return_book(key).await?;

    Ok(StatusCode::NO_CONTENT)
}
