//! Loan entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_loan, validate_loan_id, LoanValidationError};
use crate::domain::book::BookId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Loan identifier - positive integer assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LoanId(i64);

impl LoanId {
    pub fn new(id: i64) -> Result<Self, LoanValidationError> {
        validate_loan_id(id)?;
        Ok(Self(id))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for LoanId {
    type Error = LoanValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LoanId> for i64 {
    fn from(id: LoanId) -> Self {
        id.0
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The (user, book) pair a borrow or return acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoanKey {
    user_id: UserId,
    book_id: BookId,
}

impl LoanKey {
    /// Build a key from raw ids, rejecting non-positive values
    pub fn new(user_id: i64, book_id: i64) -> Result<Self, LoanValidationError> {
        validate_loan(user_id, book_id)?;

        let user_id = UserId::new(user_id).map_err(|_| LoanValidationError::InvalidLoan)?;
        let book_id = BookId::new(book_id).map_err(|_| LoanValidationError::InvalidLoan)?;

        Ok(Self { user_id, book_id })
    }

    pub fn from_ids(user_id: UserId, book_id: BookId) -> Self {
        Self { user_id, book_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }
}

/// A book checked out by a user; open until returned, never reopened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loan {
    id: LoanId,
    user_id: UserId,
    book_id: BookId,
    is_returned: bool,
    created_at: DateTime<Utc>,
}

impl Loan {
    /// A newly created, not yet returned loan
    pub fn open(id: LoanId, key: LoanKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: key.user_id,
            book_id: key.book_id,
            is_returned: false,
            created_at,
        }
    }

    /// Rebuild a loan from stored state
    pub fn restore(
        id: LoanId,
        user_id: UserId,
        book_id: BookId,
        is_returned: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            is_returned,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn key(&self) -> LoanKey {
        LoanKey::from_ids(self.user_id, self.book_id)
    }

    pub fn is_returned(&self) -> bool {
        self.is_returned
    }

    pub fn is_open(&self) -> bool {
        !self.is_returned
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Transitions

    /// Close the loan
    pub fn mark_returned(&mut self) -> Result<(), DomainError> {
        if self.is_returned {
            return Err(DomainError::loan_already_returned(format!(
                "loan {} has already been returned",
                self.id
            )));
        }

        self.is_returned = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn create_test_loan() -> Loan {
        let key = LoanKey::new(1, 2).unwrap();
        Loan::open(LoanId::new(10).unwrap(), key, Utc::now())
    }

    #[test]
    fn test_loan_key_valid() {
        let key = LoanKey::new(1, 1).unwrap();
        assert_eq!(key.user_id().as_i64(), 1);
        assert_eq!(key.book_id().as_i64(), 1);
    }

    #[test]
    fn test_loan_key_invalid() {
        assert_eq!(LoanKey::new(0, 1), Err(LoanValidationError::InvalidLoan));
        assert_eq!(LoanKey::new(1, 0), Err(LoanValidationError::InvalidLoan));
    }

    #[test]
    fn test_open_loan() {
        let loan = create_test_loan();

        assert!(loan.is_open());
        assert!(!loan.is_returned());
        assert_eq!(loan.user_id().as_i64(), 1);
        assert_eq!(loan.book_id().as_i64(), 2);
        assert_eq!(loan.key(), LoanKey::new(1, 2).unwrap());
    }

    #[test]
    fn test_mark_returned_once() {
        let mut loan = create_test_loan();

        loan.mark_returned().unwrap();
        assert!(loan.is_returned());

        let err = loan.mark_returned().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoanAlreadyReturned);
        assert!(loan.is_returned());
    }

    #[test]
    fn test_loan_serialization_uses_snake_case() {
        let loan = create_test_loan();
        let json = serde_json::to_value(&loan).unwrap();

        assert_eq!(json["id"], 10);
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["book_id"], 2);
        assert_eq!(json["is_returned"], false);
        assert!(json.get("created_at").is_some());
    }
}
