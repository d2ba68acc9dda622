//! Book entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_book, validate_book_id, BookValidationError};
use crate::domain::DomainError;

/// Book identifier - positive integer assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BookId(i64);

impl BookId {
    /// Create a new BookId after validation
    pub fn new(id: i64) -> Result<Self, BookValidationError> {
        validate_book_id(id)?;
        Ok(Self(id))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for BookId {
    type Error = BookValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BookId> for i64 {
    fn from(id: BookId) -> Self {
        id.0
    }
}

impl FromStr for BookId {
    type Err = BookValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| BookValidationError::InvalidId)?;
        Self::new(id)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated title, author and stock, as accepted on create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    title: String,
    author: String,
    amount: i32,
}

impl BookDetails {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        amount: i32,
    ) -> Result<Self, BookValidationError> {
        let title = title.into();
        let author = author.into();
        validate_book(&title, &author, amount)?;

        Ok(Self {
            title,
            author,
            amount,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }
}

/// A book in the catalogue; `amount` is the number of copies available to lend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    amount: i32,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Create a freshly stored book
    pub fn new(id: BookId, details: BookDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: details.title,
            author: details.author,
            amount: details.amount,
            created_at,
            updated_at: None,
        }
    }

    /// Rebuild a book from stored state without re-running creation rules
    ///
    /// Stored stock may legitimately be zero.
    pub fn restore(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        amount: i32,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            amount,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_available(&self) -> bool {
        self.amount > 0
    }

    // Mutators

    /// Replace title, author and stock
    pub fn apply(&mut self, details: BookDetails, updated_at: DateTime<Utc>) {
        self.title = details.title;
        self.author = details.author;
        self.amount = details.amount;
        self.updated_at = Some(updated_at);
    }

    /// Take one copy off the shelf
    ///
    /// Fails without touching the stock when no copy is left.
    pub fn checkout(&mut self) -> Result<(), DomainError> {
        if self.amount - 1 < 0 {
            return Err(DomainError::book_unavailable(format!(
                "book {} unavailable at the moment",
                self.id
            )));
        }

        self.amount -= 1;
        Ok(())
    }

    /// Put one copy back on the shelf
    ///
    /// Not capped at the original inventory, only at what the stock column holds.
    pub fn check_in(&mut self) -> Result<(), DomainError> {
        self.amount = self.amount.checked_add(1).ok_or_else(|| {
            DomainError::validation(format!(
                "book {} cannot hold more than {} copies",
                self.id,
                i32::MAX
            ))
        })?;
        Ok(())
    }
}
