use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity a lookup was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Book,
    User,
    Loan,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book => write!(f, "book"),
            Self::User => write!(f, "user"),
            Self::Loan => write!(f, "loan"),
        }
    }
}

/// Stable, machine-checkable classification of a [`DomainError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    BookNotFound,
    UserNotFound,
    NoLoansFound,
    AlreadyExists,
    ReturnFirst,
    BookUnavailable,
    LoanAlreadyReturned,
    Persistence,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::BookNotFound => "book_not_found",
            Self::UserNotFound => "user_not_found",
            Self::NoLoansFound => "no_loans_found",
            Self::AlreadyExists => "already_exists",
            Self::ReturnFirst => "return_first",
            Self::BookUnavailable => "book_unavailable",
            Self::LoanAlreadyReturned => "loan_already_returned",
            Self::Persistence => "persistence",
            Self::Timeout => "timeout",
        }
    }

    /// Whether the kind describes something that is absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BookNotFound | Self::UserNotFound | Self::NoLoansFound
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { entity: Entity, message: String },

    #[error("Already exists: {message}")]
    AlreadyExists { message: String },

    #[error("Return first: {message}")]
    ReturnFirst { message: String },

    #[error("Unavailable: {message}")]
    BookUnavailable { message: String },

    #[error("Loan already returned: {message}")]
    LoanAlreadyReturned { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: Entity, message: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            message: message.into(),
        }
    }

    pub fn book_not_found(message: impl Into<String>) -> Self {
        Self::not_found(Entity::Book, message)
    }

    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::not_found(Entity::User, message)
    }

    pub fn no_loans_found(message: impl Into<String>) -> Self {
        Self::not_found(Entity::Loan, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn return_first(message: impl Into<String>) -> Self {
        Self::ReturnFirst {
            message: message.into(),
        }
    }

    pub fn book_unavailable(message: impl Into<String>) -> Self {
        Self::BookUnavailable {
            message: message.into(),
        }
    }

    pub fn loan_already_returned(message: impl Into<String>) -> Self {
        Self::LoanAlreadyReturned {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Machine-readable kind, stable across message rewording
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { entity, .. } => match entity {
                Entity::Book => ErrorKind::BookNotFound,
                Entity::User => ErrorKind::UserNotFound,
                Entity::Loan => ErrorKind::NoLoansFound,
            },
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::ReturnFirst { .. } => ErrorKind::ReturnFirst,
            Self::BookUnavailable { .. } => ErrorKind::BookUnavailable,
            Self::LoanAlreadyReturned { .. } => ErrorKind::LoanAlreadyReturned,
            Self::Storage { .. } => ErrorKind::Persistence,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::NotFound { message, .. }
            | Self::AlreadyExists { message }
            | Self::ReturnFirst { message }
            | Self::BookUnavailable { message }
            | Self::LoanAlreadyReturned { message }
            | Self::Storage { message }
            | Self::Timeout { message } => message,
        }
    }

    /// Prefix the message with operation context, keeping the variant intact
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        let message = match &mut self {
            Self::Validation { message }
            | Self::NotFound { message, .. }
            | Self::AlreadyExists { message }
            | Self::ReturnFirst { message }
            | Self::BookUnavailable { message }
            | Self::LoanAlreadyReturned { message }
            | Self::Storage { message }
            | Self::Timeout { message } => message,
        };
        *message = format!("{}: {}", context, message);
        self
    }
}

/// Attach operation context to the error side of a result
pub trait ResultExt<T> {
    fn context(self, context: impl fmt::Display) -> Result<T, DomainError>;
}

impl<T> ResultExt<T> for Result<T, DomainError> {
    fn context(self, context: impl fmt::Display) -> Result<T, DomainError> {
        self.map_err(|e| e.context(context))
    }
}
