//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// Broad category of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// Could not open or configure a connection.
    #[display("connection")]
    Connection,
    /// A query or transaction failed.
    #[display("query")]
    Query,
    /// A unique constraint rejected an insert.
    #[display("unique violation")]
    UniqueViolation,
    /// Schema migrations could not be applied.
    #[display("migration")]
    Migration,
    /// A stored value could not be decoded into a domain type.
    #[display("corrupt record")]
    Corrupt,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new query error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Query, message)
    }

    /// Creates an error of a specific kind with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns `true` if a unique constraint rejected the write.
    pub fn is_unique_violation(&self) -> bool {
        self.kind == DbErrorKind::UniqueViolation
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::with_kind(DbErrorKind::UniqueViolation, info.message().to_string())
            }
            other => Self::new(format!("Diesel error: {}", other)),
        }
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::with_kind(DbErrorKind::Connection, format!("Connection error: {}", err))
    }
}
