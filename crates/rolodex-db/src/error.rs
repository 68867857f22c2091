//! Database layer errors.

use thiserror::Error;

/// Database layer errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Contact not found: {0}")]
    ContactNotFound(i64),

    #[error("Group not found: {0}")]
    GroupNotFound(i64),

    /// A write was attempted against a record that has never been
    /// persisted.
    #[error("Record has no id")]
    MissingId,
}

pub type DbResult<T> = std::result::Result<T, DbError>;
