use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] rolodex_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] rolodex_core::error::CoreError),

    #[error(transparent)]
    ParseError(#[from] rolodex_vcf::error::ParseError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Import failed: {0}")]
    ImportFailed(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
