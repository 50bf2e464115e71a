//! Error types for LibraSync

use thiserror::Error;

/// Stable numeric error codes surfaced to presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StorageFailure = 3,
    NoSuchData = 4,
    BookNotAvailable = 5,
    MemberSuspended = 6,
    BadValue = 7,
    Conflict = 8,
    InvalidCredentials = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Book not available: {0}")]
    BookUnavailable(String),

    #[error("Member suspended: {0}")]
    MemberSuspended(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Code reported alongside the message to callers
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BookUnavailable(_) => ErrorCode::BookNotAvailable,
            AppError::MemberSuspended(_) => ErrorCode::MemberSuspended,
            AppError::Authentication(_) => ErrorCode::InvalidCredentials,
            AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::BusinessRule(_) => ErrorCode::Failure,
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                ErrorCode::StorageFailure
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                ErrorCode::StorageFailure
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorCode::Failure
            }
        }
    }

    /// True for failures the user can act on (as opposed to storage faults)
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            AppError::Storage(_) | AppError::Serialization(_) | AppError::Internal(_)
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
