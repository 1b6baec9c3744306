//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type handed to the HTTP boundary.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Unreadable`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: empty file name or bad sealed-text encoding.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No file with this id exists for the requesting owner.
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored ciphertext failed authentication. The cause is never exposed.
    #[error("file unreadable or corrupt")]
    Unreadable,

    /// An unexpected internal error occurred (I/O, RNG, configuration).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Unreadable => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "VALIDATION_ERROR",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Unreadable => "FILE_UNREADABLE",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
