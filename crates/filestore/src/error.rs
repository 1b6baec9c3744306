//! Errors produced by the file store.

use common::ServiceError;
use thiserror::Error;
use uuid::Uuid;
use vault_codec::CodecError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No file with this id belongs to the requesting owner.
    #[error("file {0} not found")]
    NotFound(Uuid),

    /// A metadata row with this id already exists.
    #[error("file {0} already exists")]
    AlreadyExists(Uuid),

    /// The caller supplied unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Sealing or opening failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Blob I/O failed.
    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata backend failed.
    #[error("metadata store error: {0}")]
    Metadata(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ServiceError::NotFound("File not found".into()),
            StoreError::InvalidInput(msg) => ServiceError::BadRequest(msg),
            StoreError::Codec(e) => e.into(),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
