//! Error taxonomy of the vault codec.

use common::ServiceError;
use thiserror::Error;

/// Errors produced by the codec.
///
/// [`CodecError::DecryptionFailed`] deliberately carries no cause: a wrong
/// key, a flipped bit, and a truncated tag all look the same from outside.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The master secret is missing or unusable. Raised at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The RNG, KDF, or cipher failed while sealing.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The sealed record did not authenticate.
    #[error("decryption failed: data is corrupt or was sealed under a different key")]
    DecryptionFailed,

    /// A compact text value or stored hex field could not be parsed.
    #[error("invalid sealed format: {0}")]
    InvalidFormat(String),
}

impl CodecError {
    /// Stable identifier suitable for a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::Configuration(_) => "configuration_error",
            CodecError::EncryptionFailure(_) => "encryption_failure",
            CodecError::DecryptionFailed => "decryption_failed",
            CodecError::InvalidFormat(_) => "invalid_format",
        }
    }
}

impl From<CodecError> for ServiceError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::DecryptionFailed => ServiceError::Unreadable,
            CodecError::InvalidFormat(msg) => ServiceError::BadRequest(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
