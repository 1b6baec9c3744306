//! Metadata and response types exchanged with the storage/HTTP layer.
//!
//! These types are serialised as camelCase JSON, the shape of a row in the
//! encrypted-files table and of the bodies returned to API callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// File metadata
// ---------------------------------------------------------------------------

/// Sidecar metadata for one encrypted file.
///
/// The ciphertext itself lives in a blob named after `id`; this record holds
/// everything else needed to open it. `iv` and `auth_tag` are lowercase hex.
/// A record and its blob must be created and destroyed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Identifier shared by the metadata row and the ciphertext blob.
    pub id: Uuid,
    /// Owner of the file; every lookup is scoped by it.
    pub user_id: String,
    /// Display name supplied at upload.
    pub name: String,
    pub mime_type: String,
    /// Plaintext length in bytes.
    pub size: u64,
    /// Where the blob store put the ciphertext.
    pub storage_path: String,
    /// Hex-encoded 16-byte nonce.
    pub iv: String,
    /// Hex-encoded 16-byte authentication tag.
    pub auth_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a [`FileRecord`]. Only metadata may change; the sealed
/// content is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"NOT_FOUND"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        let message = match err {
            // Internal details stay in the logs.
            crate::ServiceError::Internal(_) => "An unexpected error occurred".to_owned(),
            other => other.to_string(),
        };
        Self::new(err.code(), message)
    }
}
