//! Compact text form of a sealed record.
//!
//! ```text
//! <hex(nonce)>:<hex(authTag)>:<hex(ciphertext)>
//! ```
//!
//! The ciphertext field is empty for an empty plaintext.

use super::cipher::SealedRecord;
use crate::error::CodecError;

/// Field separator of the compact form.
pub const SEPARATOR: char = ':';

impl SealedRecord {
    /// Encode this record as `nonce:tag:ciphertext` in lowercase hex.
    pub fn to_compact(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            hex::encode(self.nonce),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext),
        )
    }
}

/// Raw bytes of a parsed compact string.
///
/// Nonce and tag lengths are left for the open path to judge so that a
/// well-formed but wrong-length value fails the same way as a bad tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactFields {
    pub nonce: Vec<u8>,
    pub auth_tag: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl CompactFields {
    /// Split a compact string into its three hex-decoded fields.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] unless the input has exactly three
    /// `:`-separated fields, each valid hex.
    pub fn parse(encoded: &str) -> Result<Self, CodecError> {
        let parts: Vec<&str> = encoded.split(SEPARATOR).collect();
        let [nonce_hex, tag_hex, ciphertext_hex] = parts.as_slice() else {
            return Err(CodecError::InvalidFormat(format!(
                "expected 3 fields, found {}",
                parts.len()
            )));
        };

        Ok(Self {
            nonce: decode_field("nonce", nonce_hex)?,
            auth_tag: decode_field("auth tag", tag_hex)?,
            ciphertext: decode_field("ciphertext", ciphertext_hex)?,
        })
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, CodecError> {
    hex::decode(value).map_err(|e| CodecError::InvalidFormat(format!("{name} is not hex: {e}")))
}
