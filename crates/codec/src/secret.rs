//! [`MasterSecret`]: the single long-lived secret every per-operation key is
//! derived from.
//!
//! # Normalization
//!
//! The configured value must be exactly [`SECRET_LEN`] bytes. Shorter values
//! are padded on the right with ASCII `'0'` bytes, longer ones are truncated
//! to their first [`SECRET_LEN`] bytes. Existing ciphertext depends on this
//! rule; changing it makes every sealed file unreadable.

use std::fmt;

use tracing::warn;

/// Byte length of the master secret (256 bits).
pub const SECRET_LEN: usize = 32;

/// Byte appended to short secrets.
pub const PAD_BYTE: u8 = b'0';

/// Development-only fallback secret. Anyone who has read this source can
/// decrypt data sealed under it.
pub const FALLBACK_SECRET: &str = "a-very-secure-master-key-that-is-32-bytes-long";

/// How a configured value was brought to [`SECRET_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Already exactly [`SECRET_LEN`] bytes.
    Exact,
    /// Right-padded with [`PAD_BYTE`].
    Padded { original_len: usize },
    /// Cut down to the first [`SECRET_LEN`] bytes.
    Truncated { original_len: usize },
}

/// Fixed-size secret buffer holding exactly [`SECRET_LEN`] bytes.
///
/// Overwritten with zeroes on drop. Never printed, not even in debug builds.
#[derive(Clone)]
pub struct MasterSecret(Box<[u8; SECRET_LEN]>);

impl MasterSecret {
    /// Wrap bytes that are already the right length.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Pad or truncate `raw` to [`SECRET_LEN`] bytes.
    pub fn normalize(raw: &[u8]) -> (Self, Normalization) {
        let mut buf = Box::new([PAD_BYTE; SECRET_LEN]);
        let take = raw.len().min(SECRET_LEN);
        buf[..take].copy_from_slice(&raw[..take]);

        let how = match raw.len() {
            n if n == SECRET_LEN => Normalization::Exact,
            n if n < SECRET_LEN => Normalization::Padded { original_len: n },
            n => Normalization::Truncated { original_len: n },
        };
        (Self(buf), how)
    }

    /// Normalize a configured value, warning loudly when it had to be adjusted.
    pub fn from_configured(raw: &[u8]) -> Self {
        let (secret, how) = Self::normalize(raw);
        match how {
            Normalization::Exact => {}
            Normalization::Padded { original_len } => warn!(
                original_len,
                target_len = SECRET_LEN,
                "master secret shorter than {SECRET_LEN} bytes; padded with '0'"
            ),
            Normalization::Truncated { original_len } => warn!(
                original_len,
                target_len = SECRET_LEN,
                "master secret longer than {SECRET_LEN} bytes; truncated"
            ),
        }
        secret
    }

    /// The well-known development secret, normalized.
    pub fn fallback() -> Self {
        Self::normalize(FALLBACK_SECRET.as_bytes()).0
    }

    /// Access the raw secret bytes (to feed the KDF).
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret([REDACTED])")
    }
}
