//! PBKDF2-HMAC-SHA512 key derivation from the master secret.
//!
//! Every seal and open re-derives its key; nothing is cached. The iteration
//! count is part of the stored-data contract: a record only opens under the
//! count it was sealed with.

use std::fmt;

use hmac::Hmac;
use sha2::Sha512;

use crate::error::CodecError;

/// Byte length of a derived AES-256 key.
pub const KEY_LEN: usize = 32;

/// PBKDF2 round count used for all stored data.
pub const KDF_ITERATIONS: u32 = 100_000;

/// A 32-byte key that lives for one seal/open call.
///
/// Zeroed on drop and redacted in `Debug`.
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive `output_len` bytes from `secret` and `salt`.
///
/// # Errors
///
/// Returns [`CodecError::EncryptionFailure`] if `iterations` or `output_len`
/// is zero, or if the PRF rejects the secret.
pub fn derive_key_with_len(
    secret: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
) -> Result<Vec<u8>, CodecError> {
    if iterations == 0 {
        return Err(CodecError::EncryptionFailure(
            "kdf iterations must be at least 1".into(),
        ));
    }
    if output_len == 0 {
        return Err(CodecError::EncryptionFailure(
            "kdf output length must be at least 1".into(),
        ));
    }

    let mut out = vec![0u8; output_len];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(secret, salt, iterations, &mut out)
        .map_err(|_| CodecError::EncryptionFailure("pbkdf2 rejected its input".into()))?;
    Ok(out)
}

/// Derive a [`KEY_LEN`]-byte cipher key.
///
/// # Errors
///
/// See [`derive_key_with_len`].
pub fn derive_key(secret: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKey, CodecError> {
    if iterations == 0 {
        return Err(CodecError::EncryptionFailure(
            "kdf iterations must be at least 1".into(),
        ));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(secret, salt, iterations, &mut key)
        .map_err(|_| CodecError::EncryptionFailure("pbkdf2 rejected its input".into()))?;
    Ok(DerivedKey(key))
}
