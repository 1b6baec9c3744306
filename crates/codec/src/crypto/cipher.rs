//! AES-256-GCM sealing and opening of opaque byte buffers.
//!
//! GCM runs with a 16-byte nonce (J0 derived through GHASH, as in OpenSSL)
//! and a detached 16-byte tag. Ciphertext is the same length as plaintext.
//!
//! **Nonce-as-salt.** The PBKDF2 salt for a record is its nonce. Records carry
//! no separate salt field, so both seal and open derive the key from
//! `(master secret, nonce)`. This is a fixed property of the stored format;
//! changing it needs a versioned migration of every stored record.

use aes_gcm::{
    aead::{consts::U16, rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};

use super::kdf::{derive_key, DerivedKey};
use crate::error::CodecError;
use crate::secret::MasterSecret;

/// Byte length of the per-record nonce.
pub const NONCE_LEN: usize = 16;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// The ciphertext + nonce + tag triple produced by [`seal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRecord {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub auth_tag: [u8; TAG_LEN],
}

impl SealedRecord {
    /// Lowercase hex of the nonce, as stored in the `iv` metadata column.
    pub fn nonce_hex(&self) -> String {
        hex::encode(self.nonce)
    }

    /// Lowercase hex of the tag, as stored in the `authTag` metadata column.
    pub fn auth_tag_hex(&self) -> String {
        hex::encode(self.auth_tag)
    }
}

/// Nonce and tag recovered from split-form metadata.
///
/// Lengths are not checked here; [`open`] rejects anything that is not
/// 16 bytes with the same generic failure as a bad tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFields {
    pub nonce: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

impl SplitFields {
    /// Parse the hex `iv` and `authTag` metadata fields.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] if either field is not valid hex.
    pub fn from_hex(nonce_hex: &str, auth_tag_hex: &str) -> Result<Self, CodecError> {
        let nonce = hex::decode(nonce_hex)
            .map_err(|e| CodecError::InvalidFormat(format!("nonce is not hex: {e}")))?;
        let auth_tag = hex::decode(auth_tag_hex)
            .map_err(|e| CodecError::InvalidFormat(format!("auth tag is not hex: {e}")))?;
        Ok(Self { nonce, auth_tag })
    }
}

/// Encrypt `plaintext` under a key derived from `secret`.
///
/// A fresh nonce is drawn from the OS CSPRNG for every call, so sealing the
/// same plaintext twice yields unrelated records.
///
/// # Errors
///
/// Returns [`CodecError::EncryptionFailure`] if the RNG, KDF, or cipher fails.
/// Nothing partial is returned on error.
pub fn seal(
    secret: &MasterSecret,
    iterations: u32,
    plaintext: &[u8],
) -> Result<SealedRecord, CodecError> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CodecError::EncryptionFailure(format!("random source unavailable: {e}")))?;

    let key = derive_key(secret.as_bytes(), &nonce, iterations)?;
    let cipher = build_cipher(&key).map_err(|_| {
        CodecError::EncryptionFailure("cipher rejected derived key".into())
    })?;

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&nonce), b"", &mut ciphertext)
        .map_err(|_| CodecError::EncryptionFailure("aead encryption failed".into()))?;

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&tag);

    Ok(SealedRecord {
        ciphertext,
        nonce,
        auth_tag,
    })
}

/// Verify and decrypt a sealed triple.
///
/// The tag is checked before any plaintext is released.
///
/// # Errors
///
/// Returns [`CodecError::DecryptionFailed`] for every failure: wrong key,
/// altered ciphertext/nonce/tag, or fields of the wrong length.
pub fn open(
    secret: &MasterSecret,
    iterations: u32,
    ciphertext: &[u8],
    nonce: &[u8],
    auth_tag: &[u8],
) -> Result<Vec<u8>, CodecError> {
    if nonce.len() != NONCE_LEN || auth_tag.len() != TAG_LEN {
        return Err(CodecError::DecryptionFailed);
    }

    let key =
        derive_key(secret.as_bytes(), nonce, iterations).map_err(|_| CodecError::DecryptionFailed)?;
    let cipher = build_cipher(&key)?;

    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(nonce),
            b"",
            &mut plaintext,
            Tag::<U16>::from_slice(auth_tag),
        )
        .map_err(|_| CodecError::DecryptionFailed)?;

    Ok(plaintext)
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256Gcm16, CodecError> {
    Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| CodecError::DecryptionFailed)
}
