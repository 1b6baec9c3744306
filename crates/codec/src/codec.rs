//! [`VaultCodec`]: seal and open bytes or text under the process master secret.

use tracing::{debug, warn};

use crate::config::{CodecConfig, RuntimeMode};
use crate::crypto::{cipher, CompactFields, SealedRecord, SplitFields, KDF_ITERATIONS};
use crate::error::CodecError;
use crate::secret::MasterSecret;

/// The vault codec.
///
/// Holds only the master secret and the KDF cost; every call derives its own
/// key, nonce, and buffers, so a shared `&VaultCodec` is safe to use from any
/// number of threads. Calls are CPU-bound for the length of the key
/// derivation; async callers should go through [`crate::AsyncCodec`].
#[derive(Debug, Clone)]
pub struct VaultCodec {
    secret: MasterSecret,
    iterations: u32,
}

impl VaultCodec {
    /// Build a codec around an explicit secret with the standard KDF cost.
    pub fn new(secret: MasterSecret) -> Self {
        Self {
            secret,
            iterations: KDF_ITERATIONS,
        }
    }

    /// Build a codec from startup configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Configuration`] if no secret is configured while
    /// running in production, or if the configured secret is blank.
    pub fn from_config(cfg: &CodecConfig) -> Result<Self, CodecError> {
        let secret = match (&cfg.encryption_master_key, cfg.vault_mode) {
            (Some(raw), _) if raw.trim().is_empty() => {
                return Err(CodecError::Configuration(
                    "ENCRYPTION_MASTER_KEY is set but empty".into(),
                ));
            }
            (Some(raw), _) => MasterSecret::from_configured(raw.as_bytes()),
            (None, RuntimeMode::Production) => {
                return Err(CodecError::Configuration(
                    "ENCRYPTION_MASTER_KEY is required in production mode".into(),
                ));
            }
            (None, RuntimeMode::Development) => {
                warn!(
                    "ENCRYPTION_MASTER_KEY not set; using the built-in development secret. \
                     Data sealed now is readable by anyone with this source code"
                );
                MasterSecret::fallback()
            }
        };
        Ok(Self::new(secret))
    }

    /// Override the PBKDF2 round count.
    ///
    /// Records only open under the count they were sealed with; use this for
    /// tests and benchmarks, not for stored data.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Seal `plaintext` into a fresh [`SealedRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EncryptionFailure`] if the RNG, KDF, or cipher
    /// fails. The caller must not persist anything in that case.
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedRecord, CodecError> {
        match cipher::seal(&self.secret, self.iterations, plaintext) {
            Ok(record) => {
                debug!(len = plaintext.len(), "sealed");
                Ok(record)
            }
            Err(e) => {
                warn!(kind = e.kind(), "seal failed");
                Err(e)
            }
        }
    }

    /// Verify and decrypt a split-form record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecryptionFailed`] on any verification failure.
    pub fn open(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        auth_tag: &[u8],
    ) -> Result<Vec<u8>, CodecError> {
        cipher::open(&self.secret, self.iterations, ciphertext, nonce, auth_tag).map_err(|e| {
            // Never log why; only that it happened.
            warn!(kind = e.kind(), "open failed");
            e
        })
    }

    /// Open a record produced by [`VaultCodec::seal`].
    pub fn open_record(&self, record: &SealedRecord) -> Result<Vec<u8>, CodecError> {
        self.open(&record.ciphertext, &record.nonce, &record.auth_tag)
    }

    /// Open a blob whose nonce and tag are stored as hex metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] if the metadata is not hex, and
    /// [`CodecError::DecryptionFailed`] if the record does not verify.
    pub fn open_split(
        &self,
        ciphertext: &[u8],
        nonce_hex: &str,
        auth_tag_hex: &str,
    ) -> Result<Vec<u8>, CodecError> {
        let fields = SplitFields::from_hex(nonce_hex, auth_tag_hex)?;
        self.open(ciphertext, &fields.nonce, &fields.auth_tag)
    }

    /// Seal a string into the compact `nonce:tag:ciphertext` form.
    pub fn encode_text(&self, plaintext: &str) -> Result<String, CodecError> {
        Ok(self.seal(plaintext.as_bytes())?.to_compact())
    }

    /// Reverse [`VaultCodec::encode_text`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] for a malformed string or a
    /// plaintext that is not UTF-8, and [`CodecError::DecryptionFailed`] if the
    /// record does not verify.
    pub fn decode_text(&self, encoded: &str) -> Result<String, CodecError> {
        let fields = CompactFields::parse(encoded)?;
        let plaintext = self.open(&fields.ciphertext, &fields.nonce, &fields.auth_tag)?;
        String::from_utf8(plaintext)
            .map_err(|_| CodecError::InvalidFormat("sealed plaintext is not UTF-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> VaultCodec {
        VaultCodec::new(MasterSecret::from_bytes([7u8; 32])).with_iterations(2)
    }

    #[test]
    fn new_uses_standard_cost() {
        let c = VaultCodec::new(MasterSecret::from_bytes([0u8; 32]));
        assert_eq!(c.iterations(), KDF_ITERATIONS);
    }

    #[test]
    fn production_without_secret_is_refused() {
        let cfg = CodecConfig::default();
        let err = VaultCodec::from_config(&cfg).unwrap_err();
        assert!(matches!(err, CodecError::Configuration(_)));
    }

    #[test]
    fn development_without_secret_uses_fallback() {
        let cfg = CodecConfig {
            vault_mode: RuntimeMode::Development,
            ..CodecConfig::default()
        };
        let dev = VaultCodec::from_config(&cfg).unwrap().with_iterations(2);
        let fallback = VaultCodec::new(MasterSecret::fallback()).with_iterations(2);
        let record = dev.seal(b"dev data").unwrap();
        assert_eq!(fallback.open_record(&record).unwrap(), b"dev data");
    }

    #[test]
    fn blank_secret_is_refused() {
        let cfg = CodecConfig {
            encryption_master_key: Some(String::new()),
            vault_mode: RuntimeMode::Development,
            ..CodecConfig::default()
        };
        assert!(matches!(
            VaultCodec::from_config(&cfg),
            Err(CodecError::Configuration(_))
        ));
    }

    #[test]
    fn configured_secret_is_normalized() {
        let cfg = CodecConfig {
            encryption_master_key: Some("short".into()),
            ..CodecConfig::default()
        };
        let configured = VaultCodec::from_config(&cfg).unwrap().with_iterations(2);
        let explicit = VaultCodec::new(MasterSecret::normalize(b"short").0).with_iterations(2);
        let record = configured.seal(b"x").unwrap();
        assert_eq!(explicit.open_record(&record).unwrap(), b"x");
    }

    #[test]
    fn open_split_round_trip() {
        let c = codec();
        let record = c.seal(b"file contents").unwrap();
        let plain = c
            .open_split(&record.ciphertext, &record.nonce_hex(), &record.auth_tag_hex())
            .unwrap();
        assert_eq!(plain, b"file contents");
    }

    #[test]
    fn open_split_bad_hex_is_invalid_format() {
        let c = codec();
        let record = c.seal(b"file contents").unwrap();
        let err = c
            .open_split(&record.ciphertext, "not-hex", &record.auth_tag_hex())
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidFormat(_)));
    }

    #[test]
    fn text_round_trip() {
        let c = codec();
        for s in ["", "hello world", "héllo wörld ✓ 日本語 🦀"] {
            assert_eq!(c.decode_text(&c.encode_text(s).unwrap()).unwrap(), s);
        }
    }

    #[test]
    fn decode_text_rejects_non_utf8_plaintext() {
        let c = codec();
        let encoded = c.seal(&[0xFF, 0xFE, 0x00]).unwrap().to_compact();
        assert!(matches!(
            c.decode_text(&encoded),
            Err(CodecError::InvalidFormat(_))
        ));
    }

    #[test]
    fn decode_text_wrong_length_nonce_is_decryption_failure() {
        let c = codec();
        let encoded = format!("{}:{}:abcd", "00".repeat(12), "00".repeat(16));
        assert!(matches!(
            c.decode_text(&encoded),
            Err(CodecError::DecryptionFailed)
        ));
    }
}
