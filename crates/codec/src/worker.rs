//! [`AsyncCodec`]: runs codec calls on Tokio's blocking pool.
//!
//! Each seal/open spends most of its time in PBKDF2. Running that on a
//! reactor thread stalls every other task on it, so calls are moved to
//! `spawn_blocking`, gated by a semaphore so that a burst of uploads cannot
//! monopolise the blocking pool.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task;
use tracing::error;

use crate::codec::VaultCodec;
use crate::crypto::SealedRecord;
use crate::error::CodecError;

/// Cheaply cloneable async front-end over a shared [`VaultCodec`].
#[derive(Clone, Debug)]
pub struct AsyncCodec {
    codec: Arc<VaultCodec>,
    permits: Arc<Semaphore>,
}

impl AsyncCodec {
    /// Allow at most `workers` concurrent blocking jobs (minimum 1).
    pub fn new(codec: VaultCodec, workers: usize) -> Self {
        Self {
            codec: Arc::new(codec),
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Synchronous codec, for callers already off the reactor.
    pub fn codec(&self) -> &VaultCodec {
        &self.codec
    }

    /// Seal `plaintext` on a blocking thread.
    pub async fn seal(&self, plaintext: Vec<u8>) -> Result<SealedRecord, CodecError> {
        self.run(
            move |codec| codec.seal(&plaintext),
            || CodecError::EncryptionFailure("codec worker did not complete".into()),
        )
        .await
    }

    /// Open a split-form record on a blocking thread.
    pub async fn open(
        &self,
        ciphertext: Vec<u8>,
        nonce: Vec<u8>,
        auth_tag: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        self.run(
            move |codec| codec.open(&ciphertext, &nonce, &auth_tag),
            || CodecError::DecryptionFailed,
        )
        .await
    }

    /// Open a blob with hex nonce/tag metadata on a blocking thread.
    pub async fn open_split(
        &self,
        ciphertext: Vec<u8>,
        nonce_hex: String,
        auth_tag_hex: String,
    ) -> Result<Vec<u8>, CodecError> {
        self.run(
            move |codec| codec.open_split(&ciphertext, &nonce_hex, &auth_tag_hex),
            || CodecError::DecryptionFailed,
        )
        .await
    }

    /// Compact-encode `plaintext` on a blocking thread.
    pub async fn encode_text(&self, plaintext: String) -> Result<String, CodecError> {
        self.run(
            move |codec| codec.encode_text(&plaintext),
            || CodecError::EncryptionFailure("codec worker did not complete".into()),
        )
        .await
    }

    /// Decode a compact string on a blocking thread.
    pub async fn decode_text(&self, encoded: String) -> Result<String, CodecError> {
        self.run(
            move |codec| codec.decode_text(&encoded),
            || CodecError::DecryptionFailed,
        )
        .await
    }

    async fn run<T, F, E>(&self, job: F, on_abort: E) -> Result<T, CodecError>
    where
        T: Send + 'static,
        F: FnOnce(&VaultCodec) -> Result<T, CodecError> + Send + 'static,
        E: FnOnce() -> CodecError,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| on_abort_closed())?;

        let codec = Arc::clone(&self.codec);
        let handle = task::spawn_blocking(move || {
            let _permit = permit;
            job(&codec)
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "codec worker aborted");
                Err(on_abort())
            }
        }
    }
}

fn on_abort_closed() -> CodecError {
    CodecError::EncryptionFailure("codec worker pool is closed".into())
}
