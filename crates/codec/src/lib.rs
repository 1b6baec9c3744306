//! Per-file authenticated encryption at rest.
//!
//! A [`VaultCodec`] turns plaintext into a [`SealedRecord`] (ciphertext, 16-byte
//! nonce, 16-byte tag) under a key derived from the process master secret,
//! and back. Records travel either split (ciphertext blob + hex metadata) or
//! as one compact `nonce:tag:ciphertext` hex string.
//!
//! Startup sequence for a host process:
//! 1. Load [`CodecConfig`] from environment variables.
//! 2. [`telemetry::init`] with the configured log level.
//! 3. [`VaultCodec::from_config`], wrapped in an [`AsyncCodec`] when running
//!    inside Tokio.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod secret;
pub mod telemetry;
pub mod worker;

pub use codec::VaultCodec;
pub use config::{CodecConfig, RuntimeMode};
pub use crypto::{CompactFields, SealedRecord, SplitFields, KDF_ITERATIONS};
pub use error::CodecError;
pub use secret::{MasterSecret, Normalization};
pub use worker::AsyncCodec;
