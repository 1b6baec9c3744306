//! Key derivation, AES-256-GCM sealing, and framing primitives.
//!
//! This module is free of configuration, logging, and async concerns; it is
//! the layer [`crate::VaultCodec`] drives.
//!
//! # Record formats
//!
//! Split form (file at rest):
//!
//! ```text
//! blob      = ciphertext
//! metadata  = { iv: hex(nonce), authTag: hex(tag) }
//! ```
//!
//! Compact form (single string):
//!
//! ```text
//! hex(nonce):hex(tag):hex(ciphertext)
//! ```

pub mod cipher;
pub mod kdf;
pub mod text;

pub use cipher::{SealedRecord, SplitFields, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, derive_key_with_len, DerivedKey, KDF_ITERATIONS, KEY_LEN};
pub use text::CompactFields;
