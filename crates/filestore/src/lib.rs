//! Encrypted file storage in split form.
//!
//! Each uploaded file becomes a ciphertext blob named by a fresh UUID plus a
//! [`common::FileRecord`] carrying the hex nonce and tag needed to open it.
//! Sealing and opening run through [`vault_codec::AsyncCodec`] so the key
//! derivation never blocks the async runtime.

pub mod blob;
pub mod config;
pub mod error;
pub mod metadata;
pub mod vault;

pub use blob::{BlobStore, LocalBlobStore};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use metadata::{InMemoryMetadataStore, MetadataStore};
pub use vault::{FileVault, NewFile};
