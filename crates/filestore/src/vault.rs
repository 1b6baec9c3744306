//! [`FileVault`]: owner-scoped upload, download, and lifecycle of sealed files.
//!
//! # Consistency
//!
//! A metadata row and its ciphertext blob exist together or not at all, as
//! far as readers are concerned:
//! - upload writes the blob first and only then inserts the row; if the
//!   insert fails the blob is removed again.
//! - delete removes the row first; a blob whose removal then fails is an
//!   unreadable orphan (its nonce and tag are gone), never a dangling row.

use bytes::Bytes;
use chrono::Utc;
use common::{FileRecord, FileUpdate};
use tracing::{info, warn};
use uuid::Uuid;
use vault_codec::AsyncCodec;

use crate::blob::BlobStore;
use crate::error::{Result, StoreError};
use crate::metadata::MetadataStore;

/// A file as handed in by the upload boundary.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
    pub folder: Option<String>,
    pub contents: Bytes,
}

/// Sealed file storage over a blob store and a metadata store.
pub struct FileVault<B, M> {
    codec: AsyncCodec,
    blobs: B,
    metadata: M,
}

impl<B: BlobStore, M: MetadataStore> FileVault<B, M> {
    pub fn new(codec: AsyncCodec, blobs: B, metadata: M) -> Self {
        Self {
            codec,
            blobs,
            metadata,
        }
    }

    /// Seal and store a file for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidInput`] if the name is blank
    /// - [`StoreError::Codec`] if sealing fails; nothing is stored
    /// - blob or metadata errors; no row is left behind
    pub async fn upload(&self, user_id: &str, file: NewFile) -> Result<FileRecord> {
        let name = file.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("file name must not be empty".into()));
        }

        let size = file.contents.len() as u64;
        let sealed = self.codec.seal(file.contents.to_vec()).await?;

        let id = Uuid::new_v4();
        let storage_path = self.blobs.put(id, &sealed.ciphertext).await?;

        let now = Utc::now();
        let record = FileRecord {
            id,
            user_id: user_id.to_owned(),
            name: name.to_owned(),
            mime_type: file.mime_type,
            size,
            storage_path,
            iv: sealed.nonce_hex(),
            auth_tag: sealed.auth_tag_hex(),
            folder: file.folder,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.metadata.insert(record.clone()).await {
            if let Err(cleanup) = self.blobs.delete(id).await {
                warn!(file_id = %id, error = %cleanup, "failed to remove blob after metadata insert failed");
            }
            return Err(e);
        }

        info!(file_id = %id, size, "file stored");
        Ok(record)
    }

    /// Fetch and open a file.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if `user_id` has no file `id`
    /// - [`StoreError::Codec`] with `DecryptionFailed` if the blob or its
    ///   metadata was altered
    pub async fn download(&self, user_id: &str, id: Uuid) -> Result<(FileRecord, Bytes)> {
        let record = self.describe(user_id, id).await?;
        let ciphertext = self.blobs.get(id).await?;

        let plaintext = self
            .codec
            .open_split(ciphertext, record.iv.clone(), record.auth_tag.clone())
            .await
            .map_err(|e| {
                warn!(file_id = %id, kind = e.kind(), "stored file could not be opened");
                e
            })?;

        Ok((record, Bytes::from(plaintext)))
    }

    /// Metadata of one file.
    pub async fn describe(&self, user_id: &str, id: Uuid) -> Result<FileRecord> {
        self.metadata
            .get(user_id, id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    /// Metadata of every file `user_id` owns.
    pub async fn list(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        self.metadata.list(user_id).await
    }

    /// Rename or move a file. The sealed content is untouched.
    pub async fn update(&self, user_id: &str, id: Uuid, update: FileUpdate) -> Result<FileRecord> {
        let mut record = self.describe(user_id, id).await?;

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(StoreError::InvalidInput("file name must not be empty".into()));
            }
            record.name = name.to_owned();
        }
        if let Some(folder) = update.folder {
            record.folder = Some(folder);
        }
        record.updated_at = Utc::now();

        self.metadata.update(record.clone()).await?;
        Ok(record)
    }

    /// Remove a file's metadata and blob.
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<()> {
        self.metadata
            .remove(user_id, id)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        match self.blobs.delete(id).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                warn!(file_id = %id, "blob already absent on delete");
            }
            Err(e) => {
                warn!(file_id = %id, error = %e, "blob removal failed; ciphertext orphaned");
            }
        }

        info!(file_id = %id, "file deleted");
        Ok(())
    }
}
