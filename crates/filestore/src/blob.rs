//! Ciphertext blob storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Extension of every ciphertext blob.
pub const BLOB_EXTENSION: &str = "enc";

/// Where sealed file contents live. Blobs are opaque ciphertext; a blob is
/// useless without the nonce and tag kept in its metadata row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `ciphertext` under `id`, returning a locator for the metadata row.
    async fn put(&self, id: Uuid, ciphertext: &[u8]) -> Result<String>;

    /// Read the ciphertext stored under `id`.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if no blob exists for `id`
    async fn get(&self, id: Uuid) -> Result<Vec<u8>>;

    /// Remove the blob stored under `id`.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if no blob exists for `id`
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Blob store backed by a local directory of `<uuid>.enc` files.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Use `root` as the blob directory, creating it if needed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.{BLOB_EXTENSION}"))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, id: Uuid, ciphertext: &[u8]) -> Result<String> {
        let path = self.path_for(id);

        // Write to a temp file in the same directory, then rename, so readers
        // never see a partial blob.
        let tmp_path = self.root.join(format!(".{id}.{BLOB_EXTENSION}.tmp"));
        fs::write(&tmp_path, ciphertext).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        Ok(path.to_string_lossy().into_owned())
    }

    async fn get(&self, id: Uuid) -> Result<Vec<u8>> {
        fs::read(self.path_for(id)).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(id),
            _ => e.into(),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        fs::remove_file(self.path_for(id))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => StoreError::NotFound(id),
                _ => e.into(),
            })
    }
}
