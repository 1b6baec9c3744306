//! Sidecar metadata rows for sealed files.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::FileRecord;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Persistence for [`FileRecord`]s. Every lookup is scoped by owner; a row
/// belonging to someone else is indistinguishable from a missing one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a new row.
    ///
    /// # Errors
    /// - [`StoreError::AlreadyExists`] if the id is taken
    async fn insert(&self, record: FileRecord) -> Result<()>;

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<FileRecord>>;

    /// All rows of one owner, oldest first.
    async fn list(&self, user_id: &str) -> Result<Vec<FileRecord>>;

    /// Replace an existing row.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if no row has this id and owner
    async fn update(&self, record: FileRecord) -> Result<()>;

    /// Delete and return a row, if the owner has one with this id.
    async fn remove(&self, user_id: &str, id: Uuid) -> Result<Option<FileRecord>>;
}

/// In-process metadata store.
///
/// Used by tests and single-node deployments; a database-backed store plugs
/// in through the same trait.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMetadataStore {
    inner: Arc<RwLock<HashMap<Uuid, FileRecord>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all owners.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, record: FileRecord) -> Result<()> {
        let mut rows = self.inner.write().await;
        if rows.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(record.id));
        }
        rows.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<FileRecord>> {
        let rows = self.inner.read().await;
        Ok(rows.get(&id).filter(|r| r.user_id == user_id).cloned())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        let rows = self.inner.read().await;
        let mut owned: Vec<FileRecord> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn update(&self, record: FileRecord) -> Result<()> {
        let mut rows = self.inner.write().await;
        match rows.get_mut(&record.id) {
            Some(existing) if existing.user_id == record.user_id => {
                *existing = record;
                Ok(())
            }
            _ => Err(StoreError::NotFound(record.id)),
        }
    }

    async fn remove(&self, user_id: &str, id: Uuid) -> Result<Option<FileRecord>> {
        let mut rows = self.inner.write().await;
        match rows.get(&id) {
            Some(r) if r.user_id == user_id => Ok(rows.remove(&id)),
            _ => Ok(None),
        }
    }
}
