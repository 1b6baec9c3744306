//! Upload/download/delete through a real blob directory.

use bytes::Bytes;
use common::{FileUpdate, ServiceError};
use filestore::{
    BlobStore, FileVault, InMemoryMetadataStore, LocalBlobStore, MetadataStore, NewFile,
    StoreError,
};
use tempfile::TempDir;
use uuid::Uuid;
use vault_codec::{AsyncCodec, CodecError, MasterSecret, VaultCodec};

fn codec(secret: u8) -> AsyncCodec {
    AsyncCodec::new(
        VaultCodec::new(MasterSecret::from_bytes([secret; 32])).with_iterations(2),
        4,
    )
}

async fn vault(
    dir: &TempDir,
) -> (
    FileVault<LocalBlobStore, InMemoryMetadataStore>,
    LocalBlobStore,
    InMemoryMetadataStore,
) {
    let blobs = LocalBlobStore::open(dir.path()).await.unwrap();
    let metadata = InMemoryMetadataStore::new();
    let vault = FileVault::new(codec(1), blobs.clone(), metadata.clone());
    (vault, blobs, metadata)
}

fn file(name: &str, contents: &'static [u8]) -> NewFile {
    NewFile {
        name: name.into(),
        mime_type: "application/octet-stream".into(),
        folder: Some("inbox".into()),
        contents: Bytes::from_static(contents),
    }
}

#[tokio::test]
async fn upload_then_download_returns_original_bytes() {
    let dir = TempDir::new().unwrap();
    let (vault, _, _) = vault(&dir).await;

    let record = vault.upload("alice", file("report.bin", b"quarterly numbers")).await.unwrap();
    assert_eq!(record.size, 17);
    assert_eq!(record.iv.len(), 32);
    assert_eq!(record.auth_tag.len(), 32);
    assert_eq!(record.folder.as_deref(), Some("inbox"));

    let (meta, contents) = vault.download("alice", record.id).await.unwrap();
    assert_eq!(meta, record);
    assert_eq!(&contents[..], b"quarterly numbers");
}

#[tokio::test]
async fn blob_on_disk_is_ciphertext() {
    let dir = TempDir::new().unwrap();
    let (vault, blobs, _) = vault(&dir).await;

    let plaintext: &'static [u8] = b"this must not appear on disk in the clear";
    let record = vault.upload("alice", file("secret.txt", plaintext)).await.unwrap();

    let on_disk = blobs.get(record.id).await.unwrap();
    assert_eq!(on_disk.len(), plaintext.len());
    assert_ne!(on_disk, plaintext);
    assert!(record.storage_path.ends_with(&format!("{}.enc", record.id)));
}

#[tokio::test]
async fn empty_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let (vault, _, _) = vault(&dir).await;

    let record = vault.upload("alice", file("empty", b"")).await.unwrap();
    let (_, contents) = vault.download("alice", record.id).await.unwrap();
    assert!(contents.is_empty());
}

#[tokio::test]
async fn other_owners_cannot_see_files() {
    let dir = TempDir::new().unwrap();
    let (vault, _, _) = vault(&dir).await;

    let record = vault.upload("alice", file("mine.txt", b"alice only")).await.unwrap();

    assert!(matches!(
        vault.download("bob", record.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(vault.list("bob").await.unwrap().is_empty());
    assert!(matches!(
        vault.delete("bob", record.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(vault.list("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn tampered_metadata_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let (vault, _, metadata) = vault(&dir).await;

    let mut record = vault.upload("alice", file("a.txt", b"contents")).await.unwrap();
    let flipped = if record.auth_tag.starts_with('0') { "1" } else { "0" };
    record.auth_tag.replace_range(0..1, flipped);
    metadata.update(record.clone()).await.unwrap();

    let err = vault.download("alice", record.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Codec(CodecError::DecryptionFailed)));
    assert!(matches!(ServiceError::from(err), ServiceError::Unreadable));
}

#[tokio::test]
async fn non_hex_metadata_is_invalid_format() {
    let dir = TempDir::new().unwrap();
    let (vault, _, metadata) = vault(&dir).await;

    let mut record = vault.upload("alice", file("a.txt", b"contents")).await.unwrap();
    record.iv = "not hex at all".into();
    metadata.update(record.clone()).await.unwrap();

    assert!(matches!(
        vault.download("alice", record.id).await,
        Err(StoreError::Codec(CodecError::InvalidFormat(_)))
    ));
}

#[tokio::test]
async fn different_master_secret_cannot_open() {
    let dir = TempDir::new().unwrap();
    let blobs = LocalBlobStore::open(dir.path()).await.unwrap();
    let metadata = InMemoryMetadataStore::new();

    let writer = FileVault::new(codec(1), blobs.clone(), metadata.clone());
    let reader = FileVault::new(codec(2), blobs, metadata);

    let record = writer.upload("alice", file("a.txt", b"contents")).await.unwrap();
    assert!(matches!(
        reader.download("alice", record.id).await,
        Err(StoreError::Codec(CodecError::DecryptionFailed))
    ));
}

#[tokio::test]
async fn update_changes_metadata_only() {
    let dir = TempDir::new().unwrap();
    let (vault, _, _) = vault(&dir).await;

    let record = vault.upload("alice", file("draft.txt", b"v1")).await.unwrap();
    let updated = vault
        .update(
            "alice",
            record.id,
            FileUpdate {
                name: Some("final.txt".into()),
                folder: Some("archive".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "final.txt");
    assert_eq!(updated.folder.as_deref(), Some("archive"));
    assert_eq!(updated.iv, record.iv);
    assert!(updated.updated_at >= record.updated_at);

    let (_, contents) = vault.download("alice", record.id).await.unwrap();
    assert_eq!(&contents[..], b"v1");

    let blank = vault
        .update(
            "alice",
            record.id,
            FileUpdate {
                name: Some("".into()),
                folder: None,
            },
        )
        .await;
    assert!(matches!(blank, Err(StoreError::InvalidInput(_))));
}

#[tokio::test]
async fn delete_removes_blob_and_metadata() {
    let dir = TempDir::new().unwrap();
    let (vault, blobs, metadata) = vault(&dir).await;

    let record = vault.upload("alice", file("gone.txt", b"bye")).await.unwrap();
    vault.delete("alice", record.id).await.unwrap();

    assert!(metadata.is_empty().await);
    assert!(matches!(blobs.get(record.id).await, Err(StoreError::NotFound(_))));
    assert!(matches!(
        vault.describe("alice", record.id).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (vault, _, _) = vault(&dir).await;
    let err = vault.download("alice", Uuid::new_v4()).await.unwrap_err();
    assert_eq!(ServiceError::from(err).http_status(), 404);
}
