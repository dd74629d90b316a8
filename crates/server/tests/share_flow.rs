use async_trait::async_trait;
use bytes::Bytes;
use server::config::open_pool;
use server::error::Error;
use server::realtime::{EventHub, ServerEvent};
use server::share::ShareManager;
use std::path::Path;
use std::sync::Arc;
use synchub_blob::{BlobError, BlobStore, DiskStore};
use tempfile::tempdir;
use tokio::sync::broadcast::error::TryRecvError;

async fn gateway(dir: &Path) -> ShareManager {
    let pool = open_pool(&dir.join("synchub.db")).await.unwrap();
    let blobs = Arc::new(DiskStore::new(dir.join("uploads")).await.unwrap());
    ShareManager::new(pool, blobs, EventHub::new(16))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_created_clip_listed_first_and_verbatim() {
    let dir = tempdir().unwrap();
    let share = gateway(dir.path()).await;

    share.add_clip("older".into(), None, "alice").await.unwrap();
    let created = share
        .add_clip("deploy key cafe42".into(), Some("Work".into()), "alice")
        .await
        .unwrap();

    let clips = share.recent_clips().await.unwrap();
    assert_eq!(clips[0].id, created.id);
    assert_eq!(clips[0].content, "deploy key cafe42");
    assert_eq!(clips[0].tag, "Work");
    assert_eq!(clips[0].username, "alice");
    assert_eq!(clips[1].content, "older");
}

#[tokio::test]
async fn test_missing_tag_defaults_to_general() {
    let dir = tempdir().unwrap();
    let share = gateway(dir.path()).await;

    let clip = share.add_clip("untagged".into(), None, "bob").await.unwrap();
    assert_eq!(clip.tag, "General");
}

#[tokio::test]
async fn test_recent_clips_caps_at_fifty() {
    let dir = tempdir().unwrap();
    let share = gateway(dir.path()).await;

    for i in 0..55 {
        share
            .add_clip(format!("clip {i}"), None, "bot")
            .await
            .unwrap();
    }

    let clips = share.recent_clips().await.unwrap();
    assert_eq!(clips.len(), 50);
    assert_eq!(clips[0].content, "clip 54");
    assert_eq!(clips[49].content, "clip 5");
}

#[tokio::test]
async fn test_sequential_creates_broadcast_in_order() {
    let dir = tempdir().unwrap();
    let share = gateway(dir.path()).await;
    let mut rx = share.subscribe();

    share.add_clip("first".into(), None, "a").await.unwrap();
    share.add_clip("second".into(), None, "a").await.unwrap();

    let e1 = rx.recv().await.unwrap();
    let e2 = rx.recv().await.unwrap();
    match (e1, e2) {
        (ServerEvent::NewClip(c1), ServerEvent::NewClip(c2)) => {
            assert_eq!(c1.content, "first");
            assert_eq!(c2.content, "second");
            assert!(c1.id < c2.id);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_records_size_and_original_name() {
    let dir = tempdir().unwrap();
    let share = gateway(dir.path()).await;
    let mut rx = share.subscribe();

    let record = share
        .add_file("a.txt", Bytes::from_static(b"0123456789"), "alice")
        .await
        .unwrap();

    assert_eq!(record.size, 10);
    assert_eq!(record.original_name, "a.txt");
    assert!(record.filename.ends_with("-a.txt"));
    assert_eq!(record.username, "alice");

    // The stored bytes round-trip
    let bytes = share.read_file(&record.filename).await.unwrap();
    assert_eq!(&bytes[..], b"0123456789");

    // Listed newest-first and broadcast as new_file
    let listed = share.recent_files().await.unwrap();
    assert_eq!(listed[0].id, record.id);

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, ServerEvent::NewFile(f) if f.id == record.id));
}

#[tokio::test]
async fn test_lookup_by_stored_name() {
    let dir = tempdir().unwrap();
    let share = gateway(dir.path()).await;

    let record = share
        .add_file("notes.md", Bytes::from_static(b"# notes"), "bob")
        .await
        .unwrap();

    let found = share
        .file_by_stored_name(&record.filename)
        .await
        .unwrap()
        .expect("uploaded record must resolve");
    assert_eq!(found.original_name, "notes.md");

    let missing = share
        .file_by_stored_name("1700000000000-ghost.txt")
        .await
        .unwrap();
    assert!(missing.is_none());
}

/// Upload store that always fails, for exercising the no-broadcast path.
struct FailingStore;

#[async_trait]
impl BlobStore for FailingStore {
    async fn put(&self, _original_name: &str, _data: Bytes) -> synchub_blob::Result<String> {
        Err(BlobError::Io(std::io::Error::other("disk full")))
    }

    async fn read(&self, stored_name: &str) -> synchub_blob::Result<Bytes> {
        Err(BlobError::NotFound(stored_name.to_string()))
    }

    async fn exists(&self, _stored_name: &str) -> synchub_blob::Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_failed_store_means_no_record_and_no_broadcast() {
    let dir = tempdir().unwrap();
    let pool = open_pool(&dir.path().join("synchub.db")).await.unwrap();
    let share = ShareManager::new(pool, Arc::new(FailingStore), EventHub::new(16))
        .await
        .unwrap();
    let mut rx = share.subscribe();

    let err = share
        .add_file("a.txt", Bytes::from_static(b"data"), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));

    // Nothing persisted, nothing pushed
    assert!(share.recent_files().await.unwrap().is_empty());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_closed_pool_clip_write_fails_without_broadcast() {
    let dir = tempdir().unwrap();
    let pool = open_pool(&dir.path().join("synchub.db")).await.unwrap();
    let blobs = Arc::new(DiskStore::new(dir.path().join("uploads")).await.unwrap());
    let share = ShareManager::new(pool.clone(), blobs, EventHub::new(16))
        .await
        .unwrap();
    let mut rx = share.subscribe();

    pool.close().await;

    let err = share
        .add_clip("lost".into(), None, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}
