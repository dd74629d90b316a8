use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{BlobError, Result};

/// Store for uploaded file bytes, keyed by stored name.
///
/// A trait rather than a concrete type so callers can substitute an
/// implementation that fails on demand when exercising error paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `data` under a fresh stored name derived from `original_name`
    /// and returns that name.
    async fn put(&self, original_name: &str, data: Bytes) -> Result<String>;

    /// Reads the bytes previously stored under `stored_name`.
    async fn read(&self, stored_name: &str) -> Result<Bytes>;

    /// Whether `stored_name` currently resolves to a file.
    async fn exists(&self, stored_name: &str) -> Result<bool>;
}

/// Directory-backed [`BlobStore`].
///
/// Stored names have the shape `<unix-millis>-<sanitized original name>`;
/// when two uploads land on the same name in the same millisecond, a numeric
/// suffix is inserted until the create succeeds.
#[derive(Clone, Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory the blobs live in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, stored_name: &str) -> Result<PathBuf> {
        // Stored names must be single path components; anything else could
        // walk out of the upload directory.
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name == "."
            || stored_name == ".."
        {
            return Err(BlobError::InvalidName(stored_name.to_string()));
        }
        Ok(self.root.join(stored_name))
    }
}

#[async_trait]
impl BlobStore for DiskStore {
    async fn put(&self, original_name: &str, data: Bytes) -> Result<String> {
        let base = sanitize_filename(original_name);
        let millis = chrono::Utc::now().timestamp_millis();

        let mut attempt = 0u32;
        loop {
            let stored_name = if attempt == 0 {
                format!("{millis}-{base}")
            } else {
                format!("{millis}-{attempt}-{base}")
            };
            let path = self.entry_path(&stored_name)?;

            // create_new makes the collision check and the claim atomic.
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&data).await?;
                    file.flush().await?;
                    tracing::debug!("Stored {} bytes as {}", data.len(), stored_name);
                    return Ok(stored_name);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                }
                Err(e) => return Err(BlobError::Io(e)),
            }
        }
    }

    async fn read(&self, stored_name: &str) -> Result<Bytes> {
        let path = self.entry_path(stored_name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(stored_name.to_string()))
            }
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    async fn exists(&self, stored_name: &str) -> Result<bool> {
        let path = self.entry_path(stored_name)?;
        Ok(fs::try_exists(&path).await?)
    }
}

/// Reduces a client-supplied filename to a safe single path component.
///
/// Keeps the basename only and replaces separator, control, and
/// Windows-reserved characters. Falls back to "file" when nothing usable
/// survives.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\x00'..='\x1f' | '\x7f' => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_then_read_roundtrip() {
        let dir = tempdir().unwrap();
        let store = DiskStore::new(dir.path().join("uploads")).await.unwrap();

        let stored = store
            .put("notes.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert!(stored.ends_with("-notes.txt"));

        let data = store.read(&stored).await.unwrap();
        assert_eq!(&data[..], b"hello");
        assert!(store.exists(&stored).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_original_name_gets_distinct_stored_names() {
        let dir = tempdir().unwrap();
        let store = DiskStore::new(dir.path()).await.unwrap();

        let first = store.put("a.txt", Bytes::from_static(b"1")).await.unwrap();
        let second = store.put("a.txt", Bytes::from_static(b"2")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(&store.read(&first).await.unwrap()[..], b"1");
        assert_eq!(&store.read(&second).await.unwrap()[..], b"2");
    }

    #[tokio::test]
    async fn test_read_rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let store = DiskStore::new(dir.path()).await.unwrap();

        let err = store.read("../secrets").await.unwrap_err();
        assert!(matches!(err, BlobError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_missing_blob_reads_as_not_found() {
        let dir = tempdir().unwrap();
        let store = DiskStore::new(dir.path()).await.unwrap();

        let err = store.read("1700000000000-missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("weird:na*me?.txt"), "weird_na_me_.txt");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename(".."), "file");
    }
}
