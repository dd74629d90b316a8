//! Write-and-broadcast gateway for clips and files.
//!
//! Every successful create persists first, then fans the persisted record
//! out to live subscribers. A failed insert never broadcasts; a broadcast
//! with nobody listening never fails the write.

use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::error::Result;
use crate::models::{Clip, FileRecord};
use crate::realtime::{EventHub, ServerEvent};
use synchub_blob::BlobStore;

/// Window returned by the listing endpoints.
const RECENT_LIMIT: i64 = 50;

/// Gateway owning the content tables and the upload store.
pub struct ShareManager {
    pool: SqlitePool,
    blobs: Arc<dyn BlobStore>,
    hub: EventHub,
}

impl ShareManager {
    /// Create the gateway over the shared pool.
    pub async fn new(pool: SqlitePool, blobs: Arc<dyn BlobStore>, hub: EventHub) -> Result<Self> {
        let manager = Self { pool, blobs, hub };

        manager.init_db().await?;

        info!("[Share] Initialized");

        Ok(manager)
    }

    /// Create the content tables on first run.
    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clips (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                tag TEXT NOT NULL DEFAULT 'General',
                username TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT UNIQUE NOT NULL,
                original_name TEXT NOT NULL,
                size INTEGER NOT NULL,
                username TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Subscription handle for WebSocket sessions.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.hub.subscribe()
    }

    /// Persists a clip stamped with `username`, then broadcasts it.
    pub async fn add_clip(
        &self,
        content: String,
        tag: Option<String>,
        username: &str,
    ) -> Result<Clip> {
        let tag = tag.unwrap_or_else(|| "General".to_string());

        let clip: Clip = sqlx::query_as(
            r#"
            INSERT INTO clips (content, tag, username, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, content, tag, username, created_at
            "#,
        )
        .bind(&content)
        .bind(&tag)
        .bind(username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!("[Share] Clip {} created by {}", clip.id, clip.username);
        self.hub.broadcast(ServerEvent::NewClip(clip.clone()));

        Ok(clip)
    }

    /// Stores the uploaded bytes, persists the record, then broadcasts it.
    pub async fn add_file(
        &self,
        original_name: &str,
        data: Bytes,
        username: &str,
    ) -> Result<FileRecord> {
        let size = data.len() as i64;
        let stored_name = self.blobs.put(original_name, data).await?;

        let record: FileRecord = sqlx::query_as(
            r#"
            INSERT INTO files (filename, original_name, size, username, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, filename, original_name, size, username, created_at
            "#,
        )
        .bind(&stored_name)
        .bind(original_name)
        .bind(size)
        .bind(username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(
            "[Share] File {} ({}, {} bytes) uploaded by {}",
            record.id, record.original_name, record.size, record.username
        );
        self.hub.broadcast(ServerEvent::NewFile(record.clone()));

        Ok(record)
    }

    /// Newest clips first, capped at 50.
    pub async fn recent_clips(&self) -> Result<Vec<Clip>> {
        let clips = sqlx::query_as(
            "SELECT id, content, tag, username, created_at FROM clips \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(clips)
    }

    /// Newest file records first, capped at 50.
    pub async fn recent_files(&self) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as(
            "SELECT id, filename, original_name, size, username, created_at FROM files \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Record behind a stored name; `None` when nothing was uploaded under
    /// that name.
    pub async fn file_by_stored_name(&self, stored_name: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as(
            "SELECT id, filename, original_name, size, username, created_at FROM files \
             WHERE filename = ?",
        )
        .bind(stored_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Bytes stored under `stored_name`.
    pub async fn read_file(&self, stored_name: &str) -> Result<Bytes> {
        Ok(self.blobs.read(stored_name).await?)
    }
}
