//! Database records and their wire shapes.
//!
//! Clips and file records go out exactly as stored; serde renames give the
//! camelCase field names clients expect (`createdAt`, `originalName`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account row. Never serialized; the password hash stays server-side.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Shared text snippet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: i64,
    pub content: String,
    pub tag: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata of an uploaded file; the bytes live in the upload store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i64,
    /// Stored name of the blob on disk, unique per upload.
    pub filename: String,
    /// Filename as the client sent it.
    pub original_name: String,
    pub size: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
