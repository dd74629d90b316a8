//! File upload and download handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::FileRecord;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use tracing::info;

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileRecord>>> {
    let files = state.share.recent_files().await?;
    Ok(Json(files))
}

/// POST /api/files
///
/// Multipart upload; the file goes in a field named `file`. Requests
/// without one are a 400.
pub async fn upload_file(
    State(state): State<AppState>,
    ctx: Ctx,
    mut multipart: Multipart,
) -> Result<Json<FileRecord>> {
    let mut upload: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            // A part without a filename is a plain text field, not a file.
            let original_name = match field.file_name() {
                Some(name) => name.to_string(),
                None => continue,
            };
            let data = field.bytes().await?;
            upload = Some((original_name, data));
        }
    }

    let (original_name, data) = upload.ok_or(Error::NoFileProvided)?;

    info!(
        "POST /api/files - {} ({} bytes) from {}",
        original_name,
        data.len(),
        ctx.username()
    );

    let record = state
        .share
        .add_file(&original_name, data, ctx.username())
        .await?;

    Ok(Json(record))
}

/// GET /uploads/{stored_name}
///
/// Public: download links are plain anchors, so no bearer header arrives.
/// Only names with a matching record are served, never arbitrary paths.
pub async fn download_file(
    State(state): State<AppState>,
    Path(stored_name): Path<String>,
) -> Result<impl IntoResponse> {
    let record = state
        .share
        .file_by_stored_name(&stored_name)
        .await?
        .ok_or(Error::FileNotFound)?;

    let data = state.share.read_file(&record.filename).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    // Hand the browser back the name the file was uploaded under.
    let disposition = format!(
        "attachment; filename=\"{}\"",
        record.original_name.replace(['"', '\r', '\n'], "_")
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, data))
}
