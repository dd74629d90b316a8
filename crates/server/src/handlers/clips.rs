//! Clipboard handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::Result;
use crate::models::Clip;
use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateClipRequest {
    pub content: String,
    pub tag: Option<String>,
}

/// GET /api/clips
pub async fn list_clips(State(state): State<AppState>) -> Result<Json<Vec<Clip>>> {
    let clips = state.share.recent_clips().await?;
    Ok(Json(clips))
}

/// POST /api/clips
///
/// The author comes from the verified token, never from the body.
pub async fn create_clip(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<CreateClipRequest>,
) -> Result<Json<Clip>> {
    info!("POST /api/clips - {}", ctx.username());

    let clip = state
        .share
        .add_clip(req.content, req.tag, ctx.username())
        .await?;

    Ok(Json(clip))
}
