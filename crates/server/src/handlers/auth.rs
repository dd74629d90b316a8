//! Auth handlers

use crate::config::AppState;
use crate::error::Result;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// POST /api/login
///
/// First login with an unseen username registers it; later logins must
/// present the same password. Both paths answer the same way.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    info!("POST /api/login - {}", req.username);

    let session = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        token: session.token,
        username: session.user.username,
    }))
}
