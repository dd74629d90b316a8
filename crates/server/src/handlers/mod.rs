//! Handlers for server

pub mod auth;
pub mod clips;
pub mod files;
pub mod subscribe;

// Re-export AppState from config
pub use crate::config::AppState;

// Auth handlers
pub use auth::login;

// Clipboard handlers
pub use clips::{create_clip, list_clips};

// File upload and download handlers
pub use files::{download_file, list_files, upload_file};

// Live update channel
pub use subscribe::ws_subscribe;
