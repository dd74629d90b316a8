//! Server configuration and shared state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;

use crate::auth::AuthManager;
use crate::realtime::EventHub;
use crate::share::ShareManager;
use synchub_blob::DiskStore;

/// Signing secret the original deployment shipped with. Fine for local use;
/// startup warns when it is still in effect.
pub const DEFAULT_JWT_SECRET: &str = "synchub-secret-key-change-me";

/// Configuration for the SyncHub server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Base data directory
    pub data_dir: PathBuf,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory uploaded files are stored in
    pub upload_dir: PathBuf,
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Token lifetime; `None` issues tokens that never expire
    pub token_ttl: Option<Duration>,
    /// Listen port
    pub port: u16,
    /// Broadcast channel capacity
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_dir = std::env::var("SYNCHUB_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("synchub_data"));

        Self {
            database_path: data_dir.join("synchub.db"),
            upload_dir: data_dir.join("uploads"),
            data_dir,
            jwt_secret: std::env::var("SYNCHUB_JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            token_ttl: std::env::var("SYNCHUB_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|minutes| Duration::from_secs(minutes * 60)),
            port: std::env::var("SYNCHUB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            channel_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Create config with custom base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        let base = base_dir.into();
        config.database_path = base.join("synchub.db");
        config.upload_dir = base.join("uploads");
        config.data_dir = base;
        config
    }

    /// Ensure all directories exist
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub auth: Arc<AuthManager>,
    pub share: Arc<ShareManager>,
}

impl AppState {
    /// Builds the pool and the managers; creates tables on first run.
    pub async fn init(config: ServerConfig) -> anyhow::Result<Self> {
        config.ensure_dirs().await?;

        if config.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("[Auth] Built-in JWT secret in use; set SYNCHUB_JWT_SECRET for real deployments");
        }

        let pool = open_pool(&config.database_path).await?;

        let auth = Arc::new(
            AuthManager::new(pool.clone(), &config.jwt_secret, config.token_ttl).await?,
        );

        let blobs = Arc::new(DiskStore::new(config.upload_dir.clone()).await?);
        let hub = EventHub::new(config.channel_capacity);
        let share = Arc::new(ShareManager::new(pool, blobs, hub).await?);

        Ok(Self {
            config,
            auth,
            share,
        })
    }
}

/// Opens the shared SQLite pool, creating the database file on first run.
pub async fn open_pool(path: &Path) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
