//! Authentication Module
//!
//! Login with auto-registration: the first login for an unseen username
//! provisions the account, later logins must present the same password.
//! Sessions are stateless HS256 JWTs, so nothing is stored per login.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::User;

pub mod middleware;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    /// Issued-at, seconds since epoch.
    pub iat: usize,
    /// Expiry; absent when the server runs without a token TTL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// How a successful login was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Username was unseen; a new user was provisioned.
    Registered,
    /// Existing user, password verified.
    Authenticated,
}

/// A successful login: the token to hand out plus the user behind it.
#[derive(Debug)]
pub struct LoginSession {
    pub token: String,
    pub user: User,
    pub outcome: LoginOutcome,
}

/// Auth manager handles credential checks, auto-registration, and tokens.
pub struct AuthManager {
    pool: SqlitePool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Option<Duration>,
}

impl AuthManager {
    /// Create new auth manager over the shared pool.
    pub async fn new(
        pool: SqlitePool,
        jwt_secret: &str,
        token_ttl: Option<Duration>,
    ) -> Result<Self> {
        let manager = Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl,
            pool,
        };

        manager.init_db().await?;

        info!("[Auth] Initialized");

        Ok(manager)
    }

    /// Create the users table on first run.
    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Login or register: unseen usernames are provisioned with this
    /// password, known ones must match their stored hash.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession> {
        let existing: Option<User> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let (user, outcome) = match existing {
            Some(user) => {
                let valid = verify(password, &user.password_hash)
                    .map_err(|e| Error::Internal(e.to_string()))?;
                if !valid {
                    warn!("[Auth] Failed login attempt for {}", username);
                    return Err(Error::LoginFail);
                }
                (user, LoginOutcome::Authenticated)
            }
            None => (
                self.register(username, password).await?,
                LoginOutcome::Registered,
            ),
        };

        let token = self.issue_token(&user)?;

        match outcome {
            LoginOutcome::Registered => info!("[Auth] User registered: {}", user.username),
            LoginOutcome::Authenticated => info!("[Auth] User logged in: {}", user.username),
        }

        Ok(LoginSession {
            token,
            user,
            outcome,
        })
    }

    /// First login doubles as registration.
    async fn register(&self, username: &str, password: &str) -> Result<User> {
        let password_hash =
            hash(password, DEFAULT_COST).map_err(|e| Error::Internal(e.to_string()))?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(user),
            // Two first logins raced on the same username; the loser fails
            // closed as a credential error, not a 500.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                warn!("[Auth] Concurrent registration race for {}", username);
                Err(Error::LoginFail)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        let iat = Utc::now().timestamp() as usize;
        let exp = self.token_ttl.map(|ttl| iat + ttl.as_secs() as usize);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat,
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(e.to_string()))
    }

    /// Verifies a bearer token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        if self.token_ttl.is_none() {
            // Tokens issued without a TTL carry no exp claim.
            validation.required_spec_claims.clear();
            validation.validate_exp = false;
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| Error::AuthFailTokenInvalid)
    }
}
