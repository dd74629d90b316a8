use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

/// Request-boundary error; every variant maps to one HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error("Invalid credentials")]
    LoginFail,
    #[error("No auth token found")]
    AuthFailNoToken,
    #[error("Auth token wrong format")]
    AuthFailTokenWrongFormat,
    #[error("Invalid token")]
    AuthFailTokenInvalid,
    #[error("Auth context missing")]
    AuthFailCtxNotInRequestExt,

    // Upload errors
    #[error("No file")]
    NoFileProvided,
    #[error("File not found")]
    FileNotFound,

    // Generic
    #[error("{0}")]
    BadRequest(String),
    #[error("Storage error: {0}")]
    Persistence(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::LoginFail
            | Error::AuthFailNoToken
            | Error::AuthFailTokenWrongFormat
            | Error::AuthFailTokenInvalid => StatusCode::UNAUTHORIZED,
            Error::NoFileProvided | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::FileNotFound => StatusCode::NOT_FOUND,
            Error::AuthFailCtxNotInRequestExt
            | Error::Persistence(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl From<synchub_blob::BlobError> for Error {
    fn from(err: synchub_blob::BlobError) -> Self {
        if err.is_not_found() {
            Error::FileNotFound
        } else {
            Error::Persistence(err.to_string())
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for Error {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Error::BadRequest(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
