use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data: oversized body, missing or malformed `file` field,
    /// or a destination path that escapes the storage root
    #[error("{message}")]
    BadRequest { message: String },

    /// Filesystem operation failure while persisting an upload
    #[error("storage operation failed for {}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Crate-wide result type for request handlers.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::BadRequest`] from anything printable.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Storage { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::Storage { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Handlers run inside the per-request span, so these entries carry the
        // method, path, and client address fields.
        match &self {
            Error::BadRequest { message } => {
                tracing::error!("rejected request: {message}");
            }
            Error::Storage { path, source } => {
                tracing::error!(path = %path.display(), error = %source, "storage operation failed");
            }
            Error::Other(err) => {
                tracing::error!("internal error: {err:#}");
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}
