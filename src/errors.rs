use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Everything a handler can fail with. Each variant maps to one HTTP
/// status and renders as a `{"error": ...}` JSON body; nothing here is
/// ever fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input caught before any storage or network call.
    #[error("{0}")]
    Validation(String),

    /// Credential mismatch or no active session.
    #[error("{0}")]
    Auth(String),

    /// Signup with a password some other user already holds.
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Failure reported by the table or blob store.
    #[error("{0}")]
    RemoteService(String),

    /// Upstream fetch failure in the IP lookup proxy.
    #[error("{0}")]
    Network(String),

    /// A file rename died partway through its copy-then-delete saga.
    /// When `copied` is true both the old and the new key may exist.
    #[error("rename interrupted: {message}")]
    RenameInterrupted { copied: bool, message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteService(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RemoteService(_) | Self::Network(_) | Self::RenameInterrupted { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::RemoteService(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::RemoteService(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            AppError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::auth("nope").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Conflict("taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::NotFound("plan").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::RenameInterrupted {
                copied: true,
                message: "delete failed".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
