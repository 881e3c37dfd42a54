//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokio::task::JoinError;
use tracing::error;

use crate::admin::{AdminError, AdminErrorKind};
use crate::identity::{AuthError, AuthErrorKind};
use crate::session::{GameError, GameErrorKind};

const INTERNAL_ERROR: &str = "Internal server error";

/// Error body `{"error": message}` with a status code.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates an error response.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Logs `detail` and hides it behind a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(%detail, "Request failed with internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    }

    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in the body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = match &err.kind {
            GameErrorKind::Validation(_)
            | GameErrorKind::AlreadyCompleted
            | GameErrorKind::GuessLimitReached
            | GameErrorKind::QuotaExceeded(_) => StatusCode::BAD_REQUEST,
            GameErrorKind::NotFound => StatusCode::NOT_FOUND,
            GameErrorKind::Forbidden => StatusCode::FORBIDDEN,
            GameErrorKind::NoWordsAvailable => StatusCode::SERVICE_UNAVAILABLE,
            GameErrorKind::Infrastructure(_) => return Self::internal(err),
        };
        Self::new(status, err.kind.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err.kind {
            AuthErrorKind::Validation(_) | AuthErrorKind::UsernameTaken => StatusCode::BAD_REQUEST,
            AuthErrorKind::InvalidCredentials
            | AuthErrorKind::MissingToken
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthErrorKind::Infrastructure(_) => return Self::internal(err),
        };
        Self::new(status, err.kind.to_string())
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        let status = match &err.kind {
            AdminErrorKind::Forbidden => StatusCode::FORBIDDEN,
            AdminErrorKind::Validation(_) | AdminErrorKind::DuplicateWord => {
                StatusCode::BAD_REQUEST
            }
            AdminErrorKind::UserNotFound => StatusCode::NOT_FOUND,
            AdminErrorKind::Infrastructure(_) => return Self::internal(err),
        };
        Self::new(status, err.kind.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::internal(err)
    }
}
