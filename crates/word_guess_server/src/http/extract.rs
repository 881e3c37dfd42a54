//! Bearer-token authentication as an axum extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::http::AppState;
use crate::http::error::ApiError;
use crate::http::handlers::blocking;
use crate::identity::{AuthError, AuthErrorKind, Principal};

impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AuthError::new(AuthErrorKind::MissingToken))?;

        debug!("Authenticating bearer token");
        let auth = state.auth.clone();
        blocking(move || auth.authenticate(&token)).await
    }
}
