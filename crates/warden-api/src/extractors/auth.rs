//! Token extractors reading the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use warden_auth::Claims;
use warden_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw `Authorization` header value, `Bearer ` prefix included.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Read the header, if present and non-blank.
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
            .ok_or_else(|| AppError::invalid_token("Missing Authorization header").into())
    }
}

/// Claims of a validated, unrevoked token.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(header) = BearerToken::from_parts(parts)
            .ok_or_else(|| AppError::invalid_token("Missing Authorization header"))?;
        let claims = state.sessions.authenticate(&header).await?;
        Ok(Self(claims))
    }
}
