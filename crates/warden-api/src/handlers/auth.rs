//! Auth handlers: register, verify, resend, login, logout, me.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, HeaderMap};

use warden_core::error::AppError;
use warden_service::Registration;

use crate::dto::request::{LoginRequest, RegisterRequest, ResendRequest, VerifyRequest};
use crate::dto::response::{ApiResponse, MeResponse, MessageResponse, TokenResponse};
use crate::error::ApiError;
use crate::extractors::{AuthClaims, ValidatedJson};
use crate::state::AppState;

type Message = Json<ApiResponse<MessageResponse>>;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Message), ApiError> {
    state
        .accounts
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            admin_code: req.admin_code,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(MessageResponse::new(
            "Verification code sent to your email",
        ))),
    ))
}

/// POST /auth/verify
pub async fn verify(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyRequest>,
) -> Result<Message, ApiError> {
    state.accounts.verify(&req.email, req.code.trim()).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("User verified!"))))
}

/// POST /auth/resend
///
/// Accepts `?email=` or a JSON body `{"email": ...}`; the query wins.
pub async fn resend(
    State(state): State<AppState>,
    Query(query): Query<ResendRequest>,
    body: Bytes,
) -> Result<Message, ApiError> {
    let email = match query.email {
        Some(email) => email,
        None if body.is_empty() => String::new(),
        None => serde_json::from_slice::<ResendRequest>(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
            .email
            .unwrap_or_default(),
    };
    if email.trim().is_empty() {
        return Err(AppError::validation("Email is required").into());
    }

    state.accounts.resend(&email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Code resent"))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let issued = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(issued.into())))
}

/// POST /auth/logout
///
/// Always 200: a missing, malformed or expired token has nothing to revoke.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Message {
    let token = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.sessions.logout(token).await;
    Json(ApiResponse::ok(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn me(AuthClaims(claims): AuthClaims) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(claims.into()))
}
