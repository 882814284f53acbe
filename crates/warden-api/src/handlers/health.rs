//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use warden_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
///
/// 200 when the store and the cache both answer, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store_ok = matches!(state.users.health_check().await, Ok(true));
    let cache_ok = matches!(state.cache.health_check().await, Ok(true));

    let status = if store_ok && cache_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if status == StatusCode::OK { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: label(store_ok),
            cache: label(cache_ok),
        })),
    )
}

fn label(ok: bool) -> String {
    if ok { "up" } else { "down" }.to_string()
}
