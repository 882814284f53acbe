//! JSON wire format of lifecycle messages.

use bytes::Bytes;
use serde_json::Value;

use warden_core::error::AppError;
use warden_core::events::{DeletionRequest, UserRegistered};
use warden_core::result::AppResult;

/// Encode a `user.registered` event.
pub fn encode_user_registered(event: &UserRegistered) -> AppResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(event)?))
}

/// Decode a `user.registered` event.
pub fn decode_user_registered(payload: &[u8]) -> AppResult<UserRegistered> {
    Ok(serde_json::from_slice(payload)?)
}

/// Encode a deletion request as `{"userId": "..."}`.
pub fn encode_deletion_request(request: &DeletionRequest) -> AppResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(request)?))
}

/// Decode a deletion request.
///
/// Accepts `{"userId": "..."}`, a bare JSON string, or the id as plain
/// text with or without surrounding quotes.
pub fn decode_deletion_request(payload: &[u8]) -> AppResult<DeletionRequest> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| AppError::validation("Deletion request is not valid UTF-8"))?
        .trim();
    if text.is_empty() {
        return Err(AppError::validation("Deletion request is empty"));
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => match map.get("userId") {
            Some(Value::String(id)) => Ok(DeletionRequest::new(id.clone())),
            Some(other) => Err(AppError::validation(format!(
                "Deletion request userId must be a string, got {other}"
            ))),
            None => Err(AppError::validation("Deletion request has no userId")),
        },
        Ok(Value::String(id)) => Ok(DeletionRequest::new(id)),
        Ok(other) => Err(AppError::validation(format!(
            "Unsupported deletion request body: {other}"
        ))),
        Err(_) => Ok(DeletionRequest::new(text.trim_matches('"'))),
    }
}
