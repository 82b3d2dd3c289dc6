//! Shared-secret authentication middleware
//!
//! Applied to administrative routes only; browsing and `/health` stay open.

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use bks_common::api::auth::{now_millis, AUTH_DISABLED};
use bks_common::api::{check_timestamp, verify_signature, SignatureError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

/// Largest body read while checking a signature
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
struct AuthFields {
    timestamp: i64,
    hash: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.shared_secret == AUTH_DISABLED {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AuthError::ParseError(format!("Failed to read body: {}", e)))?;

    let json_value: Value = serde_json::from_slice(&body_bytes)
        .map_err(|e| AuthError::ParseError(format!("Invalid JSON: {}", e)))?;

    let fields: AuthFields = serde_json::from_value(json_value.clone())
        .map_err(|e| AuthError::MissingFields(e.to_string()))?;

    check_timestamp(fields.timestamp, now_millis()).map_err(AuthError::Signature)?;

    verify_signature(&fields.hash, &json_value, state.shared_secret).map_err(|e| {
        warn!(uri = %parts.uri, "Rejected request with invalid hash");
        AuthError::Signature(e)
    })?;

    let request = Request::from_parts(parts, Body::from(body_bytes));
    Ok(next.run(request).await)
}

#[derive(Debug)]
pub enum AuthError {
    Signature(SignatureError),
    MissingFields(String),
    ParseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Signature(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AuthError::MissingFields(msg) => {
                (StatusCode::BAD_REQUEST, format!("Missing required fields: {}", msg))
            }
            AuthError::ParseError(msg) => (StatusCode::BAD_REQUEST, format!("Parse error: {}", msg)),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
