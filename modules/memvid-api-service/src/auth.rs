//! Shared-secret check applied to every route except `/health`.

use crate::error::ApiError;
use crate::routes::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use memvid_api_types::API_KEY_HEADER;
use std::sync::Arc;

/// Reject the request unless `X-API-Key` matches the configured key.
/// A no-op when no key is configured.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_api_key(&state.config.api_key, request.headers())?;
    Ok(next.run(request).await)
}

fn check_api_key(expected: &str, headers: &HeaderMap) -> Result<(), ApiError> {
    if expected.is_empty() {
        return Ok(());
    }
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        log::warn!(
            "Rejected request: {} API key",
            if provided.is_some() { "invalid" } else { "missing" }
        );
        Err(ApiError::Unauthorized)
    }
}
