use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use std::sync::Arc;

use crate::error::GatewayError;
use crate::metrics::REQUEST_TOTAL;
use crate::models::ReplyBody;
use crate::state::AppState;

// Bucket for callers that sent no forwarded-for header
pub const UNKNOWN_ORIGIN: &str = "unknown";

// Rate limit key: first x-forwarded-for entry, trimmed, taken as-is.
// The header is caller controlled; nothing here verifies it.
pub fn origin_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(UNKNOWN_ORIGIN)
        .to_string()
}

// Raw bytes instead of Json<..> so a bad body maps to our own 400 reply
pub async fn completion_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReplyBody>, GatewayError> {
    REQUEST_TOTAL.inc();

    let origin = origin_key(&headers);
    let reply = state.gateway.handle_request(&origin, &body).await?;

    Ok(Json(ReplyBody { reply }))
}
