use crate::config::AppState;
use crate::middleware::auth::extract_bearer_token;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tollgate_mcp::McpReply;

/// Handle a JSON-RPC message posted to the MCP endpoint
pub async fn handle_mcp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // A missing or malformed header presents the empty token, which never authenticates
    let token = extract_bearer_token(&headers).unwrap_or_default();

    match state.mcp.handle_message(token, &body).await {
        McpReply::Response(response) => (StatusCode::OK, Json(response)).into_response(),
        McpReply::Unauthorized(response) => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(response),
        )
            .into_response(),
        McpReply::Accepted => StatusCode::ACCEPTED.into_response(),
    }
}
