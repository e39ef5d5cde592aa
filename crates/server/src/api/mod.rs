use crate::config::{AppState, ServerConfig};
use anyhow::{Context, Result};
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Start the API server
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_router(state, &config.server.path);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Starting MCP server on http://{}{}", addr, config.server.path);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
fn create_router(state: AppState, mcp_path: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(mcp_path, post(handlers::handle_mcp))
        // Middleware; headers are left out of spans so the bearer token never reaches the logs
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tollgate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "abc123";
    const IDENTITY: &str = "+10000000000";

    fn router() -> Router {
        let creds =
            Credentials::from_values(Some(SECRET.to_string()), Some(IDENTITY.to_string())).unwrap();
        let config = ServerConfig::default();
        create_router(AppState::new(&config, creds).unwrap(), &config.server.path)
    }

    fn rpc(token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Option<Value>) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap())
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["status"], "ok");
    }

    #[tokio::test]
    async fn test_validate_returns_identity() {
        let (status, body) = send(rpc(Some(SECRET), tool_call(1, "validate", json!({})))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["result"]["content"][0]["text"], IDENTITY);
    }

    #[tokio::test]
    async fn test_reverse_text() {
        let (status, body) = send(rpc(
            Some(SECRET),
            tool_call(2, "reverse_text", json!({"text": "hello"})),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["id"], 2);
        assert_eq!(body["result"]["content"][0]["text"], "olleh");
    }

    #[tokio::test]
    async fn test_wrong_or_missing_token_is_401() {
        for token in [Some("wrong"), Some("ABC123"), None] {
            let response = router()
                .oneshot(rpc(token, tool_call(3, "no_such_tool", json!({}))))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"]["message"], "Unauthorized");
            assert!(!bytes.windows(SECRET.len()).any(|w| w == SECRET.as_bytes()));
        }
    }

    #[tokio::test]
    async fn test_blank_text_is_invalid_params() {
        let (status, body) = send(rpc(
            Some(SECRET),
            tool_call(4, "reverse_text", json!({"text": " "})),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let (status, body) = send(rpc(
            Some(SECRET),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_get_on_mcp_path_not_allowed() {
        let request = Request::builder().uri("/mcp").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
