//! HTTP transport for MCP server.
//!
//! | Route | Auth | Purpose |
//! |-------|------|---------|
//! | `POST /mcp` | bearer token | JSON-RPC requests |
//! | `GET /health` | none | liveness probe |
//!
//! Every `/mcp` request passes through [`require_bearer_token`] before any
//! handler runs. A rejected request gets `401` with `WWW-Authenticate:
//! Bearer` and a JSON-RPC error body; the store is never touched.

use crate::error::McpError;
use crate::protocol::{
    INVALID_REQUEST, JsonRpcRequest, JsonRpcResponse, PARSE_ERROR, RequestContext, UNAUTHORIZED,
};
use crate::server::{McpServer, SERVER_NAME};
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use stockroom_auth::TokenVerifier;
use stockroom_core::McpConfig;
use tower_http::trace::TraceLayer;

/// HTTP transport handler state.
#[derive(Clone)]
pub struct HttpTransportState {
    server: Arc<McpServer>,
    verifier: Arc<TokenVerifier>,
}

impl HttpTransportState {
    /// Create a new HTTP transport state.
    pub fn new(server: McpServer, verifier: TokenVerifier) -> Self {
        Self {
            server: Arc::new(server),
            verifier: Arc::new(verifier),
        }
    }
}

/// Create the HTTP router for MCP.
pub fn create_router(state: HttpTransportState) -> Router {
    let mcp = Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer_token,
        ));

    Router::new()
        .merge(mcp)
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized(challenge: &'static str, message: String) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge))],
        Json(JsonRpcResponse::error(None, UNAUTHORIZED, message)),
    )
        .into_response()
}

/// Verify the bearer token and attach the caller's [`RequestContext`].
pub async fn require_bearer_token(
    State(state): State<HttpTransportState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        tracing::warn!(path = %req.uri().path(), "Rejected request without bearer token");
        return unauthorized("Bearer", "Missing bearer token".to_string());
    };

    match state.verifier.verify(token) {
        Ok(claims) => {
            tracing::debug!(subject = %claims.sub, "Bearer token verified");
            req.extensions_mut().insert(RequestContext::new(claims));
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected bearer token");
            unauthorized(
                "Bearer error=\"invalid_token\"",
                format!("Unauthorized: {}", e),
            )
        }
    }
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<HttpTransportState>,
    Extension(context): Extension<RequestContext>,
    body: Bytes,
) -> Response {
    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                )),
            )
                .into_response();
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    None,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                )),
            )
                .into_response();
        }
    };

    match state.server.handle_request(request, &context).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    config: McpConfig,
    state: HttpTransportState,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(config: McpConfig, server: McpServer, verifier: TokenVerifier) -> Self {
        Self {
            config,
            state: HttpTransportState::new(server, verifier),
        }
    }

    /// Run the HTTP server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), McpError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state);
        let addr = self.config.bind_addr();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!(addr = %addr, path = "/mcp", "MCP HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("MCP HTTP server stopped");
        Ok(())
    }
}
