//! MCP server implementation.
//!
//! This module provides the JSON-RPC dispatcher behind the HTTP transport.
//! Authentication has already happened by the time a request gets here; the
//! verified claims arrive as a [`RequestContext`].

use crate::catalog;
use crate::executor::ToolExecutor;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use stockroom_store::DocumentStore;

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "stockroom-mcp";

/// The MCP server.
#[derive(Clone)]
pub struct McpServer {
    tools: ToolRegistry,
    executor: ToolExecutor,
}

impl McpServer {
    /// Create a server exposing the product tools over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let tools = catalog::product_registry();
        tracing::info!(
            tool_count = tools.len(),
            collection = %store.collection(),
            "Registered product tools"
        );
        Self {
            tools,
            executor: ToolExecutor::new(store),
        }
    }

    /// Handle a JSON-RPC request.
    ///
    /// Returns `None` for notifications.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        context: &RequestContext,
    ) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }

        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                "Unsupported JSON-RPC version",
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params.as_ref()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params, context).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<&Value>) -> JsonRpcResponse {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        let result = json!({
            "protocolVersion": version,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({ "tools": self.tools.list() });
        JsonRpcResponse::success(id, result)
    }

    async fn handle_call_tool(
        &self,
        id: Option<Value>,
        params: Option<Value>,
        context: &RequestContext,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        if !self.tools.contains(&params.name) {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Tool not found: {}", params.name),
            );
        }

        match self
            .executor
            .execute(&params.name, params.arguments, context)
            .await
        {
            Ok(result) => match serde_json::to_value(result.into_call_result()) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(e) => JsonRpcResponse::error(id, e.code(), e.to_string()),
        }
    }
}
