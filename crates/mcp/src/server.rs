// MCP server: routes JSON-RPC methods for authenticated callers

use crate::dispatch::Dispatcher;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo,
    ToolContent, ToolsCapability, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use tollgate_core::{AccessGrant, ErrorKind, ErrorOutcome};

/// What the transport should send back for one message
#[derive(Debug)]
pub enum McpReply {
    /// Response to a request carrying an id
    Response(JsonRpcResponse),
    /// Credential rejected before the message was read
    Unauthorized(JsonRpcResponse),
    /// Notification accepted; nothing to send
    Accepted,
}

pub struct McpServer {
    dispatcher: Dispatcher,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, info: ServerInfo) -> Self {
        Self { dispatcher, info }
    }

    /// Handle one raw JSON-RPC message.
    ///
    /// The credential is checked before the body is parsed, so a caller
    /// without a valid token learns nothing about the message or the tools.
    pub async fn handle_message(&self, presented_token: &str, body: &[u8]) -> McpReply {
        let grant = match self.dispatcher.authenticate(presented_token) {
            Ok(grant) => grant,
            Err(_) => {
                return McpReply::Unauthorized(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::unauthorized(),
                ))
            }
        };

        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable JSON-RPC body");
                return McpReply::Response(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(_) => {
                return McpReply::Response(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(),
                ))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return McpReply::Response(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        self.handle_request(&grant, request).await
    }

    /// Route a parsed request for a caller holding `grant`
    async fn handle_request(&self, grant: &AccessGrant, request: JsonRpcRequest) -> McpReply {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return McpReply::Accepted;
        }
        let id = request.id.unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => self.initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                ListToolsResult {
                    tools: self.dispatcher.list_tools(grant),
                },
            ),
            "tools/call" => self.call_tool(grant, id, request.params).await,
            other => {
                tracing::debug!(method = other, "Unsupported method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(other))
            }
        };

        McpReply::Response(response)
    }

    fn initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    )
                }
            },
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, "Client initialized");
        }

        JsonRpcResponse::success(
            id,
            InitializeResult {
                protocol_version: params
                    .protocol_version
                    .unwrap_or_else(|| PROTOCOL_VERSION.to_string()),
                capabilities: ServerCapabilities {
                    tools: Some(ToolsCapability {
                        list_changed: false,
                    }),
                },
                server_info: self.info.clone(),
            },
        )
    }

    async fn call_tool(
        &self,
        grant: &AccessGrant,
        id: Value,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match serde_json::from_value(params.unwrap_or(Value::Null)) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tool call params: {}", e)),
                )
            }
        };

        match self.dispatcher.call(grant, &params.name, params.arguments).await {
            Ok(output) => JsonRpcResponse::success(id, CallToolResult::from(output)),
            Err(outcome) => outcome_response(id, outcome),
        }
    }
}

/// Map a failed dispatch onto the wire.
///
/// Handler failures are tool results flagged `isError`; everything else is a
/// JSON-RPC error whose data carries the kind tag.
pub fn outcome_response(id: Value, outcome: ErrorOutcome) -> JsonRpcResponse {
    let data = json!({ "kind": outcome.kind });

    match outcome.kind {
        ErrorKind::Unauthorized => {
            JsonRpcResponse::error(id, JsonRpcError::unauthorized().with_data(data))
        }
        ErrorKind::UnknownTool | ErrorKind::InvalidParams => JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_params(outcome.message).with_data(data),
        ),
        ErrorKind::HandlerError => JsonRpcResponse::success(
            id,
            CallToolResult {
                content: vec![ToolContent::error(outcome.message)],
                is_error: Some(true),
            },
        ),
    }
}
