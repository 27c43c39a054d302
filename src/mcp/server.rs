//! Skincare MCP Server
//!
//! Native Rust implementation of the MCP (Model Context Protocol) server that
//! exposes the `get-selfie-analysis` tool over a JSON-RPC 2.0 stdio channel.
//! One request is read per line and one response line is written back;
//! notifications get no response.

use super::tools::{SelfieAnalysisTool, ToolRegistry};
use super::types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, INTERNAL_ERROR,
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::config::{
    RelayConfig, DEFAULT_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION,
    SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::error::{Result, SkincareError};
use crate::relay::ImageRelay;
use serde_json::{json, Value};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Process-wide server context: identity plus the registered tools.
///
/// Built once at startup and handed to whatever owns the transport.
pub struct McpServer {
    tools: ToolRegistry,
}

impl McpServer {
    /// Server with the selfie analysis tool wired to `config`'s endpoint
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let relay = ImageRelay::new(config)?;
        let mut tools = ToolRegistry::default();
        SelfieAnalysisTool::new(relay).register(&mut tools);
        Ok(Self::with_tools(tools))
    }

    pub fn with_tools(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Serve requests until `reader` hits EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle one raw line. `None` means nothing should be written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        if line.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => {
                // Notifications (no id) never get a response
                if request.id.is_none() {
                    handle_notification(&request);
                    return None;
                }
                Some(self.handle_request(request).await)
            },
            Err(e) => {
                tracing::warn!(error = %e, "Unparsable JSON-RPC message");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            },
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                format!("Invalid JSON-RPC version: {}", request.jsonrpc),
            );
        }

        crate::log_mcp_operation!("request", request.method.as_str());

        let result = match request.method.as_str() {
            "initialize" => Ok(handle_initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tool_call(request.params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
            _ => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(error) => JsonRpcResponse::failure(request.id, error),
        }
    }

    fn handle_tools_list(&self) -> Value {
        json!({ "tools": self.tools.definitions() })
    }

    async fn handle_tool_call(
        &self,
        params: Option<Value>,
    ) -> std::result::Result<Value, JsonRpcError> {
        let params: ToolCallParams = serde_json::from_value(params.unwrap_or(json!({})))
            .map_err(|e| {
                JsonRpcError::new(INVALID_PARAMS, format!("Invalid tool call parameters: {}", e))
            })?;

        crate::log_mcp_operation!("tool_call", "tools/call", params.name.as_str());

        let result = self
            .tools
            .call(&params.name, params.arguments)
            .await
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, e.to_string()))?;

        serde_json::to_value(&result)
            .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, format!("Serialization error: {}", e)))
    }
}

fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" | "initialized" => {
            tracing::info!("MCP client initialized");
        },
        "notifications/cancelled" => {
            // Calls run to completion; cancellation is only acknowledged in the log
            tracing::warn!(params = ?request.params, "Request cancelled by client");
        },
        _ => {
            tracing::debug!(method = %request.method, "Ignoring notification");
        },
    }
}

fn handle_initialize(params: Option<&Value>) -> Value {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);

    let protocol_version = match requested {
        Some(v) if SUPPORTED_PROTOCOL_VERSIONS.contains(&v) => v,
        _ => DEFAULT_PROTOCOL_VERSION,
    };

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {
                "listChanged": false
            },
            "resources": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION
        }
    })
}

/// Run the MCP server on stdin/stdout until stdin closes
pub async fn run(config: &RelayConfig) -> Result<()> {
    let server = McpServer::new(config)?;

    tracing::info!(
        server = SERVER_NAME,
        version = SERVER_VERSION,
        echo_url = %config.echo_url,
        "Skincare MCP server running on stdio"
    );

    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .map_err(|e| SkincareError::Startup(format!("stdio transport failed: {}", e)))?;

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
