//! Loop do servidor MCP.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::assistant::SupportAssistant;
use crate::types::config::Config;
use crate::SupportResult;

use super::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult,
};
use super::tools::ToolHandler;
use super::transport::{Incoming, LineTransport, StdioTransport};

/// Serve as ferramentas de atendimento via JSON-RPC.
pub struct McpServer {
    tools: ToolHandler,
    initialized: bool,
}

impl McpServer {
    pub fn new(assistant: Arc<SupportAssistant>) -> Self {
        Self {
            tools: ToolHandler::new(assistant),
            initialized: false,
        }
    }

    pub fn from_config(config: &Config) -> SupportResult<Self> {
        Ok(Self::new(Arc::new(SupportAssistant::from_config(config)?)))
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Serve stdin/stdout até o cliente desconectar.
    pub async fn run(&mut self) -> SupportResult<()> {
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport).await
    }

    /// Serve `transport` até EOF. Linhas inválidas recebem resposta, nunca são fatais.
    pub async fn serve<R, W>(&mut self, transport: &mut LineTransport<R, W>) -> SupportResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server starting");

        while let Some(incoming) = transport.read_message().await? {
            let response = match incoming {
                Incoming::Request(request) if request.is_notification() => {
                    self.handle_notification(&request);
                    continue;
                }
                Incoming::Request(request) => self.handle_request(request).await,
                Incoming::Malformed(detail) => {
                    JsonRpcResponse::error(None, JsonRpcError::parse_error(detail))
                }
            };

            if let Err(e) = transport.write_response(&response).await {
                tracing::error!(error = %e, "Failed to write response");
            }
        }

        tracing::info!("Client disconnected, MCP server stopped");
        Ok(())
    }

    /// Responde uma requisição.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "Handling request");

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
            );
        }

        match request.method.as_str() {
            "initialize" => {
                tracing::info!("Client initializing connection");
                self.initialized = true;
                JsonRpcResponse::success(request.id, to_value(InitializeResult::default()))
            }
            "initialized" => {
                self.handle_notification(&request);
                JsonRpcResponse::success(request.id, json!({}))
            }
            "shutdown" => {
                tracing::info!("Client requested shutdown");
                self.initialized = false;
                JsonRpcResponse::success(request.id, Value::Null)
            }
            "tools/list" => JsonRpcResponse::success(
                request.id,
                to_value(ListToolsResult {
                    tools: ToolHandler::list_tools(),
                }),
            ),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method)),
        }
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" => tracing::info!("Client initialization complete"),
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let Some(params) = request.params else {
            return JsonRpcResponse::error(request.id, JsonRpcError::invalid_params("Missing params"));
        };

        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                )
            }
        };

        let result = self.tools.handle_tool_call(&params.name, params.arguments).await;

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(request.id, JsonRpcError::internal_error(e.to_string())),
        }
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
