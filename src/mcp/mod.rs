//! Servidor MCP (Model Context Protocol).
//!
//! Expõe o assistente de atendimento como ferramentas via JSON-RPC
//! delimitado por newline em stdin/stdout:
//!
//! - `support_create_session`
//! - `support_chat`
//! - `support_tickets`
//! - `support_human_response`
//! - `support_analytics`
//! - `support_knowledge`
//!
//! ```ignore
//! use supportloop::mcp::McpServer;
//! use supportloop::Config;
//!
//! #[tokio::main]
//! async fn main() -> supportloop::SupportResult<()> {
//!     let config = Config::load_or_default();
//!     McpServer::from_config(&config)?.run().await
//! }
//! ```

mod protocol;
mod server;
mod tools;
mod transport;

pub use protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolContent, ToolDescription, ToolResult,
    ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};

pub use server::McpServer;
pub use tools::ToolHandler;
pub use transport::{Incoming, LineTransport, StdioTransport};
