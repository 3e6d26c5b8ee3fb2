//! MCP (Model Context Protocol) Tool Server
//!
//! Exposes the optimization service to an assistant host as MCP tools over
//! newline-delimited JSON-RPC on stdio.
//!
//! # Architecture
//!
//! 1. **Protocol Layer** (`protocol`): JSON-RPC 2.0 and MCP message types
//! 2. **Transport Layer** (`transport`): line framing over stdin/stdout
//! 3. **Tools** (`tools`): tool declarations and argument validation
//! 4. **Formatting** (`format`): response-to-text rendering
//! 5. **Server** (`server`): request dispatch onto an [`OptimizationApi`](crate::client::OptimizationApi)

// Protocol layer: JSON-RPC 2.0 message types
pub mod protocol;

// Transport layer: newline-delimited stdio
pub mod transport;

pub mod format;
pub mod server;
pub mod tools;

pub use protocol::{
    CallToolResult, Content, McpError, McpMethod, McpRequest, McpResponse, ServerInfo, Tool,
    ToolCallParams,
};
pub use server::McpServer;
pub use tools::{tool_definitions, ToolCall};
pub use transport::{LineReader, LineTransport, LineWriter, StdioTransport};

// Property-based tests module
#[cfg(test)]
mod proptests;
