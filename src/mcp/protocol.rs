//! MCP Protocol Types (JSON-RPC 2.0)
//!
//! This module defines the protocol types for the server side of the Model
//! Context Protocol (MCP). MCP is built on top of JSON-RPC 2.0.
//!
//! # Protocol Specification
//!
//! - JSON-RPC 2.0: <https://www.jsonrpc.org/specification>
//! - MCP Spec: <https://modelcontextprotocol.io/specification/2024-11-05>
//!
//! # Architecture
//!
//! The protocol layer is responsible only for serialization/deserialization of MCP messages.
//! Line framing is handled in the transport layer, dispatch in the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision implemented by this server
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// A JSON-RPC 2.0 request or notification
///
/// Requests carry an `id` (number or string) that the response must echo.
/// Notifications have no `id` and never get a response.
///
/// # Example
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": 1,
///   "method": "tools/call",
///   "params": {"name": "solve_lp", "arguments": {...}}
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McpRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier, absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Method name to invoke
    pub method: String,

    /// Method parameters (optional, depends on method)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpRequest {
    /// Create a new request
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Create a notification (no id, no response expected)
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: method.into(),
            params: None,
        }
    }

    /// Whether this message expects no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A JSON-RPC 2.0 response message
///
/// A response either contains a `result` or an `error`, but never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McpResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (null when the request id could not be read)
    pub id: Value,

    /// Result payload (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    /// Create a successful response
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(id: Value, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Check if the response is successful
    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }
}

/// A JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpError {
    /// Error code (JSON-RPC defined)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    /// Create a new error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    // JSON-RPC standard errors
    /// Parse error (-32700): Invalid JSON was received
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(-32700, message)
    }

    /// Invalid request (-32600): The JSON sent is not a valid Request object
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(-32600, message)
    }

    /// Method not found (-32601): The method does not exist / is not available
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(-32601, format!("Method not found: {}", method.into()))
    }

    /// Invalid params (-32602): Invalid method parameter(s)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(-32602, message)
    }

    /// Internal error (-32603): Internal JSON-RPC error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(-32603, message)
    }
}

impl std::fmt::Display for McpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Error {}] {}", self.code, self.message)
    }
}

impl std::error::Error for McpError {}

/// MCP methods handled by this server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum McpMethod {
    /// Initialize the connection (must be called first)
    Initialize,

    /// Client finished initialization (notification)
    Initialized,

    /// Liveness check
    Ping,

    /// List available tools
    ToolsList,

    /// Call a specific tool
    ToolsCall,

    /// Anything else
    Custom(String),
}

impl McpMethod {
    /// Convert to string for JSON-RPC method field
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initialize => "initialize",
            Self::Initialized => "notifications/initialized",
            Self::Ping => "ping",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl From<&str> for McpMethod {
    fn from(s: &str) -> Self {
        match s {
            "initialize" => Self::Initialize,
            "notifications/initialized" => Self::Initialized,
            "ping" => Self::Ping,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            _ => Self::Custom(s.to_string()),
        }
    }
}

/// Result of the `initialize` handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitializeResult {
    /// Server protocol version
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,

    /// Server capabilities
    pub capabilities: ServerCapabilities,

    /// Server information
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Capabilities advertised by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

/// Tool capability flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolsCapability {
    /// Whether the server emits tool list change notifications
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server identification information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server name
    pub name: String,

    /// Server version
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tool {
    /// Tool name (unique identifier)
    pub name: String,

    /// Tool description
    pub description: String,

    /// Tool input schema (JSON Schema)
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolsListResult {
    pub tools: Vec<Tool>,
}

/// Tool call parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallParams {
    /// Name of the tool to call
    pub name: String,

    /// Tool arguments (must match input schema)
    #[serde(default)]
    pub arguments: Value,
}

/// A content block in a tool result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text
    Text { text: String },
}

/// Result of `tools/call`
///
/// Always exactly one content block: the formatted result, or an error
/// message with `isError` set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallToolResult {
    pub content: Vec<Content>,

    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Successful text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error text result
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content block
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|content| match content {
            Content::Text { text } => text.as_str(),
        })
    }
}
