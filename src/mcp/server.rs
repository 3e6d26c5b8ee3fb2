//! MCP Server
//!
//! Dispatches JSON-RPC requests from an assistant host to the optimization
//! service. Tool failures never escape as JSON-RPC errors: every `tools/call`
//! yields exactly one content block, flagged with `isError` when the call
//! could not be completed.
//!
//! Requests are handled concurrently. Each input line runs in its own task
//! and replies are written by a single writer as they complete, so a slow
//! solve never holds up a `ping`. Replies carry the request id and may
//! arrive out of order.
//!
//! # Example
//!
//! ```ignore
//! use optimization_mcp::mcp::{McpServer, StdioTransport};
//!
//! let server = McpServer::new(Arc::new(client));
//! server.serve(StdioTransport::new()).await?;
//! ```

use crate::client::api::OptimizationApi;
use crate::error::ToolError;
use crate::mcp::format;
use crate::mcp::protocol::{
    CallToolResult, InitializeResult, McpError, McpMethod, McpRequest, McpResponse,
    ServerCapabilities, ServerInfo, Tool, ToolCallParams, ToolsListResult, PROTOCOL_VERSION,
};
use crate::mcp::tools::{tool_definitions, ToolCall};
use crate::mcp::transport::LineTransport;
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;

/// MCP tool-call server backed by an [`OptimizationApi`]
#[derive(Clone)]
pub struct McpServer {
    api: Arc<dyn OptimizationApi>,
    info: ServerInfo,
}

impl McpServer {
    /// Create a server using the crate name and version as server info
    pub fn new(api: Arc<dyn OptimizationApi>) -> Self {
        Self {
            api,
            info: ServerInfo::default(),
        }
    }

    /// Tool declarations returned by `tools/list`
    pub fn tools(&self) -> Vec<Tool> {
        tool_definitions()
    }

    /// Invoke a tool by name
    ///
    /// Never fails: errors are rendered into an error content block.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> CallToolResult {
        match self.dispatch(name, arguments).await {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                CallToolResult::error(format!("Error: {}", e))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let call = ToolCall::parse(name, arguments)?;
        tracing::info!("Calling tool {}", call.name());

        let text = match call {
            ToolCall::SolveLp(problem) => {
                format::format_solve_result(&self.api.solve_lp(problem).await?)
            }
            ToolCall::SolveMip(problem) => {
                format::format_solve_result(&self.api.solve_mip(problem).await?)
            }
            ToolCall::SolveTsp(problem) => {
                format::format_tsp_result(&self.api.solve_tsp(problem).await?)
            }
            ToolCall::AnalyzeProblem { description } => {
                format::format_analysis(&self.api.analyze_problem(&description).await?)
            }
            ToolCall::GetReport { report_id } => self.api.get_report(&report_id).await?,
        };

        Ok(text)
    }

    /// Handle one JSON-RPC message
    ///
    /// Returns `None` for notifications, which never get a response.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let method = McpMethod::from(request.method.as_str());

        if request.is_notification() {
            tracing::debug!("Received notification {}", method.as_str());
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        tracing::debug!("Handling {} (id={})", method.as_str(), id);

        let outcome = match method {
            McpMethod::Initialize => to_result(&InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities::default(),
                server_info: self.info.clone(),
            }),
            McpMethod::Ping => Ok(json!({})),
            McpMethod::ToolsList => to_result(&ToolsListResult {
                tools: self.tools(),
            }),
            McpMethod::ToolsCall => match parse_call_params(request.params) {
                Ok(params) => to_result(&self.call_tool(&params.name, params.arguments).await),
                Err(e) => Err(e),
            },
            McpMethod::Initialized | McpMethod::Custom(_) => {
                Err(McpError::method_not_found(method.as_str()))
            }
        };

        Some(match outcome {
            Ok(result) => McpResponse::ok(id, result),
            Err(error) => McpResponse::err(id, error),
        })
    }

    /// Handle one line of newline-delimited JSON-RPC, returning the serialized reply
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        self.handle_message(line.as_bytes()).await
    }

    /// Handle one raw input line, which may not be valid UTF-8
    ///
    /// Unparsable input gets `-32700` with a null id. Valid JSON that is
    /// not a request gets `-32600`, echoing its id when one can be read.
    pub async fn handle_message(&self, message: &[u8]) -> Option<String> {
        if message.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let response = match parse_message(message) {
            Ok(request) => self.handle_request(request).await?,
            Err(response) => response,
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    /// Serve requests until the transport reaches end of input
    ///
    /// Returns once input is closed and every in-flight request has been
    /// answered. Only an I/O failure on the transport ends it early.
    pub async fn serve<R, W>(&self, transport: LineTransport<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            "MCP server {} {} ready",
            self.info.name,
            self.info.version
        );

        let (mut reader, mut writer) = transport.into_split();
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

        // Dropped at end of input; the channel closes when the last task finishes
        let mut reply_tx = Some(reply_tx);

        loop {
            tokio::select! {
                line = reader.recv(), if reply_tx.is_some() => match line? {
                    Some(line) => {
                        if let Some(tx) = reply_tx.clone() {
                            self.spawn_handler(line, tx);
                        }
                    }
                    None => {
                        tracing::info!("Input closed, waiting for in-flight requests");
                        reply_tx = None;
                    }
                },
                reply = reply_rx.recv() => match reply {
                    Some(reply) => writer.send(&reply).await?,
                    None => break,
                },
            }
        }

        tracing::info!("All requests answered, shutting down");
        Ok(())
    }

    fn spawn_handler(&self, line: Vec<u8>, reply_tx: mpsc::UnboundedSender<String>) {
        let server = self.clone();
        tokio::spawn(async move {
            if let Some(reply) = server.handle_message(&line).await {
                if reply_tx.send(reply).is_err() {
                    tracing::debug!("Output closed, dropping reply");
                }
            }
        });
    }
}

fn parse_message(message: &[u8]) -> Result<McpRequest, McpResponse> {
    let value: Value = serde_json::from_slice(message).map_err(|e| {
        tracing::warn!("Unparsable message: {}", e);
        McpResponse::err(Value::Null, McpError::parse_error(e.to_string()))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!("Invalid request: {}", e);
        McpResponse::err(id, McpError::invalid_request(e.to_string()))
    })
}

fn parse_call_params(params: Option<Value>) -> Result<ToolCallParams, McpError> {
    let params = params.ok_or_else(|| McpError::invalid_params("Missing params for tools/call"))?;
    serde_json::from_value(params)
        .map_err(|e| McpError::invalid_params(format!("Invalid tools/call params: {}", e)))
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NetworkFailure, TransportError};
    use crate::test_support::MockApi;
    use std::time::Duration;

    fn server(api: MockApi) -> McpServer {
        McpServer::new(Arc::new(api))
    }

    fn lp_arguments() -> Value {
        json!({
            "variables": [{"name": "x"}, {"name": "y"}],
            "objective": {"sense": "maximize", "expression": "3*x + 2*y"},
            "constraints": [{"expression": "x + y <= 10"}]
        })
    }

    #[tokio::test]
    async fn test_call_tool_solve_lp() {
        let api = MockApi::default();
        let server = server(api.clone());

        let result = server.call_tool("solve_lp", lp_arguments()).await;

        assert!(!result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Status: OPTIMAL"));
        assert!(text.contains("  y = 10"));
        assert_eq!(api.calls(), vec!["solve_lp".to_string()]);
    }

    #[tokio::test]
    async fn test_call_tool_unknown_name() {
        let api = MockApi::default();
        let server = server(api.clone());

        let result = server.call_tool("delete_everything", json!({})).await;

        assert!(result.is_error);
        assert_eq!(result.content.len(), 1);
        assert!(result.first_text().unwrap().contains("delete_everything"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_call_tool_invalid_arguments() {
        let server = server(MockApi::default());
        let result = server.call_tool("analyze_problem", json!({})).await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("description"));
    }

    #[tokio::test]
    async fn test_call_tool_api_failure_is_error_block() {
        let api = MockApi::failing(|| TransportError::Status {
            method: "POST".to_string(),
            url: "http://localhost:8000/api/solve/tsp".to_string(),
            status: 500,
            body: "solver crashed".to_string(),
        });
        let server = server(api);

        let result = server
            .call_tool(
                "solve_tsp",
                json!({"locations": [{"name": "A", "latitude": 0.0, "longitude": 0.0}]}),
            )
            .await;

        assert!(result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.contains("500"));
        assert!(text.contains("solver crashed"));
    }

    #[tokio::test]
    async fn test_call_tool_get_report_returns_html() {
        let server = server(MockApi::default());
        let result = server
            .call_tool("get_report", json!({"report_id": "r-1"}))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.first_text(), Some("<html>r-1</html>"));
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = server(MockApi::default());
        let response = server
            .handle_request(McpRequest::new(1, "initialize", Some(json!({}))))
            .await
            .unwrap();

        assert!(response.is_success());
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "optimization-mcp");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_handle_notification_has_no_response() {
        let server = server(MockApi::default());
        let response = server
            .handle_request(McpRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_handle_tools_list() {
        let server = server(MockApi::default());
        let response = server
            .handle_request(McpRequest::new("abc", "tools/list", None))
            .await
            .unwrap();

        assert_eq!(response.id, json!("abc"));
        let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 5);
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let server = server(MockApi::default());
        let response = server
            .handle_request(McpRequest::new(7, "resources/list", None))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_handle_tools_call_missing_params() {
        let server = server(MockApi::default());
        let response = server
            .handle_request(McpRequest::new(2, "tools/call", None))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_handle_tools_call_network_failure() {
        let api = MockApi::failing(|| TransportError::Network {
            method: "POST".to_string(),
            url: "http://localhost:8000/api/analyze".to_string(),
            kind: NetworkFailure::Connect,
            message: "connection refused".to_string(),
        });
        let server = server(api);

        let response = server
            .handle_request(McpRequest::new(
                3,
                "tools/call",
                Some(json!({"name": "analyze_problem", "arguments": {"description": "plan"}})),
            ))
            .await
            .unwrap();

        // Tool failures are successful JSON-RPC responses carrying isError
        assert!(response.is_success());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_handle_line_parse_error() {
        let server = server(MockApi::default());
        let reply = server.handle_line("{not json").await.unwrap();
        let value: Value = serde_json::from_str(&reply).unwrap();

        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_handle_line_skips_blank_lines() {
        let server = server(MockApi::default());
        assert!(server.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_handle_line_valid_json_without_method_is_invalid_request() {
        let server = server(MockApi::default());
        let reply = server.handle_line(r#"{"jsonrpc":"2.0","id":9}"#).await.unwrap();
        let value: Value = serde_json::from_str(&reply).unwrap();

        assert_eq!(value["id"], 9);
        assert_eq!(value["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_handle_line_non_object_is_invalid_request() {
        let server = server(MockApi::default());
        let reply = server.handle_line("[1, 2]").await.unwrap();
        let value: Value = serde_json::from_str(&reply).unwrap();

        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_handle_message_invalid_utf8_is_parse_error() {
        let server = server(MockApi::default());
        let reply = server
            .handle_message(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"caf\xe9\"}")
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&reply).unwrap();

        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32700);
    }

    async fn serve_bytes(server: &McpServer, input: &[u8]) -> Vec<Value> {
        let mut output = Vec::new();
        server
            .serve(LineTransport::from_parts(input, &mut output))
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn reply_with_id(replies: &[Value], id: Value) -> &Value {
        replies.iter().find(|r| r["id"] == id).unwrap()
    }

    #[tokio::test]
    async fn test_serve_until_eof() {
        let server = server(MockApi::default());
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );

        let replies = serve_bytes(&server, input.as_bytes()).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(reply_with_id(&replies, json!(1))["result"], json!({}));
        let tools = &reply_with_id(&replies, json!(2))["result"]["tools"];
        assert_eq!(tools.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8_line() {
        let server = server(MockApi::default());
        let mut input = Vec::new();
        input.extend_from_slice(
            b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/call\",\"params\":{\"name\":\"analyze_problem\",\"arguments\":{\"description\":\"caf\xe9\"}}}\n",
        );
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

        let replies = serve_bytes(&server, &input).await;

        assert_eq!(replies.len(), 2);
        let rejected = reply_with_id(&replies, Value::Null);
        assert_eq!(rejected["error"]["code"], -32700);
        assert_eq!(reply_with_id(&replies, json!(2))["result"], json!({}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_answers_ping_while_tool_call_is_pending() {
        let api = MockApi::default().with_delay(Duration::from_secs(30));
        let server = server(api.clone());
        let solve = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "solve_lp", "arguments": lp_arguments()}
        });
        let input = format!(
            "{}\n{}\n",
            solve,
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#
        );

        let replies = serve_bytes(&server, input.as_bytes()).await;

        // Both answered before returning, the ping first
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 2);
        assert_eq!(replies[0]["result"], json!({}));
        assert_eq!(replies[1]["id"], 1);
        assert_eq!(replies[1]["result"]["isError"], false);
        assert_eq!(api.calls(), vec!["solve_lp".to_string()]);
    }
}
