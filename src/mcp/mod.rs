use crate::core::error::TodoError;
use crate::tools::{ToolSet, is_error_value};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool as McpTool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use std::sync::Arc;

const SERVER_INSTRUCTIONS: &str = "Manage a todo list: add, list, inspect, update, toggle and delete todo items.";

/// MCP stdio server exposing the todo tools to desktop assistants.
#[derive(Clone)]
pub struct TodoMcpServer {
    tools: Arc<ToolSet>,
}

impl TodoMcpServer {
    pub fn new(tools: Arc<ToolSet>) -> Self {
        Self { tools }
    }

    /// Tool descriptors advertised in `tools/list`.
    pub fn tool_definitions(&self) -> Vec<McpTool> {
        self.tools
            .tools()
            .iter()
            .map(|tool| {
                let schema = match tool.parameters_schema() {
                    Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };
                McpTool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema),
                )
            })
            .collect()
    }

    pub async fn run_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let value = self.tools.call_tool(name, arguments).await.map_err(|e| {
            tracing::warn!(tool = name, "unknown tool requested");
            McpError::invalid_params(e.to_string(), None)
        })?;
        Ok(to_call_result(&value))
    }
}

/// Wraps a tool's JSON result; `{"error": ...}` payloads are flagged as
/// tool errors.
pub fn to_call_result(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if is_error_value(value) {
        CallToolResult::error(vec![Content::text(text)])
    } else {
        CallToolResult::success(vec![Content::text(text)])
    }
}

impl ServerHandler for TodoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_definitions(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = %request.name, "mcp tool call");
        let arguments = Value::Object(request.arguments.unwrap_or_default());
        self.run_tool(&request.name, arguments).await
    }
}

/// Serves the tools on stdin/stdout until the client disconnects.
pub async fn serve_stdio(tools: Arc<ToolSet>) -> Result<(), TodoError> {
    tracing::info!("starting MCP server on stdio");
    let service = TodoMcpServer::new(tools)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| TodoError::Mcp(format!("Failed to start MCP server: {}", e)))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| TodoError::Mcp(format!("MCP server stopped unexpectedly: {}", e)))?;
    tracing::info!(?reason, "MCP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteTodoStore;
    use crate::tools::todo_tools;
    use serde_json::json;
    use tempfile::TempDir;

    fn server() -> (TempDir, TodoMcpServer) {
        let dir = TempDir::new().unwrap();
        let store = SqliteTodoStore::open(dir.path().join("todos.db")).unwrap();
        let tools = Arc::new(todo_tools(Arc::new(store)));
        (dir, TodoMcpServer::new(tools))
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn advertises_tools_with_schemas() {
        let (_dir, server) = server();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());

        let tools = server.tool_definitions();
        assert_eq!(tools.len(), 6);
        let add = tools.iter().find(|t| t.name == "add_todo").unwrap();
        assert_eq!(add.input_schema["required"], json!(["title"]));
    }

    #[tokio::test]
    async fn successful_call_is_not_error() {
        let (_dir, server) = server();

        let result = server
            .run_tool("add_todo", json!({ "title": "Buy milk" }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["title"], "Buy milk");
    }

    #[tokio::test]
    async fn error_payload_sets_is_error() {
        let (_dir, server) = server();

        let result = server
            .run_tool("get_todo", json!({ "id": 9 }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("Todo #9 not found"));
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error() {
        let (_dir, server) = server();
        assert!(server.run_tool("nope", json!({})).await.is_err());
    }
}
