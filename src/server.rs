use std::sync::Arc;

use rmcp::{ErrorData as McpError, ServerHandler, model::*};

use crate::{
    bridge::Bridge,
    handlers::{capture, elements},
    tools::ToolDefinitions,
};

/// MCP front end over the in-process extension bridge.
#[derive(Clone)]
pub struct ConnectorMcpServer {
    bridge: Arc<Bridge>,
}

impl ConnectorMcpServer {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    pub async fn dispatch(&self, name: &str) -> Result<CallToolResult, McpError> {
        match name {
            "capture_screenshot" => capture::handle_capture_screenshot(&self.bridge).await,
            "get_connection_status" => capture::handle_get_connection_status(&self.bridge).await,
            "get_selected_elements" => elements::handle_get_selected_elements(&self.bridge).await,
            "clear_selected_elements" => {
                elements::handle_clear_selected_elements(&self.bridge).await
            }
            _ => Err(McpError::method_not_found::<CallToolRequestMethod>()),
        }
    }
}

impl ServerHandler for ConnectorMcpServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion::V_2024_11_05,
            server_info: Implementation {
                name: "browser-connector".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                ..Default::default()
            },
            instructions: Some(
                "Browser connector - screenshots and element selection through the browser extension"
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: ToolDefinitions::list_all(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!("MCP tool call: {}", request.name);
        self.dispatch(request.name.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::test_support::bridge_in;

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let server = ConnectorMcpServer::new(Arc::new(bridge_in(dir.path())));

        assert!(server.dispatch("navigate").await.is_err());
        assert!(server.dispatch("get_selected_elements").await.is_ok());
    }

    #[test]
    fn test_server_info_advertises_tools() {
        let dir = tempfile::tempdir().unwrap();
        let server = ConnectorMcpServer::new(Arc::new(bridge_in(dir.path())));

        let info = server.get_info();
        assert_eq!(info.server_info.name, "browser-connector");
        assert!(info.capabilities.tools.is_some());
    }
}
