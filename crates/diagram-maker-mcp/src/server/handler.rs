//! MCP server handler implementation.
//!
//! Implements the rmcp::ServerHandler trait over the tool registry. Tool
//! schemas are built from descriptors rather than derived, so each tool can
//! advertise its own format enum and the `oneOf` input rule.

use std::sync::Arc;

use anyhow::Context;
use diagram_maker_types::{InvocationRequest, RenderResult, ToolDescriptor};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData as McpError;

use super::config::McpServerConfig;
use super::dispatch::Dispatcher;
use super::registry::ToolRegistry;

/// The diagram-maker MCP server handler.
#[derive(Debug, Clone)]
pub struct DiagramServerHandler {
    /// Server configuration.
    config: McpServerConfig,
    /// Routes calls to adapters.
    dispatcher: Dispatcher,
}

impl DiagramServerHandler {
    /// Create a handler with the built-in tools.
    pub fn new(config: McpServerConfig) -> anyhow::Result<Self> {
        let registry = ToolRegistry::builtin(&config).context("Failed to build tool registry")?;
        tracing::debug!(tools = registry.list_tools().count(), "registered tools");
        Ok(Self::with_registry(config, registry))
    }

    /// Create a handler over an explicit registry.
    pub fn with_registry(config: McpServerConfig, registry: ToolRegistry) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(Arc::new(registry)),
        }
    }

    /// Advertised tools, in registry order.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .list_tools()
            .map(to_mcp_tool)
            .collect()
    }

    /// Run one call and wrap the outcome as a single text item.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let request = InvocationRequest {
            tool_name: name.to_string(),
            arguments: arguments.unwrap_or_default(),
        };
        to_reply(self.dispatcher.dispatch(request).await)
    }

    fn instructions(&self) -> String {
        let mut text = String::from(
            "diagram-maker renders diagrams and charts to files and replies with the output \
             path, or with a message starting with \"error: \".\n\nTools:\n",
        );
        for descriptor in self.dispatcher.registry().list_tools() {
            let formats: Vec<&str> = descriptor
                .implemented_formats()
                .iter()
                .map(|f| f.as_str())
                .collect();
            text.push_str(&format!("• {} ({})\n", descriptor.name, formats.join(", ")));
        }
        text.push_str(
            "\nPass the source inline or via input_filepath. Use absolute paths for files.",
        );
        text
    }
}

fn to_mcp_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name.clone(),
        descriptor.description.clone(),
        Arc::new(descriptor.input_schema()),
    )
}

/// Exactly one text item: the output path or the marked error message.
fn to_reply(result: RenderResult) -> CallToolResult {
    CallToolResult::success(vec![Content::text(result.text().to_string())])
}

impl rmcp::ServerHandler for DiagramServerHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(self.instructions()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}
