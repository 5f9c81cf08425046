//! MCP client for a diagram-maker server.
//!
//! Spawns the server as a child process and speaks MCP over its stdio.
//! Replies are mapped back into [`RenderResult`] by the error marker.

use std::sync::Arc;

use anyhow::{Context, Result};
use diagram_maker_types::{RenderResult, ERROR_MARKER};
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent, Tool as McpTool};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::ClientHandler;
use serde_json::{Map, Value};
use tokio::process::Command;
use tokio::sync::RwLock;

/// How to launch the server.
#[derive(Debug, Clone)]
pub struct McpConfig {
    /// Human-readable name for this server.
    pub name: String,
    /// Transport configuration.
    pub transport: McpTransport,
}

/// Transport type for MCP connection.
#[derive(Debug, Clone)]
pub enum McpTransport {
    /// Stdio transport via child process.
    Stdio {
        /// Command to execute.
        command: String,
        /// Arguments to pass.
        args: Vec<String>,
        /// Environment variables.
        env: Vec<(String, String)>,
    },
}

/// We only call tools, so server requests and notifications are ignored.
#[derive(Debug, Clone, Copy, Default)]
struct MinimalClientHandler;

impl ClientHandler for MinimalClientHandler {}

type SharedService = Arc<RunningService<RoleClient, MinimalClientHandler>>;

/// Client for a running diagram-maker server.
///
/// Calls can run concurrently: the service lock is released before each
/// request is awaited.
pub struct McpClient {
    config: McpConfig,
    service: RwLock<Option<SharedService>>,
}

impl McpClient {
    /// Create a disconnected client.
    pub fn new(config: McpConfig) -> Self {
        Self {
            config,
            service: RwLock::new(None),
        }
    }

    /// Spawn the server and complete the MCP handshake.
    pub async fn connect(&self) -> Result<()> {
        let service = match &self.config.transport {
            McpTransport::Stdio { command, args, env } => {
                let args = args.clone();
                let env = env.clone();
                let transport = TokioChildProcess::new(Command::new(command).configure(
                    move |cmd| {
                        cmd.args(&args);
                        for (key, value) in &env {
                            cmd.env(key, value);
                        }
                    },
                ))
                .context("Failed to create child process transport")?;

                MinimalClientHandler
                    .serve(transport)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to initialize MCP connection: {}", e))?
            }
        };

        *self.service.write().await = Some(Arc::new(service));
        Ok(())
    }

    /// Stop the server.
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(service) = self.service.write().await.take() {
            // Other holders finish their in-flight calls first.
            if let Ok(service) = Arc::try_unwrap(service) {
                service
                    .cancel()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to cancel service: {}", e))?;
            }
        }
        Ok(())
    }

    /// Instructions the server returned from `initialize`.
    pub async fn instructions(&self) -> Result<Option<String>> {
        let service = self.service().await?;
        Ok(service
            .peer_info()
            .and_then(|info| info.instructions.clone()))
    }

    /// List the server's tools.
    pub async fn list_tools(&self) -> Result<Vec<McpTool>> {
        self.service()
            .await?
            .list_all_tools()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list tools: {}", e))
    }

    /// Call a tool and return the raw MCP result.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult> {
        self.service()
            .await?
            .call_tool(CallToolRequestParams {
                name: name.to_string().into(),
                arguments,
                task: None,
                meta: None,
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to call tool: {}", e))
    }

    /// Call a tool and read its single text item back as a [`RenderResult`].
    pub async fn render(&self, name: &str, arguments: Value) -> Result<RenderResult> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => anyhow::bail!("Tool arguments must be an object, got {}", other),
        };
        let result = self.call_tool(name, arguments).await?;
        let text = reply_text(&result).context("Reply carried no text content")?;

        Ok(if text.starts_with(ERROR_MARKER) {
            RenderResult::Failure {
                message: text.to_string(),
            }
        } else {
            RenderResult::success(text)
        })
    }

    async fn service(&self) -> Result<SharedService> {
        self.service
            .read()
            .await
            .as_ref()
            .cloned()
            .context("Not connected to MCP server")
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("config", &self.config)
            .finish()
    }
}

/// The text of the first content item, if it is text.
pub fn reply_text(result: &CallToolResult) -> Option<&str> {
    result.content.first().and_then(|c| match &c.raw {
        RawContent::Text(text) => Some(text.text.as_str()),
        _ => None,
    })
}
