//! diagram-maker-mcp: an MCP server exposing diagram and chart rendering tools.
//!
//! The [`server`] module holds the tool registry, adapters and rmcp handler.
//! The [`client`] module is a small MCP client, used to drive the server
//! binary end to end.

pub mod client;
pub mod server;

pub use client::{McpClient, McpConfig, McpTransport};
