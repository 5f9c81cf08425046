//! MCP server functionality for diagram-maker.
//!
//! Four tools render diagrams and charts to files:
//!
//! - **create_plotly_graph**: Python code producing a Plotly figure
//! - **create_plantuml_diagram**: PlantUML source, rendered by a PlantUML server
//! - **create_mermaid_chart**: Mermaid source, written as an HTML document
//! - **create_vega_lite_chart**: Vega-Lite JSON, converted by `vl-convert`
//!
//! Every call replies with one text item: the output path on success, or a
//! message starting with `error: `.
//!
//! # Example
//!
//! ```ignore
//! use diagram_maker_mcp::server::{DiagramServerHandler, McpServerConfig};
//! use rmcp::transport::io::stdio;
//! use rmcp::service::ServiceExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = McpServerConfig::load()?;
//!     let handler = DiagramServerHandler::new(config)?;
//!
//!     let transport = stdio();
//!     handler.serve(transport).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod dispatch;
pub mod handler;
pub mod materialize;
pub mod process;
pub mod registry;
pub mod resolve;

pub use config::McpServerConfig;
pub use dispatch::Dispatcher;
pub use handler::DiagramServerHandler;
pub use registry::ToolRegistry;
