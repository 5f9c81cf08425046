//! The tool catalog: descriptors paired with the adapter that renders them.

use std::sync::Arc;
use std::time::Duration;

use diagram_maker_types::{Capability, OutputFormat, ToolDescriptor};

use super::adapters::{
    MermaidAdapter, PlantUmlAdapter, PlotlyAdapter, RenderAdapter, VegaLiteAdapter,
};
use super::config::McpServerConfig;

/// Plotly figures from Python code.
pub const PLOTLY_TOOL: &str = "create_plotly_graph";
/// PlantUML diagrams.
pub const PLANTUML_TOOL: &str = "create_plantuml_diagram";
/// Mermaid charts as HTML.
pub const MERMAID_TOOL: &str = "create_mermaid_chart";
/// Vega-Lite charts.
pub const VEGA_LITE_TOOL: &str = "create_vega_lite_chart";

/// A registered tool.
#[derive(Clone)]
pub struct RegisteredTool {
    /// What the tool accepts and can produce.
    pub descriptor: ToolDescriptor,
    /// Engine that renders it.
    pub adapter: Arc<dyn RenderAdapter>,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.descriptor.name)
            .field("engine", &self.adapter.engine())
            .finish()
    }
}

/// Ordered, immutable set of tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in diagram tools, configured from `config`.
    pub fn builtin(config: &McpServerConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_millis(config.render_timeout_ms);

        let mut registry = Self::new();
        registry.register(
            plotly_descriptor(),
            PlotlyAdapter::new(&config.plotly.python, &config.plotly.script_url, timeout),
        );
        registry.register(
            plantuml_descriptor(),
            PlantUmlAdapter::new(
                &config.plantuml.server_url,
                Duration::from_millis(config.plantuml.timeout_ms),
            )?,
        );
        registry.register(
            mermaid_descriptor(),
            MermaidAdapter::new(&config.mermaid.script_url),
        );
        registry.register(
            vega_lite_descriptor(),
            VegaLiteAdapter::new(&config.vega_lite.command, timeout),
        );
        Ok(registry)
    }

    /// Add a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, descriptor: ToolDescriptor, adapter: impl RenderAdapter + 'static) {
        let tool = RegisteredTool {
            descriptor,
            adapter: Arc::new(adapter),
        };
        match self
            .tools
            .iter_mut()
            .find(|t| t.descriptor.name == tool.descriptor.name)
        {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    /// Descriptors in registration order.
    pub fn list_tools(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.descriptor.name == name)
    }
}

fn plotly_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        PLOTLY_TOOL,
        "Create a graph with Plotly and write it in the requested format. Takes Python code \
         or the path of a file containing it. Use absolute paths for files.",
    )
    .content_field(
        "python_code",
        "Python code that builds a Plotly figure and assigns it to the variable `fig`. \
         `pd`, `np`, `plt` and `go` (plotly.graph_objects) are pre-imported.",
    )
    .filepath_description(
        "Path of a file containing Python code that assigns a Plotly figure to `fig`.",
    )
    .format(OutputFormat::Png, Capability::Implemented)
    .format(OutputFormat::Svg, Capability::Implemented)
    .format(OutputFormat::Html, Capability::Implemented)
    .default_output_path("output.png")
}

fn plantuml_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        PLANTUML_TOOL,
        "Create a flow, sequence or other UML diagram with PlantUML and write it in the \
         requested format. Takes PlantUML source or the path of a file containing it. \
         Use absolute paths for files.",
    )
    .content_field("source", "PlantUML source code.")
    .filepath_description("Path of a file containing PlantUML source code.")
    .format(OutputFormat::Png, Capability::Implemented)
    .format(OutputFormat::Svg, Capability::Implemented)
    .default_output_path("output.png")
}

fn mermaid_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        MERMAID_TOOL,
        "Create a chart with Mermaid and write it as an HTML document. Takes Mermaid source \
         or the path of a file containing it. Use absolute paths for files.",
    )
    .content_field("source", "Mermaid source code.")
    .filepath_description("Path of a file containing Mermaid source code.")
    .format(OutputFormat::Html, Capability::Implemented)
    .format(OutputFormat::Png, Capability::NotImplemented)
    .format(OutputFormat::Svg, Capability::NotImplemented)
    .default_output_path("output.html")
}

fn vega_lite_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        VEGA_LITE_TOOL,
        "Create a chart with Vega-Lite and write it in the requested format. Takes a \
         Vega-Lite JSON spec or the path of a file containing it. Use absolute paths for files.",
    )
    .content_field("vl_spec", "Vega-Lite JSON spec, as a string.")
    .filepath_description("Path of a file containing a Vega-Lite JSON spec.")
    .format(OutputFormat::Png, Capability::Implemented)
    .format(OutputFormat::Svg, Capability::Implemented)
    .default_output_path("output.png")
}
