//! Call dispatch: one linear pipeline from tool name to reply.

use std::path::Path;
use std::sync::Arc;

use diagram_maker_types::{
    Capability, InvocationRequest, OutputFormat, RenderError, RenderOutcome, RenderResult,
    OUTPUT_FORMAT_FIELD, OUTPUT_PATH_FIELD,
};

use super::registry::{RegisteredTool, ToolRegistry};
use super::resolve;

/// Routes tool calls to their adapters.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one call. Never fails: errors come back as a failure result.
    #[tracing::instrument(skip_all, fields(tool = %request.tool_name))]
    pub async fn dispatch(&self, request: InvocationRequest) -> RenderResult {
        let outcome = self.run(&request).await;
        match &outcome {
            Ok(path) => tracing::info!(output_path = %path, "render complete"),
            Err(err) => tracing::warn!(error = %err, "render failed"),
        }
        outcome.into()
    }

    async fn run(&self, request: &InvocationRequest) -> RenderOutcome<String> {
        let tool = self
            .registry
            .get(&request.tool_name)
            .ok_or_else(|| RenderError::UnknownTool(request.tool_name.clone()))?;
        let descriptor = &tool.descriptor;

        let requested_format = match request.optional_str(OUTPUT_FORMAT_FIELD)? {
            Some(format) => format.to_string(),
            None => descriptor
                .default_format()
                .map(|f| f.to_string())
                .unwrap_or_default(),
        };
        let output_path = request
            .optional_str(OUTPUT_PATH_FIELD)?
            .unwrap_or(descriptor.default_output_path.as_str())
            .to_string();
        tracing::debug!(format = %requested_format, output_path = %output_path, "dispatching");

        let input = resolve::resolve_request(descriptor, request).await?;
        let format = check_format(tool, &requested_format)?;

        tool.adapter
            .render(&input, format, Path::new(&output_path))
            .await
    }
}

/// Map the requested format onto the tool's capability table.
fn check_format(tool: &RegisteredTool, requested: &str) -> RenderOutcome<OutputFormat> {
    let descriptor = &tool.descriptor;
    let unsupported = || RenderError::UnsupportedFormat {
        tool: descriptor.name.clone(),
        format: requested.to_string(),
        supported: descriptor
            .implemented_formats()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    };

    let format: OutputFormat = requested.parse().map_err(|_| unsupported())?;
    match descriptor.capability(format) {
        Some(Capability::Implemented) => Ok(format),
        Some(Capability::NotImplemented) => Err(RenderError::NotImplemented {
            tool: descriptor.name.clone(),
            format: format.to_string(),
        }),
        None => Err(unsupported()),
    }
}
