//! Vega-Lite charts converted by the `vl-convert` CLI.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use diagram_maker_types::{OutputFormat, RenderError, RenderOutcome, ResolvedInput};
use serde_json::Value;

use super::RenderAdapter;
use crate::server::materialize;
use crate::server::process::{self, ProcessSpec};

const ENGINE: &str = "Vega-Lite";

/// Converts Vega-Lite JSON specs to PNG or SVG.
#[derive(Debug, Clone)]
pub struct VegaLiteAdapter {
    command: String,
    timeout: Duration,
}

impl VegaLiteAdapter {
    /// Create an adapter invoking `command` (usually `vl-convert`).
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Parse a spec. Anything but a JSON object is malformed.
    pub fn parse_spec(text: &str) -> RenderOutcome<Value> {
        let spec: Value =
            serde_json::from_str(text).map_err(|e| RenderError::MalformedSpec(e.to_string()))?;
        if !spec.is_object() {
            return Err(RenderError::MalformedSpec(
                "a Vega-Lite spec must be a JSON object".to_string(),
            ));
        }
        Ok(spec)
    }

    async fn convert(&self, spec: &Value, format: OutputFormat) -> RenderOutcome<Vec<u8>> {
        let subcommand = match format {
            OutputFormat::Png => "vl2png",
            OutputFormat::Svg => "vl2svg",
            OutputFormat::Html => {
                return Err(RenderError::UnsupportedFormat {
                    tool: "create_vega_lite_chart".to_string(),
                    format: format.to_string(),
                    supported: "png, svg".to_string(),
                })
            }
        };

        let scratch = tempfile::tempdir()
            .map_err(|e| RenderError::backend(ENGINE, format!("failed to create scratch dir: {e}")))?;
        let input = scratch.path().join("spec.vl.json");
        let output = scratch.path().join(format!("chart.{format}"));
        tokio::fs::write(&input, spec.to_string())
            .await
            .map_err(|e| RenderError::io(&input, &e))?;

        let cmd = ProcessSpec::new(&self.command)
            .args([
                subcommand.to_string(),
                "--input".to_string(),
                input.to_string_lossy().into_owned(),
                "--output".to_string(),
                output.to_string_lossy().into_owned(),
            ])
            .cwd(scratch.path())
            .timeout(self.timeout);
        let result = process::run(cmd).await;

        if !result.ok() {
            return Err(RenderError::backend(
                ENGINE,
                format!("{} {subcommand} failed ({})", self.command, result.failure_summary()),
            ));
        }

        tokio::fs::read(&output).await.map_err(|e| {
            RenderError::backend(ENGINE, format!("converter produced no {format} output: {e}"))
        })
    }
}

#[async_trait]
impl RenderAdapter for VegaLiteAdapter {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    async fn render(
        &self,
        input: &ResolvedInput,
        format: OutputFormat,
        output_path: &Path,
    ) -> RenderOutcome<String> {
        let spec = Self::parse_spec(input.content())?;
        let chart = self.convert(&spec, format).await?;
        materialize::write(output_path, chart).await
    }
}
