//! Plotly figures built by caller-supplied Python code.
//!
//! Caller code never runs in this process. A separate interpreter
//! (`python -I`, empty environment, scratch working directory, timeout)
//! executes it in a namespace holding only [`FIGURE_NAMESPACE`], then prints
//! a [`FigureEnvelope`] describing what `fig` ended up bound to. Whether that
//! is an acceptable figure is decided here, on the host side.
//!
//! HTML output is written by the host from the figure JSON. PNG and SVG go
//! through a second interpreter run that calls kaleido via `plotly.io`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use diagram_maker_types::{OutputFormat, RenderError, RenderOutcome, ResolvedInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RenderAdapter;
use crate::server::materialize;
use crate::server::process::{self, ProcessSpec};

const ENGINE: &str = "Plotly";

/// Symbols pre-bound in the namespace caller code runs in.
pub const FIGURE_NAMESPACE: &[(&str, &str)] = &[
    ("pd", "pandas"),
    ("np", "numpy"),
    ("plt", "matplotlib.pyplot"),
    ("go", "plotly.graph_objects"),
];

/// Runs caller code and reports on `fig`. The code arrives on stdin.
///
/// The report goes to a private duplicate of fd 1; while caller code runs,
/// fd 1 points at stderr so nothing it prints can corrupt the report.
const RUNNER: &str = r#"
import contextlib, importlib, io, json, os, sys

report_out = os.fdopen(os.dup(1), "w")
os.dup2(2, 1)

report = {"bound": False, "is_figure": False, "type": None, "figure": None,
          "setup_error": None, "error": None}
namespace = {"__name__": "__figure__"}
try:
    import matplotlib
    matplotlib.use("Agg")
    figure_type = importlib.import_module("plotly.graph_objects").Figure
    for alias, module in json.loads(sys.argv[1]):
        namespace[alias] = importlib.import_module(module)
except BaseException as exc:
    report["setup_error"] = type(exc).__name__ + ": " + str(exc)

if report["setup_error"] is None:
    try:
        code = sys.stdin.read()
        with contextlib.redirect_stdout(io.StringIO()):
            exec(compile(code, "<figure>", "exec"), namespace, namespace)
        if "fig" in namespace:
            fig = namespace["fig"]
            report["bound"] = True
            report["type"] = type(fig).__module__ + "." + type(fig).__qualname__
            report["is_figure"] = isinstance(fig, figure_type)
            if report["is_figure"]:
                report["figure"] = json.loads(fig.to_json())
    except BaseException as exc:
        report["error"] = type(exc).__name__ + ": " + str(exc)

report_out.write(json.dumps(report))
report_out.flush()
"#;

/// Exports figure JSON from stdin as image bytes on stdout.
const EXPORTER: &str = r#"
import sys
import plotly.io as pio

fig = pio.from_json(sys.stdin.read())
sys.stdout.buffer.write(fig.to_image(format=sys.argv[1]))
"#;

/// What the sandboxed run reports about the `fig` variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureEnvelope {
    /// Whether `fig` was bound at all.
    pub bound: bool,
    /// Whether `fig` is a `plotly.graph_objects.Figure`, subclasses included.
    #[serde(default)]
    pub is_figure: bool,
    /// Fully qualified type name of `fig`.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Plotly figure JSON (`{"data": [...], "layout": {...}}`).
    pub figure: Option<Value>,
    /// The plotting stack could not be loaded.
    #[serde(default)]
    pub setup_error: Option<String>,
    /// Exception raised by caller code.
    pub error: Option<String>,
}

impl FigureEnvelope {
    /// Check the figure contract and return the figure JSON.
    pub fn into_figure(self) -> RenderOutcome<Value> {
        if let Some(error) = self.setup_error {
            return Err(RenderError::backend(
                ENGINE,
                format!("interpreter setup failed: {error}"),
            ));
        }
        if let Some(error) = self.error {
            return Err(RenderError::backend(ENGINE, format!("figure code raised {error}")));
        }
        if !self.bound {
            return Err(RenderError::ContractViolation(
                "the code must assign a plotly.graph_objects.Figure to the variable `fig`, \
                 but `fig` was never bound"
                    .to_string(),
            ));
        }
        if !self.is_figure {
            let type_name = self.type_name.unwrap_or_else(|| "unknown".to_string());
            return Err(RenderError::ContractViolation(format!(
                "`fig` must be a plotly.graph_objects.Figure, found {type_name}"
            )));
        }

        match self.figure {
            Some(figure @ Value::Object(_)) => Ok(figure),
            _ => Err(RenderError::ContractViolation(
                "`fig` could not be serialized as a Plotly figure".to_string(),
            )),
        }
    }
}

/// Renders Plotly figures produced by Python code.
#[derive(Debug, Clone)]
pub struct PlotlyAdapter {
    python: String,
    script_url: String,
    timeout: Duration,
}

impl PlotlyAdapter {
    /// Create an adapter using the interpreter `python`.
    pub fn new(python: impl Into<String>, script_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            script_url: script_url.into(),
            timeout,
        }
    }

    /// Run caller code in a fresh interpreter and parse its report.
    pub async fn run_code(&self, code: &str) -> RenderOutcome<FigureEnvelope> {
        let scratch = tempfile::tempdir()
            .map_err(|e| RenderError::backend(ENGINE, format!("failed to create scratch dir: {e}")))?;
        let namespace = serde_json::to_string(FIGURE_NAMESPACE)
            .map_err(|e| RenderError::backend(ENGINE, e.to_string()))?;

        let spec = self
            .interpreter(RUNNER)
            .args([namespace])
            .stdin(code)
            .cwd(scratch.path())
            // matplotlib wants a writable config dir; point it at scratch.
            .env("MPLCONFIGDIR", scratch.path().to_string_lossy());
        let output = process::run(spec).await;

        if !output.ok() {
            return Err(RenderError::backend(
                ENGINE,
                format!("interpreter failed ({})", output.failure_summary()),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            RenderError::backend(ENGINE, format!("unreadable interpreter report: {e}"))
        })
    }

    /// Standalone HTML document for a figure.
    pub fn document(&self, figure: &Value) -> String {
        let data = figure.get("data").cloned().unwrap_or_else(|| Value::Array(Vec::new()));
        let layout = figure
            .get("layout")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        format!(
            r#"<html>
<head>
    <meta charset="utf-8" />
    <script src="{script}"></script>
</head>
<body>
    <div id="figure" style="width:100%;height:100%;"></div>
    <script>
        Plotly.newPlot("figure", {data}, {layout}, {{ responsive: true }});
    </script>
</body>
</html>
"#,
            script = self.script_url,
            data = script_safe(&data),
            layout = script_safe(&layout),
        )
    }

    async fn export_image(&self, figure: &Value, format: OutputFormat) -> RenderOutcome<Vec<u8>> {
        let spec = self
            .interpreter(EXPORTER)
            .args([format.as_str()])
            .stdin(figure.to_string());
        let output = process::run(spec).await;

        if !output.ok() {
            return Err(RenderError::backend(
                ENGINE,
                format!("{format} export failed ({})", output.failure_summary()),
            ));
        }
        if output.stdout.is_empty() {
            return Err(RenderError::backend(ENGINE, format!("{format} export produced no data")));
        }
        Ok(output.stdout)
    }

    fn interpreter(&self, script: &str) -> ProcessSpec {
        ProcessSpec::new(&self.python)
            .args(["-I", "-c", script])
            .clear_env()
            .timeout(self.timeout)
    }
}

#[async_trait]
impl RenderAdapter for PlotlyAdapter {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    async fn render(
        &self,
        input: &ResolvedInput,
        format: OutputFormat,
        output_path: &Path,
    ) -> RenderOutcome<String> {
        let envelope = self.run_code(input.content()).await?;
        let figure = envelope.into_figure()?;

        match format {
            OutputFormat::Html => materialize::write(output_path, self.document(&figure)).await,
            OutputFormat::Png | OutputFormat::Svg => {
                let image = self.export_image(&figure, format).await?;
                materialize::write(output_path, image).await
            }
        }
    }
}

/// Serialize JSON for inline `<script>` use: `</` cannot close the tag.
fn script_safe(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}
