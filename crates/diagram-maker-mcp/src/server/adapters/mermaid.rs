//! Mermaid charts as self-rendering HTML documents.
//!
//! The source is embedded verbatim; the browser renders it when the document
//! is opened. Raster and vector output are recognized but not implemented.

use std::path::Path;

use async_trait::async_trait;
use diagram_maker_types::{OutputFormat, RenderError, RenderOutcome, ResolvedInput};

use super::RenderAdapter;
use crate::server::materialize;

/// Tool name used in not-implemented failures.
const TOOL: &str = "create_mermaid_chart";

/// Renders Mermaid source into an HTML document.
#[derive(Debug, Clone)]
pub struct MermaidAdapter {
    script_url: String,
}

impl MermaidAdapter {
    /// Create an adapter whose documents load Mermaid from `script_url`.
    pub fn new(script_url: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
        }
    }

    /// Build the HTML document for `source`.
    pub fn document(&self, source: &str) -> String {
        format!(
            r#"
<html>
<head>
    <script src="{script}"></script>
    <script>
        mermaid.initialize({{ startOnLoad: true }});
    </script>
</head>
<body>
    <div class="mermaid">
    {source}
    </div>
</body>
</html>
"#,
            script = self.script_url,
            source = source,
        )
    }
}

#[async_trait]
impl RenderAdapter for MermaidAdapter {
    fn engine(&self) -> &'static str {
        "Mermaid"
    }

    async fn render(
        &self,
        input: &ResolvedInput,
        format: OutputFormat,
        output_path: &Path,
    ) -> RenderOutcome<String> {
        match format {
            OutputFormat::Html => {
                let html = self.document(input.content());
                materialize::write(output_path, html).await
            }
            OutputFormat::Png | OutputFormat::Svg => Err(RenderError::NotImplemented {
                tool: TOOL.to_string(),
                format: format.to_string(),
            }),
        }
    }
}
