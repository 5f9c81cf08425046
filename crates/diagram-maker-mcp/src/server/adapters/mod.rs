//! Backend adapters: one shim per rendering engine.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!     ↓  (resolved input, format, output path)
//! Arc<dyn RenderAdapter>
//!     ↓
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │ Plotly       │ PlantUML     │ Mermaid      │ Vega-Lite    │
//! │ python child │ HTTP server  │ HTML template│ vl-convert   │
//! └──────────────┴──────────────┴──────────────┴──────────────┘
//!     ↓
//! materialize::write
//! ```
//!
//! The dispatcher checks the tool's capability table before calling an
//! adapter, but adapters still reject formats they cannot produce.

mod mermaid;
mod plantuml;
mod plotly;
mod vega_lite;

pub use mermaid::MermaidAdapter;
pub use plantuml::PlantUmlAdapter;
pub use plotly::PlotlyAdapter;
pub use vega_lite::VegaLiteAdapter;

use std::path::Path;

use async_trait::async_trait;
use diagram_maker_types::{OutputFormat, RenderOutcome, ResolvedInput};

/// Uniform contract every rendering engine is exposed through.
#[async_trait]
pub trait RenderAdapter: Send + Sync {
    /// Engine name used in failure messages (e.g. "PlantUML").
    fn engine(&self) -> &'static str;

    /// Render `input` as `format` into `output_path`.
    ///
    /// Returns the output path on success. Every engine failure is returned
    /// as a [`RenderError`](diagram_maker_types::RenderError); nothing panics
    /// past this boundary.
    async fn render(
        &self,
        input: &ResolvedInput,
        format: OutputFormat,
        output_path: &Path,
    ) -> RenderOutcome<String>;
}
