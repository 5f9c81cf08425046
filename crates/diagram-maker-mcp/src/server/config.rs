//! Configuration for the diagram-maker MCP server.
//!
//! Configuration is loaded from the file named by `$DIAGRAM_MAKER_CONFIG`,
//! falling back to `~/.config/diagram-maker/mcp-server.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "DIAGRAM_MAKER_CONFIG";

/// Configuration for the diagram-maker MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Server name (shown to MCP clients).
    #[serde(default = "default_name")]
    pub name: String,

    /// Server version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Upper bound for one interpreter or converter run, in milliseconds.
    #[serde(default = "default_timeout")]
    pub render_timeout_ms: u64,

    /// Plotly figure rendering.
    #[serde(default)]
    pub plotly: PlotlyConfig,

    /// PlantUML diagram rendering.
    #[serde(default)]
    pub plantuml: PlantUmlConfig,

    /// Mermaid chart documents.
    #[serde(default)]
    pub mermaid: MermaidConfig,

    /// Vega-Lite chart conversion.
    #[serde(default)]
    pub vega_lite: VegaLiteConfig,
}

fn default_name() -> String {
    "diagram-maker".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_timeout() -> u64 {
    60_000
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            render_timeout_ms: default_timeout(),
            plotly: PlotlyConfig::default(),
            plantuml: PlantUmlConfig::default(),
            mermaid: MermaidConfig::default(),
            vega_lite: VegaLiteConfig::default(),
        }
    }
}

impl McpServerConfig {
    /// Load configuration from `$DIAGRAM_MAKER_CONFIG` or the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_path()?,
        };

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "diagram-maker")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("mcp-server.toml"))
    }
}

/// Python interpreter used to run figure code and export images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotlyConfig {
    /// Interpreter command (needs pandas, numpy, matplotlib, plotly, kaleido).
    ///
    /// Figure code runs under `-I` with an empty environment, so user
    /// site-packages (`pip install --user`) and `PYTHONPATH` are not seen.
    /// Point this at an interpreter whose own environment has the stack,
    /// e.g. `/opt/diagram-maker/venv/bin/python`.
    #[serde(default = "default_python")]
    pub python: String,

    /// plotly.js script referenced by HTML output.
    #[serde(default = "default_plotly_script")]
    pub script_url: String,
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_plotly_script() -> String {
    "https://cdn.plot.ly/plotly-2.35.2.min.js".to_string()
}

impl Default for PlotlyConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            script_url: default_plotly_script(),
        }
    }
}

/// PlantUML server used for diagram rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantUmlConfig {
    /// Base URL; `/png/<encoded>` and `/svg/<encoded>` are appended.
    #[serde(default = "default_plantuml_server")]
    pub server_url: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_ms: u64,
}

fn default_plantuml_server() -> String {
    "https://www.plantuml.com/plantuml".to_string()
}

fn default_http_timeout() -> u64 {
    30_000
}

impl Default for PlantUmlConfig {
    fn default() -> Self {
        Self {
            server_url: default_plantuml_server(),
            timeout_ms: default_http_timeout(),
        }
    }
}

/// Mermaid document template settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MermaidConfig {
    /// Client-side Mermaid script loaded by generated documents.
    #[serde(default = "default_mermaid_script")]
    pub script_url: String,
}

fn default_mermaid_script() -> String {
    "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js".to_string()
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            script_url: default_mermaid_script(),
        }
    }
}

/// Vega-Lite converter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegaLiteConfig {
    /// `vl-convert` command.
    #[serde(default = "default_vl_convert")]
    pub command: String,
}

fn default_vl_convert() -> String {
    "vl-convert".to_string()
}

impl Default for VegaLiteConfig {
    fn default() -> Self {
        Self {
            command: default_vl_convert(),
        }
    }
}
