//! The failure taxonomy shared by the resolver, adapters and dispatcher.

use thiserror::Error;

/// Literal prefix of every failure text returned to the calling agent.
pub const ERROR_MARKER: &str = "error: ";

/// Result type for render pipeline operations.
pub type RenderOutcome<T> = Result<T, RenderError>;

/// Everything that can go wrong while serving one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Neither inline content nor a usable input file was supplied.
    #[error("missing input: one of `{content_field}` or `input_filepath` must be provided")]
    MissingInput { content_field: String },

    /// An input field held something other than a string.
    #[error("invalid argument: `{field}` must be a string")]
    InvalidArgument { field: String },

    /// Reading the input file or writing the output failed.
    #[error("io failure: {path}: {message}")]
    Io { path: String, message: String },

    /// Caller code ran but did not produce the object the tool needs.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The format is unknown or outside the tool's domain.
    #[error("unsupported format: `{format}` is not available for {tool} (supported: {supported})")]
    UnsupportedFormat {
        tool: String,
        format: String,
        supported: String,
    },

    /// Declarative input could not be parsed as structured data.
    #[error("malformed spec: {0}")]
    MalformedSpec(String),

    /// No tool with this name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The tool recognizes the format but cannot render it yet.
    #[error("not implemented: {format} output for {tool} is not implemented")]
    NotImplemented { tool: String, format: String },

    /// The rendering engine itself failed.
    #[error("{engine} rendering failed: {message}")]
    Backend { engine: String, message: String },
}

impl RenderError {
    /// Build an I/O failure for a path.
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        RenderError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Build an engine failure.
    pub fn backend(engine: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::Backend {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Text returned to the calling agent: the marker followed by the message.
    pub fn to_reply_text(&self) -> String {
        format!("{ERROR_MARKER}{self}")
    }
}
