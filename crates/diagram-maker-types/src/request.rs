//! Per-call request data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RenderError, RenderOutcome};

/// One incoming tool call: a name and its JSON arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Tool to dispatch to.
    pub tool_name: String,
    /// Arguments by field name.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl InvocationRequest {
    /// Create a request with no arguments.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: Map::new(),
        }
    }

    /// Add a string argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name.into(), Value::String(value.into()));
        self
    }

    /// Read an optional string argument.
    ///
    /// Absent and `null` read as `None`; any other non-string value is an
    /// [`RenderError::InvalidArgument`].
    pub fn optional_str(&self, field: &str) -> RenderOutcome<Option<&str>> {
        match self.arguments.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(RenderError::InvalidArgument {
                field: field.to_string(),
            }),
        }
    }
}

/// The single content string chosen between inline and file input.
///
/// Never empty: the resolver fails instead of producing an empty input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    content: String,
}

impl ResolvedInput {
    /// Wrap non-empty content. Returns `None` for an empty string.
    pub fn new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// The content, unmodified.
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_input_rejects_empty() {
        assert!(ResolvedInput::new("").is_none());
        let input = ResolvedInput::new("  graph TD\n").expect("non-empty");
        assert_eq!(input.content(), "  graph TD\n");
    }

    #[test]
    fn request_builder_and_lookup() {
        let mut req = InvocationRequest::new("create_mermaid_chart")
            .arg("source", "graph TD; A-->B")
            .arg("output_format", "html");
        req.arguments.insert("input_filepath".into(), Value::Null);
        req.arguments.insert("output_path".into(), Value::from(42));

        assert_eq!(req.optional_str("source"), Ok(Some("graph TD; A-->B")));
        assert_eq!(req.optional_str("output_format"), Ok(Some("html")));
        assert_eq!(req.optional_str("input_filepath"), Ok(None));
        assert_eq!(req.optional_str("missing"), Ok(None));
        assert_eq!(
            req.optional_str("output_path"),
            Err(RenderError::InvalidArgument {
                field: "output_path".into()
            })
        );
    }
}
