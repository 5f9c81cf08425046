//! Tool descriptors and per-tool capability tables.

use serde_json::{json, Map, Value};

use crate::format::OutputFormat;

/// Argument carrying a path to a file with the tool's source text.
pub const INPUT_FILEPATH_FIELD: &str = "input_filepath";
/// Argument naming the requested output format.
pub const OUTPUT_FORMAT_FIELD: &str = "output_format";
/// Argument naming where the rendered artifact is written.
pub const OUTPUT_PATH_FIELD: &str = "output_path";

/// Whether a tool can actually produce a format it recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Rendered and advertised in the input schema.
    Implemented,
    /// Recognized, never advertised, always answered with a not-implemented failure.
    NotImplemented,
}

/// Schema for one argument of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Argument name.
    pub name: String,
    /// Description shown to the calling agent.
    pub description: String,
}

impl FieldSchema {
    /// Create a field schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Describes one tool: its name, inputs, capabilities and defaults.
///
/// Every tool takes its source either inline (through `content_field`) or
/// from a file (`input_filepath`), plus the always-required `output_format`
/// and `output_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Short description for tool discovery.
    pub description: String,
    /// Field carrying inline source text.
    pub content_field: FieldSchema,
    /// Description of the `input_filepath` field.
    pub filepath_description: String,
    /// Format to capability, in advertising order.
    pub capabilities: Vec<(OutputFormat, Capability)>,
    /// Output path used when the caller omits one.
    pub default_output_path: String,
}

impl ToolDescriptor {
    /// Create a descriptor with no formats and an `output.png` default path.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            content_field: FieldSchema::new("source", "Source text"),
            filepath_description: "Path to a file containing the source text.".to_string(),
            capabilities: Vec::new(),
            default_output_path: "output.png".to_string(),
        }
    }

    /// Set the inline content field.
    pub fn content_field(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.content_field = FieldSchema::new(name, description);
        self
    }

    /// Set the description of the `input_filepath` field.
    pub fn filepath_description(mut self, description: impl Into<String>) -> Self {
        self.filepath_description = description.into();
        self
    }

    /// Register a format with its capability. Re-registering replaces it.
    pub fn format(mut self, format: OutputFormat, capability: Capability) -> Self {
        match self.capabilities.iter_mut().find(|(f, _)| *f == format) {
            Some(entry) => entry.1 = capability,
            None => self.capabilities.push((format, capability)),
        }
        self
    }

    /// Set the default output path.
    pub fn default_output_path(mut self, path: impl Into<String>) -> Self {
        self.default_output_path = path.into();
        self
    }

    /// Capability for a format, or `None` when the tool does not know it.
    pub fn capability(&self, format: OutputFormat) -> Option<Capability> {
        self.capabilities
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, c)| *c)
    }

    /// Formats that are implemented, in advertising order.
    pub fn implemented_formats(&self) -> Vec<OutputFormat> {
        self.capabilities
            .iter()
            .filter(|(_, c)| *c == Capability::Implemented)
            .map(|(f, _)| *f)
            .collect()
    }

    /// The format used when the caller omits `output_format`.
    pub fn default_format(&self) -> Option<OutputFormat> {
        self.implemented_formats().first().copied()
    }

    /// JSON Schema advertised for this tool's arguments.
    ///
    /// The `oneOf` clause states that exactly one of the content field and
    /// `input_filepath` must be supplied. Transports may treat it as advisory,
    /// so the resolver checks it again at call time.
    pub fn input_schema(&self) -> Map<String, Value> {
        let formats: Vec<&str> = self
            .implemented_formats()
            .iter()
            .map(|f| f.as_str())
            .collect();
        let format_list = formats.join(", ");

        let mut properties = Map::new();
        properties.insert(
            self.content_field.name.clone(),
            json!({ "type": "string", "description": self.content_field.description }),
        );
        properties.insert(
            INPUT_FILEPATH_FIELD.to_string(),
            json!({ "type": "string", "description": self.filepath_description }),
        );
        properties.insert(
            OUTPUT_FORMAT_FIELD.to_string(),
            json!({
                "type": "string",
                "enum": formats,
                "description": format!("Output format ({format_list})"),
            }),
        );
        properties.insert(
            OUTPUT_PATH_FIELD.to_string(),
            json!({
                "type": "string",
                "description": "Absolute path of the output file",
                "default": self.default_output_path,
            }),
        );

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert(
            "required".to_string(),
            json!([OUTPUT_FORMAT_FIELD, OUTPUT_PATH_FIELD]),
        );
        schema.insert(
            "oneOf".to_string(),
            json!([
                { "required": [self.content_field.name] },
                { "required": [INPUT_FILEPATH_FIELD] },
            ]),
        );
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mermaid_like() -> ToolDescriptor {
        ToolDescriptor::new("chart", "Render a chart")
            .content_field("source", "Chart source")
            .format(OutputFormat::Html, Capability::Implemented)
            .format(OutputFormat::Png, Capability::NotImplemented)
            .format(OutputFormat::Svg, Capability::NotImplemented)
            .default_output_path("output.html")
    }

    #[test]
    fn capability_lookup() {
        let tool = mermaid_like();
        assert_eq!(tool.capability(OutputFormat::Html), Some(Capability::Implemented));
        assert_eq!(tool.capability(OutputFormat::Png), Some(Capability::NotImplemented));

        let raster_only = ToolDescriptor::new("x", "y").format(OutputFormat::Png, Capability::Implemented);
        assert_eq!(raster_only.capability(OutputFormat::Html), None);
    }

    #[test]
    fn reregistering_a_format_replaces_it() {
        let tool = ToolDescriptor::new("x", "y")
            .format(OutputFormat::Png, Capability::NotImplemented)
            .format(OutputFormat::Png, Capability::Implemented);
        assert_eq!(tool.capabilities.len(), 1);
        assert_eq!(tool.capability(OutputFormat::Png), Some(Capability::Implemented));
    }

    #[test]
    fn default_format_is_first_implemented() {
        assert_eq!(mermaid_like().default_format(), Some(OutputFormat::Html));
        assert_eq!(ToolDescriptor::new("x", "y").default_format(), None);
    }

    #[test]
    fn schema_advertises_only_implemented_formats() {
        let schema = mermaid_like().input_schema();
        let formats = &schema["properties"][OUTPUT_FORMAT_FIELD]["enum"];
        assert_eq!(formats, &json!(["html"]));
    }

    #[test]
    fn schema_encodes_required_and_exclusive_inputs() {
        let schema = mermaid_like().input_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["required"], json!(["output_format", "output_path"]));
        assert_eq!(
            schema["oneOf"],
            json!([{ "required": ["source"] }, { "required": ["input_filepath"] }])
        );
        assert_eq!(
            schema["properties"][OUTPUT_PATH_FIELD]["default"],
            json!("output.html")
        );
    }
}
