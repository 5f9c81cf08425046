//! Input resolution.
//!
//! Every tool takes its source either inline or from `input_filepath`. This
//! module turns those two optional fields into one [`ResolvedInput`].

use diagram_maker_types::{
    InvocationRequest, RenderError, RenderOutcome, ResolvedInput, ToolDescriptor,
    INPUT_FILEPATH_FIELD,
};

/// Resolve the input for a call against the tool's descriptor.
pub async fn resolve_request(
    descriptor: &ToolDescriptor,
    request: &InvocationRequest,
) -> RenderOutcome<ResolvedInput> {
    let content_field = descriptor.content_field.name.as_str();
    let inline = request.optional_str(content_field)?;
    let filepath = request.optional_str(INPUT_FILEPATH_FIELD)?;
    resolve(content_field, inline, filepath).await
}

/// Choose between inline content and a file.
///
/// A file path wins over inline content when both are given. That override
/// is kept without an error, but logged. Empty content, whether inline or
/// read from the file, counts as missing.
pub async fn resolve(
    content_field: &str,
    inline: Option<&str>,
    filepath: Option<&str>,
) -> RenderOutcome<ResolvedInput> {
    let content = match filepath {
        Some(path) => {
            if inline.is_some() {
                tracing::warn!(
                    path = %path,
                    field = %content_field,
                    "both inline content and input_filepath given; using the file"
                );
            }
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| RenderError::io(path, &e))?;
            Some(text)
        }
        None => inline.map(str::to_string),
    };

    content
        .and_then(ResolvedInput::new)
        .ok_or_else(|| RenderError::MissingInput {
            content_field: content_field.to_string(),
        })
}
