//! RenderResult: the unit returned to the protocol layer for every call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// The outcome of one tool call.
///
/// Exactly one variant is populated. The textual form is either the output
/// path or a message starting with [`ERROR_MARKER`](crate::ERROR_MARKER), so
/// callers can tell the two apart without structured parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderResult {
    /// The artifact was written here.
    Success { output_path: String },
    /// The call failed; `message` already carries the marker.
    Failure { message: String },
}

impl RenderResult {
    /// Create a success result.
    pub fn success(output_path: impl Into<String>) -> Self {
        RenderResult::Success {
            output_path: output_path.into(),
        }
    }

    /// Create a failure result from an error.
    pub fn failure(err: &RenderError) -> Self {
        RenderResult::Failure {
            message: err.to_reply_text(),
        }
    }

    /// True if the call failed.
    pub fn is_error(&self) -> bool {
        matches!(self, RenderResult::Failure { .. })
    }

    /// The single text content item returned to the caller.
    pub fn text(&self) -> &str {
        match self {
            RenderResult::Success { output_path } => output_path,
            RenderResult::Failure { message } => message,
        }
    }
}

impl fmt::Display for RenderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<Result<String, RenderError>> for RenderResult {
    fn from(result: Result<String, RenderError>) -> Self {
        match result {
            Ok(path) => RenderResult::success(path),
            Err(err) => RenderResult::failure(&err),
        }
    }
}
