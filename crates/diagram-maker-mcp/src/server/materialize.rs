//! Output materialization: every adapter writes its artifact through here.

use std::path::Path;

use diagram_maker_types::{RenderError, RenderOutcome};

/// Ensure the parent directory of `output_path` exists.
///
/// Missing ancestors are created too. Calling this for a directory that
/// already exists is a no-op.
pub async fn prepare(output_path: &Path) -> RenderOutcome<()> {
    let Some(parent) = output_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || tokio::fs::try_exists(parent).await.unwrap_or(false) {
        return Ok(());
    }

    tracing::debug!(dir = %parent.display(), "creating output directory");
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| RenderError::io(parent, &e))
}

/// Write a rendered payload to `output_path`, replacing any existing file.
///
/// Returns the path exactly as the caller supplied it.
pub async fn write(output_path: &Path, payload: impl AsRef<[u8]>) -> RenderOutcome<String> {
    prepare(output_path).await?;
    tokio::fs::write(output_path, payload.as_ref())
        .await
        .map_err(|e| RenderError::io(output_path, &e))?;
    Ok(output_path.to_string_lossy().into_owned())
}
