//! Shared setup for integration tests: a server binary with its own config.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tempfile::TempDir;

use diagram_maker_mcp::{McpClient, McpConfig, McpTransport};

/// A running server plus the scratch directory backing its config.
pub struct Harness {
    pub client: Arc<McpClient>,
    pub dir: TempDir,
}

impl Harness {
    /// Path inside the scratch directory, as a string argument.
    pub fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().into_owned()
    }
}

/// Start the server with `config` written to a fresh config file.
pub async fn start(config: &str) -> Result<Harness> {
    let dir = tempfile::tempdir().context("Failed to create scratch dir")?;
    let config_path = dir.path().join("mcp-server.toml");
    std::fs::write(&config_path, config).context("Failed to write config")?;

    let client = McpClient::new(McpConfig {
        name: "diagram-maker-self".into(),
        transport: McpTransport::Stdio {
            command: env!("CARGO_BIN_EXE_diagram-maker-mcp").into(),
            args: vec![],
            env: vec![(
                "DIAGRAM_MAKER_CONFIG".into(),
                config_path.to_string_lossy().into_owned(),
            )],
        },
    });
    client.connect().await.context("Failed to connect")?;

    Ok(Harness {
        client: Arc::new(client),
        dir,
    })
}

/// Start the server with default settings.
pub async fn start_default() -> Result<Harness> {
    start("").await
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path
}
