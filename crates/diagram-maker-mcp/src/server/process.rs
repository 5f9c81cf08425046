//! Bounded child-process execution for rendering engines.
//!
//! Engines that live outside this process (the Python interpreter, the
//! `vl-convert` CLI) run through [`run`]: stdin is fed from memory, stdout is
//! captured as bytes, and the child is killed if it outlives the timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Exit code reported when the child is killed for exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when the program could not be started.
pub const SPAWN_FAILED_EXIT_CODE: i32 = 127;

/// A command to run.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Bytes written to the child's stdin, then stdin is closed.
    pub stdin: Option<Vec<u8>>,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Start from an empty environment (only `PATH` and `HOME` survive).
    pub clear_env: bool,
    /// Environment variables to set.
    pub env: Vec<(String, String)>,
    /// Wall-clock limit.
    pub timeout: Duration,
}

impl ProcessSpec {
    /// Create a spec with no args, no stdin and a 60 second timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            cwd: None,
            clear_env: false,
            env: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Append arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed bytes to stdin.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Run in a directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Start from an empty environment.
    pub fn clear_env(mut self) -> Self {
        self.clear_env = true;
        self
    }

    /// Set one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What a finished child produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (0 = success, 124 = timed out, 127 = failed to start).
    pub code: i32,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl ProcessOutput {
    fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// True if the child exited with code 0.
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Short description of a failure for error messages.
    pub fn failure_summary(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {}", self.code)
        } else {
            format!("exit code {}: {}", self.code, tail(stderr, 2_000))
        }
    }
}

/// Run a child process to completion or until its timeout.
///
/// Never returns an error: spawn failures and timeouts are reported through
/// the exit code like a shell would.
pub async fn run(spec: ProcessSpec) -> ProcessOutput {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);

    if spec.clear_env {
        cmd.env_clear();
        for key in ["PATH", "HOME"] {
            if let Some(value) = std::env::var_os(key) {
                cmd.env(key, value);
            }
        }
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    cmd.stdin(if spec.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ProcessOutput::failure(
                SPAWN_FAILED_EXIT_CODE,
                format!("failed to spawn {}: {}", spec.program, e),
            )
        }
    };

    if let (Some(data), Some(mut stdin)) = (spec.stdin, child.stdin.take()) {
        // Fed concurrently so a child that fills stdout first cannot stall us.
        // A broken pipe is left for the exit status to report.
        let program = spec.program.clone();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&data).await {
                tracing::debug!(program = %program, "stdin write failed: {}", e);
            }
        });
    }

    match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => ProcessOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Ok(Err(e)) => ProcessOutput::failure(1, format!("failed to wait for {}: {}", spec.program, e)),
        // Dropping the future drops the child, and kill_on_drop reaps it.
        Err(_) => ProcessOutput::failure(
            TIMEOUT_EXIT_CODE,
            format!(
                "{} timed out after {}ms",
                spec.program,
                spec.timeout.as_millis()
            ),
        ),
    }
}

/// Last `max` bytes of `s`, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
