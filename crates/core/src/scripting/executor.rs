//! Types shared by script runners.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How to run one script.
#[derive(Debug, Clone)]
pub struct ScriptInput {
    /// Arguments after the script path.
    pub args: Vec<String>,
    /// Child working directory; the server's own when `None`. Relative
    /// script paths are resolved against it.
    pub working_directory: Option<PathBuf>,
    /// Wall-clock limit; the child is killed when it expires.
    pub timeout: Duration,
}

impl ScriptInput {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            args: Vec::new(),
            working_directory: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }
}

/// What a finished script printed, and how it exited.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug)]
pub enum ScriptError {
    /// The script file was not found at the specified path.
    NotFound(String),
    /// The script exceeded its configured timeout and was killed.
    Timeout { elapsed_ms: u64 },
    /// The script ran but exited with a non-zero exit code.
    ExecutionFailed { exit_code: i32, stderr: String },
    /// Spawning or communicating with the process failed.
    IoError(std::io::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Script not found: {path}"),
            Self::Timeout { elapsed_ms } => {
                write!(f, "Script timed out after {elapsed_ms}ms")
            }
            Self::ExecutionFailed { exit_code, stderr } => {
                write!(f, "Script failed with exit code {exit_code}: {stderr}")
            }
            Self::IoError(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            _ => None,
        }
    }
}

/// Runs a script file through some interpreter.
pub trait ScriptExecutor: Send + Sync {
    /// Run `script_path`. A non-zero exit is [`ScriptError::ExecutionFailed`].
    fn execute(
        &self,
        script_path: &str,
        input: ScriptInput,
    ) -> impl std::future::Future<Output = Result<ScriptOutput, ScriptError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
