//! Python script executor.

use std::path::Path;

use super::executor::{ScriptError, ScriptExecutor, ScriptInput, ScriptOutput};
use super::subprocess;

/// Runs scripts with a configured Python interpreter.
#[derive(Debug, Clone)]
pub struct PythonExecutor {
    interpreter: String,
}

impl PythonExecutor {
    /// Use `interpreter` (e.g. `python3` or a venv's `bin/python`).
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl Default for PythonExecutor {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl ScriptExecutor for PythonExecutor {
    async fn execute(
        &self,
        script_path: &str,
        input: ScriptInput,
    ) -> Result<ScriptOutput, ScriptError> {
        // Relative script paths are resolved against the working directory.
        let resolved = match &input.working_directory {
            Some(dir) if Path::new(script_path).is_relative() => dir.join(script_path),
            _ => Path::new(script_path).to_path_buf(),
        };
        if tokio::fs::metadata(&resolved).await.is_err() {
            return Err(ScriptError::NotFound(script_path.to_string()));
        }

        let mut cmd = tokio::process::Command::new(&self.interpreter);
        cmd.arg(script_path);
        let output = subprocess::run_command(&mut cmd, input).await?;

        if output.success() {
            Ok(output)
        } else {
            Err(ScriptError::ExecutionFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }
}
