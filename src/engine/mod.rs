//! Engine invocation
//!
//! The engine is an external executable called once per directive as
//! `<engine> --env <TAG> --cmd <BASE64>`. Whatever JSON it prints on stdout is
//! the result for that directive; anything else is turned into a
//! [`DispatchError`].

mod process;

use crate::ast::EncodedRequest;
use crate::config::EngineConfig;
use crate::error::DispatchError;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ENGINE_TARGET: &str = "exkutor::engine";

/// Something that can carry out an encoded request.
///
/// [`ProcessEngine`] is the production implementation; tests substitute
/// doubles that return canned values without spawning processes.
pub trait Engine {
    /// Execute one request and return the engine's JSON result.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the engine cannot be started, times out,
    /// or produces no usable JSON.
    fn invoke(&self, request: &EncodedRequest) -> Result<Value, DispatchError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn invoke(&self, request: &EncodedRequest) -> Result<Value, DispatchError> {
        (**self).invoke(request)
    }
}

/// Runs the engine executable as a subprocess, one process per request.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.config.program
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout
    }
}

impl Engine for ProcessEngine {
    fn invoke(&self, request: &EncodedRequest) -> Result<Value, DispatchError> {
        let args = engine_args(request);
        let output = process::run(self.program(), &args, self.timeout())?;

        // Exit status is the engine's business; only its output is classified.
        debug!(
            target: ENGINE_TARGET,
            environment = %request.environment(),
            exit_code = ?output.status.code(),
            "classifying engine output"
        );
        classify_output(&output.stdout, &output.stderr)
    }
}

/// Command-line arguments for one engine call
#[must_use]
pub fn engine_args(request: &EncodedRequest) -> [&str; 4] {
    [
        "--env",
        request.environment().tag(),
        "--cmd",
        request.encoded_command(),
    ]
}

/// Turn captured engine output into a result.
///
/// # Errors
///
/// - stdout blank, stderr not blank: [`DispatchError::EngineStderr`] with the trimmed stderr
/// - both blank: [`DispatchError::NoOutput`]
/// - stdout not JSON: [`DispatchError::InvalidJson`] carrying the trimmed stdout
pub fn classify_output(stdout: &str, stderr: &str) -> Result<Value, DispatchError> {
    let output = stdout.trim();
    if output.is_empty() {
        let stderr = stderr.trim();
        if stderr.is_empty() {
            return Err(DispatchError::NoOutput);
        }
        return Err(DispatchError::EngineStderr {
            stderr: stderr.to_string(),
        });
    }

    serde_json::from_str(output).map_err(|source| DispatchError::InvalidJson {
        output: output.to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ast::{Directive, Environment};
    use crate::encoder;
    use serde_json::json;

    #[test]
    fn test_engine_args_layout() {
        let request = encoder::encode(&Directive {
            environment: Environment::Ps,
            raw_command: "dir".to_string(),
        });
        assert_eq!(engine_args(&request), ["--env", "PS", "--cmd", "ZGly"]);
    }

    #[test]
    fn test_json_object_passes_through() {
        let stdout = r#"{"status":"success","type":"None","environment":"WSL","message":"hi","exit_code":0}"#;
        let value = classify_output(&format!("  {stdout}\n"), "ignored warning").unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "hi");
    }

    #[test]
    fn test_json_array_passes_through() {
        let value = classify_output("[1, 2]", "").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_engine_error_json_is_not_reinterpreted() {
        let value =
            classify_output(r#"{"status":"error","type":"ExecutionError","exit_code":127}"#, "")
                .unwrap();
        assert_eq!(value["exit_code"], 127);
    }

    #[test]
    fn test_empty_stdout_uses_stderr() {
        let err = classify_output("  \n", "\n  engine exploded  \n").unwrap_err();
        assert!(matches!(err, DispatchError::EngineStderr { .. }));
        assert_eq!(err.to_string(), "engine exploded");
    }

    #[test]
    fn test_empty_stdout_and_stderr() {
        let err = classify_output("", "   ").unwrap_err();
        assert!(matches!(err, DispatchError::NoOutput));
        assert_eq!(err.to_string(), "Engine produced no output");
    }

    #[test]
    fn test_invalid_json_keeps_literal_output() {
        let err = classify_output("total 0\ndrwxr-xr-x .\n", "").unwrap_err();
        assert!(matches!(err, DispatchError::InvalidJson { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Invalid JSON from engine: "));
        assert!(message.contains("total 0\ndrwxr-xr-x ."));
    }
}
