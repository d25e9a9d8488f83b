//! Recoverable failures raised while dispatching a script.
//!
//! Every variant ends up in the report as a synthesized error object; the
//! `Display` text is the report message and [`DispatchError::kind`] picks the
//! error type.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type written to the `type` field of a synthesized result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SyntaxError,
    ExecutionError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SyntaxError => f.write_str("SyntaxError"),
            ErrorKind::ExecutionError => f.write_str("ExecutionError"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("File not found: {}", .path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    ScriptUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid syntax: {line}")]
    InvalidSyntax { line: String },

    /// Engine wrote nothing to stdout but reported on stderr.
    #[error("{stderr}")]
    EngineStderr { stderr: String },

    #[error("Engine produced no output")]
    NoOutput,

    #[error("Invalid JSON from engine: {output}")]
    InvalidJson {
        output: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to invoke engine '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to capture engine output: {source}")]
    Capture {
        #[source]
        source: io::Error,
    },

    #[error("Engine timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl DispatchError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::ScriptNotFound { .. }
            | DispatchError::ScriptUnreadable { .. }
            | DispatchError::InvalidSyntax { .. } => ErrorKind::SyntaxError,
            DispatchError::EngineStderr { .. }
            | DispatchError::NoOutput
            | DispatchError::InvalidJson { .. }
            | DispatchError::Spawn { .. }
            | DispatchError::Capture { .. }
            | DispatchError::Timeout { .. } => ErrorKind::ExecutionError,
        }
    }
}
