//! Per-line results and the JSON report they are collected into.

use crate::ast::Environment;
use crate::error::{DispatchError, ErrorKind};
use serde::Serialize;

/// Environment label used when no directive could be parsed.
pub const UNKNOWN_ENVIRONMENT: &str = "Unknown";

/// Fixed-shape error object synthesized by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub environment: String,
    pub message: String,
    pub exit_code: i32,
}

impl ErrorReport {
    #[must_use]
    pub fn new(kind: ErrorKind, environment: &str, message: String) -> Self {
        Self {
            status: "error",
            kind,
            environment: environment.to_string(),
            message,
            exit_code: 1,
        }
    }

    /// Report an error that is not tied to a parsed directive
    #[must_use]
    pub fn unattributed(error: &DispatchError) -> Self {
        Self::new(error.kind(), UNKNOWN_ENVIRONMENT, error.to_string())
    }

    #[must_use]
    pub fn for_environment(environment: Environment, error: &DispatchError) -> Self {
        Self::new(error.kind(), environment.tag(), error.to_string())
    }
}

/// Outcome of one reportable script line.
///
/// Engine output is kept as untyped JSON; its shape belongs to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationResult {
    Engine(serde_json::Value),
    Error(ErrorReport),
}

impl InvocationResult {
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self {
            InvocationResult::Error(_) => true,
            InvocationResult::Engine(value) => {
                value.get("status").and_then(serde_json::Value::as_str) == Some("error")
            }
        }
    }
}

impl From<ErrorReport> for InvocationResult {
    fn from(report: ErrorReport) -> Self {
        InvocationResult::Error(report)
    }
}

/// Ordered, append-only collection of results, one per reportable line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportSequence {
    results: Vec<InvocationResult>,
}

impl ReportSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence holding a single error that ended the run early
    #[must_use]
    pub fn aborted(error: &DispatchError) -> Self {
        let mut sequence = Self::new();
        sequence.push(ErrorReport::unattributed(error));
        sequence
    }

    pub fn push(&mut self, result: impl Into<InvocationResult>) {
        self.results.push(result.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvocationResult> {
        self.results.iter()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    /// Render as a pretty-printed JSON array (2-space indent)
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
