//! Script dispatch: classify each line, send directives to the engine, and
//! collect one result per reportable line in file order.

use crate::ast::{LineKind, ScriptLine};
use crate::engine::Engine;
use crate::error::DispatchError;
use crate::report::{ErrorReport, InvocationResult, ReportSequence};
use crate::{encoder, parser};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

const EXECUTOR_TARGET: &str = "exkutor::executor";

/// Drives a script through the engine one line at a time.
pub struct Dispatcher<E> {
    engine: E,
}

impl<E: Engine> Dispatcher<E> {
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Read and dispatch a script file.
    ///
    /// A missing or unreadable file yields a single `SyntaxError` result and
    /// no engine calls.
    #[must_use]
    pub fn run_file(&self, path: &Path) -> ReportSequence {
        match read_script(path) {
            Ok(script) => self.run_script(&script),
            Err(err) => {
                warn!(target: EXECUTOR_TARGET, path = %path.display(), error = %err, "cannot read script");
                ReportSequence::aborted(&err)
            }
        }
    }

    /// Dispatch every line of `script`, strictly in order.
    #[must_use]
    pub fn run_script(&self, script: &str) -> ReportSequence {
        let mut report = ReportSequence::new();
        let lines = parser::classify_script(script).filter(ScriptLine::is_reportable);
        for line in lines {
            if let Some(result) = self.dispatch_line(&line) {
                report.push(result);
            }
        }
        debug!(
            target: EXECUTOR_TARGET,
            results = report.len(),
            errors = report.error_count(),
            "script finished"
        );
        report
    }

    /// Result for one classified line, or `None` for blanks and comments.
    #[must_use]
    pub fn dispatch_line(&self, line: &ScriptLine<'_>) -> Option<InvocationResult> {
        match &line.kind {
            LineKind::Blank | LineKind::Comment => None,
            LineKind::Malformed => {
                warn!(target: EXECUTOR_TARGET, line = line.number, text = line.text, "invalid syntax");
                let err = DispatchError::InvalidSyntax {
                    line: line.text.to_string(),
                };
                Some(ErrorReport::unattributed(&err).into())
            }
            LineKind::Directive(directive) => {
                let request = encoder::encode(directive);
                debug!(
                    target: EXECUTOR_TARGET,
                    line = line.number,
                    environment = %directive.environment,
                    "dispatching directive"
                );
                let result = match self.engine.invoke(&request) {
                    Ok(value) => InvocationResult::Engine(value),
                    Err(err) => {
                        warn!(
                            target: EXECUTOR_TARGET,
                            line = line.number,
                            environment = %directive.environment,
                            error = %err,
                            "engine invocation failed"
                        );
                        ErrorReport::for_environment(directive.environment, &err).into()
                    }
                };
                Some(result)
            }
        }
    }
}

fn read_script(path: &Path) -> Result<String, DispatchError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DispatchError::ScriptNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DispatchError::ScriptUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
