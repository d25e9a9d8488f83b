//! Diagnostic logging setup.
//!
//! Stdout carries only the JSON report, so every log line goes to stderr.

use crate::config::LOG_ENV;
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `EXKUTOR_LOG`, falling back to `warn`.
fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let directive = std::env::var(LOG_ENV).ok();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from(directive.as_deref()))
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .finish();

    // Already installed (e.g. by a test harness); keep the existing one.
    drop(tracing::subscriber::set_global_default(subscriber));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(filter_from(None).to_string(), DEFAULT_FILTER);
        assert_eq!(filter_from(Some("  ")).to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn test_custom_filter() {
        assert_eq!(
            filter_from(Some("exkutor=debug")).to_string(),
            "exkutor=debug"
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
