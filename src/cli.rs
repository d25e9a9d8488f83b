//! CLI module containing the main entry point logic.

use crate::config::EngineConfig;
use crate::engine::ProcessEngine;
use crate::executor::Dispatcher;
use crate::telemetry;
use clap::Parser as ClapParser;
use std::path::PathBuf;
use tracing::debug;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI arguments for the exkutor tool.
#[derive(ClapParser, Debug)]
#[command(name = "exkutor")]
#[command(version = PKG_VERSION)]
#[command(about = "Run an Exkutor script through the execution engine and report JSON results", long_about = None)]
pub struct Cli {
    /// Script file to execute
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Engine executable (defaults to $EXKUTOR_ENGINE, then a bundled or PATH `exkutor-engine`)
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Seconds to wait for each engine call before giving up (0 waits forever)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Engine settings with flags taking precedence over the environment
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::resolve(self.engine.clone(), self.timeout)
    }
}

/// Main CLI logic: run the script and print the report to stdout.
///
/// The process exits normally even when every line failed; failures are
/// reported inside the JSON.
pub fn run_cli() {
    let cli = Cli::parse();
    telemetry::init();

    let engine = ProcessEngine::new(cli.engine_config());
    debug!(target: "exkutor::cli", engine = %engine.program().display(), timeout = ?engine.timeout(), "resolved engine");

    let dispatcher = Dispatcher::new(engine);
    let report = dispatcher.run_file(&cli.script);

    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => crate::fatal_error(&format!("Error serialising report: {e}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_script_only() {
        let cli = Cli::try_parse_from(["exkutor", "deploy.exk"]).unwrap();
        assert_eq!(cli.script, PathBuf::from("deploy.exk"));
        assert!(cli.engine.is_none());
        assert!(cli.timeout.is_none());
    }

    #[test]
    fn test_parse_engine_and_timeout() {
        let cli = Cli::try_parse_from([
            "exkutor",
            "--engine",
            "/opt/exkutor-engine",
            "--timeout",
            "15",
            "deploy.exk",
        ])
        .unwrap();
        assert_eq!(cli.engine, Some(PathBuf::from("/opt/exkutor-engine")));
        assert_eq!(cli.timeout, Some(15));
        let engine = ProcessEngine::new(cli.engine_config());
        assert_eq!(engine.program(), Path::new("/opt/exkutor-engine"));
        assert_eq!(engine.timeout(), Some(std::time::Duration::from_secs(15)));
    }

    #[test]
    fn test_script_is_required() {
        assert!(Cli::try_parse_from(["exkutor"]).is_err());
    }

    #[test]
    fn test_timeout_must_be_numeric() {
        assert!(Cli::try_parse_from(["exkutor", "--timeout", "soon", "a.exk"]).is_err());
    }
}
