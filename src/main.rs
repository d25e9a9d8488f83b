//! # exkutor
//!
//! Run an Exkutor script and print the JSON report.
//!
//! ## Usage
//!
//! - Run a script: `exkutor deploy.exk`
//! - Pick the engine: `exkutor --engine ./exkutor-engine deploy.exk`
//! - Bound each engine call: `exkutor --timeout 30 deploy.exk`

/// Entry point for the CLI tool.
fn main() {
    exkutor::cli::run_cli();
}
