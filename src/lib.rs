//! # exkutor
//!
//! Dispatch front end for Exkutor scripts. Each `RUN_WSL >> "..."` or
//! `RUN_PS >> "..."` line is validated, base64-encoded, handed to the external
//! engine, and the engine's JSON answers are collected into one report.

pub mod ast;
pub mod cli;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod executor;
pub mod parser;
pub mod report;
pub mod telemetry;

/// Print an error message and exit with code 1.
pub fn fatal_error(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
