//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Helper to get the compiled binary path
pub fn get_binary_path() -> PathBuf {
    // Get the directory where cargo places test binaries
    let mut path = env::current_exe().unwrap();
    path.pop(); // Remove test executable name

    // Check if we're in a 'deps' directory (integration tests)
    if path.ends_with("deps") {
        path.pop(); // Go up to debug or release
    }

    path.push(format!("exkutor{}", env::consts::EXE_SUFFIX));

    if !path.exists() {
        let build_output = Command::new("cargo")
            .args(["build", "--bin", "exkutor"])
            .output()
            .expect("Failed to build binary");

        assert!(
            build_output.status.success(),
            "Failed to build exkutor binary: {}",
            String::from_utf8_lossy(&build_output.stderr)
        );
    }

    path
}

/// Helper to create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Helper to write a script file into a directory
pub fn create_script(dir: &Path, content: &str) -> PathBuf {
    let script_path = dir.join("script.exk");
    fs::write(&script_path, content).unwrap();
    script_path
}

/// Helper to write an executable fake engine (a `sh` script) into a directory
#[cfg(unix)]
pub fn create_engine(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let engine_path = dir.join("fake-engine");
    fs::write(&engine_path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&engine_path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&engine_path, perms).unwrap();
    engine_path
}

/// Fake engine mirroring the reference engine: decode the command, run it with
/// `sh`, and print a single-line JSON result.
pub const SHELL_ENGINE: &str = r##"env="$2"
cmd=$(printf '%s' "$4" | base64 -d)
out=$(sh -c "$cmd" 2>&1)
code=$?
out=$(printf '%s' "$out" | tr '\n\t"\\' '    ')
if [ "$code" -eq 0 ]; then status=success; kind=None; else status=error; kind=ExecutionError; fi
printf '{"status":"%s","type":"%s","environment":"%s","message":"%s","exit_code":%d}\n' "$status" "$kind" "$env" "$out" "$code""##;

/// Package version for testing --version flag
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper to create a Command with test environment
/// Clears engine settings so the user's environment cannot leak in
pub fn test_command(binary: &PathBuf) -> Command {
    let mut cmd = Command::new(binary);
    cmd.env_remove("EXKUTOR_ENGINE");
    cmd.env_remove("EXKUTOR_TIMEOUT");
    cmd.env_remove("EXKUTOR_LOG");
    cmd
}

/// Parse stdout as the JSON report array
pub fn parse_report(output: &Output) -> Vec<serde_json::Value> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
    value.as_array().expect("report should be an array").clone()
}
