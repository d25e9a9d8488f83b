//! Engine discovery and invocation settings.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable naming the engine executable.
pub const ENGINE_ENV: &str = "EXKUTOR_ENGINE";
/// Environment variable holding the per-invocation timeout in seconds.
pub const TIMEOUT_ENV: &str = "EXKUTOR_TIMEOUT";
/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "EXKUTOR_LOG";
/// Base name of the engine executable.
pub const ENGINE_NAME: &str = "exkutor-engine";

const CONFIG_TARGET: &str = "exkutor::config";

/// Settings used by the process engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub program: PathBuf,
    /// `None` waits for the engine indefinitely
    pub timeout: Option<Duration>,
}

impl EngineConfig {
    /// Resolve settings from command-line overrides and the process environment.
    #[must_use]
    pub fn resolve(engine_override: Option<PathBuf>, timeout_override: Option<u64>) -> Self {
        Self::resolve_with(engine_override, timeout_override, |key| std::env::var_os(key))
    }

    /// Resolve settings using `lookup` in place of the process environment.
    #[must_use]
    pub fn resolve_with(
        engine_override: Option<PathBuf>,
        timeout_override: Option<u64>,
        lookup: impl Fn(&str) -> Option<OsString>,
    ) -> Self {
        Self {
            program: resolve_engine_path(engine_override, &lookup),
            timeout: resolve_timeout(timeout_override, &lookup),
        }
    }
}

/// Engine file name with the platform executable suffix.
#[must_use]
pub fn engine_file_name() -> String {
    format!("{ENGINE_NAME}{}", std::env::consts::EXE_SUFFIX)
}

/// Pick the engine executable.
///
/// Order: explicit override, `EXKUTOR_ENGINE`, an engine installed next to
/// the running executable, an engine on `PATH`, then the bare name. The
/// result is not checked for existence; a missing engine surfaces as a spawn
/// failure for each directive.
fn resolve_engine_path(
    engine_override: Option<PathBuf>,
    lookup: &impl Fn(&str) -> Option<OsString>,
) -> PathBuf {
    if let Some(path) = engine_override {
        return path;
    }

    if let Some(value) = lookup(ENGINE_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(value);
    }

    if let Some(path) = std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(engine_file_name()))
        .filter(|path| path.is_file())
    {
        return path;
    }

    which::which(ENGINE_NAME).unwrap_or_else(|_| PathBuf::from(engine_file_name()))
}

fn resolve_timeout(
    timeout_override: Option<u64>,
    lookup: &impl Fn(&str) -> Option<OsString>,
) -> Option<Duration> {
    let secs = match timeout_override {
        Some(secs) => secs,
        None => {
            let raw = lookup(TIMEOUT_ENV)?;
            let Some(secs) = raw.to_str().and_then(parse_timeout_secs) else {
                warn!(
                    target: CONFIG_TARGET,
                    value = ?raw,
                    "ignoring invalid {TIMEOUT_ENV} value"
                );
                return None;
            };
            secs
        }
    };

    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_timeout_secs(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}
