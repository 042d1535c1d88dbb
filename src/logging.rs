// src/logging.rs

//! Logging setup for `devloop` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `DEVLOOP_LOG` environment variable, either a bare level ("debug") or
//!    full filter directives ("devloop=debug,notify=trace")
//! 3. default: `info` for devloop, `warn` for the notification backend
//!
//! Logs go to STDERR; the supervised application and the toolchain share
//! our STDOUT.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "DEVLOOP_LOG";

/// Backend crates that are chatty at `info`.
const QUIET_DEPENDENCIES: &str = "notify=warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => filter_for_level(level_from_log_level(level)),
        None => match std::env::var(LOG_ENV_VAR) {
            Ok(value) => filter_from_env_value(&value),
            Err(_) => filter_for_level(Level::INFO),
        },
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn filter_for_level(level: Level) -> EnvFilter {
    let level = level.as_str().to_ascii_lowercase();
    EnvFilter::new(format!("{level},{QUIET_DEPENDENCIES}"))
}

/// A bare level keeps the dependency defaults; anything else is taken as
/// directives, falling back to `info` if it does not parse.
fn filter_from_env_value(value: &str) -> EnvFilter {
    if let Some(level) = parse_level_str(value) {
        return filter_for_level(level);
    }
    EnvFilter::try_new(value.trim()).unwrap_or_else(|err| {
        eprintln!("devloop: ignoring invalid {LOG_ENV_VAR}={value:?}: {err}");
        filter_for_level(Level::INFO)
    })
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
