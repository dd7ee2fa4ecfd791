// src/logging.rs

//! Stderr logging for the `workdag` binary.
//!
//! The filter comes from `--log-level` when given, else from the
//! `WORKDAG_LOG` environment variable, which accepts full `EnvFilter`
//! directives (`"info"`, `"workdag::engine=debug,warn"`). Anything missing or
//! unparsable falls back to `info`. Stdout is left for the run report.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "WORKDAG_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Filter for the global subscriber.
pub fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level.directive()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
