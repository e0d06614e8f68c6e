// src/logging.rs

//! Logging setup for `distwatch` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` CLI flag
//! 2. `DISTWATCH_LOG` environment variable, any `EnvFilter` directive
//!    (e.g. `"debug"` or `"distwatch::detect=trace,info"`)
//! 3. `info`
//!
//! Logs go to STDERR; STDOUT only carries the one-line run summary.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "DISTWATCH_LOG";

/// Initialise the global logging subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(directive(lvl)),
        None => filter_from_env(),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("initialising logging: {e}"))
}

fn filter_from_env() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(spec) if !spec.trim().is_empty() => match EnvFilter::try_new(spec.trim()) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!("distwatch: ignoring invalid {LOG_ENV}={spec:?}: {e}");
                EnvFilter::new("info")
            }
        },
        _ => EnvFilter::new("info"),
    }
}

fn directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
