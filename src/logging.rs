//! Tracing subscriber bootstrap.
//!
//! Logs always go to stderr so command output on stdout stays clean.
//! `RUST_LOG` wins over the configured level when set.

use crate::config::LogFormat;
use crate::constants::ENV_VAR_RUST_LOG;
use crate::errors::{AppError, AppResult};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Builds the filter from `RUST_LOG`, falling back to `default_level`.
pub fn build_filter(default_level: &str) -> AppResult<EnvFilter> {
    EnvFilter::try_from_env(ENV_VAR_RUST_LOG)
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| AppError::Config(format!("Invalid log level '{}': {}", default_level, e)))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `AppError::Config` if the level is invalid or a global subscriber
/// is already installed.
pub fn init_tracing(format: LogFormat, default_level: &str) -> AppResult<()> {
    let filter = build_filter(default_level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))
}
