// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup: a daily log file under the state directory, plus stderr
//! when running in the foreground.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "logid.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {message}")]
    Filter { filter: String, message: String },

    #[error("failed to create log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

/// Parse a filter directive such as `info,logi_engine=debug`.
pub fn env_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter)
        .map_err(|e| LoggingError::Filter { filter: filter.to_string(), message: e.to_string() })
}

/// Install the global subscriber. Keep the guard alive until exit or the
/// tail of the file log is lost.
pub fn init(log_dir: &Path, filter: &str, foreground: bool) -> Result<WorkerGuard, LoggingError> {
    let filter = env_filter(filter)?;
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
    let stderr_layer =
        foreground.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)?;

    Ok(guard)
}
