// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: LOGI_STATE_DIR > XDG_STATE_HOME/logi > ~/.local/state/logi
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("LOGI_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("logi"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/logi"))
}

/// Config file named by `LOGI_CONFIG`, if any.
pub fn config_path() -> Option<PathBuf> {
    std::env::var("LOGI_CONFIG").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Tracing filter directive from `LOGI_LOG` (default `info`).
pub fn log_filter() -> String {
    std::env::var("LOGI_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var("LOGI_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
