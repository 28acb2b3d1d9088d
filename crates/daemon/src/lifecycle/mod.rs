// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: single-instance lock, socket setup, cleanup.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Files the daemon owns under its state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Root state directory (e.g. ~/.local/state/logi)
    pub state_dir: PathBuf,
    /// IPC socket the CLI connects to
    pub socket_path: PathBuf,
    /// Lock file holding the daemon PID
    pub lock_path: PathBuf,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
}

impl Paths {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_dir: state_dir.join("logs"),
            state_dir,
        }
    }

    /// Paths under the state directory resolved from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::new(crate::env::state_dir()?))
    }
}

/// Proof that this process is the running daemon. Dropping it releases the
/// lock; [`DaemonLock::shutdown`] also removes the socket and PID file.
pub struct DaemonLock {
    paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

impl DaemonLock {
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn shutdown(self) {
        info!("shutting down daemon");
        for path in [&self.paths.socket_path, &self.paths.lock_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }
        info!("daemon shutdown complete");
    }
}

/// Take the lock, then bind the IPC socket.
pub fn startup(paths: &Paths) -> Result<(DaemonLock, UnixListener), LifecycleError> {
    match startup_inner(paths) {
        Ok(started) => Ok(started),
        Err(e) => {
            // Files behind a held lock belong to the running daemon
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(paths);
            }
            Err(e)
        }
    }
}

fn startup_inner(paths: &Paths) -> Result<(DaemonLock, UnixListener), LifecycleError> {
    std::fs::create_dir_all(&paths.state_dir)?;

    // Open without truncating so a failed lock attempt keeps the running PID
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&paths.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    std::fs::create_dir_all(&paths.log_dir)?;

    // Remove stale socket and bind last, once everything else succeeded
    if paths.socket_path.exists() {
        std::fs::remove_file(&paths.socket_path)?;
    }
    let listener = UnixListener::bind(&paths.socket_path)
        .map_err(|e| LifecycleError::BindFailed(paths.socket_path.clone(), e))?;

    info!(state_dir = %paths.state_dir.display(), pid = std::process::id(), "daemon started");
    Ok((DaemonLock { paths: paths.clone(), lock_file }, listener))
}

fn cleanup_on_failure(paths: &Paths) {
    for path in [&paths.socket_path, &paths.lock_path] {
        let _ = std::fs::remove_file(path);
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
