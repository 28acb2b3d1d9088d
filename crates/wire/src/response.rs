// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use logi_core::Job;
use serde::{Deserialize, Serialize};

use super::{AgentEntry, StatusSummary};

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// Error response
    Error { message: String },

    /// Daemon status
    Status { status: Box<StatusSummary> },

    /// Active jobs
    Jobs { jobs: Vec<Job> },

    /// Finished jobs
    History { jobs: Vec<Job> },

    /// Registered agents
    Agents { agents: Vec<AgentEntry> },

    /// Pending jobs removed by `ClearQueue`
    Cleared { removed: usize },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }
}
