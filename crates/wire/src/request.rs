// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request types sent from the CLI to the daemon.

use serde::{Deserialize, Serialize};

use crate::Query;

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Read daemon state
    Query { query: Query },

    /// Drop every pending job (in-flight jobs are left alone)
    ClearQueue,

    /// Request daemon shutdown
    Shutdown,
}
