// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query types for reading daemon state.

use logi_core::{HistoryFilter, ItemId, JobStatus, Role};
use serde::{Deserialize, Serialize};

/// Query types for reading daemon state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// Server summary: uptime, job counts, fleet sizes
    Status,
    /// Active (non-terminal) jobs in id order
    ListJobs,
    /// Finished jobs, most recent last
    History {
        #[serde(default)]
        status: Option<JobStatus>,
        #[serde(default)]
        item: Option<ItemId>,
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Registered agents, optionally one fleet only
    ListAgents {
        #[serde(default)]
        role: Option<Role>,
    },
}

impl Query {
    /// History filter for a `History` query; empty for anything else.
    pub fn history_filter(&self) -> HistoryFilter {
        match self {
            Query::History { status, item, limit } => {
                HistoryFilter { status: *status, item: item.clone(), limit: *limit }
            }
            _ => HistoryFilter::default(),
        }
    }
}
