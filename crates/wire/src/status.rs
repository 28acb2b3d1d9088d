// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-model DTOs for daemon status displays.

use logi_core::{Agent, AgentId, AgentState, JobId, JobStats, NodeId, Role};
use serde::{Deserialize, Serialize};

/// Overall server state for `logi status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub server_label: String,
    pub version: String,
    pub instance: String,
    pub uptime_secs: u64,
    pub jobs: JobStats,
    pub crafters_online: usize,
    pub crafters_total: usize,
    pub workers_online: usize,
    pub workers_total: usize,
}

/// One registered agent with its derived liveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub id: AgentId,
    pub role: Role,
    pub label: String,
    pub node: NodeId,
    pub state: AgentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job: Option<JobId>,
    /// Milliseconds since the agent was last heard from
    pub last_seen_ago_ms: u64,
}

impl AgentEntry {
    pub fn from_agent(agent: &Agent, now_ms: u64, offline_timeout_ms: u64) -> Self {
        Self {
            id: agent.id.clone(),
            role: agent.role,
            label: agent.label.clone(),
            node: agent.node,
            state: agent.state(now_ms, offline_timeout_ms),
            current_job: agent.current_job,
            last_seen_ago_ms: now_ms.saturating_sub(agent.last_seen_ms),
        }
    }
}
