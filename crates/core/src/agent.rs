// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registered remote agents (crafting and worker turtles).

use crate::id::NodeId;
use crate::job::JobId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Stable agent identity issued by the server at registration.
    ///
    /// Agents present the id again when they re-register, so a turtle that
    /// reboots or moves to another computer id keeps its record.
    pub struct AgentId("agt-");
}

/// Which fleet an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Executes recipe jobs
    Crafter,
    /// Executes block-breaking / farming tasks
    Worker,
}

crate::simple_display! {
    Role {
        Crafter => "crafter",
        Worker => "worker",
    }
}

/// Stored agent status. `offline` is derived from liveness, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Busy,
}

crate::simple_display! {
    AgentStatus {
        Idle => "idle",
        Busy => "busy",
    }
}

/// Status as shown to operators, with the liveness overlay applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Idle,
    Busy,
    Offline,
}

crate::simple_display! {
    AgentState {
        Idle => "idle",
        Busy => "busy",
        Offline => "offline",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Last transport address the agent was heard from
    pub node: NodeId,
    pub role: Role,
    pub label: String,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job: Option<JobId>,
    /// Epoch ms of the last message received from this agent
    pub last_seen_ms: u64,
    /// Registration order; dispatch tie-breaks on it
    pub registered_seq: u64,
}

impl Agent {
    /// Heard from within `timeout_ms`.
    pub fn is_online(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_seen_ms) < timeout_ms
    }

    /// Eligible to receive a job: online, idle, and holding nothing.
    pub fn is_available(&self, now_ms: u64, timeout_ms: u64) -> bool {
        self.status == AgentStatus::Idle
            && self.current_job.is_none()
            && self.is_online(now_ms, timeout_ms)
    }

    pub fn state(&self, now_ms: u64, timeout_ms: u64) -> AgentState {
        if !self.is_online(now_ms, timeout_ms) {
            return AgentState::Offline;
        }
        match self.status {
            AgentStatus::Idle => AgentState::Idle,
            AgentStatus::Busy => AgentState::Busy,
        }
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        into {
            id: AgentId = "agt-test",
            label: String = "turtle",
        }
        set {
            node: NodeId = NodeId(1),
            role: Role = Role::Crafter,
            status: AgentStatus = AgentStatus::Idle,
            last_seen_ms: u64 = 1_000_000,
            registered_seq: u64 = 0,
        }
        option {
            current_job: JobId = None,
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
