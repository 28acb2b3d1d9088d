// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and lifecycle.

use crate::agent::{AgentId, Role};
use crate::item::ItemId;
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique, monotonically increasing job number.
///
/// Ids are never reused for the lifetime of a server process; FIFO order in
/// the queue is id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle of a job.
///
/// ```text
/// pending → assigned → crafting → completed | failed
///    ↑         │           │
///    └─────────┴───────────┘  stale sweep
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for an idle agent
    Pending,
    /// Sent to an agent, not yet acknowledged
    Assigned,
    /// Agent acknowledged and is executing
    Crafting,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Held by an agent (assigned or crafting).
    pub fn is_in_flight(self) -> bool {
        matches!(self, JobStatus::Assigned | JobStatus::Crafting)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Assigned => "assigned",
        Crafting => "crafting",
        Completed => "completed",
        Failed => "failed",
    }
}

/// What the agent is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    /// Recipe-based job for a crafter (crafting grid or furnace)
    Craft { recipe: Recipe },
    /// Named worker task (mining, farming) producing `item`
    Work { task: String },
}

impl JobKind {
    /// Which fleet runs this kind of job.
    pub fn role(&self) -> Role {
        match self {
            JobKind::Craft { .. } => Role::Crafter,
            JobKind::Work { .. } => Role::Worker,
        }
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            JobKind::Craft { recipe } => Some(recipe),
            JobKind::Work { .. } => None,
        }
    }
}

/// A unit of work owned by the job queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    /// Item this job produces
    pub item: ItemId,
    /// Requested quantity (not necessarily a multiple of one craft's output)
    pub expected_output: u64,
    /// Craft operations (or task units for work jobs)
    pub crafts: u32,
    /// Ingredients reserved when the job was created
    #[serde(default)]
    pub materials: BTreeMap<ItemId, u64>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    /// Times this job has been handed to an agent
    #[serde(default)]
    pub attempts: u32,
    pub created_at_ms: u64,
    /// Last status change; the stale sweep measures from here
    pub updated_at_ms: u64,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn role(&self) -> Role {
        self.kind.role()
    }

    /// Move to `status`, stamping the change time.
    pub fn transition(&mut self, status: JobStatus, epoch_ms: u64) {
        self.status = status;
        self.updated_at_ms = epoch_ms;
    }

    /// Time spent in the current status.
    pub fn status_age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.updated_at_ms)
    }
}

/// Per-status counts plus lifetime totals, for status displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub pending: usize,
    pub assigned: usize,
    pub crafting: usize,
    pub completed: usize,
    pub failed: usize,
    /// Jobs created since the server started
    pub total_created: u64,
    /// Sum of `actual_output` over completed jobs
    pub items_produced: u64,
}

impl JobStats {
    /// Non-terminal jobs.
    pub fn active(&self) -> usize {
        self.pending + self.assigned + self.crafting
    }
}

/// Selection for job history queries. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemId>,
    /// Most recent N entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn matches(&self, job: &Job) -> bool {
        self.status.map_or(true, |s| job.status == s)
            && self.item.as_ref().map_or(true, |i| &job.item == i)
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            item: ItemId = "minecraft:torch",
        }
        set {
            id: JobId = JobId(1),
            kind: JobKind = JobKind::Work { task: "test".to_string() },
            expected_output: u64 = 4,
            crafts: u32 = 1,
            materials: BTreeMap<ItemId, u64> = BTreeMap::new(),
            status: JobStatus = JobStatus::Pending,
            attempts: u32 = 0,
            created_at_ms: u64 = 1_000_000,
            updated_at_ms: u64 = 1_000_000,
        }
        option {
            assigned_agent: AgentId = None,
            actual_output: u64 = None,
            fail_reason: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
