// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet manager: one registry of agents per role.
//!
//! Per agent: `unknown → idle ⇄ busy`, with `offline` derived from
//! `last_seen`. Silent agents are never evicted; they just stop being
//! offered for dispatch.

use std::collections::HashMap;

use indexmap::IndexMap;
use logi_core::{Agent, AgentId, AgentStatus, Job, JobId, NodeId, Role};
use logi_wire::{Envelope, Message};

/// Normalized outcome of an agent message, for the caller to apply to the
/// job queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetEvent {
    Started { job_id: JobId, agent_id: AgentId },
    Completed { job_id: JobId, agent_id: AgentId, actual_output: u64 },
    Failed { job_id: JobId, agent_id: AgentId, reason: String },
}

#[derive(Debug)]
pub struct Fleet {
    role: Role,
    offline_timeout_ms: u64,
    /// Registration order is dispatch order
    agents: IndexMap<AgentId, Agent>,
    nodes: HashMap<NodeId, AgentId>,
    next_seq: u64,
}

impl Fleet {
    pub fn new(role: Role, offline_timeout_ms: u64) -> Self {
        Self {
            role,
            offline_timeout_ms,
            agents: IndexMap::new(),
            nodes: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn offline_timeout_ms(&self) -> u64 {
        self.offline_timeout_ms
    }

    /// Register an agent or refresh a known one.
    ///
    /// A known `agent_id` keeps its record and registration order; only the
    /// node, label and liveness are updated. Any other id (or none) gets a
    /// fresh record. A re-registering agent has restarted, so it comes back
    /// idle and its previous job (returned) is the caller's to recover.
    pub fn register(
        &mut self,
        node: NodeId,
        agent_id: Option<AgentId>,
        label: &str,
        now_ms: u64,
    ) -> (AgentId, Option<JobId>) {
        if let Some(id) = agent_id.as_ref().filter(|id| self.agents.contains_key(*id)) {
            let id = id.clone();
            let orphaned = self.rebind(&id, node, label, now_ms);
            tracing::info!(agent = %id, %node, role = %self.role, "agent re-registered");
            return (id, orphaned);
        }

        let id = agent_id.unwrap_or_else(AgentId::generate);
        self.insert(id.clone(), node, label, now_ms);
        tracing::info!(agent = %id, %node, label, role = %self.role, "agent registered");
        (id, None)
    }

    fn insert(&mut self, id: AgentId, node: NodeId, label: &str, now_ms: u64) {
        if let Some(previous) = self.nodes.insert(node, id.clone()) {
            // The node now belongs to someone else
            if previous != id {
                tracing::debug!(%node, old = %previous, new = %id, "node reassigned");
            }
        }
        let agent = Agent {
            id: id.clone(),
            node,
            role: self.role,
            label: label.to_string(),
            status: AgentStatus::Idle,
            current_job: None,
            last_seen_ms: now_ms,
            registered_seq: self.next_seq,
        };
        self.next_seq += 1;
        self.agents.insert(id, agent);
    }

    fn rebind(&mut self, id: &AgentId, node: NodeId, label: &str, now_ms: u64) -> Option<JobId> {
        let agent = self.agents.get_mut(id)?;
        if agent.node != node && self.nodes.get(&agent.node) == Some(id) {
            self.nodes.remove(&agent.node);
        }
        agent.node = node;
        agent.label = label.to_string();
        agent.last_seen_ms = now_ms;
        agent.status = AgentStatus::Idle;
        let orphaned = agent.current_job.take();
        self.nodes.insert(node, id.clone());
        orphaned
    }

    /// First online idle agent, in registration order.
    pub fn idle_agent(&self, now_ms: u64) -> Option<&Agent> {
        self.idle_agents(now_ms).next()
    }

    pub fn idle_agents(&self, now_ms: u64) -> impl Iterator<Item = &Agent> {
        let timeout = self.offline_timeout_ms;
        self.agents.values().filter(move |agent| agent.is_available(now_ms, timeout))
    }

    /// Mark `agent_id` busy with `job` and build the request to send.
    ///
    /// Returns `None` if the agent is unknown or not available.
    pub fn craft_request(
        &mut self,
        agent_id: &AgentId,
        job: &Job,
        now_ms: u64,
    ) -> Option<(NodeId, Message)> {
        let timeout = self.offline_timeout_ms;
        let agent = self.agents.get_mut(agent_id)?;
        if !agent.is_available(now_ms, timeout) {
            tracing::debug!(agent = %agent_id, job_id = %job.id, "agent not available");
            return None;
        }
        agent.status = AgentStatus::Busy;
        agent.current_job = Some(job.id);
        Some((agent.node, Message::job_request(job.clone())))
    }

    /// Overwrite an agent's status. Idle clears the current job.
    pub fn update_status(
        &mut self,
        agent_id: &AgentId,
        status: AgentStatus,
        job: Option<JobId>,
    ) -> bool {
        let Some(agent) = self.agents.get_mut(agent_id) else {
            return false;
        };
        agent.status = status;
        agent.current_job = match status {
            AgentStatus::Idle => None,
            AgentStatus::Busy => job.or(agent.current_job),
        };
        true
    }

    /// Free whichever agent holds `job_id`.
    pub fn release_job(&mut self, job_id: JobId) -> Option<AgentId> {
        let agent = self.agents.values_mut().find(|a| a.current_job == Some(job_id))?;
        agent.status = AgentStatus::Idle;
        agent.current_job = None;
        Some(agent.id.clone())
    }

    /// Heartbeat to broadcast; replies come back through [`handle_message`](Self::handle_message).
    pub fn ping_all(&self) -> Message {
        Message::Ping
    }

    /// Whether a message from this node belongs to this fleet.
    pub fn knows_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Apply one incoming message.
    ///
    /// Any message from a known agent refreshes its liveness. A `PONG` from
    /// an unknown node registers it (first contact after a server restart).
    pub fn handle_message(&mut self, envelope: &Envelope, now_ms: u64) -> Option<FleetEvent> {
        if let Message::Pong { agent_id, role, label, .. } = &envelope.message {
            if *role == self.role && !self.knows_node(envelope.sender) {
                self.adopt(envelope.sender, agent_id, label, now_ms);
            }
        }

        let Some(agent_id) = self.nodes.get(&envelope.sender).cloned() else {
            tracing::debug!(
                sender = %envelope.sender,
                kind = %envelope.kind(),
                role = %self.role,
                "message from unknown agent"
            );
            return None;
        };
        let agent = self.agents.get_mut(&agent_id)?;
        agent.last_seen_ms = now_ms;

        match &envelope.message {
            Message::Pong { status, current_job, .. } => {
                reconcile(agent, *status, *current_job);
                None
            }
            Message::CraftAccepted { job_id } | Message::WorkAccepted { job_id } => {
                if agent.current_job != Some(*job_id) {
                    tracing::debug!(agent = %agent_id, %job_id, current = ?agent.current_job, "acceptance for a job not sent to this agent");
                    return None;
                }
                agent.status = AgentStatus::Busy;
                Some(FleetEvent::Started { job_id: *job_id, agent_id })
            }
            Message::CraftComplete { job_id, actual_output }
            | Message::WorkComplete { job_id, actual_output } => {
                free_if_holding(agent, *job_id);
                Some(FleetEvent::Completed {
                    job_id: *job_id,
                    agent_id,
                    actual_output: *actual_output,
                })
            }
            Message::CraftFailed { job_id, reason } | Message::WorkFailed { job_id, reason } => {
                free_if_holding(agent, *job_id);
                Some(FleetEvent::Failed { job_id: *job_id, agent_id, reason: reason.clone() })
            }
            _ => None,
        }
    }

    fn adopt(&mut self, node: NodeId, agent_id: &AgentId, label: &str, now_ms: u64) {
        if self.agents.contains_key(agent_id) {
            self.rebind_node(agent_id, node);
        } else {
            self.insert(agent_id.clone(), node, label, now_ms);
            tracing::info!(agent = %agent_id, %node, role = %self.role, "agent adopted from heartbeat");
        }
    }

    fn rebind_node(&mut self, agent_id: &AgentId, node: NodeId) {
        if let Some(agent) = self.agents.get_mut(agent_id) {
            self.nodes.remove(&agent.node);
            agent.node = node;
            self.nodes.insert(node, agent_id.clone());
        }
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn online_count(&self, now_ms: u64) -> usize {
        self.agents.values().filter(|a| a.is_online(now_ms, self.offline_timeout_ms)).count()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Trust an agent that says it is busy; an agent that says it is idle is
/// believed only if the server has no job on record for it (otherwise the
/// stale sweep decides).
fn reconcile(agent: &mut Agent, reported: AgentStatus, reported_job: Option<JobId>) {
    match (reported, agent.current_job) {
        (AgentStatus::Busy, _) => {
            agent.status = AgentStatus::Busy;
            if reported_job.is_some() {
                agent.current_job = reported_job;
            }
        }
        (AgentStatus::Idle, None) => agent.status = AgentStatus::Idle,
        (AgentStatus::Idle, Some(job_id)) => {
            tracing::debug!(agent = %agent.id, %job_id, "agent reports idle while holding a job");
        }
    }
}

fn free_if_holding(agent: &mut Agent, job_id: JobId) {
    match agent.current_job {
        Some(current) if current != job_id => {
            tracing::debug!(agent = %agent.id, %job_id, %current, "report for a job the agent no longer holds");
        }
        _ => {
            agent.status = AgentStatus::Idle;
            agent.current_job = None;
        }
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
