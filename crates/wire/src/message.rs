// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turtle network messages.
//!
//! Every message travels inside an [`Envelope`] and serializes as
//! `{"type": "CRAFT_REQUEST", "data": {...}}`. Payload-less messages omit
//! `data`.

use logi_core::{AgentId, AgentStatus, ItemId, Job, JobId, NodeId, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of messages exchanged between the server and its agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    // -- liveness --
    /// Heartbeat broadcast by the server
    Ping,
    /// Heartbeat reply, carries the agent's self-reported state
    Pong {
        agent_id: AgentId,
        role: Role,
        status: AgentStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_job: Option<JobId>,
        label: String,
    },

    // -- registration --
    /// Agent introduces itself; `agent_id` is set when re-registering
    Register {
        role: Role,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<AgentId>,
    },
    /// Server confirms the stable id the agent must present from now on
    Registered { agent_id: AgentId },

    // -- crafter jobs --
    CraftRequest { job: Job },
    CraftAccepted { job_id: JobId },
    CraftComplete { job_id: JobId, actual_output: u64 },
    CraftFailed { job_id: JobId, reason: String },

    // -- worker jobs --
    WorkRequest { job: Job },
    WorkAccepted { job_id: JobId },
    WorkComplete { job_id: JobId, actual_output: u64 },
    WorkFailed { job_id: JobId, reason: String },

    // -- storage API --
    /// Move `count` of `item` from storage into the agent's inventory
    RequestWithdraw {
        item: ItemId,
        count: u64,
        dest_inv: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dest_slot: Option<u8>,
    },
    ResponseWithdraw { item: ItemId, requested: u64, withdrawn: u64 },
    /// Move everything (or only `item`) from the agent's inventory to storage
    RequestDeposit {
        source_inv: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<ItemId>,
    },
    ResponseDeposit { deposited: u64 },

    // -- discovery --
    ServerQuery,
    ServerAnnounce {
        server_id: NodeId,
        server_label: String,
        version: String,
        /// Changes on every server start so agents can tell a restart apart
        instance: Uuid,
        online: bool,
    },
}

/// Tag-only discriminant of [`Message`], used to filter receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Ping,
    Pong,
    Register,
    Registered,
    CraftRequest,
    CraftAccepted,
    CraftComplete,
    CraftFailed,
    WorkRequest,
    WorkAccepted,
    WorkComplete,
    WorkFailed,
    RequestWithdraw,
    ResponseWithdraw,
    RequestDeposit,
    ResponseDeposit,
    ServerQuery,
    ServerAnnounce,
}

logi_core::simple_display! {
    MessageKind {
        Ping => "PING",
        Pong => "PONG",
        Register => "REGISTER",
        Registered => "REGISTERED",
        CraftRequest => "CRAFT_REQUEST",
        CraftAccepted => "CRAFT_ACCEPTED",
        CraftComplete => "CRAFT_COMPLETE",
        CraftFailed => "CRAFT_FAILED",
        WorkRequest => "WORK_REQUEST",
        WorkAccepted => "WORK_ACCEPTED",
        WorkComplete => "WORK_COMPLETE",
        WorkFailed => "WORK_FAILED",
        RequestWithdraw => "REQUEST_WITHDRAW",
        ResponseWithdraw => "RESPONSE_WITHDRAW",
        RequestDeposit => "REQUEST_DEPOSIT",
        ResponseDeposit => "RESPONSE_DEPOSIT",
        ServerQuery => "SERVER_QUERY",
        ServerAnnounce => "SERVER_ANNOUNCE",
    }
}

impl From<&Message> for MessageKind {
    fn from(message: &Message) -> Self {
        match message {
            Message::Ping => MessageKind::Ping,
            Message::Pong { .. } => MessageKind::Pong,
            Message::Register { .. } => MessageKind::Register,
            Message::Registered { .. } => MessageKind::Registered,
            Message::CraftRequest { .. } => MessageKind::CraftRequest,
            Message::CraftAccepted { .. } => MessageKind::CraftAccepted,
            Message::CraftComplete { .. } => MessageKind::CraftComplete,
            Message::CraftFailed { .. } => MessageKind::CraftFailed,
            Message::WorkRequest { .. } => MessageKind::WorkRequest,
            Message::WorkAccepted { .. } => MessageKind::WorkAccepted,
            Message::WorkComplete { .. } => MessageKind::WorkComplete,
            Message::WorkFailed { .. } => MessageKind::WorkFailed,
            Message::RequestWithdraw { .. } => MessageKind::RequestWithdraw,
            Message::ResponseWithdraw { .. } => MessageKind::ResponseWithdraw,
            Message::RequestDeposit { .. } => MessageKind::RequestDeposit,
            Message::ResponseDeposit { .. } => MessageKind::ResponseDeposit,
            Message::ServerQuery => MessageKind::ServerQuery,
            Message::ServerAnnounce { .. } => MessageKind::ServerAnnounce,
        }
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        MessageKind::from(self)
    }

    /// Job request for `job`, chosen by the role that runs it.
    pub fn job_request(job: Job) -> Self {
        match job.role() {
            Role::Crafter => Message::CraftRequest { job },
            Role::Worker => Message::WorkRequest { job },
        }
    }

    pub fn job_accepted(role: Role, job_id: JobId) -> Self {
        match role {
            Role::Crafter => Message::CraftAccepted { job_id },
            Role::Worker => Message::WorkAccepted { job_id },
        }
    }

    pub fn job_complete(role: Role, job_id: JobId, actual_output: u64) -> Self {
        match role {
            Role::Crafter => Message::CraftComplete { job_id, actual_output },
            Role::Worker => Message::WorkComplete { job_id, actual_output },
        }
    }

    pub fn job_failed(role: Role, job_id: JobId, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match role {
            Role::Crafter => Message::CraftFailed { job_id, reason },
            Role::Worker => Message::WorkFailed { job_id, reason },
        }
    }
}

/// A message plus its routing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Logical channel; receivers ignore envelopes for other channels
    pub channel: u16,
    pub sender: NodeId,
    /// `None` for broadcasts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<NodeId>,
    pub timestamp_ms: u64,
    pub message: Message,
}

impl Envelope {
    pub fn kind(&self) -> MessageKind {
        self.message.kind()
    }

    pub fn is_broadcast(&self) -> bool {
        self.recipient.is_none()
    }

    /// Broadcasts and envelopes addressed to `node`.
    pub fn is_for(&self, node: NodeId) -> bool {
        self.recipient.map_or(true, |r| r == node)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
