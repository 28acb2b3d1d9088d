// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection to the coordinating server.
//!
//! Every exchange is a deadline-bounded round trip over the unreliable
//! transport. A missed storage reply means nothing moved.

use std::time::Duration;

use logi_adapters::Transport;
use logi_core::{AgentId, ItemId, NodeId, Role};
use logi_wire::{Envelope, Message, MessageKind};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::LinkError;

/// The server an agent is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub node: NodeId,
    pub label: String,
    pub instance: Uuid,
}

pub struct ServerLink<T: Transport> {
    transport: T,
    round_trip_timeout: Duration,
    server: Option<ServerInfo>,
    agent_id: Option<AgentId>,
}

impl<T: Transport> ServerLink<T> {
    pub fn new(transport: T, round_trip_timeout: Duration) -> Self {
        Self { transport, round_trip_timeout, server: None, agent_id: None }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn server(&self) -> Option<&ServerInfo> {
        self.server.as_ref()
    }

    /// Id issued at the last registration, kept across reconnects.
    pub fn agent_id(&self) -> Option<&AgentId> {
        self.agent_id.as_ref()
    }

    /// Forget the current server; the agent id survives.
    pub fn disconnect(&mut self) {
        self.server = None;
    }

    /// Broadcast a query and take the first online announcement.
    pub async fn discover(&mut self, timeout: Duration) -> Result<ServerInfo, LinkError> {
        self.transport.send(Message::ServerQuery, None).await;
        let deadline = Instant::now() + timeout;
        while let Some(envelope) = self.recv_until(deadline, MessageKind::ServerAnnounce).await {
            if let Message::ServerAnnounce { server_id, server_label, instance, online, .. } =
                envelope.message
            {
                if !online {
                    continue;
                }
                let info = ServerInfo { node: server_id, label: server_label, instance };
                tracing::info!(server = %info.node, label = %info.label, "found server");
                self.server = Some(info.clone());
                return Ok(info);
            }
        }
        Err(LinkError::NoServer)
    }

    /// Register with the discovered server, presenting the previous id if
    /// there is one.
    pub async fn register(&mut self, role: Role, label: &str) -> Result<AgentId, LinkError> {
        let server = self.server_node()?;
        let register =
            Message::Register { role, label: label.to_string(), agent_id: self.agent_id.clone() };
        self.transport.send(register, Some(server)).await;

        let deadline = Instant::now() + self.round_trip_timeout;
        while let Some(envelope) = self.recv_until(deadline, MessageKind::Registered).await {
            if envelope.sender != server {
                continue;
            }
            if let Message::Registered { agent_id } = envelope.message {
                tracing::info!(agent = %agent_id, %server, "registered");
                self.agent_id = Some(agent_id.clone());
                return Ok(agent_id);
            }
        }
        Err(LinkError::RegisterTimeout)
    }

    /// Unicast to the server. Dropped with a debug log when disconnected.
    pub async fn send(&self, message: Message) {
        match self.server_node() {
            Ok(server) => self.transport.send(message, Some(server)).await,
            Err(_) => tracing::debug!(kind = %message.kind(), "no server, message dropped"),
        }
    }

    /// Ask storage to move up to `count` of `item` into `dest_inv`. Returns
    /// how many moved; zero on timeout.
    pub async fn withdraw(
        &self,
        item: &ItemId,
        count: u64,
        dest_inv: &str,
        dest_slot: Option<u8>,
    ) -> u64 {
        let Ok(server) = self.server_node() else {
            return 0;
        };
        let request = Message::RequestWithdraw {
            item: item.clone(),
            count,
            dest_inv: dest_inv.to_string(),
            dest_slot,
        };
        self.transport.send(request, Some(server)).await;

        let deadline = Instant::now() + self.round_trip_timeout;
        while let Some(envelope) = self.recv_until(deadline, MessageKind::ResponseWithdraw).await {
            match envelope.message {
                Message::ResponseWithdraw { item: got_item, withdrawn, .. }
                    if envelope.sender == server && &got_item == item =>
                {
                    return withdrawn;
                }
                _ => continue,
            }
        }
        tracing::warn!(%item, count, "withdraw timed out");
        0
    }

    /// Ask storage to pull `item` (or everything) out of `source_inv`.
    pub async fn deposit(&self, source_inv: &str, item: Option<&ItemId>) -> u64 {
        let Ok(server) = self.server_node() else {
            return 0;
        };
        let request =
            Message::RequestDeposit { source_inv: source_inv.to_string(), item: item.cloned() };
        self.transport.send(request, Some(server)).await;

        let deadline = Instant::now() + self.round_trip_timeout;
        while let Some(envelope) = self.recv_until(deadline, MessageKind::ResponseDeposit).await {
            if let (true, Message::ResponseDeposit { deposited }) =
                (envelope.sender == server, &envelope.message)
            {
                return *deposited;
            }
        }
        tracing::warn!(source_inv, "deposit timed out");
        0
    }

    fn server_node(&self) -> Result<NodeId, LinkError> {
        self.server.as_ref().map(|s| s.node).ok_or(LinkError::NotConnected)
    }

    async fn recv_until(&self, deadline: Instant, kind: MessageKind) -> Option<Envelope> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        self.transport.receive(remaining, Some(kind)).await
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
