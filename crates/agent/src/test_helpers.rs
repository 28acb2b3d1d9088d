// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scripted server for agent tests: answers discovery, registration and
//! storage requests from a [`MemoryStock`], and forwards everything else.

use logi_adapters::{MemoryNetwork, MemoryStock, MemoryTransport, StockOracle, Transport};
use logi_core::{AgentId, NodeId};
use logi_wire::{Message, PROTOCOL_VERSION};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const CH: u16 = 7;

pub struct FakeServer {
    pub node: NodeId,
    pub instance: Uuid,
    pub transport: MemoryTransport,
    /// Registrations plus every agent message the server does not answer
    /// itself (PONG, job results)
    pub reports: mpsc::UnboundedReceiver<Message>,
    task: JoinHandle<()>,
}

impl FakeServer {
    pub fn spawn(net: &MemoryNetwork, stock: MemoryStock) -> Self {
        let transport = net.join(CH);
        let instance = Uuid::new_v4();
        let (tx, reports) = mpsc::unbounded_channel();
        let task = tokio::spawn(serve(transport.clone(), stock, instance, tx));
        Self { node: transport.node_id(), instance, transport, reports, task }
    }

    /// Next forwarded message, skipping heartbeats.
    pub async fn next_report(&mut self) -> Message {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(30), self.reports.recv())
                .await
                .unwrap()
                .unwrap();
            if !matches!(message, Message::Pong { .. }) {
                return message;
            }
        }
    }

    pub fn announce(&self, online: bool, instance: Uuid) -> Message {
        Message::ServerAnnounce {
            server_id: self.node,
            server_label: "test".into(),
            version: PROTOCOL_VERSION.into(),
            instance,
            online,
        }
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    transport: MemoryTransport,
    stock: MemoryStock,
    instance: Uuid,
    reports: mpsc::UnboundedSender<Message>,
) {
    let mut issued = 0;
    loop {
        let Some(envelope) = transport.receive(Duration::from_secs(3600), None).await else {
            continue;
        };
        let sender = Some(envelope.sender);
        let reply = match envelope.message {
            Message::ServerQuery => Some(Message::ServerAnnounce {
                server_id: transport.node_id(),
                server_label: "test".into(),
                version: PROTOCOL_VERSION.into(),
                instance,
                online: true,
            }),
            Message::Register { role, label, agent_id } => {
                let _ = reports.send(Message::Register { role, label, agent_id: agent_id.clone() });
                issued += 1;
                let agent_id =
                    agent_id.unwrap_or_else(|| AgentId::from_string(format!("agt-{issued}")));
                Some(Message::Registered { agent_id })
            }
            Message::RequestWithdraw { item, count, dest_inv, dest_slot } => {
                let withdrawn = stock.withdraw(&item, count, &dest_inv, dest_slot).await;
                Some(Message::ResponseWithdraw { item, requested: count, withdrawn })
            }
            Message::RequestDeposit { source_inv, item } => {
                let deposited = stock.deposit(&source_inv, item.as_ref()).await;
                Some(Message::ResponseDeposit { deposited })
            }
            other => {
                let _ = reports.send(other);
                None
            }
        };
        if let Some(reply) = reply {
            transport.send(reply, sender).await;
        }
    }
}
