// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process network hub.
//!
//! Backs the tests and the daemon's simulated fleet. Every node gets an
//! unbounded mailbox; delivery order per sender is preserved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logi_core::{Clock, NodeId, SystemClock};
use logi_wire::{Envelope, Message, MessageKind};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{accepts, Transport};

struct Mailbox {
    channel: u16,
    tx: mpsc::UnboundedSender<Envelope>,
    isolated: bool,
}

#[derive(Default)]
struct NetworkState {
    nodes: HashMap<NodeId, Mailbox>,
    next_node: u32,
    drop_next: usize,
    dropped: u64,
}

/// Shared hub that [`MemoryTransport`]s attach to.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Mutex<NetworkState>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new node with the next free id (ids start at 1).
    pub fn join(&self, channel: u16) -> MemoryTransport {
        let node = {
            let mut state = self.inner.lock();
            state.next_node += 1;
            while state.nodes.contains_key(&NodeId(state.next_node)) {
                state.next_node += 1;
            }
            NodeId(state.next_node)
        };
        self.join_as(node, channel)
    }

    /// Attach a node with a fixed id, replacing any previous mailbox for it.
    pub fn join_as(&self, node: NodeId, channel: u16) -> MemoryTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().nodes.insert(node, Mailbox { channel, tx, isolated: false });
        MemoryTransport {
            node,
            channel,
            network: self.clone(),
            rx: Arc::new(tokio::sync::Mutex::new(rx)),
        }
    }

    /// Detach a node; messages to it are dropped from now on.
    pub fn leave(&self, node: NodeId) {
        self.inner.lock().nodes.remove(&node);
    }

    /// Messages lost to injected drops or isolation.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }

    fn deliver(&self, envelope: Envelope) {
        let mut state = self.inner.lock();
        if state.drop_next > 0 {
            state.drop_next -= 1;
            state.dropped += 1;
            tracing::debug!(kind = %envelope.kind(), sender = %envelope.sender, "dropping message");
            return;
        }
        if state.nodes.get(&envelope.sender).is_some_and(|m| m.isolated) {
            state.dropped += 1;
            return;
        }

        let targets: Vec<NodeId> = match envelope.recipient {
            Some(node) => vec![node],
            None => state.nodes.keys().copied().filter(|n| *n != envelope.sender).collect(),
        };
        let mut lost = 0;
        for node in targets {
            match state.nodes.get(&node) {
                Some(mailbox) if mailbox.channel == envelope.channel => {
                    if mailbox.isolated || mailbox.tx.send(envelope.clone()).is_err() {
                        lost += 1;
                    }
                }
                Some(_) => {}
                None => {
                    tracing::debug!(%node, kind = %envelope.kind(), "no such node");
                    lost += 1;
                }
            }
        }
        state.dropped += lost;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryNetwork {
    /// Silently lose the next `n` sends (a broadcast counts once).
    pub fn drop_next(&self, n: usize) {
        self.inner.lock().drop_next = n;
    }

    /// Cut a node off: it neither sends nor receives until restored.
    pub fn isolate(&self, node: NodeId, isolated: bool) {
        if let Some(mailbox) = self.inner.lock().nodes.get_mut(&node) {
            mailbox.isolated = isolated;
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.lock().nodes.len()
    }
}

/// One node's handle onto a [`MemoryNetwork`].
#[derive(Clone)]
pub struct MemoryTransport {
    node: NodeId,
    channel: u16,
    network: MemoryNetwork,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Envelope>>>,
}

impl MemoryTransport {
    pub fn network(&self) -> &MemoryNetwork {
        &self.network
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn node_id(&self) -> NodeId {
        self.node
    }

    async fn send(&self, message: Message, recipient: Option<NodeId>) {
        self.network.deliver(Envelope {
            channel: self.channel,
            sender: self.node,
            recipient,
            timestamp_ms: SystemClock.epoch_ms(),
            message,
        });
    }

    async fn receive(&self, timeout: Duration, expected: Option<MessageKind>) -> Option<Envelope> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut rx = self.rx.lock().await;
        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(envelope)) => {
                    if accepts(&envelope, expected) {
                        return Some(envelope);
                    }
                }
                // Mailbox replaced by a newer join; behave like a silent network
                Ok(None) => {
                    tokio::time::sleep_until(deadline).await;
                    return None;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
