// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message transport.
//!
//! Delivery is best effort: sends never fail from the caller's point of view
//! and every problem (I/O, decoding, unknown peer) surfaces as a missing
//! message, which callers already handle as a timeout.

mod memory;
mod udp;

pub use memory::{MemoryNetwork, MemoryTransport};
pub use udp::{UdpConfig, UdpTransport};

use std::time::Duration;

use async_trait::async_trait;
use logi_core::NodeId;
use logi_wire::{Envelope, Message, MessageKind};

/// Channel-scoped, unreliable datagram delivery between nodes.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// This node's address.
    fn node_id(&self) -> NodeId;

    /// Fire and forget. `None` broadcasts to every node on the channel.
    async fn send(&self, message: Message, recipient: Option<NodeId>);

    /// Wait up to `timeout` for the next envelope addressed to this node.
    ///
    /// With `expected` set, envelopes of other kinds that arrive while
    /// waiting are discarded.
    async fn receive(&self, timeout: Duration, expected: Option<MessageKind>) -> Option<Envelope>;
}

fn accepts(envelope: &Envelope, expected: Option<MessageKind>) -> bool {
    match expected {
        Some(kind) if envelope.kind() != kind => {
            tracing::trace!(
                got = %envelope.kind(),
                expected = %kind,
                sender = %envelope.sender,
                "discarding unexpected message"
            );
            false
        }
        _ => true,
    }
}
