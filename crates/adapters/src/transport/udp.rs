// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-over-UDP transport.
//!
//! One envelope per datagram. Broadcasts go to the configured broadcast
//! address; unicasts go to the address a peer was last heard from, falling
//! back to broadcast for peers not seen yet.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logi_core::{Clock, NodeId, SystemClock};
use logi_wire::{decode, encode, Envelope, Message, MessageKind};
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use super::{accepts, Transport};

/// Largest datagram accepted.
const MAX_DATAGRAM: usize = 64 * 1024;

/// Pause after a failed `recv_from` before reading again.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct UdpConfig {
    pub node: NodeId,
    pub channel: u16,
    pub bind: SocketAddr,
    /// Destination for broadcasts (e.g. `255.255.255.255:7420`)
    pub broadcast: SocketAddr,
}

#[derive(Clone)]
pub struct UdpTransport {
    config: Arc<UdpConfig>,
    socket: Arc<UdpSocket>,
    peers: Arc<Mutex<HashMap<NodeId, SocketAddr>>>,
}

impl UdpTransport {
    pub async fn bind(config: UdpConfig) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(config.bind).await?;
        socket.set_broadcast(true)?;
        tracing::info!(
            node = %config.node,
            channel = config.channel,
            addr = %socket.local_addr()?,
            "udp transport bound"
        );
        Ok(Self {
            config: Arc::new(config),
            socket: Arc::new(socket),
            peers: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Pre-seed a peer address (normally learned from received datagrams).
    pub fn add_peer(&self, node: NodeId, addr: SocketAddr) {
        self.peers.lock().insert(node, addr);
    }

    pub fn peer(&self, node: NodeId) -> Option<SocketAddr> {
        self.peers.lock().get(&node).copied()
    }

    fn destination(&self, recipient: Option<NodeId>) -> SocketAddr {
        recipient.and_then(|node| self.peer(node)).unwrap_or(self.config.broadcast)
    }

    /// Decode and filter one datagram. `None` means "not for us".
    fn accept_datagram(&self, bytes: &[u8], from: SocketAddr) -> Option<Envelope> {
        let envelope: Envelope = match decode(bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(%from, error = %e, "undecodable datagram");
                return None;
            }
        };
        if envelope.channel != self.config.channel || envelope.sender == self.config.node {
            return None;
        }
        self.peers.lock().insert(envelope.sender, from);
        if !envelope.is_for(self.config.node) {
            return None;
        }
        Some(envelope)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn node_id(&self) -> NodeId {
        self.config.node
    }

    async fn send(&self, message: Message, recipient: Option<NodeId>) {
        let envelope = Envelope {
            channel: self.config.channel,
            sender: self.config.node,
            recipient,
            timestamp_ms: SystemClock.epoch_ms(),
            message,
        };
        let bytes = match encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(kind = %envelope.kind(), error = %e, "failed to encode message");
                return;
            }
        };
        let dest = self.destination(recipient);
        if let Err(e) = self.socket.send_to(&bytes, dest).await {
            tracing::warn!(kind = %envelope.kind(), %dest, error = %e, "udp send failed");
        }
    }

    async fn receive(&self, timeout: Duration, expected: Option<MessageKind>) -> Option<Envelope> {
        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, from) =
                match tokio::time::timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                    Ok(Ok(received)) => received,
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "udp receive failed");
                        let retry = retry_after_error(Instant::now(), deadline)?;
                        tokio::time::sleep_until(retry).await;
                        continue;
                    }
                    Err(_) => return None,
                };
            if let Some(envelope) = self.accept_datagram(&buf[..len], from) {
                if accepts(&envelope, expected) {
                    return Some(envelope);
                }
            }
        }
    }
}

/// When to read again after a socket error, or `None` if the backoff would
/// run past the deadline.
fn retry_after_error(now: Instant, deadline: Instant) -> Option<Instant> {
    let at = now + RECV_ERROR_BACKOFF;
    (at < deadline).then_some(at)
}

#[cfg(test)]
#[path = "udp_tests.rs"]
mod tests;
