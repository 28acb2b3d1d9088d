// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use logi_core::JobId;

const CH: u16 = 42;
const WAIT: Duration = Duration::from_millis(100);

#[tokio::test]
async fn join_assigns_sequential_nodes() {
    let net = MemoryNetwork::new();
    assert_eq!(net.join(CH).node_id(), NodeId(1));
    assert_eq!(net.join(CH).node_id(), NodeId(2));
    assert_eq!(net.node_count(), 2);
}

#[tokio::test]
async fn unicast_reaches_only_recipient() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let b = net.join(CH);
    let c = net.join(CH);

    a.send(Message::Ping, Some(b.node_id())).await;

    let got = b.receive(WAIT, None).await.unwrap();
    assert_eq!(got.sender, a.node_id());
    assert_eq!(got.recipient, Some(b.node_id()));
    assert!(c.receive(WAIT, None).await.is_none());
}

#[tokio::test]
async fn broadcast_skips_sender() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let b = net.join(CH);
    let c = net.join(CH);

    a.send(Message::ServerQuery, None).await;

    assert!(b.receive(WAIT, None).await.is_some());
    assert!(c.receive(WAIT, None).await.is_some());
    assert!(a.receive(WAIT, None).await.is_none());
}

#[tokio::test]
async fn other_channels_are_not_delivered() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let b = net.join(CH + 1);

    a.send(Message::Ping, None).await;
    assert!(b.receive(WAIT, None).await.is_none());
}

#[tokio::test]
async fn expected_kind_discards_others() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let b = net.join(CH);

    a.send(Message::Ping, Some(b.node_id())).await;
    a.send(Message::ResponseDeposit { deposited: 5 }, Some(b.node_id())).await;

    let got = b.receive(WAIT, Some(MessageKind::ResponseDeposit)).await.unwrap();
    assert_eq!(got.message, Message::ResponseDeposit { deposited: 5 });
    // The ping was consumed and discarded
    assert!(b.receive(WAIT, None).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn receive_times_out() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let started = tokio::time::Instant::now();
    assert!(a.receive(Duration::from_secs(5), None).await.is_none());
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test]
async fn drop_next_loses_messages() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let b = net.join(CH);

    net.drop_next(1);
    a.send(Message::CraftAccepted { job_id: JobId(1) }, Some(b.node_id())).await;
    a.send(Message::CraftAccepted { job_id: JobId(2) }, Some(b.node_id())).await;

    let got = b.receive(WAIT, None).await.unwrap();
    assert_eq!(got.message, Message::CraftAccepted { job_id: JobId(2) });
    assert_eq!(net.dropped(), 1);
}

#[tokio::test]
async fn isolated_node_is_silent_both_ways() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    let b = net.join(CH);
    net.isolate(b.node_id(), true);

    a.send(Message::Ping, Some(b.node_id())).await;
    b.send(Message::ServerQuery, None).await;
    assert!(b.receive(WAIT, None).await.is_none());
    assert!(a.receive(WAIT, None).await.is_none());

    net.isolate(b.node_id(), false);
    a.send(Message::Ping, Some(b.node_id())).await;
    assert!(b.receive(WAIT, None).await.is_some());
}

#[tokio::test]
async fn send_to_unknown_node_counts_as_dropped() {
    let net = MemoryNetwork::new();
    let a = net.join(CH);
    a.send(Message::Ping, Some(NodeId(99))).await;
    assert_eq!(net.dropped(), 1);
}
