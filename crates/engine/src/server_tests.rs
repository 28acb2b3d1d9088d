// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use logi_adapters::{MemoryNetwork, MemoryStock, MemoryTransport};
use logi_core::test_support::{recipe_book, stock};
use logi_core::{AgentId, AgentStatus, FakeClock, ItemId, JobId, JobStatus, StockTarget};
use logi_wire::{Envelope, MessageKind};
use tokio_util::sync::CancellationToken;

const CH: u16 = 42;
const WAIT: Duration = Duration::from_millis(200);

struct Harness {
    server: Server<MemoryTransport, MemoryStock, FakeClock>,
    net: MemoryNetwork,
    stock: MemoryStock,
    clock: FakeClock,
}

fn harness(torches: u64) -> Harness {
    let net = MemoryNetwork::new();
    let stock = MemoryStock::new(stock(&[("minecraft:coal", 100), ("minecraft:stick", 100)]));
    let clock = FakeClock::new();
    let config = ServerConfig {
        label: "base".into(),
        targets: Targets {
            craft: vec![StockTarget::new("minecraft:torch", torches)],
            ..Default::default()
        },
        job_timeout: Duration::from_secs(30),
        ..Default::default()
    };
    let server =
        Server::new(config, net.join(CH), stock.clone(), Arc::new(recipe_book()), clock.clone());
    Harness { server, net, stock, clock }
}

impl Harness {
    /// Deliver the next message waiting at the server.
    async fn pump(&self) {
        let envelope = self.server.transport().receive(WAIT, None).await.unwrap();
        self.server.handle_envelope(envelope).await;
    }

    async fn register(&self, agent: &MemoryTransport, role: Role) -> AgentId {
        agent.send(Message::Register { role, label: "t".into(), agent_id: None }, None).await;
        self.pump().await;
        match agent.receive(WAIT, Some(MessageKind::Registered)).await.unwrap().message {
            Message::Registered { agent_id } => agent_id,
            other => panic!("unexpected {other:?}"),
        }
    }
}

async fn expect(agent: &MemoryTransport, kind: MessageKind) -> Envelope {
    agent.receive(WAIT, Some(kind)).await.unwrap()
}

fn job_of(envelope: &Envelope) -> JobId {
    match &envelope.message {
        Message::CraftRequest { job } | Message::WorkRequest { job } => job.id,
        other => panic!("not a job request: {other:?}"),
    }
}

#[tokio::test]
async fn server_query_is_answered_with_announce() {
    let h = harness(0);
    let agent = h.net.join(CH);

    agent.send(Message::ServerQuery, None).await;
    h.pump().await;

    let reply = expect(&agent, MessageKind::ServerAnnounce).await;
    match reply.message {
        Message::ServerAnnounce { server_label, online, instance, server_id, .. } => {
            assert_eq!(server_label, "base");
            assert!(online);
            assert_eq!(instance, h.server.instance());
            assert_eq!(server_id, h.server.transport().node_id());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn register_adds_agent_to_role_fleet() {
    let h = harness(0);
    let crafter = h.net.join(CH);
    let worker = h.net.join(CH);

    let c = h.register(&crafter, Role::Crafter).await;
    let w = h.register(&worker, Role::Worker).await;

    h.server.lock_state(|state| {
        assert!(state.crafters.get(&c).is_some());
        assert!(state.workers.get(&w).is_some());
        assert!(state.crafters.get(&w).is_none());
    });
}

#[tokio::test]
async fn dispatch_sends_request_and_completion_closes_job() {
    let h = harness(256);
    let agent = h.net.join(CH);
    h.register(&agent, Role::Crafter).await;

    let report = h.server.dispatch_once().await;
    assert_eq!(report.created.len(), 1);

    let request = expect(&agent, MessageKind::CraftRequest).await;
    let job_id = job_of(&request);
    let status = |h: &Harness| h.server.lock_state(|s| s.queue.get(job_id).map(|j| j.status));
    assert_eq!(status(&h), Some(JobStatus::Assigned));

    agent.send(Message::CraftAccepted { job_id }, None).await;
    h.pump().await;
    assert_eq!(status(&h), Some(JobStatus::Crafting));

    agent.send(Message::CraftComplete { job_id, actual_output: 256 }, None).await;
    h.pump().await;
    assert_eq!(status(&h), Some(JobStatus::Completed));
    assert_eq!(h.stock.invalidations(), 1);

    let history = h.server.history(&HistoryFilter::default());
    assert_eq!(history[0].actual_output, Some(256));
}

#[tokio::test]
async fn failure_is_recorded() {
    let h = harness(4);
    let agent = h.net.join(CH);
    h.register(&agent, Role::Crafter).await;
    h.server.dispatch_once().await;
    let job_id = job_of(&expect(&agent, MessageKind::CraftRequest).await);

    agent.send(Message::CraftFailed { job_id, reason: "no crafting table".into() }, None).await;
    h.pump().await;

    let failed = h.server.history(&HistoryFilter {
        status: Some(JobStatus::Failed),
        ..Default::default()
    });
    assert_eq!(failed[0].fail_reason.as_deref(), Some("no crafting table"));
    assert_eq!(h.server.status().jobs.failed, 1);
}

#[tokio::test]
async fn withdraw_and_deposit_are_served_from_stock() {
    let h = harness(0);
    let agent = h.net.join(CH);
    let coal = ItemId::from("minecraft:coal");

    agent
        .send(
            Message::RequestWithdraw {
                item: coal.clone(),
                count: 150,
                dest_inv: "turtle_1".into(),
                dest_slot: Some(1),
            },
            None,
        )
        .await;
    h.pump().await;
    let reply = expect(&agent, MessageKind::ResponseWithdraw).await;
    assert_eq!(
        reply.message,
        Message::ResponseWithdraw { item: coal.clone(), requested: 150, withdrawn: 100 }
    );

    agent.send(Message::RequestDeposit { source_inv: "turtle_1".into(), item: None }, None).await;
    h.pump().await;
    let reply = expect(&agent, MessageKind::ResponseDeposit).await;
    assert_eq!(reply.message, Message::ResponseDeposit { deposited: 100 });
    assert_eq!(h.stock.count(&coal), 100);
}

#[tokio::test]
async fn stale_job_moves_to_second_agent() {
    let h = harness(4);
    let silent = h.net.join(CH);
    let backup = h.net.join(CH);
    let silent_id = h.register(&silent, Role::Crafter).await;
    h.server.dispatch_once().await;
    let job_id = job_of(&expect(&silent, MessageKind::CraftRequest).await);

    let backup_id = h.register(&backup, Role::Crafter).await;
    // Past both the job timeout and the offline timeout; only the backup answers
    h.clock.advance(Duration::from_secs(61));
    backup
        .send(
            Message::Pong {
                agent_id: backup_id.clone(),
                role: Role::Crafter,
                status: logi_core::AgentStatus::Idle,
                current_job: None,
                label: "t".into(),
            },
            None,
        )
        .await;
    h.pump().await;

    assert_eq!(h.server.sweep_stale(), 1);
    h.server.lock_state(|s| {
        assert_eq!(s.crafters.get(&silent_id).unwrap().current_job, None);
    });

    h.server.dispatch_once().await;
    let retried = expect(&backup, MessageKind::CraftRequest).await;
    assert_eq!(job_of(&retried), job_id);
    h.server.lock_state(|s| {
        let job = s.queue.get(job_id).unwrap();
        assert_eq!(job.assigned_agent.as_ref(), Some(&backup_id));
        assert_eq!(job.attempts, 2);
    });
}

#[tokio::test]
async fn previous_holder_cannot_finish_reassigned_job() {
    let h = harness(4);
    let silent = h.net.join(CH);
    let backup = h.net.join(CH);
    let silent_id = h.register(&silent, Role::Crafter).await;
    h.server.dispatch_once().await;
    let job_id = job_of(&expect(&silent, MessageKind::CraftRequest).await);

    let backup_id = h.register(&backup, Role::Crafter).await;
    h.clock.advance(Duration::from_secs(61));
    backup
        .send(
            Message::Pong {
                agent_id: backup_id.clone(),
                role: Role::Crafter,
                status: logi_core::AgentStatus::Idle,
                current_job: None,
                label: "t".into(),
            },
            None,
        )
        .await;
    h.pump().await;
    h.server.sweep_stale();
    h.server.dispatch_once().await;
    assert_eq!(job_of(&expect(&backup, MessageKind::CraftRequest).await), job_id);

    // The silent agent wakes up and reports on the job it no longer holds
    for message in [
        Message::CraftAccepted { job_id },
        Message::CraftComplete { job_id, actual_output: 999 },
        Message::CraftFailed { job_id, reason: "late".into() },
    ] {
        silent.send(message, None).await;
        h.pump().await;
    }

    h.server.lock_state(|s| {
        let job = s.queue.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Assigned);
        assert_eq!(job.assigned_agent.as_ref(), Some(&backup_id));
        assert_eq!(job.actual_output, None);
        let backup = s.crafters.get(&backup_id).unwrap();
        assert_eq!((backup.status, backup.current_job), (AgentStatus::Busy, Some(job_id)));
        let silent = s.crafters.get(&silent_id).unwrap();
        assert_eq!((silent.status, silent.current_job), (AgentStatus::Idle, None));
    });

    backup.send(Message::CraftComplete { job_id, actual_output: 4 }, None).await;
    h.pump().await;
    let history = h.server.history(&HistoryFilter::default());
    assert_eq!(history[0].status, JobStatus::Completed);
    assert_eq!(history[0].actual_output, Some(4));
}

#[tokio::test]
async fn reregistering_mid_job_requeues_it() {
    let h = harness(4);
    let agent = h.net.join(CH);
    let id = h.register(&agent, Role::Crafter).await;
    h.server.dispatch_once().await;
    let job_id = job_of(&expect(&agent, MessageKind::CraftRequest).await);

    let again = Message::Register { role: Role::Crafter, label: "t".into(), agent_id: Some(id) };
    agent.send(again, None).await;
    h.pump().await;

    let status = h.server.lock_state(|s| s.queue.get(job_id).map(|j| j.status));
    assert_eq!(status, Some(JobStatus::Pending));
}

#[tokio::test]
async fn read_accessors_reflect_state() {
    let h = harness(8);
    let crafter = h.net.join(CH);
    h.register(&crafter, Role::Crafter).await;
    h.server.dispatch_once().await;

    let status = h.server.status();
    assert_eq!(status.crafters_total, 1);
    assert_eq!(status.crafters_online, 1);
    assert_eq!(status.workers_total, 0);
    assert_eq!(status.jobs.assigned, 1);

    assert_eq!(h.server.jobs().len(), 1);
    assert_eq!(h.server.agents(None).len(), 1);
    assert!(h.server.agents(Some(Role::Worker)).is_empty());
    assert_eq!(h.server.clear_queue(), 0);
}

#[tokio::test]
async fn unknown_sender_results_are_ignored() {
    let h = harness(0);
    let stranger = h.net.join(CH);
    stranger.send(Message::CraftComplete { job_id: JobId(1), actual_output: 1 }, None).await;
    h.pump().await;
    assert_eq!(h.stock.invalidations(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_announces_online_then_offline() {
    let h = harness(0);
    let observer = h.net.join(CH);
    let cancel = CancellationToken::new();

    let server = h.server.clone();
    let token = cancel.clone();
    let task = tokio::spawn(async move { server.run(token).await });

    let hello = observer.receive(Duration::from_secs(5), Some(MessageKind::ServerAnnounce)).await;
    assert!(matches!(hello.map(|e| e.message), Some(Message::ServerAnnounce { online: true, .. })));

    cancel.cancel();
    task.await.unwrap();

    let bye = observer.receive(Duration::from_secs(5), Some(MessageKind::ServerAnnounce)).await;
    assert!(matches!(bye.map(|e| e.message), Some(Message::ServerAnnounce { online: false, .. })));
}

#[tokio::test(start_paused = true)]
async fn run_pings_the_fleet() {
    let h = harness(0);
    let observer = h.net.join(CH);
    let cancel = CancellationToken::new();
    let server = h.server.clone();
    let token = cancel.clone();
    let task = tokio::spawn(async move { server.run(token).await });

    let ping = observer.receive(Duration::from_secs(60), Some(MessageKind::Ping)).await;
    assert!(ping.is_some());

    cancel.cancel();
    task.await.unwrap();
}
