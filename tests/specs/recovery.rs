// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lost agents, restarts and late reports.

use std::time::Duration;

use crate::prelude::*;

fn torch_world(torches: u64) -> World {
    World::new(
        World::crafting(&[("minecraft:torch", torches)]),
        &[("minecraft:coal", 10), ("minecraft:stick", 10)],
    )
}

#[tokio::test(start_paused = true)]
async fn silent_agent_job_moves_to_another_agent() {
    let mut world = torch_world(8);
    world.start();
    let silent = SilentAgent::register(&world, "silent").await;
    let job = silent.accept_next().await;
    assert_eq!(job.crafts, 2);

    // The silent turtle never reports; past the job timeout it is also offline
    world.clock.advance(Duration::from_secs(61));
    let requeued = world
        .settle(|w| w.server.jobs().iter().any(|j| j.status == JobStatus::Pending))
        .await;
    assert!(requeued, "stale job was not requeued");

    world.spawn_crafter("backup");
    assert!(world.settle(|w| !w.history().is_empty()).await);

    let finished = &world.history()[0];
    assert_eq!(finished.id, job.id);
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.attempts, 2);
    assert_ne!(finished.assigned_agent.as_ref(), Some(&silent.id));
    assert_eq!(world.count("minecraft:torch"), 8);

    // The original agent wakes up and reports late: ignored
    let server = world.server.transport().node_id();
    let late = Message::job_complete(Role::Crafter, job.id, 999);
    silent.transport.send(late, Some(server)).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    similar_asserts::assert_eq!(world.history(), vec![finished.clone()]);
    world.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn agent_restart_mid_job_requeues_it() {
    let mut world = torch_world(8);
    world.start();
    let agent = SilentAgent::register(&world, "flaky").await;
    let first = agent.accept_next().await;

    // Same turtle, rebooted: it presents its old id
    let server = world.server.transport().node_id();
    let register = Message::Register {
        role: Role::Crafter,
        label: "flaky".to_string(),
        agent_id: Some(agent.id.clone()),
    };
    agent.transport.send(register, Some(server)).await;

    let again = agent.accept_next().await;
    assert_eq!(again.id, first.id);
    assert_eq!(again.attempts, 2);
    let agents = world.server.agents(Some(Role::Crafter));
    assert_eq!(agents.len(), 1, "re-registration must not add a second agent");
    assert_eq!(agents[0].id, agent.id);
    world.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn busy_agent_gets_no_second_job() {
    let mut world = World::new(
        World::crafting(&[("minecraft:torch", 8), ("minecraft:campfire", 1)]),
        &[("minecraft:coal", 10), ("minecraft:stick", 10), ("minecraft:oak_log", 3)],
    );
    world.start();
    let agent = SilentAgent::register(&world, "only").await;
    let job = agent.accept_next().await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    let jobs = world.server.jobs();
    assert_eq!(jobs.len(), 2);
    let held: Vec<_> = jobs.iter().filter(|j| j.assigned_agent.is_some()).collect();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].id, job.id);
    assert_eq!(held[0].status, JobStatus::Crafting);
    assert!(jobs.iter().any(|j| j.status == JobStatus::Pending));
    world.shutdown().await;
}
