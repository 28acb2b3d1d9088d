// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target-driven crafting end to end.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn torch_target_becomes_one_job_of_64_crafts() {
    let mut world = World::new(
        World::crafting(&[("minecraft:torch", 256)]),
        &[("minecraft:coal", 100), ("minecraft:stick", 100)],
    );
    world.start();
    world.spawn_crafter("crafter-1");

    let done = world.settle(|w| w.count("minecraft:torch") >= 256).await;
    assert!(done, "torches never reached the target");

    let history = world.history();
    assert_eq!(history.len(), 1);
    let job = &history[0];
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.crafts, 64);
    assert_eq!(job.actual_output, Some(256));
    assert_eq!(world.count("minecraft:torch"), 256);
    assert_eq!(world.count("minecraft:coal"), 36);
    assert_eq!(world.count("minecraft:stick"), 36);

    // Target met: later passes create nothing
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert!(world.server.jobs().is_empty());
    assert_eq!(world.history().len(), 1);
    world.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shared_ingredient_is_reserved_once_per_pass() {
    // One coal: torches and the campfire both want it
    let world = World::new(
        World::crafting(&[("minecraft:torch", 4), ("minecraft:campfire", 1)]),
        &[("minecraft:coal", 1), ("minecraft:stick", 2), ("minecraft:oak_log", 3)],
    );

    let report = world.server.dispatch_once().await;
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    let skipped = &report.skipped[0];
    assert_eq!(skipped.item, ItemId::from("minecraft:campfire"));
    assert_eq!(
        skipped.reason,
        QueueError::InsufficientMaterials { item: "minecraft:campfire".into() }
    );

    let jobs = world.server.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].item, ItemId::from("minecraft:torch"));
    assert_eq!(jobs[0].status, JobStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn two_crafters_split_two_targets() {
    let mut world = World::new(
        World::crafting(&[("minecraft:torch", 64), ("minecraft:campfire", 2)]),
        &[("minecraft:coal", 40), ("minecraft:stick", 40), ("minecraft:oak_log", 6)],
    );
    world.start_ingress();
    world.spawn_crafter("crafter-1");
    world.spawn_crafter("crafter-2");
    assert!(world.settle(|w| w.server.agents(Some(Role::Crafter)).len() == 2).await);

    let report = world.server.dispatch_once().await;
    assert_eq!(report.created.len(), 2);
    assert_eq!(report.assignments.len(), 2, "both jobs go out in one pass");

    let done = world
        .settle(|w| w.count("minecraft:torch") >= 64 && w.count("minecraft:campfire") >= 2)
        .await;
    assert!(done);

    let mut agents: Vec<_> =
        world.history().into_iter().filter_map(|job| job.assigned_agent).collect();
    agents.sort();
    agents.dedup();
    assert_eq!(agents.len(), 2, "each crafter took one job");
    world.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn partial_craft_completes_with_what_was_made() {
    let mut world = World::new(
        World::crafting(&[("minecraft:torch", 40)]),
        &[("minecraft:coal", 10), ("minecraft:stick", 10)],
    );
    world.start_ingress();
    let turtle = world.spawn_crafter("crafter-1");
    turtle.fail_after(6);
    assert!(world.settle(|w| w.server.agents(None).len() == 1).await);

    let report = world.server.dispatch_once().await;
    assert_eq!(report.assignments.len(), 1);
    let done = world.settle(|w| !w.history().is_empty()).await;
    assert!(done);

    let job = &world.history()[0];
    assert_eq!(job.crafts, 10);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.actual_output, Some(24));
    assert_eq!(world.count("minecraft:torch"), 24);
    // Unused ingredients went back to storage
    assert_eq!(world.count("minecraft:coal"), 4);
    world.shutdown().await;
}
