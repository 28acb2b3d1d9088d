// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use logi_core::test_support::{recipe_book, stock};
use logi_core::{ItemId, StockTarget, SystemClock, Targets};
use logi_engine::{Server, ServerConfig};

use super::*;

const CH: u16 = 42;

fn plan(crafters: u32, workers: u32) -> FleetPlan {
    FleetPlan {
        channel: CH,
        crafters,
        workers,
        op_delay: Duration::ZERO,
        tasks: vec![WorkTarget {
            task: "farm_wheat".to_string(),
            item: "minecraft:wheat".into(),
            threshold: 10,
            target: 20,
        }],
    }
}

#[tokio::test(start_paused = true)]
async fn fleet_registers_and_fills_target() {
    let net = MemoryNetwork::new();
    let stock = MemoryStock::new(stock(&[("minecraft:coal", 10), ("minecraft:stick", 10)]));
    let config = ServerConfig {
        targets: Targets {
            craft: vec![StockTarget::new("minecraft:torch", 8)],
            ..Default::default()
        },
        ..Default::default()
    };
    let server =
        Server::new(config, net.join(CH), stock.clone(), Arc::new(recipe_book()), SystemClock);
    let cancel = CancellationToken::new();
    let running = {
        let server = server.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { server.run(cancel).await })
    };

    let fleet = SimulatedFleet::spawn(&net, &stock, &plan(2, 1));
    assert_eq!(fleet.len(), 3);

    let torch = ItemId::from("minecraft:torch");
    for _ in 0..120 {
        if stock.count(&torch) >= 8 {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    assert_eq!(stock.count(&torch), 8);
    assert_eq!(server.agents(Some(Role::Crafter)).len(), 2);
    assert_eq!(server.agents(Some(Role::Worker)).len(), 1);

    fleet.shutdown().await;
    cancel.cancel();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn empty_plan_spawns_nothing() {
    let net = MemoryNetwork::new();
    let fleet = SimulatedFleet::spawn(&net, &MemoryStock::new(stock(&[])), &plan(0, 0));
    assert!(fleet.is_empty());
    fleet.shutdown().await;
}
