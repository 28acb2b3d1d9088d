// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process turtle fleet for running the daemon without hardware.
//!
//! Every simulated agent joins the same [`MemoryNetwork`] as the server and
//! moves items through the server's [`MemoryStock`].

use std::time::Duration;

use logi_adapters::{MemoryNetwork, MemoryStock, SimulatedPeripherals};
use logi_agent::{AgentConfig, AgentRuntime};
use logi_core::{Role, WorkTarget};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// What to spawn.
#[derive(Debug, Clone)]
pub struct FleetPlan {
    pub channel: u16,
    pub crafters: u32,
    pub workers: u32,
    pub op_delay: Duration,
    /// Every worker knows all of these tasks
    pub tasks: Vec<WorkTarget>,
}

/// Running simulated agents.
pub struct SimulatedFleet {
    cancel: CancellationToken,
    agents: JoinSet<()>,
}

impl SimulatedFleet {
    pub fn spawn(net: &MemoryNetwork, stock: &MemoryStock, plan: &FleetPlan) -> Self {
        let cancel = CancellationToken::new();
        let mut agents = JoinSet::new();

        let crafters = (1..=plan.crafters).map(|n| (Role::Crafter, format!("crafter-{n}")));
        let workers = (1..=plan.workers).map(|n| (Role::Worker, format!("worker-{n}")));
        for (role, label) in crafters.chain(workers) {
            let mut peripherals =
                SimulatedPeripherals::new(label.clone(), stock.clone()).with_delay(plan.op_delay);
            if role == Role::Worker {
                for task in &plan.tasks {
                    peripherals = peripherals.with_task(task.task.clone(), task.item.clone());
                }
            }

            let mut runtime =
                AgentRuntime::new(AgentConfig::new(role, label), net.join(plan.channel), peripherals);
            let cancel = cancel.child_token();
            agents.spawn(async move { runtime.run(cancel).await });
        }

        tracing::info!(crafters = plan.crafters, workers = plan.workers, "simulated fleet started");
        Self { cancel, agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Cancel every agent and wait for them to flush their inventories.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        while let Some(joined) = self.agents.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "simulated agent panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "simulate_tests.rs"]
mod tests;
