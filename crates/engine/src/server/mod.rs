// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server runtime.
//!
//! The job queue and both fleets live behind one mutex. Every mutation is a
//! short synchronous section; the lock is never held across an `.await`, so
//! a read-modify-write like assignment cannot interleave with another loop.

mod ingress;
mod loops;

use std::sync::Arc;
use std::time::Duration;

use logi_adapters::{StockOracle, Transport};
use logi_core::{Clock, HistoryFilter, Job, RecipeBook, Role, Targets};
use logi_wire::{AgentEntry, Message, StatusSummary, PROTOCOL_VERSION};
use parking_lot::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::dispatch::{self, DispatchReport};
use crate::fleet::Fleet;
use crate::queue::{JobQueue, DEFAULT_HISTORY_LIMIT};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub label: String,
    pub targets: Targets,
    /// Period of the reconciliation pass (completions also trigger one)
    pub dispatch_interval: Duration,
    /// In-flight jobs silent for longer than this are requeued
    pub job_timeout: Duration,
    pub stale_sweep_interval: Duration,
    pub ping_interval: Duration,
    pub announce_interval: Duration,
    /// Agents not heard from for this long are offline
    pub offline_timeout: Duration,
    pub history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            label: "logi".to_string(),
            targets: Targets::default(),
            dispatch_interval: Duration::from_secs(10),
            job_timeout: Duration::from_secs(300),
            stale_sweep_interval: Duration::from_secs(30),
            ping_interval: Duration::from_secs(15),
            announce_interval: Duration::from_secs(60),
            offline_timeout: Duration::from_secs(60),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Everything the server mutates.
#[derive(Debug)]
pub struct ServerState {
    pub queue: JobQueue,
    pub crafters: Fleet,
    pub workers: Fleet,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        let offline_ms = config.offline_timeout.as_millis() as u64;
        Self {
            queue: JobQueue::new(config.history_limit),
            crafters: Fleet::new(Role::Crafter, offline_ms),
            workers: Fleet::new(Role::Worker, offline_ms),
        }
    }

    pub fn fleet(&self, role: Role) -> &Fleet {
        match role {
            Role::Crafter => &self.crafters,
            Role::Worker => &self.workers,
        }
    }

    pub fn fleet_mut(&mut self, role: Role) -> &mut Fleet {
        match role {
            Role::Crafter => &mut self.crafters,
            Role::Worker => &mut self.workers,
        }
    }
}

/// Authoritative coordinator. Cheap to clone; clones share state.
pub struct Server<T, S, C>
where
    T: Transport,
    S: StockOracle,
    C: Clock,
{
    config: Arc<ServerConfig>,
    state: Arc<Mutex<ServerState>>,
    transport: T,
    stock: S,
    recipes: Arc<dyn RecipeBook>,
    clock: C,
    instance: Uuid,
    started_at_ms: u64,
    dispatch_wake: Arc<Notify>,
}

impl<T, S, C> Clone for Server<T, S, C>
where
    T: Transport,
    S: StockOracle,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            transport: self.transport.clone(),
            stock: self.stock.clone(),
            recipes: Arc::clone(&self.recipes),
            clock: self.clock.clone(),
            instance: self.instance,
            started_at_ms: self.started_at_ms,
            dispatch_wake: Arc::clone(&self.dispatch_wake),
        }
    }
}

impl<T, S, C> Server<T, S, C>
where
    T: Transport,
    S: StockOracle,
    C: Clock,
{
    pub fn new(
        config: ServerConfig,
        transport: T,
        stock: S,
        recipes: Arc<dyn RecipeBook>,
        clock: C,
    ) -> Self {
        let state = ServerState::new(&config);
        let started_at_ms = clock.epoch_ms();
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
            transport,
            stock,
            recipes,
            clock,
            instance: Uuid::new_v4(),
            started_at_ms,
            dispatch_wake: Arc::new(Notify::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read server state under the lock.
    pub fn lock_state<R>(&self, f: impl FnOnce(&ServerState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Mutate server state under the lock.
    pub fn lock_state_mut<R>(&self, f: impl FnOnce(&mut ServerState) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Run a dispatch pass soon instead of waiting for the next tick.
    pub fn wake_dispatch(&self) {
        self.dispatch_wake.notify_one();
    }

    /// One reconciliation pass: snapshot stock, create and assign jobs, then
    /// send the job requests.
    pub async fn dispatch_once(&self) -> DispatchReport {
        let stock = self.stock.snapshot().await;
        let now_ms = self.clock.epoch_ms();
        let report = self.lock_state_mut(|state| {
            let ServerState { queue, crafters, workers } = state;
            dispatch::run_pass(
                queue,
                crafters,
                workers,
                &self.config.targets,
                stock,
                self.recipes.as_ref(),
                now_ms,
            )
        });

        for assignment in &report.assignments {
            tracing::info!(
                job_id = %assignment.job_id,
                agent = %assignment.agent_id,
                node = %assignment.node,
                "sending job"
            );
            self.transport.send(assignment.message.clone(), Some(assignment.node)).await;
        }
        if !report.is_idle() {
            tracing::debug!(
                created = report.created.len(),
                assigned = report.assignments.len(),
                skipped = report.skipped.len(),
                "dispatch pass"
            );
        }
        report
    }

    /// Requeue in-flight jobs past the job timeout and free their agents.
    pub fn sweep_stale(&self) -> usize {
        let timeout_ms = self.config.job_timeout.as_millis() as u64;
        let now_ms = self.clock.epoch_ms();
        let reset = self.lock_state_mut(|state| {
            let reset = state.queue.reset_stale_jobs(timeout_ms, now_ms);
            for stale in &reset {
                let freed = state
                    .crafters
                    .release_job(stale.job_id)
                    .or_else(|| state.workers.release_job(stale.job_id));
                if let Some(agent) = freed {
                    tracing::warn!(job_id = %stale.job_id, %agent, "agent timed out on job");
                }
            }
            reset.len()
        });
        if reset > 0 {
            self.wake_dispatch();
        }
        reset
    }

    pub async fn ping(&self) {
        let ping = self.lock_state(|state| state.crafters.ping_all());
        self.transport.send(ping, None).await;
    }

    fn announcement(&self, online: bool) -> Message {
        Message::ServerAnnounce {
            server_id: self.transport.node_id(),
            server_label: self.config.label.clone(),
            version: PROTOCOL_VERSION.to_string(),
            instance: self.instance,
            online,
        }
    }

    pub async fn announce(&self, online: bool) {
        self.transport.send(self.announcement(online), None).await;
    }

    // -- read accessors --

    pub fn status(&self) -> StatusSummary {
        let now_ms = self.clock.epoch_ms();
        self.lock_state(|state| StatusSummary {
            server_label: self.config.label.clone(),
            version: PROTOCOL_VERSION.to_string(),
            instance: self.instance.to_string(),
            uptime_secs: now_ms.saturating_sub(self.started_at_ms) / 1000,
            jobs: state.queue.stats(),
            crafters_online: state.crafters.online_count(now_ms),
            crafters_total: state.crafters.len(),
            workers_online: state.workers.online_count(now_ms),
            workers_total: state.workers.len(),
        })
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.lock_state(|state| state.queue.jobs().cloned().collect())
    }

    pub fn history(&self, filter: &HistoryFilter) -> Vec<Job> {
        self.lock_state(|state| state.queue.history(filter))
    }

    pub fn agents(&self, role: Option<Role>) -> Vec<AgentEntry> {
        let now_ms = self.clock.epoch_ms();
        self.lock_state(|state| {
            [&state.crafters, &state.workers]
                .into_iter()
                .filter(|fleet| role.map_or(true, |r| fleet.role() == r))
                .flat_map(|fleet| {
                    let timeout = fleet.offline_timeout_ms();
                    fleet.agents().map(move |agent| AgentEntry::from_agent(agent, now_ms, timeout))
                })
                .collect()
        })
    }

    pub fn clear_queue(&self) -> usize {
        self.lock_state_mut(|state| state.queue.clear_queue())
    }
}

#[cfg(test)]
#[path = "../server_tests.rs"]
mod tests;
