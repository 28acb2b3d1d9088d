// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness: one server, any number of agents, one storage system.

use std::sync::Arc;
use std::time::Duration;

pub use logi_adapters::{MemoryNetwork, MemoryStock, MemoryTransport, SimulatedPeripherals, Transport};
pub use logi_agent::{AgentConfig, AgentRuntime};
pub use logi_core::test_support::{recipe_book, stock};
pub use logi_core::{
    AgentId, FakeClock, HistoryFilter, ItemId, Job, JobStatus, Role, StockTarget, Targets,
};
pub use logi_engine::{QueueError, Server, ServerConfig};
pub use logi_wire::{Message, MessageKind};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub const CH: u16 = 42;
/// Virtual seconds a scenario may wait for the fleet to settle.
pub const SETTLE_SECS: u64 = 600;

pub type TestServer = Server<MemoryTransport, MemoryStock, FakeClock>;

pub struct World {
    pub net: MemoryNetwork,
    pub stock: MemoryStock,
    pub clock: FakeClock,
    pub server: TestServer,
    cancel: CancellationToken,
    tasks: JoinSet<()>,
}

impl World {
    pub fn new(config: ServerConfig, items: &[(&str, u64)]) -> Self {
        let net = MemoryNetwork::new();
        let stock = MemoryStock::new(stock(items));
        let clock = FakeClock::new();
        let server =
            Server::new(config, net.join(CH), stock.clone(), Arc::new(recipe_book()), clock.clone());
        Self { net, stock, clock, server, cancel: CancellationToken::new(), tasks: JoinSet::new() }
    }

    /// Server config keeping `item` at `amount` by crafting.
    pub fn crafting(targets: &[(&str, u64)]) -> ServerConfig {
        ServerConfig {
            label: "base".to_string(),
            targets: Targets {
                craft: targets.iter().map(|(item, n)| StockTarget::new(*item, *n)).collect(),
                ..Default::default()
            },
            dispatch_interval: Duration::from_secs(5),
            job_timeout: Duration::from_secs(60),
            stale_sweep_interval: Duration::from_secs(10),
            ..Default::default()
        }
    }

    /// Start the server's loops.
    pub fn start(&mut self) {
        let server = self.server.clone();
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move { server.run(cancel).await });
    }

    /// Answer network traffic only; dispatch passes run when the scenario calls
    /// [`Server::dispatch_once`].
    pub fn start_ingress(&mut self) {
        let server = self.server.clone();
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            loop {
                let envelope = tokio::select! {
                    _ = cancel.cancelled() => break,
                    envelope = server.transport().receive(Duration::from_secs(1), None) => envelope,
                };
                if let Some(envelope) = envelope {
                    server.handle_envelope(envelope).await;
                }
            }
        });
    }

    /// Spawn a crafter backed by a simulated turtle. The returned handle
    /// shares state with the running turtle.
    pub fn spawn_crafter(&mut self, label: &str) -> SimulatedPeripherals {
        let peripherals = SimulatedPeripherals::new(label, self.stock.clone());
        let mut runtime = AgentRuntime::new(
            AgentConfig::new(Role::Crafter, label),
            self.net.join(CH),
            peripherals.clone(),
        );
        let cancel = self.cancel.child_token();
        self.tasks.spawn(async move { runtime.run(cancel).await });
        peripherals
    }

    pub fn count(&self, item: &str) -> u64 {
        self.stock.count(&ItemId::from(item))
    }

    pub fn history(&self) -> Vec<Job> {
        self.server.history(&HistoryFilter::default())
    }

    /// Let virtual time run until `done` holds, up to [`SETTLE_SECS`].
    pub async fn settle(&self, done: impl Fn(&World) -> bool) -> bool {
        for _ in 0..SETTLE_SECS {
            if done(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        done(self)
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        while let Some(joined) = self.tasks.join_next().await {
            joined.unwrap();
        }
    }
}

/// A registered agent driven by hand: it accepts jobs and then goes quiet.
pub struct SilentAgent {
    pub transport: MemoryTransport,
    pub id: AgentId,
}

impl SilentAgent {
    pub async fn register(world: &World, label: &str) -> Self {
        let transport = world.net.join(CH);
        let server = world.server.transport().node_id();
        let register = Message::Register { role: Role::Crafter, label: label.to_string(), agent_id: None };
        transport.send(register, Some(server)).await;
        let envelope = transport
            .receive(Duration::from_secs(5), Some(MessageKind::Registered))
            .await
            .expect("server answers registration");
        let Message::Registered { agent_id } = envelope.message else {
            panic!("expected REGISTERED, got {:?}", envelope.message);
        };
        Self { transport, id: agent_id }
    }

    /// Wait for a craft request and acknowledge it, then say nothing more.
    pub async fn accept_next(&self) -> Job {
        let envelope = self
            .transport
            .receive(Duration::from_secs(SETTLE_SECS), Some(MessageKind::CraftRequest))
            .await
            .expect("a job arrives");
        let Message::CraftRequest { job } = envelope.message else {
            panic!("expected CRAFT_REQUEST, got {:?}", envelope.message);
        };
        let accepted = Message::job_accepted(Role::Crafter, job.id);
        self.transport.send(accepted, Some(envelope.sender)).await;
        job
    }
}
