// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent main loop.
//!
//! ```text
//! discover ─▶ register ─▶ idle ──request──▶ crafting/working ─▶ idle
//!    ▲                     │
//!    └── server restarted / went offline
//! ```

use logi_adapters::{Peripherals, Transport};
use logi_core::{AgentStatus, Job, JobId};
use logi_wire::{Envelope, Message};
use tokio_util::sync::CancellationToken;

use crate::config::AgentConfig;
use crate::error::{ExecError, LinkError};
use crate::exec;
use crate::link::ServerLink;

/// What the serve loop does after a message.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Idle,
    Rediscover,
    Stop,
}

pub struct AgentRuntime<T: Transport, P: Peripherals> {
    config: AgentConfig,
    link: ServerLink<T>,
    peripherals: P,
    status: AgentStatus,
    current_job: Option<JobId>,
}

impl<T: Transport, P: Peripherals> AgentRuntime<T, P> {
    pub fn new(config: AgentConfig, transport: T, peripherals: P) -> Self {
        let link = ServerLink::new(transport, config.round_trip_timeout);
        Self { config, link, peripherals, status: AgentStatus::Idle, current_job: None }
    }

    pub fn link(&self) -> &ServerLink<T> {
        &self.link
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    /// Serve until cancelled, rediscovering the server whenever it goes away.
    /// Flushes the inventory back to storage on the way out.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(role = %self.config.role, label = %self.config.label, "agent starting");
        loop {
            let connected = tokio::select! {
                _ = cancel.cancelled() => break,
                connected = self.connect() => connected,
            };
            if let Err(e) = connected {
                tracing::debug!(error = %e, "not connected, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.config.discovery_backoff) => continue,
                }
            }
            if self.serve(&cancel).await == Flow::Stop {
                break;
            }
            self.link.disconnect();
        }

        if self.link.server().is_some() {
            let inventory = self.peripherals.inventory_name();
            self.link.deposit(&inventory, None).await;
        }
        tracing::info!(label = %self.config.label, "agent stopped");
    }

    /// Discover a server and register with it.
    pub async fn connect(&mut self) -> Result<(), LinkError> {
        self.link.discover(self.config.discovery_timeout).await?;
        self.link.register(self.config.role, &self.config.label).await?;
        Ok(())
    }

    /// Idle loop. Returns `Stop` when cancelled, `Rediscover` when the server
    /// went away.
    async fn serve(&mut self, cancel: &CancellationToken) -> Flow {
        loop {
            let envelope = tokio::select! {
                _ = cancel.cancelled() => return Flow::Stop,
                envelope = self.link.transport().receive(self.config.poll_interval, None) => envelope,
            };
            let Some(envelope) = envelope else {
                continue;
            };
            if self.handle(envelope, cancel).await == Flow::Rediscover {
                return Flow::Rediscover;
            }
            if cancel.is_cancelled() {
                return Flow::Stop;
            }
        }
    }

    /// React to one message while idle.
    async fn handle(&mut self, envelope: Envelope, cancel: &CancellationToken) -> Flow {
        match envelope.message {
            Message::Ping => {
                if let Some(pong) = self.pong() {
                    self.link.send(pong).await;
                }
            }
            Message::CraftRequest { job } | Message::WorkRequest { job } => {
                self.run_job(job, cancel).await;
            }
            Message::ServerAnnounce { instance, online, server_id, .. } => {
                let Some(server) = self.link.server() else {
                    return Flow::Idle;
                };
                if !online && server_id == server.node {
                    tracing::info!(server = %server_id, "server went offline");
                    return Flow::Rediscover;
                }
                if online && server_id == server.node && instance != server.instance {
                    tracing::info!(server = %server_id, "server restarted");
                    return Flow::Rediscover;
                }
            }
            other => {
                tracing::trace!(kind = %other.kind(), sender = %envelope.sender, "ignoring message");
            }
        }
        Flow::Idle
    }

    fn pong(&self) -> Option<Message> {
        Some(Message::Pong {
            agent_id: self.link.agent_id()?.clone(),
            role: self.config.role,
            status: self.status,
            current_job: self.current_job,
            label: self.config.label.clone(),
        })
    }

    /// Accept, execute and report `job`. Exactly one outcome is sent.
    async fn run_job(&mut self, job: Job, cancel: &CancellationToken) {
        let role = self.config.role;
        let job_id = job.id;
        if job.role() != role {
            tracing::warn!(%job_id, job_role = %job.role(), "job for the other role");
            let reason = ExecError::WrongRole(job_id).to_string();
            self.link.send(Message::job_failed(role, job_id, reason)).await;
            return;
        }

        self.link.send(Message::job_accepted(role, job_id)).await;
        self.status = AgentStatus::Busy;
        self.current_job = Some(job_id);
        tracing::info!(%job_id, item = %job.item, crafts = job.crafts, "job started");

        let outcome = exec::execute(
            &self.link,
            &self.peripherals,
            &job,
            self.config.batch_size,
            self.config.withdraw_retries,
            cancel,
        )
        .await;

        let report = if outcome.is_success() {
            if let Some(error) = &outcome.error {
                tracing::warn!(%job_id, produced = outcome.produced, %error, "job partially done");
            } else {
                tracing::info!(%job_id, produced = outcome.produced, "job done");
            }
            Message::job_complete(role, job_id, outcome.produced)
        } else {
            let reason = outcome
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "nothing produced".to_string());
            tracing::warn!(%job_id, %reason, "job failed");
            Message::job_failed(role, job_id, reason)
        };
        self.link.send(report).await;

        self.status = AgentStatus::Idle;
        self.current_job = None;
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
