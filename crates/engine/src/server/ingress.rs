// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handling of incoming network messages.

use logi_adapters::{StockOracle, Transport};
use logi_core::{Clock, Role};
use logi_wire::{Envelope, Message};

use super::{Server, ServerState};
use crate::fleet::FleetEvent;

impl<T, S, C> Server<T, S, C>
where
    T: Transport,
    S: StockOracle,
    C: Clock,
{
    /// Apply one envelope and send whatever reply it calls for.
    pub async fn handle_envelope(&self, envelope: Envelope) {
        let sender = envelope.sender;
        match &envelope.message {
            Message::ServerQuery => {
                self.transport.send(self.announcement(true), Some(sender)).await;
            }
            Message::Register { role, label, agent_id } => {
                let now_ms = self.clock.epoch_ms();
                let (agent_id, orphaned) = self.lock_state_mut(|state| {
                    let (agent_id, orphaned) =
                        state.fleet_mut(*role).register(sender, agent_id.clone(), label, now_ms);
                    if let Some(job_id) = orphaned {
                        state.queue.requeue_job(job_id, now_ms);
                    }
                    (agent_id, orphaned)
                });
                if let Some(job_id) = orphaned {
                    tracing::warn!(%job_id, agent = %agent_id, "agent restarted mid-job, requeued");
                }
                self.transport.send(Message::Registered { agent_id }, Some(sender)).await;
                self.wake_dispatch();
            }
            Message::RequestWithdraw { item, count, dest_inv, dest_slot } => {
                let withdrawn = self.stock.withdraw(item, *count, dest_inv, *dest_slot).await;
                if withdrawn < *count {
                    tracing::debug!(%item, requested = count, withdrawn, %sender, "short withdraw");
                }
                self.touch(&envelope);
                let reply = Message::ResponseWithdraw {
                    item: item.clone(),
                    requested: *count,
                    withdrawn,
                };
                self.transport.send(reply, Some(sender)).await;
            }
            Message::RequestDeposit { source_inv, item } => {
                let deposited = self.stock.deposit(source_inv, item.as_ref()).await;
                self.touch(&envelope);
                self.transport.send(Message::ResponseDeposit { deposited }, Some(sender)).await;
            }
            Message::Pong { .. }
            | Message::CraftAccepted { .. }
            | Message::CraftComplete { .. }
            | Message::CraftFailed { .. }
            | Message::WorkAccepted { .. }
            | Message::WorkComplete { .. }
            | Message::WorkFailed { .. } => {
                let finished = self.apply_agent_message(&envelope);
                if finished {
                    self.stock.invalidate().await;
                    self.wake_dispatch();
                }
            }
            // Server-originated kinds, or another server's traffic
            Message::Ping
            | Message::Registered { .. }
            | Message::CraftRequest { .. }
            | Message::WorkRequest { .. }
            | Message::ResponseWithdraw { .. }
            | Message::ResponseDeposit { .. }
            | Message::ServerAnnounce { .. } => {
                tracing::trace!(kind = %envelope.kind(), %sender, "ignoring message");
            }
        }
    }

    /// Route an agent message to its fleet and the resulting event to the
    /// queue. Returns true when a job finished.
    fn apply_agent_message(&self, envelope: &Envelope) -> bool {
        let now_ms = self.clock.epoch_ms();
        self.lock_state_mut(|state| {
            let Some(role) = fleet_for(state, envelope) else {
                tracing::debug!(sender = %envelope.sender, kind = %envelope.kind(), "message from unregistered node");
                return false;
            };
            match state.fleet_mut(role).handle_message(envelope, now_ms) {
                Some(FleetEvent::Started { job_id, agent_id }) => {
                    state.queue.start_job(job_id, &agent_id, now_ms);
                    false
                }
                Some(FleetEvent::Completed { job_id, agent_id, actual_output }) => {
                    let result = state
                        .queue
                        .check_holder(job_id, &agent_id)
                        .and_then(|()| state.queue.complete_job(job_id, actual_output, now_ms));
                    if let Err(e) = result {
                        tracing::info!(%job_id, agent = %agent_id, error = %e, "late completion ignored");
                    }
                    true
                }
                Some(FleetEvent::Failed { job_id, agent_id, reason }) => {
                    let result = state
                        .queue
                        .check_holder(job_id, &agent_id)
                        .and_then(|()| state.queue.fail_job(job_id, &reason, now_ms));
                    if let Err(e) = result {
                        tracing::info!(%job_id, agent = %agent_id, error = %e, "late failure ignored");
                    }
                    true
                }
                None => false,
            }
        })
    }

    /// Storage traffic counts as a sign of life.
    fn touch(&self, envelope: &Envelope) {
        let now_ms = self.clock.epoch_ms();
        self.lock_state_mut(|state| {
            if let Some(role) = fleet_for(state, envelope) {
                state.fleet_mut(role).handle_message(envelope, now_ms);
            }
        });
    }
}

/// The fleet a message belongs to: by declared role for heartbeats, by
/// sender otherwise.
fn fleet_for(state: &ServerState, envelope: &Envelope) -> Option<Role> {
    if let Message::Pong { role, .. } = &envelope.message {
        return Some(*role);
    }
    [Role::Crafter, Role::Worker]
        .into_iter()
        .find(|role| state.fleet(*role).knows_node(envelope.sender))
}
