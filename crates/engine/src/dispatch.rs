// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch pass: reconcile targets against stock and the queue, then match
//! pending jobs with idle agents.
//!
//! The pass owns no state. It runs with the server state locked and returns
//! the messages to send once the lock is released.

use logi_core::{AgentId, ItemId, JobId, NodeId, RecipeBook, StockSnapshot, Targets};
use logi_wire::Message;

use crate::error::QueueError;
use crate::fleet::Fleet;
use crate::queue::JobQueue;

/// A target that produced no job this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub item: ItemId,
    pub needed: u64,
    pub reason: QueueError,
}

/// A job handed to an agent; `message` still has to be sent to `node`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub job_id: JobId,
    pub agent_id: AgentId,
    pub node: NodeId,
    pub message: Message,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub created: Vec<JobId>,
    pub skipped: Vec<Skipped>,
    pub assignments: Vec<Assignment>,
}

impl DispatchReport {
    pub fn is_idle(&self) -> bool {
        self.created.is_empty() && self.assignments.is_empty()
    }
}

/// One full pass: job creation, then assignment for both fleets.
pub fn run_pass(
    queue: &mut JobQueue,
    crafters: &mut Fleet,
    workers: &mut Fleet,
    targets: &Targets,
    stock: StockSnapshot,
    recipes: &dyn RecipeBook,
    now_ms: u64,
) -> DispatchReport {
    let (created, skipped) = plan_jobs(queue, targets, stock, recipes, now_ms);
    let mut assignments = assign_pending(queue, crafters, now_ms);
    assignments.extend(assign_pending(queue, workers, now_ms));
    DispatchReport { created, skipped, assignments }
}

/// Create jobs for every under-stocked target not already covered by the
/// queue.
///
/// Each created job's materials are subtracted from the working `stock`, so
/// later targets in the same pass cannot reserve the same ingredients.
pub fn plan_jobs(
    queue: &mut JobQueue,
    targets: &Targets,
    mut stock: StockSnapshot,
    recipes: &dyn RecipeBook,
    now_ms: u64,
) -> (Vec<JobId>, Vec<Skipped>) {
    let queued = queue.queued_by_item();
    let mut created = Vec::new();
    let mut skipped = Vec::new();

    let covered = |item: &ItemId, needed: u64| {
        needed.saturating_sub(queued.get(item).copied().unwrap_or(0))
    };

    for (target, kind) in targets.recipe_targets() {
        let needed = covered(&target.item, target.needed(stock.get(&target.item)));
        if needed == 0 {
            continue;
        }
        match queue.add_job(&target.item, needed, kind, &stock, recipes, now_ms) {
            Ok(job) => {
                stock.subtract(&job.materials);
                created.push(job.id);
            }
            Err(reason) => {
                tracing::debug!(item = %target.item, needed, %reason, "target skipped");
                skipped.push(Skipped { item: target.item.clone(), needed, reason });
            }
        }
    }

    for target in &targets.work {
        let needed = covered(&target.item, target.needed(stock.get(&target.item)));
        if needed == 0 {
            continue;
        }
        match queue.add_task(&target.task, &target.item, needed, now_ms) {
            Ok(job) => created.push(job.id),
            Err(reason) => skipped.push(Skipped { item: target.item.clone(), needed, reason }),
        }
    }

    (created, skipped)
}

/// Greedily pair pending jobs (oldest first) with idle agents (registration
/// order) of the fleet's role until either runs out.
pub fn assign_pending(queue: &mut JobQueue, fleet: &mut Fleet, now_ms: u64) -> Vec<Assignment> {
    let pending: Vec<JobId> = queue.pending_for(fleet.role()).map(|job| job.id).collect();
    let idle: Vec<AgentId> = fleet.idle_agents(now_ms).map(|agent| agent.id.clone()).collect();

    let mut assignments = Vec::new();
    for (job_id, agent_id) in pending.into_iter().zip(idle) {
        if !queue.assign_job(job_id, &agent_id, now_ms) {
            continue;
        }
        let Some(job) = queue.get(job_id).cloned() else {
            continue;
        };
        match fleet.craft_request(&agent_id, &job, now_ms) {
            Some((node, message)) => {
                assignments.push(Assignment { job_id, agent_id, node, message });
            }
            None => {
                // Agent vanished between selection and request; undo
                queue.requeue_job(job_id, now_ms);
            }
        }
    }
    assignments
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
