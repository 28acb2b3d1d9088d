// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue: creation with material reservation, lifecycle transitions,
//! stale recovery and bounded history.

use std::collections::{BTreeMap, HashMap, VecDeque};

use logi_core::{
    AgentId, HistoryFilter, ItemId, Job, JobId, JobKind, JobStats, JobStatus, RecipeBook,
    RecipeKind, Role, StockSnapshot,
};

use crate::error::QueueError;

/// Finished jobs kept for history queries.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// A job the stale sweep returned to pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleJob {
    pub job_id: JobId,
    pub item: ItemId,
    /// Status before the reset (assigned or crafting)
    pub was: JobStatus,
    /// Agent that held the job; the caller frees it
    pub agent: Option<AgentId>,
    pub age_ms: u64,
}

/// Owns every job record. Active jobs are keyed by id, so iteration is FIFO.
#[derive(Debug)]
pub struct JobQueue {
    next_id: u64,
    active: BTreeMap<JobId, Job>,
    history: VecDeque<Job>,
    history_limit: usize,
    total_created: u64,
    items_produced: u64,
    completed: usize,
    failed: usize,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl JobQueue {
    pub fn new(history_limit: usize) -> Self {
        Self {
            next_id: 1,
            active: BTreeMap::new(),
            history: VecDeque::new(),
            history_limit,
            total_created: 0,
            items_produced: 0,
            completed: 0,
            failed: 0,
        }
    }

    /// Create a recipe job for `quantity` of `item`, reserving materials from
    /// `stock`.
    ///
    /// Crafts are capped by what `stock` can supply; the job then promises
    /// only what those crafts produce. `stock` itself is not modified: the
    /// caller subtracts `job.materials` from its working copy.
    pub fn add_job(
        &mut self,
        item: &ItemId,
        quantity: u64,
        kind: RecipeKind,
        stock: &StockSnapshot,
        recipes: &dyn RecipeBook,
        now_ms: u64,
    ) -> Result<Job, QueueError> {
        if quantity == 0 {
            return Err(QueueError::ZeroQuantity { item: item.clone() });
        }
        let recipe = recipes
            .lookup(item, kind)
            .ok_or_else(|| QueueError::NoRecipe { item: item.clone(), kind })?;
        if recipe.output_count == 0 {
            return Err(QueueError::EmptyRecipe { item: item.clone(), kind });
        }

        let per_craft = recipe.materials_per_craft();
        let crafts = recipe
            .crafts_for(quantity)
            .min(stock.crafts_available(&per_craft))
            .min(u64::from(u32::MAX));
        if crafts == 0 {
            return Err(QueueError::InsufficientMaterials { item: item.clone() });
        }

        let materials =
            per_craft.into_iter().map(|(ingredient, count)| (ingredient, count * crafts)).collect();
        let expected_output = quantity.min(crafts * u64::from(recipe.output_count));

        let job = self.insert(
            JobKind::Craft { recipe },
            item.clone(),
            expected_output,
            crafts as u32,
            materials,
            now_ms,
        );
        tracing::info!(
            job_id = %job.id,
            item = %job.item,
            crafts = job.crafts,
            expected = job.expected_output,
            "job created"
        );
        Ok(job)
    }

    /// Create a worker job. Tasks have no recipe and reserve nothing.
    pub fn add_task(
        &mut self,
        task: &str,
        item: &ItemId,
        quantity: u64,
        now_ms: u64,
    ) -> Result<Job, QueueError> {
        if quantity == 0 {
            return Err(QueueError::ZeroQuantity { item: item.clone() });
        }
        let units = quantity.min(u64::from(u32::MAX)) as u32;
        let job = self.insert(
            JobKind::Work { task: task.to_string() },
            item.clone(),
            quantity,
            units,
            BTreeMap::new(),
            now_ms,
        );
        tracing::info!(job_id = %job.id, task, item = %job.item, quantity, "task created");
        Ok(job)
    }

    fn insert(
        &mut self,
        kind: JobKind,
        item: ItemId,
        expected_output: u64,
        crafts: u32,
        materials: BTreeMap<ItemId, u64>,
        now_ms: u64,
    ) -> Job {
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.total_created += 1;
        let job = Job {
            id,
            kind,
            item,
            expected_output,
            crafts,
            materials,
            status: JobStatus::Pending,
            assigned_agent: None,
            actual_output: None,
            fail_reason: None,
            attempts: 0,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        self.active.insert(id, job.clone());
        job
    }

    /// Oldest pending job.
    pub fn next_job(&self) -> Option<&Job> {
        self.active.values().find(|job| job.status == JobStatus::Pending)
    }

    /// Oldest pending job runnable by `role`.
    pub fn next_job_for(&self, role: Role) -> Option<&Job> {
        self.pending_for(role).next()
    }

    /// Pending jobs runnable by `role`, oldest first.
    pub fn pending_for(&self, role: Role) -> impl Iterator<Item = &Job> {
        self.active
            .values()
            .filter(move |job| job.status == JobStatus::Pending && job.role() == role)
    }

    /// `pending → assigned`. Returns false if the job is not pending.
    pub fn assign_job(&mut self, job_id: JobId, agent: &AgentId, now_ms: u64) -> bool {
        match self.active.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.transition(JobStatus::Assigned, now_ms);
                job.assigned_agent = Some(agent.clone());
                job.attempts += 1;
                tracing::info!(%job_id, %agent, attempt = job.attempts, "job assigned");
                true
            }
            Some(job) => {
                tracing::debug!(%job_id, %agent, status = %job.status, "assignment conflict");
                false
            }
            None => {
                tracing::debug!(%job_id, %agent, "assignment for unknown job");
                false
            }
        }
    }

    /// `assigned → crafting` once the assigned agent acknowledges.
    pub fn start_job(&mut self, job_id: JobId, agent: &AgentId, now_ms: u64) -> bool {
        match self.active.get_mut(&job_id) {
            Some(job)
                if job.status == JobStatus::Assigned
                    && job.assigned_agent.as_ref() == Some(agent) =>
            {
                job.transition(JobStatus::Crafting, now_ms);
                tracing::info!(%job_id, %agent, "job started");
                true
            }
            _ => {
                tracing::debug!(%job_id, %agent, "ignoring start for job not assigned to agent");
                false
            }
        }
    }

    /// Finish a non-terminal job successfully and move it to history.
    pub fn complete_job(
        &mut self,
        job_id: JobId,
        actual_output: u64,
        now_ms: u64,
    ) -> Result<Job, QueueError> {
        let mut job = self.take_active(job_id)?;
        job.transition(JobStatus::Completed, now_ms);
        job.actual_output = Some(actual_output);
        self.items_produced += actual_output;
        self.completed += 1;
        tracing::info!(
            %job_id,
            item = %job.item,
            actual_output,
            expected = job.expected_output,
            "job completed"
        );
        self.archive(job.clone());
        Ok(job)
    }

    /// Finish a non-terminal job as failed and move it to history.
    pub fn fail_job(&mut self, job_id: JobId, reason: &str, now_ms: u64) -> Result<Job, QueueError> {
        let mut job = self.take_active(job_id)?;
        job.transition(JobStatus::Failed, now_ms);
        job.fail_reason = Some(reason.to_string());
        self.failed += 1;
        tracing::warn!(%job_id, item = %job.item, reason, "job failed");
        self.archive(job.clone());
        Ok(job)
    }

    /// Check that `agent` still holds `job_id`. A report from an agent that
    /// lost the job to a stale sweep must not finish it for the new holder.
    pub fn check_holder(&self, job_id: JobId, agent: &AgentId) -> Result<(), QueueError> {
        match self.active.get(&job_id) {
            Some(job) if job.assigned_agent.as_ref() == Some(agent) => Ok(()),
            Some(job) => Err(QueueError::NotHolder {
                job_id,
                agent: agent.clone(),
                holder: job.assigned_agent.clone(),
            }),
            None => Err(self.missing(job_id)),
        }
    }

    fn take_active(&mut self, job_id: JobId) -> Result<Job, QueueError> {
        self.active.remove(&job_id).ok_or_else(|| self.missing(job_id))
    }

    fn missing(&self, job_id: JobId) -> QueueError {
        if self.history.iter().any(|job| job.id == job_id) {
            QueueError::NotActive(job_id)
        } else {
            QueueError::JobNotFound(job_id)
        }
    }

    fn archive(&mut self, job: Job) {
        self.history.push_back(job);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Return every in-flight job idle for longer than `timeout_ms` to
    /// pending.
    pub fn reset_stale_jobs(&mut self, timeout_ms: u64, now_ms: u64) -> Vec<StaleJob> {
        let mut reset = Vec::new();
        for job in self.active.values_mut() {
            let age_ms = job.status_age_ms(now_ms);
            if !job.status.is_in_flight() || age_ms <= timeout_ms {
                continue;
            }
            let stale = StaleJob {
                job_id: job.id,
                item: job.item.clone(),
                was: job.status,
                agent: job.assigned_agent.take(),
                age_ms,
            };
            job.transition(JobStatus::Pending, now_ms);
            tracing::warn!(
                job_id = %stale.job_id,
                agent = ?stale.agent,
                was = %stale.was,
                age_ms,
                "stale job requeued"
            );
            reset.push(stale);
        }
        reset
    }

    /// Put one in-flight job back to pending (its agent lost it).
    pub fn requeue_job(&mut self, job_id: JobId, now_ms: u64) -> bool {
        match self.active.get_mut(&job_id) {
            Some(job) if job.status.is_in_flight() => {
                job.transition(JobStatus::Pending, now_ms);
                job.assigned_agent = None;
                tracing::info!(%job_id, "job requeued");
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, job_id: JobId) -> Option<&Job> {
        self.active.get(&job_id).or_else(|| self.history.iter().find(|job| job.id == job_id))
    }

    /// Active (non-terminal) jobs, oldest first.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.active.values()
    }

    /// Finished jobs matching `filter`, oldest first, at most `filter.limit`
    /// of the most recent.
    pub fn history(&self, filter: &HistoryFilter) -> Vec<Job> {
        let matched: Vec<&Job> = self.history.iter().filter(|job| filter.matches(job)).collect();
        let skip = filter.limit.map_or(0, |limit| matched.len().saturating_sub(limit));
        matched.into_iter().skip(skip).cloned().collect()
    }

    /// Drop all pending jobs. In-flight jobs stay so agent reports still land.
    pub fn clear_queue(&mut self) -> usize {
        let before = self.active.len();
        self.active.retain(|_, job| job.status != JobStatus::Pending);
        let removed = before - self.active.len();
        tracing::info!(removed, "queue cleared");
        removed
    }

    pub fn stats(&self) -> JobStats {
        let mut stats = JobStats {
            completed: self.completed,
            failed: self.failed,
            total_created: self.total_created,
            items_produced: self.items_produced,
            ..Default::default()
        };
        for job in self.active.values() {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Assigned => stats.assigned += 1,
                JobStatus::Crafting => stats.crafting += 1,
                JobStatus::Completed | JobStatus::Failed => {}
            }
        }
        stats
    }

    /// Quantity already promised per item by non-terminal jobs.
    pub fn queued_by_item(&self) -> HashMap<ItemId, u64> {
        let mut queued = HashMap::new();
        for job in self.active.values() {
            *queued.entry(job.item.clone()).or_insert(0) += job.expected_output;
        }
        queued
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
