// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue command handlers

use anyhow::Result;
use clap::{Args, ValueEnum};
use logi_core::{HistoryFilter, JobStatus};

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

/// Finished-job states selectable in `logi history`.
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum Outcome {
    Completed,
    Failed,
}

impl From<Outcome> for JobStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => JobStatus::Completed,
            Outcome::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct HistoryArgs {
    /// Only jobs that ended this way
    #[arg(long)]
    pub status: Option<Outcome>,
    /// Only jobs producing this item (e.g. minecraft:torch)
    #[arg(long)]
    pub item: Option<String>,
    /// Most recent N jobs
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl HistoryArgs {
    pub fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            status: self.status.map(JobStatus::from),
            item: self.item.as_deref().map(Into::into),
            limit: self.limit,
        }
    }
}

pub async fn list(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let jobs = client.jobs().await?;
    let now_ms = now_ms();
    output::print(format, &jobs, || output::render_jobs(&jobs, now_ms))
}

pub async fn history(client: &DaemonClient, args: &HistoryArgs, format: OutputFormat) -> Result<()> {
    let jobs = client.history(args.filter()).await?;
    output::print(format, &jobs, || output::render_history(&jobs))
}

pub async fn clear(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let removed = client.clear_queue().await?;
    output::print(format, &serde_json::json!({ "removed": removed }), || {
        format!("Removed {removed} pending job(s)\n")
    })
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
