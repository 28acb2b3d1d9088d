// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON rendering of daemon responses.

use clap::ValueEnum;
use logi_core::{format_elapsed, format_elapsed_ms, Job, JobKind};
use logi_wire::{AgentEntry, StatusSummary};
use serde::Serialize;

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON, or `text()` otherwise.
pub fn print<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text()),
    }
    Ok(())
}

/// One table cell with an optional palette color.
pub struct Cell {
    text: String,
    color: Option<u8>,
}

impl Cell {
    pub fn plain(text: impl ToString) -> Self {
        Self { text: text.to_string(), color: None }
    }

    pub fn colored(text: impl ToString, code: u8) -> Self {
        Self { text: text.to_string(), color: Some(code) }
    }
}

/// Left-aligned columns, widths from the plain text so color escapes do not
/// break alignment.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.text.chars().count());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> =
            self.headers.iter().zip(&widths).map(|(h, w)| format!("{h:<w$}")).collect();
        out.push_str(&color::header(header.join("  ").trim_end()));
        out.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let padded = format!("{:<w$}", cell.text);
                    match cell.color {
                        Some(code) => color::paint(code, &padded),
                        None => padded,
                    }
                })
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

pub fn render_status(status: &StatusSummary) -> String {
    let jobs = &status.jobs;
    format!(
        "{} {} (v{}), up {}\n\
         jobs:      {} pending, {} assigned, {} crafting, {} completed, {} failed\n\
         produced:  {} items from {} jobs\n\
         crafters:  {}/{} online\n\
         workers:   {}/{} online\n",
        color::header("logi"),
        status.server_label,
        status.version,
        format_elapsed(status.uptime_secs),
        jobs.pending,
        jobs.assigned,
        jobs.crafting,
        jobs.completed,
        jobs.failed,
        jobs.items_produced,
        jobs.total_created,
        status.crafters_online,
        status.crafters_total,
        status.workers_online,
        status.workers_total,
    )
}

fn kind_label(kind: &JobKind) -> String {
    match kind {
        JobKind::Craft { recipe } => recipe.kind.to_string(),
        JobKind::Work { task } => format!("work:{task}"),
    }
}

/// Active jobs; `now_ms` dates the AGE column.
pub fn render_jobs(jobs: &[Job], now_ms: u64) -> String {
    if jobs.is_empty() {
        return format!("{}\n", color::muted("No active jobs"));
    }
    let mut table = Table::new(vec!["ID", "STATUS", "ITEM", "QTY", "KIND", "AGENT", "TRIES", "AGE"]);
    for job in jobs {
        table.row(vec![
            Cell::plain(job.id),
            Cell::colored(job.status, color::job_status_code(job.status)),
            Cell::plain(&job.item),
            Cell::plain(job.expected_output),
            Cell::plain(kind_label(&job.kind)),
            Cell::plain(job.assigned_agent.as_ref().map_or("-".to_string(), |a| a.to_string())),
            Cell::plain(job.attempts),
            Cell::plain(format_elapsed_ms(job.status_age_ms(now_ms))),
        ]);
    }
    table.render()
}

pub fn render_history(jobs: &[Job]) -> String {
    if jobs.is_empty() {
        return format!("{}\n", color::muted("No finished jobs"));
    }
    let mut table = Table::new(vec!["ID", "STATUS", "ITEM", "WANTED", "MADE", "REASON"]);
    for job in jobs {
        table.row(vec![
            Cell::plain(job.id),
            Cell::colored(job.status, color::job_status_code(job.status)),
            Cell::plain(&job.item),
            Cell::plain(job.expected_output),
            Cell::plain(job.actual_output.map_or("-".to_string(), |n| n.to_string())),
            Cell::plain(job.fail_reason.as_deref().unwrap_or("")),
        ]);
    }
    table.render()
}

pub fn render_agents(agents: &[AgentEntry]) -> String {
    if agents.is_empty() {
        return format!("{}\n", color::muted("No agents registered"));
    }
    let mut table = Table::new(vec!["ID", "ROLE", "LABEL", "NODE", "STATE", "JOB", "SEEN"]);
    for agent in agents {
        table.row(vec![
            Cell::plain(&agent.id),
            Cell::plain(agent.role),
            Cell::plain(&agent.label),
            Cell::plain(agent.node),
            Cell::colored(agent.state, color::agent_state_code(agent.state)),
            Cell::plain(agent.current_job.map_or("-".to_string(), |j| j.to_string())),
            Cell::plain(format!("{} ago", format_elapsed_ms(agent.last_seen_ago_ms))),
        ]);
    }
    table.render()
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
