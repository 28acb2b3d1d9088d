// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job execution on the turtle.
//!
//! A craft job runs in batches: gather one batch of ingredients from storage,
//! craft, push the output back. Whatever completed before a failure is still
//! reported as output.

use std::collections::BTreeMap;

use logi_adapters::{PeripheralError, Peripherals, Transport};
use logi_core::{ItemId, Job, JobKind, Recipe};
use tokio_util::sync::CancellationToken;

use crate::error::ExecError;
use crate::link::ServerLink;

/// Result of running one job.
#[derive(Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Items produced (for crafts: completed multiples times output count)
    pub produced: u64,
    /// Set when the job stopped before doing everything it asked for
    pub error: Option<ExecError>,
}

impl Outcome {
    fn done(produced: u64) -> Self {
        Self { produced, error: None }
    }

    fn stopped(produced: u64, error: ExecError) -> Self {
        Self { produced, error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.produced > 0
    }
}

/// Run `job` to completion, first failure or cancellation.
///
/// Cancellation is observed between craft batches, so multiples already
/// made are still counted.
pub async fn execute<T, P>(
    link: &ServerLink<T>,
    peripherals: &P,
    job: &Job,
    batch_size: u32,
    withdraw_retries: u32,
    cancel: &CancellationToken,
) -> Outcome
where
    T: Transport,
    P: Peripherals,
{
    match &job.kind {
        JobKind::Craft { recipe } => {
            let plan = CraftPlan { crafts: job.crafts, batch_size, withdraw_retries };
            craft(link, peripherals, recipe, plan, cancel).await
        }
        JobKind::Work { task } => work(link, peripherals, task, job.expected_output, cancel).await,
    }
}

struct CraftPlan {
    crafts: u32,
    batch_size: u32,
    withdraw_retries: u32,
}

async fn craft<T, P>(
    link: &ServerLink<T>,
    peripherals: &P,
    recipe: &Recipe,
    plan: CraftPlan,
    cancel: &CancellationToken,
) -> Outcome
where
    T: Transport,
    P: Peripherals,
{
    let CraftPlan { crafts, batch_size, withdraw_retries } = plan;
    let inventory = peripherals.inventory_name();
    let per_craft = recipe.materials_per_craft();
    let output_count = u64::from(recipe.output_count);

    // Leftovers from an earlier job would confuse the crafting grid
    link.deposit(&inventory, None).await;

    let mut multiples: u64 = 0;
    let mut remaining = crafts;
    let mut error = None;

    while remaining > 0 {
        if cancel.is_cancelled() {
            error = Some(ExecError::Cancelled);
            break;
        }
        let batch = remaining.min(batch_size.max(1));
        let gathered = gather(link, recipe, &inventory, batch, withdraw_retries).await;
        if cancel.is_cancelled() {
            error = Some(ExecError::Cancelled);
            break;
        }

        let (feasible, shortfall) = feasible_crafts(&per_craft, &gathered, batch);
        if let Some(shortfall) = &shortfall {
            tracing::warn!(error = %shortfall, batch, feasible, "short on ingredients");
        }
        if feasible == 0 {
            error = shortfall;
            break;
        }

        match peripherals.craft(recipe, feasible).await {
            Ok(done) => {
                multiples += u64::from(done);
                link.deposit(&inventory, Some(&recipe.output)).await;
                tracing::debug!(item = %recipe.output, done, total = multiples, "batch crafted");
                if done < feasible {
                    let reason = format!("{done} of {feasible} crafts completed");
                    error = Some(PeripheralError::CraftFailed(reason).into());
                    break;
                }
            }
            Err(e) => {
                error = Some(e.into());
                break;
            }
        }

        if shortfall.is_some() {
            error = shortfall;
            break;
        }
        remaining -= batch;
    }

    link.deposit(&inventory, None).await;

    let produced = multiples * output_count;
    match error {
        Some(error) => Outcome::stopped(produced, error),
        None => Outcome::done(produced),
    }
}

async fn work<T, P>(
    link: &ServerLink<T>,
    peripherals: &P,
    task: &str,
    quantity: u64,
    cancel: &CancellationToken,
) -> Outcome
where
    T: Transport,
    P: Peripherals,
{
    let inventory = peripherals.inventory_name();
    let outcome = tokio::select! {
        result = peripherals.perform(task, quantity) => match result {
            Ok(produced) => Outcome::done(produced),
            Err(e) => Outcome::stopped(0, e.into()),
        },
        // A task reports its yield only when it finishes
        _ = cancel.cancelled() => Outcome::stopped(0, ExecError::Cancelled),
    };
    link.deposit(&inventory, None).await;
    outcome
}

/// Withdraw one batch of every ingredient, retrying short transfers.
/// Returns the amount gathered per item.
async fn gather<T: Transport>(
    link: &ServerLink<T>,
    recipe: &Recipe,
    inventory: &str,
    batch: u32,
    withdraw_retries: u32,
) -> BTreeMap<ItemId, u64> {
    let mut gathered: BTreeMap<ItemId, u64> = BTreeMap::new();
    for ingredient in &recipe.ingredients {
        let wanted = u64::from(ingredient.count) * u64::from(batch);
        let mut got = 0;
        for attempt in 0..=withdraw_retries {
            got += link.withdraw(&ingredient.item, wanted - got, inventory, ingredient.slot).await;
            if got >= wanted {
                break;
            }
            tracing::debug!(item = %ingredient.item, got, wanted, attempt, "short withdraw");
        }
        *gathered.entry(ingredient.item.clone()).or_insert(0) += got;
    }
    gathered
}

/// Crafts the gathered ingredients cover, capped at `batch`, plus the first
/// shortfall if any ingredient came up short.
fn feasible_crafts(
    per_craft: &BTreeMap<ItemId, u64>,
    gathered: &BTreeMap<ItemId, u64>,
    batch: u32,
) -> (u32, Option<ExecError>) {
    let mut feasible = u64::from(batch);
    let mut shortfall = None;
    for (item, per) in per_craft {
        let got = gathered.get(item).copied().unwrap_or(0);
        let wanted = per * u64::from(batch);
        if got < wanted && shortfall.is_none() {
            shortfall = Some(ExecError::TransferShortfall { item: item.clone(), wanted, got });
        }
        if *per > 0 {
            feasible = feasible.min(got / per);
        }
    }
    (u32::try_from(feasible).unwrap_or(batch), shortfall)
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
