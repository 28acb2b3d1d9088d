// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The turtle's own hardware: crafting table, furnace, tools.

mod simulated;

pub use simulated::SimulatedPeripherals;

use async_trait::async_trait;
use logi_core::Recipe;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeripheralError {
    #[error("missing ingredients for {recipe}")]
    MissingIngredients { recipe: String },

    #[error("craft failed: {0}")]
    CraftFailed(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task failed: {0}")]
    TaskFailed(String),
}

/// Hardware the agent drives. Results land in the turtle's inventory.
#[async_trait]
pub trait Peripherals: Clone + Send + Sync + 'static {
    /// Name the storage network knows this turtle's inventory by.
    fn inventory_name(&self) -> String;

    /// Craft (or smelt) `multiples` times from the inventory's contents.
    ///
    /// Returns how many multiples completed before the first failure; an
    /// error means none did.
    async fn craft(&self, recipe: &Recipe, multiples: u32) -> Result<u32, PeripheralError>;

    /// Run a worker task aiming for `quantity` items; returns items produced.
    async fn perform(&self, task: &str, quantity: u64) -> Result<u64, PeripheralError>;
}
