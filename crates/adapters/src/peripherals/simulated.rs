// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peripherals backed by a [`MemoryStock`] inventory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logi_core::{ItemId, Recipe};
use parking_lot::Mutex;

use super::{PeripheralError, Peripherals};
use crate::stock::MemoryStock;

#[derive(Default)]
struct SimState {
    /// Task name to produced item
    tasks: HashMap<String, ItemId>,
    /// Multiples left before crafting starts failing
    craft_budget: Option<u32>,
    crafted: u64,
}

/// Simulated turtle that crafts by rewriting its inventory in `stock`.
#[derive(Clone)]
pub struct SimulatedPeripherals {
    inventory: String,
    stock: MemoryStock,
    op_delay: Duration,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPeripherals {
    pub fn new(inventory: impl Into<String>, stock: MemoryStock) -> Self {
        Self {
            inventory: inventory.into(),
            stock,
            op_delay: Duration::ZERO,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Pause for `delay` per craft or task, to make work observable.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.op_delay = delay;
        self
    }

    /// Teach a worker task that yields `item`.
    pub fn with_task(self, task: impl Into<String>, item: impl Into<ItemId>) -> Self {
        self.state.lock().tasks.insert(task.into(), item.into());
        self
    }

    /// Crafting fails once `multiples` more have completed.
    pub fn fail_after(&self, multiples: u32) {
        self.state.lock().craft_budget = Some(multiples);
    }

    /// Total multiples crafted so far.
    pub fn crafted(&self) -> u64 {
        self.state.lock().crafted
    }

    fn craft_one(&self, recipe: &Recipe) -> Result<(), PeripheralError> {
        let mut state = self.state.lock();
        if state.craft_budget == Some(0) {
            return Err(PeripheralError::CraftFailed(format!("{} jammed", self.inventory)));
        }

        let needed = recipe.materials_per_craft();
        let inventory = self.stock.inventory(&self.inventory);
        if needed.iter().any(|(item, count)| inventory.get(item) < *count) {
            return Err(PeripheralError::MissingIngredients { recipe: recipe.output.to_string() });
        }
        for (item, count) in &needed {
            self.stock.take(&self.inventory, item, *count);
        }
        self.stock.put(&self.inventory, &recipe.output, u64::from(recipe.output_count));

        if let Some(budget) = state.craft_budget.as_mut() {
            *budget -= 1;
        }
        state.crafted += 1;
        Ok(())
    }
}

#[async_trait]
impl Peripherals for SimulatedPeripherals {
    fn inventory_name(&self) -> String {
        self.inventory.clone()
    }

    async fn craft(&self, recipe: &Recipe, multiples: u32) -> Result<u32, PeripheralError> {
        let mut done = 0;
        for _ in 0..multiples {
            if !self.op_delay.is_zero() {
                tokio::time::sleep(self.op_delay).await;
            }
            match self.craft_one(recipe) {
                Ok(()) => done += 1,
                Err(e) if done == 0 => return Err(e),
                Err(e) => {
                    tracing::debug!(done, error = %e, "craft stopped early");
                    break;
                }
            }
        }
        Ok(done)
    }

    async fn perform(&self, task: &str, quantity: u64) -> Result<u64, PeripheralError> {
        let item = self
            .state
            .lock()
            .tasks
            .get(task)
            .cloned()
            .ok_or_else(|| PeripheralError::UnknownTask(task.to_string()))?;
        if !self.op_delay.is_zero() {
            tokio::time::sleep(self.op_delay).await;
        }
        self.stock.put(&self.inventory, &item, quantity);
        Ok(quantity)
    }
}

#[cfg(test)]
#[path = "simulated_tests.rs"]
mod tests;
