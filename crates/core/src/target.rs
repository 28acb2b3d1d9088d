// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desired stock levels.
//!
//! Targets are operator configuration: the dispatch loop reads them and turns
//! deficits into jobs, nothing writes them back.

use crate::item::ItemId;
use crate::recipe::RecipeKind;
use serde::{Deserialize, Serialize};

/// Keep `item` at `amount` by crafting or smelting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTarget {
    pub item: ItemId,
    pub amount: u64,
}

impl StockTarget {
    pub fn new(item: impl Into<ItemId>, amount: u64) -> Self {
        Self { item: item.into(), amount }
    }

    pub fn needed(&self, current: u64) -> u64 {
        self.amount.saturating_sub(current)
    }
}

/// Run worker `task` once `item` drops below `threshold`, refilling to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTarget {
    pub task: String,
    pub item: ItemId,
    pub threshold: u64,
    pub target: u64,
}

impl WorkTarget {
    /// Zero while stock sits at or above the threshold (hysteresis band).
    pub fn needed(&self, current: u64) -> u64 {
        if current >= self.threshold {
            0
        } else {
            self.target.saturating_sub(current)
        }
    }
}

/// Every configured target, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    #[serde(default)]
    pub craft: Vec<StockTarget>,
    #[serde(default)]
    pub smelt: Vec<StockTarget>,
    #[serde(default)]
    pub work: Vec<WorkTarget>,
}

impl Targets {
    /// Craft then smelt targets, tagged with the recipe kind to look up.
    pub fn recipe_targets(&self) -> impl Iterator<Item = (&StockTarget, RecipeKind)> {
        self.craft
            .iter()
            .map(|t| (t, RecipeKind::Crafting))
            .chain(self.smelt.iter().map(|t| (t, RecipeKind::Smelting)))
    }

    pub fn is_empty(&self) -> bool {
        self.craft.is_empty() && self.smelt.is_empty() && self.work.is_empty()
    }

    pub fn len(&self) -> usize {
        self.craft.len() + self.smelt.len() + self.work.len()
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
