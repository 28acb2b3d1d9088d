// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Ingredient, Recipe, StaticRecipeBook, StockSnapshot};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::job::JobStatus;
    use proptest::prelude::*;

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Pending),
            Just(JobStatus::Assigned),
            Just(JobStatus::Crafting),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
        ]
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

/// `1 coal + 1 stick -> 4 torch`
pub fn torch_recipe() -> Recipe {
    Recipe::new(
        "minecraft:torch",
        4,
        vec![
            Ingredient::new("minecraft:coal", 1).in_slot(1),
            Ingredient::new("minecraft:stick", 1).in_slot(5),
        ],
    )
}

/// `1 coal + 1 stick + 3 logs -> 1 campfire` (shares coal with torches)
pub fn campfire_recipe() -> Recipe {
    Recipe::new(
        "minecraft:campfire",
        1,
        vec![
            Ingredient::new("minecraft:stick", 1).in_slot(2),
            Ingredient::new("minecraft:coal", 1).in_slot(5),
            Ingredient::new("minecraft:oak_log", 1).in_slot(7),
            Ingredient::new("minecraft:oak_log", 1).in_slot(8),
            Ingredient::new("minecraft:oak_log", 1).in_slot(9),
        ],
    )
}

pub fn iron_ingot_recipe() -> Recipe {
    Recipe::smelting("minecraft:iron_ingot", "minecraft:raw_iron")
}

pub fn recipe_book() -> StaticRecipeBook {
    StaticRecipeBook::new()
        .with(torch_recipe())
        .with(campfire_recipe())
        .with(iron_ingot_recipe())
}

pub fn stock(pairs: &[(&str, u64)]) -> StockSnapshot {
    pairs.iter().map(|(item, count)| (*item, *count)).collect()
}
