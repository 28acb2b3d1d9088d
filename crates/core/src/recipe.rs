// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe lookup.
//!
//! The concrete recipe schema belongs to the game data; the coordinator only
//! needs an ingredient list, an output item and how many items one craft
//! yields.

use crate::item::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How a recipe is executed on the agent side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeKind {
    /// Turtle crafting grid
    #[default]
    Crafting,
    /// Furnace next to the turtle
    Smelting,
}

crate::simple_display! {
    RecipeKind {
        Crafting => "crafting",
        Smelting => "smelting",
    }
}

/// One input of a craft. `slot` pins the item to a crafting-grid slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: ItemId,
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u8>,
}

fn one() -> u32 {
    1
}

impl Ingredient {
    pub fn new(item: impl Into<ItemId>, count: u32) -> Self {
        Self { item: item.into(), count, slot: None }
    }

    pub fn in_slot(mut self, slot: u8) -> Self {
        self.slot = Some(slot);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub output: ItemId,
    /// Items produced by a single craft operation
    pub output_count: u32,
    #[serde(default)]
    pub kind: RecipeKind,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(output: impl Into<ItemId>, output_count: u32, ingredients: Vec<Ingredient>) -> Self {
        Self { output: output.into(), output_count, kind: RecipeKind::Crafting, ingredients }
    }

    pub fn smelting(output: impl Into<ItemId>, input: impl Into<ItemId>) -> Self {
        Self {
            output: output.into(),
            output_count: 1,
            kind: RecipeKind::Smelting,
            ingredients: vec![Ingredient::new(input, 1)],
        }
    }

    /// Total of each distinct ingredient consumed by one craft.
    ///
    /// A grid recipe lists the same item once per slot (three planks for a
    /// slab), so entries are folded per item.
    pub fn materials_per_craft(&self) -> BTreeMap<ItemId, u64> {
        let mut totals = BTreeMap::new();
        for ingredient in &self.ingredients {
            *totals.entry(ingredient.item.clone()).or_insert(0) += u64::from(ingredient.count);
        }
        totals
    }

    /// Number of crafts needed to produce at least `quantity` items.
    pub fn crafts_for(&self, quantity: u64) -> u64 {
        let per_craft = u64::from(self.output_count.max(1));
        quantity.div_ceil(per_craft)
    }
}

/// Recipe lookup consumed by the job queue.
pub trait RecipeBook: Send + Sync {
    fn lookup(&self, item: &ItemId, kind: RecipeKind) -> Option<Recipe>;
}

/// In-memory recipe table, typically loaded from a JSON file at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticRecipeBook {
    recipes: HashMap<(RecipeKind, ItemId), Recipe>,
}

impl StaticRecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe. A later recipe for the same output and kind replaces
    /// the earlier one.
    pub fn insert(&mut self, recipe: Recipe) {
        self.recipes.insert((recipe.kind, recipe.output.clone()), recipe);
    }

    pub fn with(mut self, recipe: Recipe) -> Self {
        self.insert(recipe);
        self
    }

    /// Parse a JSON array of recipes.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;
        Ok(recipes.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl FromIterator<Recipe> for StaticRecipeBook {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let mut book = Self::new();
        for recipe in iter {
            book.insert(recipe);
        }
        book
    }
}

impl RecipeBook for StaticRecipeBook {
    fn lookup(&self, item: &ItemId, kind: RecipeKind) -> Option<Recipe> {
        self.recipes.get(&(kind, item.clone())).cloned()
    }
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
