// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time view of storage contents.
//!
//! A snapshot is a plain value: each dispatch pass clones it and subtracts
//! the materials it reserves, so later targets in the same pass see what is
//! left rather than what was scanned.

use crate::item::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockSnapshot {
    counts: BTreeMap<ItemId, u64>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Available count for an item (zero when unknown).
    pub fn get(&self, item: &ItemId) -> u64 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn set(&mut self, item: impl Into<ItemId>, count: u64) {
        let item = item.into();
        if count == 0 {
            self.counts.remove(&item);
        } else {
            self.counts.insert(item, count);
        }
    }

    pub fn add(&mut self, item: &ItemId, count: u64) {
        if count > 0 {
            *self.counts.entry(item.clone()).or_insert(0) += count;
        }
    }

    /// Remove up to `count` of an item; returns how many were actually removed.
    pub fn take(&mut self, item: &ItemId, count: u64) -> u64 {
        let available = self.get(item);
        let taken = available.min(count);
        self.set(item.clone(), available - taken);
        taken
    }

    /// How many whole crafts the snapshot can feed given per-craft totals.
    ///
    /// A recipe with no ingredients is never limited by stock.
    pub fn crafts_available(&self, per_craft: &BTreeMap<ItemId, u64>) -> u64 {
        per_craft
            .iter()
            .filter(|(_, need)| **need > 0)
            .map(|(item, need)| self.get(item) / need)
            .min()
            .unwrap_or(u64::MAX)
    }

    /// Subtract a reservation. Never goes below zero.
    pub fn subtract(&mut self, materials: &BTreeMap<ItemId, u64>) {
        for (item, count) in materials {
            self.take(item, *count);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &u64)> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

impl<I: Into<ItemId>> FromIterator<(I, u64)> for StockSnapshot {
    fn from_iter<T: IntoIterator<Item = (I, u64)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (item, count) in iter {
            let item = item.into();
            snapshot.add(&item, count);
        }
        snapshot
    }
}

#[cfg(test)]
#[path = "stock_tests.rs"]
mod tests;
