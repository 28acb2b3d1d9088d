// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage kept entirely in memory.
//!
//! Besides the storage counts it tracks named external inventories (one per
//! turtle), so withdrawals and deposits move items rather than create them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use logi_core::{ItemId, StockSnapshot};
use parking_lot::Mutex;

use super::StockOracle;

#[derive(Default)]
struct MemoryStockState {
    storage: StockSnapshot,
    inventories: HashMap<String, StockSnapshot>,
    invalidations: u64,
}

#[derive(Clone, Default)]
pub struct MemoryStock {
    inner: Arc<Mutex<MemoryStockState>>,
}

impl MemoryStock {
    pub fn new(storage: StockSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStockState { storage, ..Default::default() })),
        }
    }

    /// Overwrite the storage count of one item.
    pub fn set(&self, item: impl Into<ItemId>, count: u64) {
        self.inner.lock().storage.set(item, count);
    }

    pub fn count(&self, item: &ItemId) -> u64 {
        self.inner.lock().storage.get(item)
    }

    /// Contents of a named inventory (empty if never used).
    pub fn inventory(&self, name: &str) -> StockSnapshot {
        self.inner.lock().inventories.get(name).cloned().unwrap_or_default()
    }

    /// Put items straight into an inventory, bypassing storage.
    pub fn put(&self, inventory: &str, item: &ItemId, count: u64) {
        self.inner.lock().inventories.entry(inventory.to_string()).or_default().add(item, count);
    }

    /// Remove up to `count` from an inventory; returns how many were removed.
    pub fn take(&self, inventory: &str, item: &ItemId, count: u64) -> u64 {
        self.inner
            .lock()
            .inventories
            .get_mut(inventory)
            .map(|inv| inv.take(item, count))
            .unwrap_or(0)
    }

    pub fn invalidations(&self) -> u64 {
        self.inner.lock().invalidations
    }
}

#[async_trait]
impl StockOracle for MemoryStock {
    async fn snapshot(&self) -> StockSnapshot {
        self.inner.lock().storage.clone()
    }

    async fn withdraw(
        &self,
        item: &ItemId,
        count: u64,
        dest_inv: &str,
        _dest_slot: Option<u8>,
    ) -> u64 {
        let mut state = self.inner.lock();
        let moved = state.storage.take(item, count);
        if moved > 0 {
            state.inventories.entry(dest_inv.to_string()).or_default().add(item, moved);
        }
        moved
    }

    async fn deposit(&self, source_inv: &str, item: Option<&ItemId>) -> u64 {
        let mut state = self.inner.lock();
        let Some(inventory) = state.inventories.get_mut(source_inv) else {
            return 0;
        };
        let moved: Vec<(ItemId, u64)> = match item {
            Some(item) => {
                let count = inventory.take(item, u64::MAX);
                vec![(item.clone(), count)]
            }
            None => std::mem::take(inventory).iter().map(|(i, c)| (i.clone(), *c)).collect(),
        };
        let mut total = 0;
        for (item, count) in moved {
            state.storage.add(&item, count);
            total += count;
        }
        total
    }

    async fn invalidate(&self) {
        self.inner.lock().invalidations += 1;
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
