// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage system access.

mod memory;

pub use memory::MemoryStock;

use async_trait::async_trait;
use logi_core::{ItemId, StockSnapshot};

/// Authoritative view of the storage network.
///
/// Transfers report how much actually moved; a short transfer is not an
/// error.
#[async_trait]
pub trait StockOracle: Clone + Send + Sync + 'static {
    /// Current item counts (may be cached until [`invalidate`](Self::invalidate)).
    async fn snapshot(&self) -> StockSnapshot;

    /// Move up to `count` of `item` from storage into `dest_inv`.
    async fn withdraw(&self, item: &ItemId, count: u64, dest_inv: &str, dest_slot: Option<u8>)
        -> u64;

    /// Move everything (or only `item`) out of `source_inv` into storage.
    async fn deposit(&self, source_inv: &str, item: Option<&ItemId>) -> u64;

    /// Drop any cached snapshot so the next one rescans.
    async fn invalidate(&self);
}
