// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! logi-core: domain types shared by the logistics server and its agents

pub mod macros;

pub mod agent;
pub mod clock;
pub mod id;
pub mod item;
pub mod job;
pub mod recipe;
pub mod stock;
pub mod target;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{Agent, AgentId, AgentState, AgentStatus, Role};
#[cfg(any(test, feature = "test-support"))]
pub use agent::AgentBuilder;
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{short, NodeId};
pub use item::ItemId;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{HistoryFilter, Job, JobId, JobKind, JobStats, JobStatus};
pub use recipe::{Ingredient, Recipe, RecipeBook, RecipeKind, StaticRecipeBook};
pub use stock::StockSnapshot;
pub use target::{StockTarget, Targets, WorkTarget};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
