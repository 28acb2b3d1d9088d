// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! logi daemon library
//!
//! Configuration, lifecycle and the IPC listener behind `logid`. The CLI
//! links this crate for [`lifecycle::Paths`] so both sides agree on where
//! the socket lives.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod simulate;

pub use config::{Config, ConfigError};
pub use lifecycle::{DaemonLock, LifecycleError, Paths};
pub use listener::{ListenCtx, Listener, ServerView};
pub use simulate::{FleetPlan, SimulatedFleet};
