// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Server-side coordination: job queue, fleets, dispatch and the runtime
//! loops that tie them to the network.

pub mod dispatch;
pub mod duration;
pub mod error;
pub mod fleet;
pub mod queue;
pub mod server;

pub use dispatch::{assign_pending, plan_jobs, run_pass, Assignment, DispatchReport, Skipped};
pub use duration::{parse_duration, DurationError};
pub use error::QueueError;
pub use fleet::{Fleet, FleetEvent};
pub use queue::{JobQueue, StaleJob, DEFAULT_HISTORY_LIMIT};
pub use server::{Server, ServerConfig, ServerState};
