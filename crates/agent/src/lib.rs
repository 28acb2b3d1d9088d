// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! logi-agent: the turtle side of the protocol.
//!
//! An agent finds the server, registers, answers heartbeats and executes the
//! jobs it is sent, reporting each outcome exactly once.

mod config;
mod error;
mod exec;
mod link;
mod runtime;

#[cfg(test)]
mod test_helpers;

pub use config::AgentConfig;
pub use error::{ExecError, LinkError};
pub use exec::{execute, Outcome};
pub use link::{ServerInfo, ServerLink};
pub use runtime::AgentRuntime;
