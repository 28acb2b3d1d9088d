// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the collaborators the coordinator does not own: the
//! network, the storage system and the turtle's own peripherals.

pub mod peripherals;
pub mod stock;
pub mod transport;

pub use peripherals::{PeripheralError, Peripherals, SimulatedPeripherals};
pub use stock::{MemoryStock, StockOracle};
pub use transport::{MemoryNetwork, MemoryTransport, Transport, UdpConfig, UdpTransport};
