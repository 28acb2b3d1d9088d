// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocols spoken by logi.
//!
//! Two surfaces share the JSON codec in this crate:
//! - the turtle network: [`Envelope`]s carrying a closed [`Message`] enum,
//!   one JSON document per datagram
//! - daemon IPC: [`Request`] / [`Response`] over a Unix socket, framed with
//!   a 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod message;
mod query;
mod request;
mod response;
mod status;
mod wire;

pub use message::{Envelope, Message, MessageKind};
pub use query::Query;
pub use request::Request;
pub use response::Response;
pub use status::{AgentEntry, StatusSummary};
pub use wire::{decode, encode, read_message, write_message, ProtocolError, MAX_MESSAGE_SIZE};
pub use wire::{read_request, read_response, write_request, write_response};

/// Protocol version exchanged in `Hello` and `SERVER_ANNOUNCE`.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
