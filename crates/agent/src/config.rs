// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use logi_core::Role;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub role: Role,
    pub label: String,
    /// Most crafts gathered into the inventory at once
    pub batch_size: u32,
    /// Deadline for one storage round trip; a miss counts as nothing moved
    pub round_trip_timeout: Duration,
    /// Extra withdraw attempts for an ingredient that came up short
    pub withdraw_retries: u32,
    /// How long one idle receive waits before re-checking cancellation
    pub poll_interval: Duration,
    /// How long to wait for a server announcement per discovery attempt
    pub discovery_timeout: Duration,
    /// Pause between failed discovery attempts
    pub discovery_backoff: Duration,
}

impl AgentConfig {
    pub fn new(role: Role, label: impl Into<String>) -> Self {
        Self {
            role,
            label: label.into(),
            batch_size: 64,
            round_trip_timeout: Duration::from_secs(5),
            withdraw_retries: 2,
            poll_interval: Duration::from_secs(1),
            discovery_timeout: Duration::from_secs(5),
            discovery_backoff: Duration::from_secs(2),
        }
    }
}
