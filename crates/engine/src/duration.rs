// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable intervals for timing settings.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("no amount in {0:?}")]
    MissingAmount(String),

    #[error("unknown unit {0:?}")]
    UnknownUnit(String),

    #[error("{0:?} is too long")]
    Overflow(String),
}

/// Milliseconds per unit, by every spelling accepted.
const UNITS: &[(&[&str], u64)] = &[
    (&["ms", "millis", "millisecond", "milliseconds"], 1),
    (&["", "s", "sec", "secs", "second", "seconds"], 1_000),
    (&["m", "min", "mins", "minute", "minutes"], 60_000),
    (&["h", "hr", "hrs", "hour", "hours"], 3_600_000),
    (&["d", "day", "days"], 86_400_000),
];

/// Parse `"500ms"`, `"30s"`, `"5m"`, `"2 hours"` and the like. A bare
/// number is seconds.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    let split = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split);
    let amount: u64 =
        amount.parse().map_err(|_| DurationError::MissingAmount(trimmed.to_string()))?;

    let unit = unit.trim().to_ascii_lowercase();
    let scale = UNITS
        .iter()
        .find(|(names, _)| names.contains(&unit.as_str()))
        .map(|(_, ms)| *ms)
        .ok_or_else(|| DurationError::UnknownUnit(unit.clone()))?;

    amount
        .checked_mul(scale)
        .map(Duration::from_millis)
        .ok_or_else(|| DurationError::Overflow(trimmed.to_string()))
}
