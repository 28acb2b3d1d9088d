// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}

#[test]
fn fake_clock_starts_at_fixed_epoch() {
    assert_eq!(FakeClock::new().epoch_ms(), 1_000_000);
}

#[test]
fn fake_clock_advance_is_shared_between_clones() {
    let clock = FakeClock::new();
    let other = clock.clone();
    other.advance(Duration::from_secs(30));
    assert_eq!(clock.epoch_ms(), 1_030_000);
}

#[test]
fn elapsed_ms_saturates_for_future_timestamps() {
    let clock = FakeClock::new();
    assert_eq!(clock.elapsed_ms(2_000_000), 0);
    assert_eq!(clock.elapsed_ms(400_000), 600_000);
}

#[test]
fn set_epoch_ms_overrides_time() {
    let clock = FakeClock::default();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
