// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_epoch_ms_is_plausible() {
    let clock = SystemClock;
    let ms = clock.epoch_ms();
    // Some time after 2024-01-01 and before the year 3000, sanity bounds.
    assert!(ms > 1_700_000_000_000);
    assert!(ms < 32_503_680_000_000);
}

#[test]
fn fake_clock_starts_at_given_epoch() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(0);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 500);
    clock.advance_ms(500);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_now_tracks_epoch_ms_deltas() {
    let clock = FakeClock::new(0);
    let t0 = clock.now();
    clock.advance_ms(250);
    let t1 = clock.now();
    assert_eq!((t1 - t0).as_millis(), 250);
}

#[test]
fn fake_clock_set_epoch_ms_is_absolute() {
    let clock = FakeClock::new(100);
    clock.set_epoch_ms(9_999);
    assert_eq!(clock.epoch_ms(), 9_999);
}

#[test]
fn fake_clock_clone_shares_state() {
    let clock = FakeClock::new(0);
    let clone = clock.clone();
    clock.advance_ms(10);
    assert_eq!(clone.epoch_ms(), 10);
}
