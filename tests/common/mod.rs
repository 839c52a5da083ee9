//! Helpers shared by the integration tests.
//!
//! Unified time precision evaluation criterion:
//! - All time-related assertions must have absolute error less than 1 microsecond (0.000001s)
//! - Use [`assert_time_close`] for time comparisons

#![allow(dead_code)]

use rand::Rng;
use stepchart::prelude::*;

/// Unified time precision evaluation constant: 1 microsecond (unit: seconds)
pub const MICROSECOND_EPSILON: f64 = 1e-6;

/// Assert that two floating-point time values are equal within 1 microsecond error margin
#[track_caller]
pub fn assert_time_close(expected: f64, actual: f64, msg: &str) {
    let diff = (expected - actual).abs();
    assert!(
        diff < MICROSECOND_EPSILON,
        "{msg}: expected {expected:.6}s, got {actual:.6}s, diff {diff:.9}s (allowed: {MICROSECOND_EPSILON}s)",
    );
}

/// 120 BPM at 48 rows per beat: one row is 1/96 second.
pub fn constant_chart(num_lanes: usize) -> Chart {
    Chart::new(num_lanes, TempoMap::constant(120.0).unwrap())
}

/// Random timing with BPM changes, and with stops and warps when `gimmicks` is set.
///
/// Changes are spread apart, so no change falls on a stop row or inside a warp.
pub fn random_timing(rng: &mut impl Rng, max_row: i64, gimmicks: bool) -> TempoMap {
    let mut builder = TempoMap::builder(48).bpm(0, rng.random_range(60.0..240.0));
    let mut row = 0;
    loop {
        row += rng.random_range(24..400);
        if row >= max_row {
            break;
        }
        builder = match rng.random_range(0..3) {
            1 if gimmicks => builder.stop(row, rng.random_range(0.1..1.0)),
            2 if gimmicks => {
                let rows = rng.random_range(1..96);
                let warped = builder.warp(row, rows);
                row += rows;
                warped
            }
            _ => builder.bpm(row, rng.random_range(60.0..300.0)),
        };
    }
    builder.build().unwrap()
}

/// Random chart of `num_lanes` lanes with events on rows `0..max_row`.
///
/// Notes of one lane never overlap, except that a hold may start on the row where the
/// previous hold of the lane ends.
pub fn random_chart(rng: &mut impl Rng, num_lanes: usize, max_row: i64) -> Chart {
    let timing = random_timing(rng, max_row, true);
    let mut chart = Chart::new(num_lanes, timing);
    // Row where the last note of each lane ends, and whether it was a hold.
    let mut busy_until = vec![(-1, false); num_lanes];
    let mut row = 0;
    while row < max_row {
        for (lane, busy) in busy_until.iter_mut().enumerate() {
            if !rng.random_bool(0.3) {
                continue;
            }
            let kind = rng.random_range(0..6);
            let free = row > busy.0 || (kind == 1 && busy.1 && row == busy.0);
            if !free {
                continue;
            }
            match kind {
                0 => {
                    chart.add_tap(row, lane).unwrap();
                    *busy = (row, false);
                }
                1 => {
                    let end_row = row + rng.random_range(1..192);
                    chart.add_hold(row, lane, end_row).unwrap();
                    *busy = (end_row, true);
                }
                2 => {
                    chart.add_lift(row, lane).unwrap();
                    *busy = (row, false);
                }
                3 => {
                    chart.add_mine(row, lane).unwrap();
                }
                4 => {
                    chart.add_fake(row, lane).unwrap();
                }
                _ => {
                    chart.add_tap(row, lane).unwrap();
                    *busy = (row, false);
                }
            }
        }
        if rng.random_bool(0.05) {
            chart.add_marker(row, format!("section {row}")).unwrap();
        }
        row += [6, 12, 24, 48][rng.random_range(0..4)];
    }
    chart
}
