//! Randomized checks of the index queries against linear scans.

use std::collections::HashSet;

use itertools::Itertools;
use rand::{Rng, SeedableRng, rngs::StdRng};
use stepchart::prelude::*;

use crate::common::{random_chart, random_timing};

const SEEDS: std::ops::Range<u64> = 0..32;

/// Query times: random ones plus the exact time of every event.
fn query_times(rng: &mut StdRng, chart: &Chart) -> Vec<f64> {
    let last = chart
        .events()
        .iter()
        .last()
        .map_or(1.0, ChartEvent::end_chart_time);
    let mut times: Vec<f64> = (0..64).map(|_| rng.random_range(-1.0..last + 1.0)).collect();
    times.extend(chart.events().iter().map(ChartEvent::chart_time));
    times.push(0.0);
    times
}

#[test]
fn chart_times_are_monotonic_in_index_order() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        for (a, b) in chart.events().iter().tuple_windows() {
            assert!(a < b, "seed {seed}: {a:?} !< {b:?}");
            assert!(a.chart_time() <= b.chart_time(), "seed {seed}");
        }
    }
}

#[test]
fn best_by_position_is_at_or_before_the_row() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let events = chart.events();
        let Some(first) = events.iter().next() else {
            continue;
        };
        for _ in 0..128 {
            let row = rng.random_range(-50.0..2050.0);
            let mut cursor = events.find_best_by_position(row).unwrap();
            assert!(cursor.move_next());
            let found = cursor.current().unwrap();
            if first.row() as f64 <= row {
                assert!(found.row() as f64 <= row, "seed {seed}, row {row}");
            } else {
                assert_eq!(found.row(), first.row(), "seed {seed}, row {row}");
            }
        }
    }
}

#[test]
fn events_at_row_partition_the_index() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let events = chart.events();
        let mut seen = HashSet::new();
        for row in -10..2010 {
            for event in events.find_events_at_row(row) {
                assert_eq!(event.row(), row, "seed {seed}");
                assert!(seen.insert(event.id()), "seed {seed}: {event:?} seen twice");
            }
        }
        assert_eq!(seen.len(), events.len(), "seed {seed}");
    }
}

#[test]
fn time_queries_match_linear_scan() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let events = chart.events();
        for time in query_times(&mut rng, &chart) {
            let expected = events.iter().find(|event| event.chart_time() > time);
            let actual = events
                .find_first_after_chart_time(time, chart.timing())
                .and_then(|mut cursor| cursor.next());
            assert_eq!(
                actual.map(ChartEvent::id),
                expected.map(ChartEvent::id),
                "seed {seed}, first after {time}"
            );

            let expected = events.iter().rev().find(|event| event.chart_time() < time);
            let actual = events
                .find_last_before_chart_time(time, chart.timing())
                .and_then(|mut cursor| cursor.next());
            assert_eq!(
                actual.map(ChartEvent::id),
                expected.map(ChartEvent::id),
                "seed {seed}, last before {time}"
            );
        }
    }
}

#[test]
fn position_queries_match_linear_scan() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let events = chart.events();
        for _ in 0..128 {
            let row = if rng.random_bool(0.5) {
                rng.random_range(-10..2010) as f64
            } else {
                rng.random_range(-10.0..2010.0)
            };
            let expected = events.iter().find(|event| event.row() as f64 > row);
            let actual = events
                .find_first_after_chart_position(row)
                .and_then(|mut cursor| cursor.next());
            assert_eq!(
                actual.map(ChartEvent::id),
                expected.map(ChartEvent::id),
                "seed {seed}, first after row {row}"
            );

            let expected = events.iter().rev().find(|event| (event.row() as f64) < row);
            let actual = events
                .find_last_before_chart_position(row)
                .and_then(|mut cursor| cursor.next());
            assert_eq!(
                actual.map(ChartEvent::id),
                expected.map(ChartEvent::id),
                "seed {seed}, last before row {row}"
            );
        }
    }
}

#[test]
fn row_time_conversion_is_idempotent() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let gimmicks = random_timing(&mut rng, 2000, true);
        let plain = random_timing(&mut rng, 2000, false);
        for row in (0..2000).step_by(7) {
            let row = row as f64;

            // Warps and stops map many rows to one time: the time survives a round trip.
            let time = gimmicks.row_to_time(row).unwrap();
            let back = gimmicks
                .row_to_time(gimmicks.time_to_row(time).unwrap())
                .unwrap();
            assert!((back - time).abs() < 1e-6, "seed {seed}, row {row}");

            // Without them, the row itself does.
            let time = plain.row_to_time(row).unwrap();
            let back = plain.time_to_row(time).unwrap();
            assert!((back - row).abs() < 1e-6, "seed {seed}, row {row}");
        }
    }
}

#[test]
fn note_at_matches_linear_scan() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 1000);
        for _ in 0..256 {
            let row = rng.random_range(0..1000);
            let lane = rng.random_range(0..4);
            // The nearest lane event at or before the row decides.
            let nearest = chart
                .events()
                .iter()
                .rev()
                .filter(|event| event.lane() == Some(lane))
                .find(|event| event.row() <= row);
            let expected = nearest.filter(|event| {
                event.row() == row
                    || matches!(event.kind(), EventKind::Hold { end_row, .. } if *end_row >= row)
            });
            assert_eq!(
                chart.find_note_at(row, lane, false).map(ChartEvent::id),
                expected.map(ChartEvent::id),
                "seed {seed}, row {row}, lane {lane}"
            );
        }
    }
}
