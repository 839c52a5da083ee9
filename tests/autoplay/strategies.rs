//! The two next input strategies must be interchangeable.

use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};
use stepchart::prelude::*;

use super::Harness;
use crate::common::random_chart;

fn last_time(chart: &Chart) -> f64 {
    chart
        .events()
        .iter()
        .map(ChartEvent::end_chart_time)
        .fold(1.0, f64::max)
}

#[test]
fn strategies_resolve_the_same_next_inputs() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let end = last_time(&chart);
        let mut times: Vec<f64> = (0..128).map(|_| rng.random_range(-0.5..end + 0.5)).collect();
        for event in chart.events().iter() {
            times.push(event.chart_time());
            times.push(event.end_chart_time());
        }

        for time in times {
            assert_eq!(
                chart.next_inputs(time, NextInputStrategy::TimeScan),
                chart.next_inputs(time, NextInputStrategy::PerLane),
                "seed {seed}, time {time}"
            );
        }
    }
}

#[test]
fn strategies_play_identically() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let end = last_time(&chart);

        let mut by_time = Harness::new(
            chart.clone(),
            AutoPlayConfig::default().strategy(NextInputStrategy::TimeScan),
        );
        let mut by_lane = Harness::new(
            chart,
            AutoPlayConfig::default().strategy(NextInputStrategy::PerLane),
        );
        let mut time = rng.random_range(-0.5..end / 2.0);
        while time < end + 0.5 {
            by_time.tick(time);
            by_lane.tick(time);
            time += rng.random_range(0.0..0.2);
        }

        for lane in 0..4 {
            assert_eq!(by_time.drain(lane), by_lane.drain(lane), "seed {seed}, lane {lane}");
        }
    }
}

#[test]
fn receptor_is_held_exactly_inside_holds() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let chart = random_chart(&mut rng, 4, 2000);
        let end = last_time(&chart);
        let mut harness = Harness::new(chart, AutoPlayConfig::default());

        let mut time = rng.random_range(-0.5..end / 2.0);
        while time < end + 0.5 {
            harness.tick(time);
            for lane in 0..4 {
                assert_eq!(
                    harness.receptors[lane].is_held(),
                    harness.chart.active_hold(lane, time).is_some(),
                    "seed {seed}, lane {lane}, time {time}"
                );
            }
            time += rng.random_range(0.0..0.2);
        }
    }
}
