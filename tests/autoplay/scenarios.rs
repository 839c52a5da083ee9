use pretty_assertions::assert_eq;
use stepchart::prelude::*;

use super::Harness;
use crate::common::constant_chart;

use stepchart::receptor::ReceptorSignal::{Cancel, Down, Up};

fn harness(chart: Chart) -> Harness {
    Harness::new(chart, AutoPlayConfig::default())
}

#[test]
fn tap_emits_down_then_up_on_the_tick_it_passes() {
    let mut chart = constant_chart(1);
    chart.add_tap(48, 0).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.0);
    harness.tick(0.25);
    assert_eq!(harness.drain(0), vec![]);
    harness.tick(0.5);
    assert_eq!(harness.drain(0), vec![Down(0.0), Up(0.0)]);
    harness.tick(1.0);
    assert_eq!(harness.drain(0), vec![]);
}

#[test]
fn lift_is_played_like_a_tap() {
    let mut chart = constant_chart(1);
    chart.add_lift(48, 0).unwrap();
    let mut harness = harness(chart);
    harness.tick(0.0);
    harness.tick(0.5);
    assert_eq!(harness.drain(0), vec![Down(0.0), Up(0.0)]);
}

#[test]
fn back_to_back_holds_stay_held() {
    let mut chart = constant_chart(1);
    chart.add_hold(48, 0, 96).unwrap();
    chart.add_hold(96, 0, 192).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.0);
    harness.tick(0.75);
    assert_eq!(harness.drain(0), vec![Down(0.25)]);
    assert!(harness.receptors[0].is_held());

    harness.tick(1.25);
    assert_eq!(harness.drain(0), vec![Up(0.25), Down(0.25)]);
    assert!(harness.receptors[0].is_held());

    harness.tick(2.0);
    assert_eq!(harness.drain(0), vec![Up(0.0)]);
    assert!(!harness.receptors[0].is_held());
}

#[test]
fn back_to_back_holds_crossed_exactly_at_the_boundary() {
    let mut chart = constant_chart(1);
    chart.add_hold(48, 0, 96).unwrap();
    chart.add_hold(96, 0, 192).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.5);
    harness.tick(1.0);
    assert_eq!(harness.drain(0), vec![Down(0.0), Up(0.0), Down(0.0)]);
    assert!(harness.receptors[0].is_held());
}

#[test]
fn holds_joined_by_a_warp_stay_held() {
    // Rows 96 to 144 all play at one second.
    let timing = TempoMap::builder(48)
        .bpm(0, 120.0)
        .warp(96, 48)
        .build()
        .unwrap();
    let mut chart = Chart::new(1, timing);
    chart.add_hold(48, 0, 96).unwrap();
    chart.add_hold(120, 0, 240).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.0);
    harness.tick(0.75);
    harness.tick(1.25);
    assert_eq!(harness.drain(0), vec![Down(0.25), Up(0.25), Down(0.25)]);
    assert!(harness.receptors[0].is_held());
}

#[test]
fn starting_inside_a_hold_presses_once() {
    let mut chart = constant_chart(2);
    chart.add_hold(0, 0, 192).unwrap();
    chart.add_tap(144, 1).unwrap();
    let mut harness = harness(chart);

    harness.tick(1.0);
    assert_eq!(harness.drain(0), vec![Down(0.0)]);
    assert!(harness.receptors[0].is_held());
    assert_eq!(harness.drain(1), vec![]);

    harness.tick(1.5);
    assert_eq!(harness.drain(0), vec![]);
    assert_eq!(harness.drain(1), vec![Down(0.0), Up(0.0)]);
    assert!(harness.receptors[0].is_held());
}

#[test]
fn end_of_chart_releases_the_last_hold() {
    let mut chart = constant_chart(1);
    chart.add_hold(0, 0, 96).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.5);
    harness.tick(1.2);
    let signals = harness.drain(0);
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0], Down(0.0));
    let Up(time_delta) = signals[1] else {
        panic!("expected a release, got {:?}", signals[1]);
    };
    crate::common::assert_time_close(0.2, time_delta, "release delta");
    assert!(!harness.receptors[0].is_held());
}

#[test]
fn stop_cancels_every_lane_and_restarts_cleanly() {
    let mut chart = constant_chart(3);
    chart.add_hold(0, 0, 192).unwrap();
    chart.add_tap(48, 1).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.5);
    assert!(harness.receptors[0].is_held());
    harness.autoplay.stop(&mut harness.receptors);

    for lane in 0..3 {
        let cancels = harness
            .drain(lane)
            .into_iter()
            .filter(|signal| *signal == Cancel)
            .count();
        assert_eq!(cancels, 1, "lane {lane}");
        assert!(!harness.receptors[lane].is_held());
    }
    assert!(harness.autoplay.lanes().iter().all(LaneState::is_unset));

    // Playback restarts inside the hold: it is pressed again, nothing else fires.
    harness.tick(1.0);
    assert_eq!(harness.drain(0), vec![Down(0.0)]);
    assert_eq!(harness.drain(1), vec![]);
}

#[test]
fn tap_and_hold_on_one_row_in_different_lanes() {
    let mut chart = constant_chart(2);
    chart.add_tap(48, 0).unwrap();
    chart.add_hold(48, 1, 96).unwrap();
    let mut harness = harness(chart);

    harness.tick(0.0);
    harness.tick(0.5);
    assert_eq!(harness.drain(0), vec![Down(0.0), Up(0.0)]);
    assert_eq!(harness.drain(1), vec![Down(0.0)]);
    harness.tick(1.0);
    assert_eq!(harness.drain(0), vec![]);
    assert_eq!(harness.drain(1), vec![Up(0.0)]);
}

#[test]
fn mines_and_fakes_are_not_played() {
    let mut chart = constant_chart(2);
    chart.add_mine(48, 0).unwrap();
    chart.add_fake(48, 1).unwrap();
    let mut harness = harness(chart);
    harness.tick(0.0);
    harness.tick(1.0);
    assert_eq!(harness.drain(0), vec![]);
    assert_eq!(harness.drain(1), vec![]);
}
