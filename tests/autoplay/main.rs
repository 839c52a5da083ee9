//! Tests for `stepchart::autoplay`.

#[path = "../common/mod.rs"]
mod common;

mod scenarios;
mod strategies;

use stepchart::prelude::*;

/// Drives an [`AutoPlayer`] over a chart through a [`PositionTracker`], one tick per call.
struct Harness {
    chart: Chart,
    tracker: PositionTracker,
    autoplay: AutoPlayer,
    receptors: Vec<RecordingReceptor>,
}

impl Harness {
    fn new(chart: Chart, config: AutoPlayConfig) -> Self {
        let receptors = vec![RecordingReceptor::new(); chart.num_lanes()];
        Self {
            chart,
            tracker: PositionTracker::new(InterpolationConfig::default()),
            autoplay: AutoPlayer::new(config),
            receptors,
        }
    }

    fn tick(&mut self, chart_time: f64) {
        self.tracker.set_chart_time(chart_time, &self.chart);
        self.autoplay
            .update(&self.chart, self.tracker.position(), &mut self.receptors);
    }

    fn drain(&mut self, lane: usize) -> Vec<ReceptorSignal> {
        self.receptors[lane].drain().collect()
    }
}
