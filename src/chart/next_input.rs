//! Per-lane resolution of the next expected input.
//!
//! For each lane the next input at a chart time is the end of the hold active at that time, or
//! else the first steppable event strictly after it. Two strategies compute the same answer:
//! [`NextInputStrategy::TimeScan`] walks the index once from the time boundary and fills every
//! lane, and [`NextInputStrategy::PerLane`] scans each lane separately from the matching row.

use super::Chart;
use super::event::NextInput;
use super::timing::TimingSource;

/// How a [`Chart`] resolves the next inputs of its lanes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NextInputStrategy {
    /// One forward walk over the index from the first event after the time.
    #[default]
    TimeScan,
    /// An independent scan per lane starting from the row at the time.
    PerLane,
}

impl<S: TimingSource> Chart<S> {
    /// The next input of every lane at `time`, indexed by lane.
    #[must_use]
    pub fn next_inputs(&self, time: f64, strategy: NextInputStrategy) -> Vec<Option<NextInput>> {
        match strategy {
            NextInputStrategy::TimeScan => self.next_inputs_by_time_scan(time),
            NextInputStrategy::PerLane => (0..self.num_lanes)
                .map(|lane| self.next_input_in_lane(lane, time))
                .collect(),
        }
    }

    /// The next input of every lane at `time`, filled by a single walk from the time boundary.
    #[must_use]
    pub fn next_inputs_by_time_scan(&self, time: f64) -> Vec<Option<NextInput>> {
        let mut inputs: Vec<_> = self
            .holds_overlapping_time(time)
            .into_iter()
            .map(|hold| hold.map(|hold| hold.resolve(time)))
            .collect();
        let mut unresolved = inputs.iter().filter(|input| input.is_none()).count();
        if unresolved == 0 {
            return inputs;
        }
        let Some(cursor) = self.events.find_first_after_chart_time(time, &self.timing) else {
            return inputs;
        };
        for event in cursor {
            let (Some(lane), Some(input)) = (event.lane(), event.next_input()) else {
                continue;
            };
            if let Some(slot) = inputs.get_mut(lane)
                && slot.is_none()
            {
                *slot = Some(input);
                unresolved -= 1;
                if unresolved == 0 {
                    break;
                }
            }
        }
        inputs
    }

    /// The next input of one lane at `time`.
    ///
    /// The lane is scanned from the row at `time`, so this costs no more than the distance to
    /// the lane's next steppable event.
    #[must_use]
    pub fn next_input_in_lane(&self, lane: usize, time: f64) -> Option<NextInput> {
        if let Some(hold) = self.active_hold(lane, time) {
            return Some(hold.resolve(time));
        }
        let row = self.timing.time_to_row(time)?;
        // Start one whole row early: the row may land a hair past an event exactly at `time`.
        let cursor = self.events.find_best_by_position(row.floor())?;
        cursor
            .filter(|event| event.lane() == Some(lane) && event.chart_time() > time)
            .find_map(|event| event.next_input())
    }
}
