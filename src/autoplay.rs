//! Autoplay: replaying a chart as simulated lane input.
//!
//! [`AutoPlayer`] keeps one [`LaneState`] per lane. Each [`AutoPlayer::update`] resolves the
//! next input of every lane at the playhead and compares it with the previous tick's. When it
//! changed, the input that was tracked has just passed, and the lane's [`Receptor`] is pressed
//! and released to match. Back-to-back holds and taps sharing a row with a hold start are
//! handled so that the receptor's held state always agrees with the chart.

use crate::chart::Chart;
use crate::chart::event::{InputKind, NextInput};
use crate::chart::timing::TimingSource;
use crate::position::Position;
use crate::receptor::Receptor;

pub use crate::chart::next_input::NextInputStrategy;

/// Settings of an [`AutoPlayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoPlayConfig {
    /// How next inputs are resolved.
    pub strategy: NextInputStrategy,
}

impl AutoPlayConfig {
    /// Set the next input strategy.
    #[must_use]
    pub const fn strategy(mut self, strategy: NextInputStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// What autoplay observed in one lane on the previous tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneState {
    next: Option<NextInput>,
    unset: bool,
}

impl Default for LaneState {
    fn default() -> Self {
        Self {
            next: None,
            unset: true,
        }
    }
}

impl LaneState {
    /// The next input seen on the previous tick. `None` past the end of the chart.
    #[must_use]
    pub const fn next(&self) -> Option<NextInput> {
        self.next
    }

    /// Chart time of [`Self::next`].
    #[must_use]
    pub fn next_time(&self) -> Option<f64> {
        self.next.map(|input| input.chart_time)
    }

    /// Whether the lane has not been observed since the start or the last stop.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.unset
    }

    /// Whether `next` differs from the recorded input.
    fn changed_to(&self, next: Option<&NextInput>) -> bool {
        match (self.next.as_ref(), next) {
            (Some(prev), Some(next)) => !prev.same_as(next),
            (None, None) => false,
            _ => true,
        }
    }
}

/// Drives lane receptors from a chart as if a perfect player were playing it.
#[derive(Debug, Clone, Default)]
pub struct AutoPlayer {
    config: AutoPlayConfig,
    lanes: Vec<LaneState>,
}

impl AutoPlayer {
    /// Create an autoplayer with every lane unset.
    #[must_use]
    pub const fn new(config: AutoPlayConfig) -> Self {
        Self {
            config,
            lanes: Vec::new(),
        }
    }

    /// The settings.
    #[must_use]
    pub const fn config(&self) -> &AutoPlayConfig {
        &self.config
    }

    /// The state of every lane observed so far, indexed by lane.
    #[must_use]
    pub fn lanes(&self) -> &[LaneState] {
        &self.lanes
    }

    /// Advance to `position`, signalling the receptors of the lanes whose next input changed.
    ///
    /// `receptors` is indexed by lane. Does nothing if the chart has no timing.
    ///
    /// Positions are expected to move forward. Before jumping backward, call [`Self::stop`];
    /// otherwise the input tracked before the jump is played again with a negative time delta.
    pub fn update<S, R>(&mut self, chart: &Chart<S>, position: &Position, receptors: &mut [R])
    where
        S: TimingSource,
        R: Receptor,
    {
        let time = position.chart_time;
        if chart.time_to_row(time).is_none() {
            log::warn!("autoplay skipped at {time}: chart timing is unavailable");
            return;
        }
        let num_lanes = chart.num_lanes();
        if self.lanes.len() != num_lanes {
            log::debug!("autoplay lanes resized from {} to {num_lanes}", self.lanes.len());
            self.lanes.resize(num_lanes, LaneState::default());
        }
        if receptors.len() < num_lanes {
            log::warn!(
                "{} receptors for {num_lanes} lanes, extra lanes are not played",
                receptors.len()
            );
        }

        let inputs = chart.next_inputs(time, self.config.strategy);
        for (lane, ((state, receptor), next)) in self
            .lanes
            .iter_mut()
            .zip(receptors.iter_mut())
            .zip(inputs)
            .enumerate()
        {
            if state.changed_to(next.as_ref()) {
                log::trace!("lane {lane}: {:?} -> {next:?} at {time}", state.next);
                transition(state, next, time, receptor);
            }
        }
    }

    /// Reset every lane to unset and cancel every receptor.
    pub fn stop<R: Receptor>(&mut self, receptors: &mut [R]) {
        self.lanes.fill(LaneState::default());
        receptors.iter_mut().for_each(Receptor::cancel);
        log::debug!("autoplay stopped, {} receptors cancelled", receptors.len());
    }
}

/// Signal the inputs which passed between the recorded state and `next`, then record `next`.
fn transition(state: &mut LaneState, next: Option<NextInput>, time: f64, receptor: &mut impl Receptor) {
    let time_delta = match state.next {
        Some(prev) if !state.unset => time - prev.chart_time,
        _ => 0.0,
    };
    let next_is_hold_end = next.is_some_and(|next| next.is_hold_end());

    if next.is_none() && receptor.is_held() {
        receptor.input_up(time_delta);
    } else if let Some(prev) = state.next.filter(|_| !state.unset) {
        match prev.kind {
            InputKind::HoldEnd => {
                if !receptor.is_held() {
                    receptor.input_down(time_delta);
                }
                receptor.input_up(time_delta);
                // The next hold starts where this one ends.
                if next_is_hold_end {
                    receptor.input_down(time_delta);
                }
            }
            InputKind::HoldStart | InputKind::Tap | InputKind::Lift => {
                receptor.input_down(time_delta);
                if !next_is_hold_end {
                    receptor.input_up(time_delta);
                }
            }
        }
    } else if state.unset && next_is_hold_end {
        // Starting inside a hold.
        receptor.input_down(time_delta);
    }

    state.next = next;
    state.unset = false;
}
