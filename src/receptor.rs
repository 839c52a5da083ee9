//! Receptors: the per-lane sinks of simulated input.

use std::collections::VecDeque;

/// A lane's input target.
///
/// Autoplay drives one receptor per lane. `time_delta` is how far, in seconds of chart time, the
/// input lies in the past relative to the tick that reports it, so the receptor can place it at
/// its true moment.
pub trait Receptor {
    /// Press the lane.
    fn input_down(&mut self, time_delta: f64);

    /// Release the lane.
    fn input_up(&mut self, time_delta: f64);

    /// Drop any in-progress input without judging it.
    fn cancel(&mut self);

    /// Whether the lane is currently pressed.
    fn is_held(&self) -> bool;
}

impl<R: Receptor + ?Sized> Receptor for &mut R {
    fn input_down(&mut self, time_delta: f64) {
        (**self).input_down(time_delta);
    }

    fn input_up(&mut self, time_delta: f64) {
        (**self).input_up(time_delta);
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }

    fn is_held(&self) -> bool {
        (**self).is_held()
    }
}

/// A signal received by a [`RecordingReceptor`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReceptorSignal {
    /// [`Receptor::input_down`] with its time delta.
    Down(f64),
    /// [`Receptor::input_up`] with its time delta.
    Up(f64),
    /// [`Receptor::cancel`].
    Cancel,
}

/// A receptor which tracks its held state and queues every signal it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingReceptor {
    held: bool,
    signals: VecDeque<ReceptorSignal>,
}

impl RecordingReceptor {
    /// Create a released receptor with no signals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals received so far, oldest first.
    pub fn signals(&self) -> impl Iterator<Item = &ReceptorSignal> {
        self.signals.iter()
    }

    /// Take out the queued signals, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = ReceptorSignal> + '_ {
        self.signals.drain(..)
    }
}

impl Receptor for RecordingReceptor {
    fn input_down(&mut self, time_delta: f64) {
        self.held = true;
        self.signals.push_back(ReceptorSignal::Down(time_delta));
    }

    fn input_up(&mut self, time_delta: f64) {
        self.held = false;
        self.signals.push_back(ReceptorSignal::Up(time_delta));
    }

    fn cancel(&mut self) {
        self.held = false;
        self.signals.push_back(ReceptorSignal::Cancel);
    }

    fn is_held(&self) -> bool {
        self.held
    }
}
