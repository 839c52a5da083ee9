//! Playhead position in three synchronized coordinates.
//!
//! - Song time: seconds from the start of the audio.
//! - Chart time: seconds from chart time zero, `song_time + music_offset - sync_offset`.
//! - Chart position: fractional row at the chart time.
//!
//! [`PositionTracker`] keeps the three consistent: setting one recomputes the others from a
//! [`ChartClock`] before the observer is notified. Jumps can be animated with the
//! interpolation methods, which blend linearly toward a target over
//! [`InterpolationConfig::duration`].

use gametime::{TimeSpan, TimeStamp};

use crate::chart::Chart;
use crate::chart::timing::TimingSource;
use crate::util::approx_eq;

/// The offsets and row/time conversion a [`PositionTracker`] derives coordinates from.
pub trait ChartClock: TimingSource {
    /// Offset of the music relative to chart time 0, in seconds.
    fn music_offset(&self) -> f64;

    /// Audio-to-chart sync offset, in seconds.
    fn sync_offset(&self) -> f64;

    /// Chart time at `song_time`.
    fn chart_time_at(&self, song_time: f64) -> f64 {
        song_time + self.music_offset() - self.sync_offset()
    }

    /// Song time at `chart_time`.
    fn song_time_at(&self, chart_time: f64) -> f64 {
        chart_time - self.music_offset() + self.sync_offset()
    }
}

impl<S: TimingSource> ChartClock for Chart<S> {
    fn music_offset(&self) -> f64 {
        Chart::music_offset(self)
    }

    fn sync_offset(&self) -> f64 {
        Chart::sync_offset(self)
    }
}

/// One instant in the three coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Seconds from the start of the audio.
    pub song_time: f64,
    /// Seconds from chart time zero.
    pub chart_time: f64,
    /// Fractional row.
    pub chart_position: f64,
}

impl Position {
    /// Derive the position at `song_time`. Returns `None` if the clock has no timing.
    #[must_use]
    pub fn from_song_time(song_time: f64, clock: &impl ChartClock) -> Option<Self> {
        Self::from_chart_time(clock.chart_time_at(song_time), clock).map(|position| Self {
            song_time,
            ..position
        })
    }

    /// Derive the position at `chart_time`. Returns `None` if the clock has no timing.
    #[must_use]
    pub fn from_chart_time(chart_time: f64, clock: &impl ChartClock) -> Option<Self> {
        Some(Self {
            song_time: clock.song_time_at(chart_time),
            chart_time,
            chart_position: clock.time_to_row(chart_time)?,
        })
    }

    /// Derive the position at `chart_position`. Returns `None` if the clock has no timing.
    #[must_use]
    pub fn from_chart_position(chart_position: f64, clock: &impl ChartClock) -> Option<Self> {
        let chart_time = clock.row_to_time(chart_position)?;
        Some(Self {
            song_time: clock.song_time_at(chart_time),
            chart_time,
            chart_position,
        })
    }
}

/// Receives every change of a [`PositionTracker`]'s position.
pub trait PositionObserver {
    /// Called once per change, after all three coordinates are consistent.
    fn position_changed(&mut self, position: &Position);
}

impl<F: FnMut(&Position)> PositionObserver for F {
    fn position_changed(&mut self, position: &Position) {
        self(position);
    }
}

/// An observer ignoring every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl PositionObserver for NoObserver {
    fn position_changed(&mut self, _: &Position) {}
}

/// Settings of [`PositionTracker`] interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationConfig {
    /// How long an interpolation takes to reach its target.
    pub duration: TimeSpan,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            duration: TimeSpan::MILLISECOND * 100,
        }
    }
}

impl InterpolationConfig {
    /// Set the interpolation duration.
    #[must_use]
    pub const fn duration(mut self, duration: TimeSpan) -> Self {
        self.duration = duration;
        self
    }
}

/// One interpolation track: where it started, where it goes, and since when.
#[derive(Debug, Clone, Copy, Default)]
struct Track {
    desired: f64,
    from: f64,
    started_at: Option<TimeStamp>,
}

impl Track {
    const fn anchor(&mut self, value: f64) {
        self.desired = value;
        self.from = value;
        self.started_at = None;
    }

    fn is_moving(&self, current: f64) -> bool {
        !approx_eq(current, self.desired)
    }

    fn begin(&mut self, now: TimeStamp, current: f64, delta: f64) {
        self.from = current;
        self.desired += delta;
        self.started_at = Some(now);
    }

    /// Value at `now`, and whether the target is reached.
    fn sample(&mut self, now: TimeStamp, current: f64, duration: TimeSpan) -> (f64, bool) {
        let started_at = match self.started_at {
            Some(started_at) => started_at,
            None => {
                self.from = current;
                self.started_at = Some(now);
                now
            }
        };
        let total = duration.as_secs_f64();
        let progress = if total > 0.0 {
            ((now - started_at).as_secs_f64() / total).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            (self.desired, true)
        } else {
            (self.from + (self.desired - self.from) * progress, false)
        }
    }
}

/// Tracks a playhead in song time, chart time and chart position.
///
/// The tracker starts at the origin of all three coordinates. After any setter the three are
/// consistent for the clock passed to it; if the clock's offsets or timing change afterwards,
/// call [`Self::refresh`].
#[derive(Debug, Clone)]
pub struct PositionTracker<O = NoObserver> {
    position: Position,
    config: InterpolationConfig,
    song_time: Track,
    chart_position: Track,
    observer: O,
}

impl PositionTracker<NoObserver> {
    /// Create a tracker without an observer.
    #[must_use]
    pub fn new(config: InterpolationConfig) -> Self {
        Self::with_observer(config, NoObserver)
    }
}

impl<O: PositionObserver> PositionTracker<O> {
    /// Create a tracker notifying `observer` on every change.
    #[must_use]
    pub fn with_observer(config: InterpolationConfig, observer: O) -> Self {
        Self {
            position: Position::default(),
            config,
            song_time: Track::default(),
            chart_position: Track::default(),
            observer,
        }
    }

    /// The current position.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Current song time.
    #[must_use]
    pub const fn song_time(&self) -> f64 {
        self.position.song_time
    }

    /// Current chart time.
    #[must_use]
    pub const fn chart_time(&self) -> f64 {
        self.position.chart_time
    }

    /// Current chart position.
    #[must_use]
    pub const fn chart_position(&self) -> f64 {
        self.position.chart_position
    }

    /// Target song time of the interpolation.
    #[must_use]
    pub const fn desired_song_time(&self) -> f64 {
        self.song_time.desired
    }

    /// Target chart position of the interpolation.
    #[must_use]
    pub const fn desired_chart_position(&self) -> f64 {
        self.chart_position.desired
    }

    /// The interpolation settings.
    #[must_use]
    pub const fn config(&self) -> &InterpolationConfig {
        &self.config
    }

    /// The observer.
    #[must_use]
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Take the observer out of the tracker.
    #[must_use]
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// The chart position rounded to the nearest row, halves rounding up.
    #[must_use]
    pub fn nearest_row(&self) -> i64 {
        (self.position.chart_position + 0.5).floor() as i64
    }

    /// Jump to `song_time`, stopping any interpolation. Does nothing if `clock` has no timing.
    pub fn set_song_time(&mut self, song_time: f64, clock: &impl ChartClock) {
        if self.apply(Position::from_song_time(song_time, clock)) {
            self.anchor_both();
        }
    }

    /// Jump to `chart_time`, stopping any interpolation. Does nothing if `clock` has no timing.
    pub fn set_chart_time(&mut self, chart_time: f64, clock: &impl ChartClock) {
        if self.apply(Position::from_chart_time(chart_time, clock)) {
            self.anchor_both();
        }
    }

    /// Jump to `chart_position`, stopping any interpolation. Does nothing if `clock` has no
    /// timing.
    pub fn set_chart_position(&mut self, chart_position: f64, clock: &impl ChartClock) {
        if self.apply(Position::from_chart_position(chart_position, clock)) {
            self.anchor_both();
        }
    }

    /// Re-derive chart time and chart position from the song time, after the clock changed.
    pub fn refresh(&mut self, clock: &impl ChartClock) {
        self.set_song_time(self.position.song_time, clock);
    }

    /// Start moving the song time by `delta` seconds from its current target.
    pub fn begin_song_time_interpolation(&mut self, now: TimeStamp, delta: f64) {
        self.song_time.begin(now, self.position.song_time, delta);
    }

    /// Advance the song time interpolation to `now`.
    pub fn update_song_time_interpolation(&mut self, now: TimeStamp, clock: &impl ChartClock) {
        if !self.is_interpolating_song_time() {
            return;
        }
        let (song_time, done) =
            self.song_time
                .sample(now, self.position.song_time, self.config.duration);
        if self.apply(Position::from_song_time(song_time, clock)) {
            self.chart_position.anchor(self.position.chart_position);
            if done {
                self.song_time.anchor(song_time);
            }
        }
    }

    /// Start moving the chart position by `delta` rows from its current target.
    pub fn begin_chart_position_interpolation(&mut self, now: TimeStamp, delta: f64) {
        self.chart_position
            .begin(now, self.position.chart_position, delta);
    }

    /// Advance the chart position interpolation to `now`.
    pub fn update_chart_position_interpolation(&mut self, now: TimeStamp, clock: &impl ChartClock) {
        if !self.is_interpolating_chart_position() {
            return;
        }
        let (chart_position, done) = self.chart_position.sample(
            now,
            self.position.chart_position,
            self.config.duration,
        );
        if self.apply(Position::from_chart_position(chart_position, clock)) {
            self.song_time.anchor(self.position.song_time);
            if done {
                self.chart_position.anchor(chart_position);
            }
        }
    }

    /// Jump to the interpolation targets.
    ///
    /// If both tracks are moving, the chart position target is applied last and wins.
    pub fn finish_interpolating(&mut self, clock: &impl ChartClock) {
        // Applying one target moves the other coordinate away from its own stale target.
        let song_time_moving = self.is_interpolating_song_time();
        let chart_position_moving = self.is_interpolating_chart_position();
        if song_time_moving {
            self.apply(Position::from_song_time(self.song_time.desired, clock));
        }
        if chart_position_moving {
            self.apply(Position::from_chart_position(
                self.chart_position.desired,
                clock,
            ));
        }
        self.anchor_both();
    }

    /// Drop the interpolation targets, staying where the tracker is.
    pub const fn cancel_interpolating(&mut self) {
        self.anchor_both();
    }

    /// Whether the song time is away from its target.
    #[must_use]
    pub fn is_interpolating_song_time(&self) -> bool {
        self.song_time.is_moving(self.position.song_time)
    }

    /// Whether the chart position is away from its target.
    #[must_use]
    pub fn is_interpolating_chart_position(&self) -> bool {
        self.chart_position.is_moving(self.position.chart_position)
    }

    fn apply(&mut self, position: Option<Position>) -> bool {
        let Some(position) = position else {
            log::warn!("position left unchanged: chart timing is unavailable");
            return false;
        };
        self.position = position;
        log::trace!("position changed to {position:?}");
        self.observer.position_changed(&self.position);
        true
    }

    const fn anchor_both(&mut self) {
        self.song_time.anchor(self.position.song_time);
        self.chart_position.anchor(self.position.chart_position);
    }
}
