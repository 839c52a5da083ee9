//! Row and time conversion.
//!
//! A [`TimingSource`] converts between chart rows and chart time in seconds. [`TempoMap`] is a
//! piecewise-linear implementation built from BPM changes, stops and warps:
//!
//! - A BPM change sets the number of seconds per beat from its row on.
//! - A stop spends time without advancing rows. An event on a stop row happens on arrival,
//!   before the stop elapses.
//! - A warp skips a range of rows in zero time, so every row inside it shares one time.

use thiserror::Error;

/// Rows per beat used when a chart does not state otherwise.
pub const DEFAULT_ROWS_PER_BEAT: i64 = 48;

/// Conversion between chart rows and chart time.
///
/// Both conversions return `None` while the source has no timing data.
pub trait TimingSource {
    /// Chart time in seconds at `row`.
    fn row_to_time(&self, row: f64) -> Option<f64>;

    /// Row at chart time `time`. Where several rows share the time, the least row is returned.
    fn time_to_row(&self, time: f64) -> Option<f64>;
}

impl<T: TimingSource + ?Sized> TimingSource for &T {
    fn row_to_time(&self, row: f64) -> Option<f64> {
        (**self).row_to_time(row)
    }

    fn time_to_row(&self, time: f64) -> Option<f64> {
        (**self).time_to_row(time)
    }
}

/// An error occurred when building a [`TempoMap`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    /// Rows per beat must be positive.
    #[error("rows per beat must be positive")]
    ZeroRowsPerBeat,
    /// A BPM change with zero, negative or non-finite tempo.
    #[error("BPM change at row {row} has non-positive tempo {bpm}")]
    NonPositiveBpm {
        /// Row of the change.
        row: i64,
        /// Offending tempo.
        bpm: f64,
    },
    /// A stop with negative or non-finite duration.
    #[error("stop at row {row} has negative duration {seconds}s")]
    NegativeStop {
        /// Row of the stop.
        row: i64,
        /// Offending duration.
        seconds: f64,
    },
    /// A warp with negative length.
    #[error("warp at row {row} has negative length {rows}")]
    NegativeWarp {
        /// Row of the warp.
        row: i64,
        /// Offending length in rows.
        rows: i64,
    },
    /// A timing change placed before row 0.
    #[error("timing change at negative row {row}")]
    NegativeRow {
        /// Offending row.
        row: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimingChange {
    Bpm { row: i64, bpm: f64 },
    Stop { row: i64, seconds: f64 },
    Warp { row: i64, rows: i64 },
}

impl TimingChange {
    const fn row(&self) -> i64 {
        match *self {
            Self::Bpm { row, .. } | Self::Stop { row, .. } | Self::Warp { row, .. } => row,
        }
    }

    // Changes sharing a row apply in this order.
    const fn priority(&self) -> u8 {
        match self {
            Self::Bpm { .. } => 0,
            Self::Stop { .. } => 1,
            Self::Warp { .. } => 2,
        }
    }
}

/// A linear piece of the row to time mapping, valid from `row` up to the next segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    row: f64,
    time: f64,
    seconds_per_beat: f64,
}

/// Builder of [`TempoMap`].
#[derive(Debug, Clone)]
pub struct TempoMapBuilder {
    rows_per_beat: i64,
    changes: Vec<TimingChange>,
}

impl TempoMapBuilder {
    /// Set the tempo to `bpm` from `row` on. The earliest BPM change also governs the rows
    /// before it.
    #[must_use]
    pub fn bpm(mut self, row: i64, bpm: f64) -> Self {
        self.changes.push(TimingChange::Bpm { row, bpm });
        self
    }

    /// Stop for `seconds` at `row`.
    #[must_use]
    pub fn stop(mut self, row: i64, seconds: f64) -> Self {
        self.changes.push(TimingChange::Stop { row, seconds });
        self
    }

    /// Skip `rows` rows starting at `row` in zero time.
    #[must_use]
    pub fn warp(mut self, row: i64, rows: i64) -> Self {
        self.changes.push(TimingChange::Warp { row, rows });
        self
    }

    /// Validate the changes and build the map.
    ///
    /// A builder without any BPM change produces a map without timing data, whose conversions
    /// return `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError`] if rows per beat is not positive, or a change is placed before
    /// row 0, or a change carries an invalid value.
    pub fn build(mut self) -> Result<TempoMap, TimingError> {
        if self.rows_per_beat <= 0 {
            return Err(TimingError::ZeroRowsPerBeat);
        }
        for change in &self.changes {
            match *change {
                _ if change.row() < 0 => {
                    return Err(TimingError::NegativeRow { row: change.row() });
                }
                TimingChange::Bpm { row, bpm } if !(bpm.is_finite() && bpm > 0.0) => {
                    return Err(TimingError::NonPositiveBpm { row, bpm });
                }
                TimingChange::Stop { row, seconds } if !(seconds.is_finite() && seconds >= 0.0) => {
                    return Err(TimingError::NegativeStop { row, seconds });
                }
                TimingChange::Warp { row, rows } if rows < 0 => {
                    return Err(TimingError::NegativeWarp { row, rows });
                }
                _ => {}
            }
        }
        self.changes
            .sort_by_key(|change| (change.row(), change.priority()));

        let Some(initial_bpm) = self.changes.iter().find_map(|change| match *change {
            TimingChange::Bpm { bpm, .. } => Some(bpm),
            _ => None,
        }) else {
            return Ok(TempoMap {
                rows_per_beat: self.rows_per_beat,
                segments: Vec::new(),
            });
        };

        let mut walker = SegmentWalker::new(self.rows_per_beat as f64, 60.0 / initial_bpm);
        for change in &self.changes {
            walker.advance_to(change.row() as f64);
            match *change {
                TimingChange::Bpm { bpm, .. } => walker.set_tempo(60.0 / bpm),
                TimingChange::Stop { seconds, .. } => walker.stop(seconds),
                TimingChange::Warp { row, rows } => walker.warp((row + rows) as f64),
            }
        }
        walker.finish();

        Ok(TempoMap {
            rows_per_beat: self.rows_per_beat,
            segments: walker.segments,
        })
    }
}

/// Accumulates segments while walking the timing changes in row order.
struct SegmentWalker {
    rows_per_beat: f64,
    row: f64,
    time: f64,
    tempo: f64,
    warp_until: Option<f64>,
    segments: Vec<Segment>,
}

impl SegmentWalker {
    fn new(rows_per_beat: f64, tempo: f64) -> Self {
        Self {
            rows_per_beat,
            row: 0.0,
            time: 0.0,
            tempo,
            warp_until: None,
            segments: vec![Segment {
                row: 0.0,
                time: 0.0,
                seconds_per_beat: tempo,
            }],
        }
    }

    fn effective_tempo(&self) -> f64 {
        if self.warp_until.is_some() {
            0.0
        } else {
            self.tempo
        }
    }

    fn push(&mut self) {
        self.segments.push(Segment {
            row: self.row,
            time: self.time,
            seconds_per_beat: self.effective_tempo(),
        });
    }

    fn advance_to(&mut self, row: f64) {
        if let Some(warp_end) = self.warp_until
            && warp_end <= row
        {
            self.row = warp_end;
            self.warp_until = None;
            self.push();
        }
        self.time += (row - self.row) / self.rows_per_beat * self.effective_tempo();
        self.row = row;
    }

    fn set_tempo(&mut self, seconds_per_beat: f64) {
        self.tempo = seconds_per_beat;
        self.push();
    }

    fn stop(&mut self, seconds: f64) {
        self.time += seconds;
        self.push();
    }

    fn warp(&mut self, until: f64) {
        if until <= self.row {
            return;
        }
        self.warp_until = Some(self.warp_until.map_or(until, |current| current.max(until)));
        self.push();
    }

    fn finish(&mut self) {
        if let Some(warp_end) = self.warp_until {
            self.advance_to(warp_end);
        }
    }
}

/// Piecewise-linear timing built from BPM changes, stops and warps.
///
/// # Example
///
/// ```
/// use stepchart::chart::timing::{TempoMap, TimingSource};
///
/// let timing = TempoMap::builder(48)
///     .bpm(0, 120.0)
///     .stop(96, 1.0)
///     .build()?;
/// assert_eq!(timing.row_to_time(96.0), Some(1.0));
/// assert_eq!(timing.row_to_time(144.0), Some(2.5));
/// assert_eq!(timing.time_to_row(1.5), Some(96.0));
/// # Ok::<(), stepchart::chart::timing::TimingError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    rows_per_beat: i64,
    segments: Vec<Segment>,
}

impl TempoMap {
    /// Start building a map with the given rows per beat.
    #[must_use]
    pub const fn builder(rows_per_beat: i64) -> TempoMapBuilder {
        TempoMapBuilder {
            rows_per_beat,
            changes: Vec::new(),
        }
    }

    /// A map with a single tempo and [`DEFAULT_ROWS_PER_BEAT`].
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::NonPositiveBpm`] if `bpm` is not a positive finite number.
    pub fn constant(bpm: f64) -> Result<Self, TimingError> {
        Self::builder(DEFAULT_ROWS_PER_BEAT).bpm(0, bpm).build()
    }

    /// A map without timing data.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rows_per_beat: DEFAULT_ROWS_PER_BEAT,
            segments: Vec::new(),
        }
    }

    /// Rows per beat of the map.
    #[must_use]
    pub const fn rows_per_beat(&self) -> i64 {
        self.rows_per_beat
    }

    /// Whether the map has any timing data.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl TimingSource for TempoMap {
    fn row_to_time(&self, row: f64) -> Option<f64> {
        let first = self.segments.first()?;
        let idx = self.segments.partition_point(|segment| segment.row < row);
        let segment = idx
            .checked_sub(1)
            .and_then(|idx| self.segments.get(idx))
            .unwrap_or(first);
        Some(
            segment.time
                + (row - segment.row) / self.rows_per_beat as f64 * segment.seconds_per_beat,
        )
    }

    fn time_to_row(&self, time: f64) -> Option<f64> {
        let first = self.segments.first()?;
        let idx = self.segments.partition_point(|segment| segment.time < time);
        let Some(segment) = idx.checked_sub(1).and_then(|idx| self.segments.get(idx)) else {
            // At or before the origin, extrapolate with the initial tempo.
            return Some(
                first.row
                    + (time - first.time) / first.seconds_per_beat * self.rows_per_beat as f64,
            );
        };
        let next_row = self.segments.get(idx).map(|next| next.row);
        let row = if segment.seconds_per_beat > 0.0 {
            segment.row
                + (time - segment.time) / segment.seconds_per_beat * self.rows_per_beat as f64
        } else {
            next_row.unwrap_or(segment.row)
        };
        Some(next_row.map_or(row, |next_row| row.min(next_row)))
    }
}
