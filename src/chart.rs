//! Chart owning the event index.
//!
//! A [`Chart`] stores the events of one playable chart in an [`OrderedIndex`], derives their
//! chart times from a [`TimingSource`], and keeps per-lane hold spans for overlap queries. All
//! structural edits go through the chart, so the index, the hold spans and the id lookup stay in
//! step.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use thiserror::Error;

use crate::index::OrderedIndex;

pub mod event;
pub mod next_input;
pub mod timing;

use self::event::{ChartEvent, EventId, EventIdGenerator, EventKind, HoldSpan};
use self::timing::{TempoMap, TimingSource};

/// An error occurred when editing a [`Chart`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// The event's lane is not one of the chart's lanes.
    #[error("lane {lane} is out of range for a chart with {num_lanes} lanes")]
    LaneOutOfRange {
        /// Offending lane.
        lane: usize,
        /// Number of lanes of the chart.
        num_lanes: usize,
    },
    /// A hold ending before it starts.
    #[error("hold at row {row} ends before it starts, at row {end_row}")]
    HoldEndBeforeStart {
        /// Start row of the hold.
        row: i64,
        /// End row of the hold.
        end_row: i64,
    },
    /// The chart's timing could not place the row.
    #[error("no timing data to place row {row}")]
    Untimed {
        /// Row which could not be placed.
        row: i64,
    },
    /// An equal event already occupies the same slot.
    #[error("an equal event already exists at row {row}")]
    Conflict {
        /// Row of the slot.
        row: i64,
    },
    /// No event has the id.
    #[error("no event with id {0:?}")]
    UnknownEvent(EventId),
}

/// One playable chart: its lanes, timing, offsets and events.
#[derive(Debug, Clone)]
pub struct Chart<S = TempoMap> {
    num_lanes: usize,
    timing: S,
    music_offset: f64,
    sync_offset: f64,
    events: OrderedIndex<ChartEvent>,
    rows: HashMap<EventId, i64>,
    /// Hold spans of each lane, sorted by start row.
    holds: Vec<Vec<HoldSpan>>,
    being_edited: HashSet<EventId>,
    id_gen: EventIdGenerator,
}

impl<S: TimingSource> Chart<S> {
    /// Create an empty chart.
    #[must_use]
    pub fn new(num_lanes: usize, timing: S) -> Self {
        Self {
            num_lanes,
            timing,
            music_offset: 0.0,
            sync_offset: 0.0,
            events: OrderedIndex::new(),
            rows: HashMap::new(),
            holds: vec![Vec::new(); num_lanes],
            being_edited: HashSet::new(),
            id_gen: EventIdGenerator::default(),
        }
    }

    /// Number of input lanes.
    #[must_use]
    pub const fn num_lanes(&self) -> usize {
        self.num_lanes
    }

    /// The timing of the chart.
    #[must_use]
    pub const fn timing(&self) -> &S {
        &self.timing
    }

    /// The event index.
    #[must_use]
    pub const fn events(&self) -> &OrderedIndex<ChartEvent> {
        &self.events
    }

    /// Offset of the music relative to chart time 0, in seconds.
    #[must_use]
    pub const fn music_offset(&self) -> f64 {
        self.music_offset
    }

    /// Set the music offset.
    pub const fn set_music_offset(&mut self, seconds: f64) {
        self.music_offset = seconds;
    }

    /// Audio-to-chart sync offset, in seconds.
    #[must_use]
    pub const fn sync_offset(&self) -> f64 {
        self.sync_offset
    }

    /// Set the sync offset.
    pub const fn set_sync_offset(&mut self, seconds: f64) {
        self.sync_offset = seconds;
    }

    /// Get an event by id.
    #[must_use]
    pub fn event(&self, id: EventId) -> Option<&ChartEvent> {
        let row = *self.rows.get(&id)?;
        self.events
            .find_events_at_row(row)
            .into_iter()
            .find(|event| event.id() == id)
    }

    /// Add an event of `kind` at `row`, deriving its times from the chart's timing.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError`] if the lane does not exist, a hold ends before it starts, the
    /// timing cannot place the rows, or an equal event already exists.
    pub fn add_event(&mut self, row: i64, kind: EventKind) -> Result<EventId, ChartError> {
        if let Some(lane) = kind.lane()
            && lane >= self.num_lanes
        {
            return Err(ChartError::LaneOutOfRange {
                lane,
                num_lanes: self.num_lanes,
            });
        }
        let end_row = match kind {
            EventKind::Hold { end_row, .. } if end_row < row => {
                return Err(ChartError::HoldEndBeforeStart { row, end_row });
            }
            EventKind::Hold { end_row, .. } => end_row,
            _ => row,
        };
        let chart_time = self.place(row)?;
        let end_chart_time = self.place(end_row)?;

        let id = self.id_gen.peek_next();
        let event = ChartEvent::new(id, row, chart_time, end_chart_time, kind);
        let hold = event.hold_span();
        self.events
            .insert(event)
            .map_err(|_| ChartError::Conflict { row })?;
        let id = self.id_gen.next_id();
        self.rows.insert(id, row);
        if let Some(hold) = hold {
            self.insert_hold(hold);
        }
        log::debug!("added event {id:?} at row {row}");
        Ok(id)
    }

    /// Add a tap note.
    ///
    /// # Errors
    ///
    /// See [`Self::add_event`].
    pub fn add_tap(&mut self, row: i64, lane: usize) -> Result<EventId, ChartError> {
        self.add_event(row, EventKind::Tap { lane })
    }

    /// Add a hold note from `row` to `end_row`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_event`].
    pub fn add_hold(&mut self, row: i64, lane: usize, end_row: i64) -> Result<EventId, ChartError> {
        self.add_event(
            row,
            EventKind::Hold {
                lane,
                end_row,
                roll: false,
            },
        )
    }

    /// Add a lift note.
    ///
    /// # Errors
    ///
    /// See [`Self::add_event`].
    pub fn add_lift(&mut self, row: i64, lane: usize) -> Result<EventId, ChartError> {
        self.add_event(row, EventKind::Lift { lane })
    }

    /// Add a mine.
    ///
    /// # Errors
    ///
    /// See [`Self::add_event`].
    pub fn add_mine(&mut self, row: i64, lane: usize) -> Result<EventId, ChartError> {
        self.add_event(row, EventKind::Mine { lane })
    }

    /// Add a fake note.
    ///
    /// # Errors
    ///
    /// See [`Self::add_event`].
    pub fn add_fake(&mut self, row: i64, lane: usize) -> Result<EventId, ChartError> {
        self.add_event(row, EventKind::Fake { lane })
    }

    /// Add a marker without a lane.
    ///
    /// # Errors
    ///
    /// See [`Self::add_event`].
    pub fn add_marker(&mut self, row: i64, label: impl Into<String>) -> Result<EventId, ChartError> {
        self.add_event(
            row,
            EventKind::Marker {
                label: label.into(),
            },
        )
    }

    /// Remove an event by id, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::UnknownEvent`] if no event has the id.
    pub fn remove_event(&mut self, id: EventId) -> Result<ChartEvent, ChartError> {
        let probe = self.event(id).cloned().ok_or(ChartError::UnknownEvent(id))?;
        let removed = self
            .events
            .remove(&probe)
            .ok_or(ChartError::UnknownEvent(id))?;
        self.rows.remove(&id);
        self.being_edited.remove(&id);
        if let Some(lane) = removed.hold_span().map(|hold| hold.lane)
            && let Some(spans) = self.holds.get_mut(lane)
        {
            spans.retain(|span| span.id != id);
        }
        log::debug!("removed event {id:?} at row {}", removed.row());
        Ok(removed)
    }

    /// Replace the timing and re-derive the chart time of every event.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Untimed`] and keeps the old timing if the new one cannot place
    /// some event.
    pub fn set_timing(&mut self, timing: S) -> Result<(), ChartError> {
        let mut times = Vec::with_capacity(self.events.len());
        for event in self.events.iter() {
            let place = |row: i64| {
                timing
                    .row_to_time(row as f64)
                    .ok_or(ChartError::Untimed { row })
            };
            times.push((place(event.row())?, place(event.end_row())?));
        }

        self.timing = timing;
        let mut times = times.into_iter();
        self.events.for_each_mut(|event| {
            if let Some((chart_time, end_chart_time)) = times.next() {
                event.set_times(chart_time, end_chart_time);
            }
        });
        self.rebuild_holds();
        log::debug!("retimed {} events", self.events.len());
        Ok(())
    }

    /// Mark or unmark an event as being edited. Returns false if no event has the id.
    pub fn set_being_edited(&mut self, id: EventId, being_edited: bool) -> bool {
        if !self.rows.contains_key(&id) {
            return false;
        }
        if being_edited {
            self.being_edited.insert(id);
        } else {
            self.being_edited.remove(&id);
        }
        true
    }

    /// Whether an event is marked as being edited.
    #[must_use]
    pub fn is_being_edited(&self, id: EventId) -> bool {
        self.being_edited.contains(&id)
    }

    /// Find the note of `lane` at `row`, or a hold of `lane` covering `row`.
    ///
    /// With `ignore_being_edited`, events marked as being edited are treated as absent.
    #[must_use]
    pub fn find_note_at(&self, row: i64, lane: usize, ignore_being_edited: bool) -> Option<&ChartEvent> {
        self.events.find_note_at(row, lane, |event| {
            ignore_being_edited && self.being_edited.contains(&event.id())
        })
    }

    /// The hold active at `time` in each lane, indexed by lane.
    #[must_use]
    pub fn holds_overlapping_time(&self, time: f64) -> Vec<Option<HoldSpan>> {
        (0..self.num_lanes)
            .map(|lane| self.active_hold(lane, time))
            .collect()
    }

    /// The hold of `lane` active at `time`.
    ///
    /// A hold is active from its start time inclusive to its end time exclusive. If holds of one
    /// lane overlap, the one starting last is reported.
    #[must_use]
    pub fn active_hold(&self, lane: usize, time: f64) -> Option<HoldSpan> {
        let spans = self.holds.get(lane)?;
        let started = spans.partition_point(|span| span.start_time <= time);
        started
            .checked_sub(1)
            .and_then(|idx| spans.get(idx))
            .filter(|span| span.is_active_at(time))
            .copied()
    }

    fn place(&self, row: i64) -> Result<f64, ChartError> {
        self.timing
            .row_to_time(row as f64)
            .ok_or(ChartError::Untimed { row })
    }

    fn insert_hold(&mut self, hold: HoldSpan) {
        if let Some(spans) = self.holds.get_mut(hold.lane) {
            let idx = spans.partition_point(|span| span.start_row < hold.start_row);
            spans.insert(idx, hold);
        }
    }

    fn rebuild_holds(&mut self) {
        let mut holds = vec![Vec::new(); self.num_lanes];
        for span in self
            .events
            .iter()
            .filter_map(ChartEvent::hold_span)
            .sorted_by_key(|span| (span.lane, span.start_row))
        {
            if let Some(spans) = holds.get_mut(span.lane) {
                spans.push(span);
            }
        }
        self.holds = holds;
    }
}

impl<S: TimingSource> TimingSource for Chart<S> {
    fn row_to_time(&self, row: f64) -> Option<f64> {
        self.timing.row_to_time(row)
    }

    fn time_to_row(&self, time: f64) -> Option<f64> {
        self.timing.time_to_row(time)
    }
}
