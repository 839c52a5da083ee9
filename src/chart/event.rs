//! Chart event model.
//!
//! A hold is stored as a single [`ChartEvent`] at its start row carrying its end row, rather than
//! as two events pointing at each other. The end of a hold is exposed through [`HoldSpan`] and
//! [`InputKind::HoldEnd`] when input simulation needs it.

use std::cmp::Ordering;

use crate::index::IndexedEvent;

/// Identity of an event, unique within its chart and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(usize);

impl EventId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

/// Hands out increasing [`EventId`]s.
#[derive(Debug, Clone, Default)]
pub struct EventIdGenerator {
    next: usize,
}

impl EventIdGenerator {
    /// Start handing out ids at `start`.
    #[must_use]
    pub const fn new(start: usize) -> Self {
        Self { next: start }
    }

    /// Consume the next id.
    pub const fn next_id(&mut self) -> EventId {
        let id = self.peek_next();
        self.next += 1;
        id
    }

    /// The id [`Self::next_id`] returns next, without consuming it.
    #[must_use]
    pub const fn peek_next(&self) -> EventId {
        EventId(self.next)
    }
}

/// What an event is, together with the payload specific to that kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A note to be pressed once.
    Tap {
        /// Lane of the note.
        lane: usize,
    },
    /// A note to be pressed at its row and held until `end_row`.
    Hold {
        /// Lane of the note.
        lane: usize,
        /// Row where the hold is released. Never less than the start row.
        end_row: i64,
        /// Whether the hold is a roll (must be tapped repeatedly while active).
        roll: bool,
    },
    /// A note to be released at its row.
    Lift {
        /// Lane of the note.
        lane: usize,
    },
    /// A note that must not be pressed.
    Mine {
        /// Lane of the note.
        lane: usize,
    },
    /// A note shown to the player but never judged.
    Fake {
        /// Lane of the note.
        lane: usize,
    },
    /// A structural event without a lane, such as a pattern label.
    Marker {
        /// Text attached to the marker.
        label: String,
    },
}

impl EventKind {
    /// Lane of the event, or `None` for events which are not playable.
    #[must_use]
    pub const fn lane(&self) -> Option<usize> {
        match self {
            Self::Tap { lane }
            | Self::Hold { lane, .. }
            | Self::Lift { lane }
            | Self::Mine { lane }
            | Self::Fake { lane } => Some(*lane),
            Self::Marker { .. } => None,
        }
    }

    /// Whether this is a fake note.
    #[must_use]
    pub const fn is_fake(&self) -> bool {
        matches!(self, Self::Fake { .. })
    }

    /// The input a player performs at the start of this event, if any.
    ///
    /// Mines, fakes and markers do not take part in input simulation.
    #[must_use]
    pub const fn input_kind(&self) -> Option<InputKind> {
        match self {
            Self::Tap { .. } => Some(InputKind::Tap),
            Self::Hold { .. } => Some(InputKind::HoldStart),
            Self::Lift { .. } => Some(InputKind::Lift),
            Self::Mine { .. } | Self::Fake { .. } | Self::Marker { .. } => None,
        }
    }

    /// Whether the event takes part in input simulation.
    #[must_use]
    pub const fn is_steppable(&self) -> bool {
        self.input_kind().is_some()
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Tap { .. } => 0,
            Self::Hold { .. } => 1,
            Self::Lift { .. } => 2,
            Self::Mine { .. } => 3,
            Self::Fake { .. } => 4,
            Self::Marker { .. } => 5,
        }
    }

    /// Deterministic order among events sharing one row.
    ///
    /// Lane events come first ordered by lane, then by kind. Markers follow, ordered by label.
    /// Two kinds comparing equal would occupy the same slot of a row.
    #[must_use]
    pub fn tie_break(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Marker { label: a }, Self::Marker { label: b }) => a.cmp(b),
            _ => match (self.lane(), other.lane()) {
                (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.rank().cmp(&other.rank())),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.rank().cmp(&other.rank()),
            },
        }
    }
}

/// An event placed in a chart.
///
/// Row and kind are fixed once the event is created. Chart times are derived from the chart's
/// timing and are refreshed by the owning chart when its timing changes.
///
/// Equality and ordering are by slot: row first, then [`EventKind::tie_break`]. A chart never
/// holds two events in the same slot, so within one chart slot equality is identity.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartEvent {
    id: EventId,
    row: i64,
    chart_time: f64,
    end_chart_time: f64,
    kind: EventKind,
}

impl ChartEvent {
    /// Create a new event. `end_chart_time` equals `chart_time` for everything but holds.
    #[must_use]
    pub const fn new(
        id: EventId,
        row: i64,
        chart_time: f64,
        end_chart_time: f64,
        kind: EventKind,
    ) -> Self {
        Self {
            id,
            row,
            chart_time,
            end_chart_time,
            kind,
        }
    }

    /// Get event identifier
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Get event row
    #[must_use]
    pub const fn row(&self) -> i64 {
        self.row
    }

    /// Get chart time in seconds
    #[must_use]
    pub const fn chart_time(&self) -> f64 {
        self.chart_time
    }

    /// Get chart time of the end of the event. Only differs from [`Self::chart_time`] for holds.
    #[must_use]
    pub const fn end_chart_time(&self) -> f64 {
        self.end_chart_time
    }

    /// Get event kind
    #[must_use]
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Get event lane, `None` if the event is not playable.
    #[must_use]
    pub const fn lane(&self) -> Option<usize> {
        self.kind.lane()
    }

    /// Row of the end of the event. Only differs from [`Self::row`] for holds.
    #[must_use]
    pub const fn end_row(&self) -> i64 {
        match self.kind {
            EventKind::Hold { end_row, .. } => end_row,
            _ => self.row,
        }
    }

    /// Whether this is a fake note.
    #[must_use]
    pub const fn is_fake(&self) -> bool {
        self.kind.is_fake()
    }

    /// Whether the event takes part in input simulation.
    #[must_use]
    pub const fn is_steppable(&self) -> bool {
        self.kind.is_steppable()
    }

    /// The hold span of this event, if it is a hold.
    #[must_use]
    pub const fn hold_span(&self) -> Option<HoldSpan> {
        match self.kind {
            EventKind::Hold { lane, end_row, .. } => Some(HoldSpan {
                id: self.id,
                lane,
                start_row: self.row,
                end_row,
                start_time: self.chart_time,
                end_time: self.end_chart_time,
            }),
            _ => None,
        }
    }

    /// The input performed at the start of this event, if it is steppable.
    #[must_use]
    pub fn next_input(&self) -> Option<NextInput> {
        self.kind.input_kind().map(|kind| NextInput {
            id: self.id,
            kind,
            chart_time: self.chart_time,
        })
    }

    pub(crate) const fn set_times(&mut self, chart_time: f64, end_chart_time: f64) {
        self.chart_time = chart_time;
        self.end_chart_time = end_chart_time;
    }
}

impl PartialEq for ChartEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ChartEvent {}

impl PartialOrd for ChartEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChartEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.kind.tie_break(&other.kind))
    }
}

impl IndexedEvent for ChartEvent {
    fn row(&self) -> i64 {
        self.row
    }

    fn chart_time(&self) -> f64 {
        self.chart_time
    }
}

/// Kind of a simulated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputKind {
    /// Press and release of a tap note.
    Tap,
    /// Press at the start of a hold.
    HoldStart,
    /// Release at the end of a hold.
    HoldEnd,
    /// Release of a lift note.
    Lift,
}

/// The next input expected in a lane: which event, which part of it, and when.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NextInput {
    /// Event the input belongs to.
    pub id: EventId,
    /// Which input of the event.
    pub kind: InputKind,
    /// Chart time of the input in seconds.
    pub chart_time: f64,
}

impl NextInput {
    /// Whether both values describe the same input of the same event at the same time.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && crate::util::approx_eq(self.chart_time, other.chart_time)
    }

    /// Whether this input is the end of a hold.
    #[must_use]
    pub fn is_hold_end(&self) -> bool {
        self.kind == InputKind::HoldEnd
    }
}

/// A hold viewed as one entity spanning two rows.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoldSpan {
    /// Event of the hold.
    pub id: EventId,
    /// Lane of the hold.
    pub lane: usize,
    /// Row where the hold starts.
    pub start_row: i64,
    /// Row where the hold ends.
    pub end_row: i64,
    /// Chart time where the hold starts.
    pub start_time: f64,
    /// Chart time where the hold ends.
    pub end_time: f64,
}

impl HoldSpan {
    /// Whether the hold is active at `time`: started at or before it and not yet ended.
    #[must_use]
    pub fn is_active_at(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time
    }

    /// Resolve the hold to the input that is next at `time`: its start while `time` is before
    /// the start, its end otherwise.
    #[must_use]
    pub fn resolve(&self, time: f64) -> NextInput {
        if time < self.start_time {
            NextInput {
                id: self.id,
                kind: InputKind::HoldStart,
                chart_time: self.start_time,
            }
        } else {
            NextInput {
                id: self.id,
                kind: InputKind::HoldEnd,
                chart_time: self.end_time,
            }
        }
    }
}
