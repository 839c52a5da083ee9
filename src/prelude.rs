//! Prelude module for the stepchart crate.
//!
//! This module re-exports the types needed to build a chart, track a playhead over it and
//! autoplay it.

pub use crate::autoplay::{AutoPlayConfig, AutoPlayer, LaneState, NextInputStrategy};
pub use crate::chart::event::{
    ChartEvent, EventId, EventIdGenerator, EventKind, HoldSpan, InputKind, NextInput,
};
pub use crate::chart::timing::{
    DEFAULT_ROWS_PER_BEAT, TempoMap, TempoMapBuilder, TimingError, TimingSource,
};
pub use crate::chart::{Chart, ChartError};
pub use crate::index::{Cursor, IndexedEvent, OrderedIndex};
pub use crate::position::{
    ChartClock, InterpolationConfig, NoObserver, Position, PositionObserver, PositionTracker,
};
pub use crate::receptor::{Receptor, ReceptorSignal, RecordingReceptor};
