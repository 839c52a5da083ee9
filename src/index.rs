//! Ordered event index.
//!
//! [`OrderedIndex`] keeps events sorted by their [`Ord`] implementation, which orders by row
//! first and breaks ties deterministically. Searches never build throwaway events: they compare
//! a bare row or time key against the stored events, and return a [`Cursor`] for stepwise
//! traversal. Queries by chart time locate a cursor by row first and correct it with the walks
//! in [`walk`], since rows sharing one time make a row answer only approximately right.
//!
//! Absence is not an error: every query returns `None` or an empty collection when no event
//! lies in the requested direction.

use std::ops::{Bound, RangeBounds};

use crate::chart::event::{ChartEvent, EventKind};
use crate::chart::timing::TimingSource;

pub mod cursor;
pub mod walk;

pub use self::cursor::Cursor;

/// An element which can be stored in an [`OrderedIndex`].
///
/// The [`Ord`] implementation must be a strict total order consistent with [`Self::row`]:
/// it compares rows first, and two distinct elements never compare equal. Chart time must be
/// non-decreasing along that order.
pub trait IndexedEvent: Ord {
    /// Row of the element, the primary ordering key.
    fn row(&self) -> i64;

    /// Chart time of the element in seconds.
    fn chart_time(&self) -> f64;
}

/// A sorted index of events supporting nearest-neighbor and range queries by row and time.
///
/// Lookups are `O(log n)` followed by a short local walk; insertion and removal are `O(n)`.
/// Queries borrow the index, so it cannot be mutated while a [`Cursor`] is alive.
#[derive(Debug, Clone)]
pub struct OrderedIndex<T> {
    events: Vec<T>,
}

impl<T> Default for OrderedIndex<T> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<T: IndexedEvent> FromIterator<T> for OrderedIndex<T> {
    /// Collect events into an index. Of events comparing equal, only the first is kept.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut events: Vec<T> = iter.into_iter().collect();
        events.sort();
        events.dedup();
        Self { events }
    }
}

impl<T: IndexedEvent> OrderedIndex<T> {
    /// Create an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the index has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.events
    }

    /// Iterate all events in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.events.iter()
    }

    /// Insert an event.
    ///
    /// # Errors
    ///
    /// Gives the event back if an equal one is already stored.
    pub fn insert(&mut self, event: T) -> Result<(), T> {
        match self.events.binary_search(&event) {
            Ok(_) => Err(event),
            Err(idx) => {
                self.events.insert(idx, event);
                Ok(())
            }
        }
    }

    /// Remove the event equal to `probe`, returning it.
    pub fn remove(&mut self, probe: &T) -> Option<T> {
        let idx = self.events.binary_search(probe).ok()?;
        Some(self.events.remove(idx))
    }

    /// The stored event equal to `probe`.
    #[must_use]
    pub fn get(&self, probe: &T) -> Option<&T> {
        let idx = self.events.binary_search(probe).ok()?;
        self.events.get(idx)
    }

    /// Modify every event in place. `f` must not change how events compare.
    pub(crate) fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.events.iter_mut().for_each(f);
        debug_assert!(self.events.is_sorted());
    }

    /// Events whose row lies in `range`, in order.
    #[must_use]
    pub fn range_by_row(&self, range: impl RangeBounds<i64>) -> &[T] {
        let start = match range.start_bound() {
            Bound::Included(&row) => self.events.partition_point(|event| event.row() < row),
            Bound::Excluded(&row) => self.events.partition_point(|event| event.row() <= row),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&row) => self.events.partition_point(|event| event.row() <= row),
            Bound::Excluded(&row) => self.events.partition_point(|event| event.row() < row),
            Bound::Unbounded => self.events.len(),
        };
        self.events.get(start..end.max(start)).unwrap_or_default()
    }

    /// Find the greatest event before `row`, or the least event if none precedes it.
    ///
    /// The search key sorts before every event on `row` itself, so when events precede the key
    /// the result is the last event of an earlier row. Either way its row is `<= row` unless no
    /// event is at or before `row`. The cursor is returned unset at the result.
    #[must_use]
    pub fn find_best_by_position(&self, row: f64) -> Option<Cursor<'_, T>> {
        let following = self
            .events
            .partition_point(|event| (event.row() as f64) < row);
        Cursor::unset_at(&self.events, following.saturating_sub(1))
    }

    /// Find the first event with chart time strictly greater than `time`.
    ///
    /// The time is converted to a row by `timing` to locate an approximate cursor, which is then
    /// corrected by walking. Returns `None` if no event follows `time` or `timing` cannot place
    /// it.
    #[must_use]
    pub fn find_first_after_chart_time(
        &self,
        time: f64,
        timing: &impl TimingSource,
    ) -> Option<Cursor<'_, T>> {
        let row = timing.time_to_row(time)?;
        let mut cursor = self.find_best_by_position(row)?;
        walk::ensure_greater_than(&mut cursor, T::chart_time, time).then_some(cursor)
    }

    /// Find the last event with chart time strictly less than `time`.
    #[must_use]
    pub fn find_last_before_chart_time(
        &self,
        time: f64,
        timing: &impl TimingSource,
    ) -> Option<Cursor<'_, T>> {
        let row = timing.time_to_row(time)?;
        let mut cursor = self.find_best_by_position(row)?;
        walk::ensure_less_than(&mut cursor, T::chart_time, time).then_some(cursor)
    }

    /// Find the first event with row strictly greater than `row`.
    #[must_use]
    pub fn find_first_after_chart_position(&self, row: f64) -> Option<Cursor<'_, T>> {
        let mut cursor = self.find_best_by_position(row)?;
        walk::ensure_greater_than(&mut cursor, |event: &T| event.row() as f64, row)
            .then_some(cursor)
    }

    /// Find the last event with row strictly less than `row`.
    #[must_use]
    pub fn find_last_before_chart_position(&self, row: f64) -> Option<Cursor<'_, T>> {
        let mut cursor = self.find_best_by_position(row)?;
        walk::ensure_less_than(&mut cursor, |event: &T| event.row() as f64, row).then_some(cursor)
    }

    /// All events on exactly `row`, in order.
    #[must_use]
    pub fn find_events_at_row(&self, row: i64) -> Vec<&T> {
        let Some(cursor) = self.find_best_by_position(row as f64) else {
            return Vec::new();
        };
        cursor
            .take_while(|event| event.row() <= row)
            .filter(|event| event.row() == row)
            .collect()
    }
}

impl OrderedIndex<ChartEvent> {
    /// Find the note of `lane` at `row`.
    ///
    /// Returns the note on exactly `row` in `lane`, or else a hold in `lane` which started
    /// earlier and has not ended before `row`. Events for which `skip` returns true are passed
    /// over as if absent.
    pub fn find_note_at(
        &self,
        row: i64,
        lane: usize,
        skip: impl Fn(&ChartEvent) -> bool,
    ) -> Option<&ChartEvent> {
        let mut cursor = self.find_best_by_position(row as f64)?;
        cursor.move_next();
        while cursor.peek_next().is_some_and(|event| event.row() <= row) {
            cursor.move_next();
        }

        loop {
            let event = cursor.current()?;
            if event.row() <= row && event.lane() == Some(lane) && !skip(event) {
                if event.row() == row {
                    return Some(event);
                }
                // The nearest earlier note in the lane decides: notes in one lane do not overlap.
                return match event.kind() {
                    EventKind::Hold { end_row, .. } if *end_row >= row => Some(event),
                    _ => None,
                };
            }
            cursor.move_prev();
        }
    }
}
