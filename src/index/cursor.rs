//! Steppable view over an [`OrderedIndex`](super::OrderedIndex).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    BeforeFirst,
    At(usize),
    AfterLast,
}

/// A cursor over the events of an index, stepped with [`Cursor::move_next`] and
/// [`Cursor::move_prev`].
///
/// Searches return cursors in the *unset* state: anchored at the found event but without a
/// current element. The first step in either direction makes the anchor current without moving.
/// Stepping past either end leaves the cursor in a terminal state with no current element,
/// from which stepping back returns to the first or last event.
///
/// A cursor is also an [`Iterator`] which steps forward and yields each current event.
pub struct Cursor<'a, T> {
    events: &'a [T],
    slot: Slot,
    unset: bool,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("len", &self.events.len())
            .field("slot", &self.slot)
            .field("unset", &self.unset)
            .finish()
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Create an unset cursor anchored at `index`. Returns `None` if `index` is out of bounds.
    pub(crate) fn unset_at(events: &'a [T], index: usize) -> Option<Self> {
        (index < events.len()).then_some(Self {
            events,
            slot: Slot::At(index),
            unset: true,
        })
    }

    /// Step forward. Returns whether the cursor has a current element afterwards.
    pub fn move_next(&mut self) -> bool {
        if self.unset {
            self.unset = false;
            return self.current().is_some();
        }
        let len = self.events.len();
        self.slot = match self.slot {
            Slot::BeforeFirst if len > 0 => Slot::At(0),
            Slot::At(idx) if idx + 1 < len => Slot::At(idx + 1),
            _ => Slot::AfterLast,
        };
        self.current().is_some()
    }

    /// Step backward. Returns whether the cursor has a current element afterwards.
    pub fn move_prev(&mut self) -> bool {
        if self.unset {
            self.unset = false;
            return self.current().is_some();
        }
        let len = self.events.len();
        self.slot = match self.slot {
            Slot::AfterLast if len > 0 => Slot::At(len - 1),
            Slot::At(idx) if idx > 0 => Slot::At(idx - 1),
            _ => Slot::BeforeFirst,
        };
        self.current().is_some()
    }

    /// The current element, `None` while unset or past either end.
    #[must_use]
    pub fn current(&self) -> Option<&'a T> {
        match self.slot {
            Slot::At(idx) if !self.unset => self.events.get(idx),
            _ => None,
        }
    }

    /// The element [`Self::move_next`] would make current, without moving.
    #[must_use]
    pub fn peek_next(&self) -> Option<&'a T> {
        let mut ahead = *self;
        ahead.move_next();
        ahead.current()
    }

    /// The element [`Self::move_prev`] would make current, without moving.
    #[must_use]
    pub fn peek_prev(&self) -> Option<&'a T> {
        let mut behind = *self;
        behind.move_prev();
        behind.current()
    }

    /// Clear the current element, keeping the cursor anchored at it. Does nothing past either
    /// end.
    pub fn unset(&mut self) {
        if matches!(self.slot, Slot::At(_)) {
            self.unset = true;
        }
    }

    /// Whether the cursor is unset.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.unset
    }

    /// Whether the cursor stepped past the first element.
    #[must_use]
    pub const fn is_before_first(&self) -> bool {
        matches!(self.slot, Slot::BeforeFirst)
    }

    /// Whether the cursor stepped past the last element.
    #[must_use]
    pub const fn is_after_last(&self) -> bool {
        matches!(self.slot, Slot::AfterLast)
    }

    /// Position of the anchor in the index, `None` past either end.
    #[must_use]
    pub const fn anchor_index(&self) -> Option<usize> {
        match self.slot {
            Slot::At(idx) => Some(idx),
            Slot::BeforeFirst | Slot::AfterLast => None,
        }
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.move_next() {
            self.current()
        } else {
            None
        }
    }
}
