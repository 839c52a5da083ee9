//! Boundary correction walks.
//!
//! An index is ordered by row, but a query may bound a different key such as chart time. Several
//! rows can share one time, so a cursor located by row is only approximately right for a time
//! bound. These walks step the cursor one element at a time until the bound holds on one side of
//! it and fails on the other, then leave it unset at the boundary element.
//!
//! The key must be monotonic non-decreasing in index order. On success the caller steps once to
//! read the boundary element; on failure no element satisfies the bound.

use super::Cursor;

/// Walk to the first element with `key > bound`.
pub fn ensure_greater_than<T>(cursor: &mut Cursor<'_, T>, key: impl Fn(&T) -> f64, bound: f64) -> bool {
    seek_first(cursor, |event| key(event) > bound)
}

/// Walk to the first element with `key >= bound`.
pub fn ensure_greater_than_or_equal<T>(
    cursor: &mut Cursor<'_, T>,
    key: impl Fn(&T) -> f64,
    bound: f64,
) -> bool {
    seek_first(cursor, |event| key(event) >= bound)
}

/// Walk to the last element with `key < bound`.
pub fn ensure_less_than<T>(cursor: &mut Cursor<'_, T>, key: impl Fn(&T) -> f64, bound: f64) -> bool {
    seek_last(cursor, |event| key(event) < bound)
}

/// Walk to the last element with `key <= bound`.
pub fn ensure_less_than_or_equal<T>(
    cursor: &mut Cursor<'_, T>,
    key: impl Fn(&T) -> f64,
    bound: f64,
) -> bool {
    seek_last(cursor, |event| key(event) <= bound)
}

// `accept` is false for a prefix of the index and true for the rest.
fn seek_first<T>(cursor: &mut Cursor<'_, T>, accept: impl Fn(&T) -> bool) -> bool {
    if cursor.is_unset() {
        cursor.move_next();
    } else if cursor.is_after_last() {
        cursor.move_prev();
    }
    while cursor.current().is_some_and(&accept) {
        if !cursor.move_prev() {
            break;
        }
    }
    while !cursor.current().is_some_and(&accept) {
        if !cursor.move_next() {
            return false;
        }
    }
    cursor.unset();
    true
}

// `accept` is true for a prefix of the index and false for the rest.
fn seek_last<T>(cursor: &mut Cursor<'_, T>, accept: impl Fn(&T) -> bool) -> bool {
    if cursor.is_unset() {
        cursor.move_next();
    } else if cursor.is_before_first() {
        cursor.move_next();
    }
    while cursor.current().is_some_and(&accept) {
        if !cursor.move_next() {
            break;
        }
    }
    while !cursor.current().is_some_and(&accept) {
        if !cursor.move_prev() {
            return false;
        }
    }
    cursor.unset();
    true
}
