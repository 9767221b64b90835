//! Positions within slot storage.
//!
//! A cursor names one storage slot at a time and can step to the next one.
//! Cursors never read or write the slot themselves; they only hand out the
//! slot's address. What a relocator may do with a cursor depends on its
//! [`CursorCategory`]:
//!
//! | Category        | Forward forms | Backward form | Overlap check | Bulk copy |
//! |-----------------|---------------|---------------|---------------|-----------|
//! | `SinglePass`    | source        | -             | -             | -         |
//! | `Bidirectional` | both sides    | both sides    | -             | -         |
//! | `Contiguous`    | both sides    | both sides    | yes           | yes       |
//!
//! Destinations additionally require [`NoThrowCursor`].

/// Traversal capability of a cursor, resolved at compile time.
///
/// Ordered from weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CursorCategory {
    /// Can only step forward, and each position is visited once.
    SinglePass,
    /// Can step in both directions.
    Bidirectional,
    /// Adjacent positions are adjacent `Item`-sized slots in one allocation.
    Contiguous,
}

/// A position within a sequence of storage slots.
///
/// # Safety
///
/// - [`slot`](Cursor::slot) must return an aligned pointer to storage for one
///   `Item` at every position the cursor reaches while the caller walks a
///   range the caller vouched for.
/// - Distinct positions within one range must yield distinct slots.
/// - `CATEGORY == Contiguous` asserts that advancing moves the slot pointer
///   by exactly one `Item` and that [`distance_to`](Cursor::distance_to)
///   always returns `Some` for positions within the same range.
pub unsafe trait Cursor {
    /// Element type stored in the slots.
    type Item;

    /// Traversal capability of this cursor type.
    const CATEGORY: CursorCategory;

    /// Address of the slot at the current position.
    fn slot(&self) -> *mut Self::Item;

    /// Step to the next position.
    fn advance(&mut self);

    /// Whether `self` and `other` denote the same position.
    fn same_position(&self, other: &Self) -> bool;

    /// Step forward `n` positions.
    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Number of positions from `self` forward to `end`, when known in O(1).
    ///
    /// Returns `None` when the distance cannot be computed cheaply or when
    /// `end` lies before `self`.
    fn distance_to(&self, end: &Self) -> Option<usize> {
        let _ = end;
        None
    }
}

/// A cursor that can also step backward.
///
/// # Safety
///
/// [`retreat`](BidirectionalCursor::retreat) must exactly undo
/// [`advance`](Cursor::advance), and `CATEGORY` must not be `SinglePass`.
pub unsafe trait BidirectionalCursor: Cursor + Clone {
    /// Step to the previous position.
    fn retreat(&mut self);

    /// Step backward `n` positions.
    fn retreat_by(&mut self, n: usize) {
        for _ in 0..n {
            self.retreat();
        }
    }
}

/// A cursor whose navigation can never fail.
///
/// Destination cursors must be able to step and compare while a rollback is
/// underway, so none of [`advance`](Cursor::advance),
/// [`same_position`](Cursor::same_position), [`slot`](Cursor::slot), the
/// `Clone` impl or (for bidirectional cursors)
/// [`retreat`](BidirectionalCursor::retreat) may panic.
///
/// # Safety
///
/// Implementors promise the operations listed above never panic or abort
/// for positions within the range being relocated.
pub unsafe trait NoThrowCursor: Cursor + Clone {}
