//! Bulk-copy path for contiguous, bitwise-relocatable ranges.
//!
//! When both cursors are contiguous and the element strategy is `Bitwise`,
//! a whole range relocation is one `ptr::copy` (memmove semantics, correct
//! for either overlap direction). The element step cannot fail, so no
//! rollback guard is built.

use std::ptr;

use reloc_core::{BidirectionalCursor, Cursor, CursorCategory, Relocate, Strategy, StrategyKind};

/// Whether relocating from `S` to `D` may take the bulk path.
///
/// Every input is an associated constant, so the result folds at compile
/// time and the untaken path is removed.
#[inline(always)]
pub(crate) const fn eligible<S, D>() -> bool
where
    S: Cursor,
    D: Cursor<Item = S::Item>,
    S::Item: Relocate,
{
    matches!(S::CATEGORY, CursorCategory::Contiguous)
        && matches!(D::CATEGORY, CursorCategory::Contiguous)
        && matches!(
            <<S::Item as Relocate>::Strategy as Strategy<S::Item>>::KIND,
            StrategyKind::Bitwise
        )
}

/// Move `len` elements from `first` to `dest` in one copy and return the
/// advanced cursors.
///
/// # Safety
///
/// `eligible::<S, D>()` must hold, the source slots must be live, the
/// destination slots raw except where they overlap the source, and both
/// ranges must lie within their allocations.
#[inline]
pub(crate) unsafe fn forward<S, D>(mut first: S, len: usize, mut dest: D) -> (S, D)
where
    S: Cursor,
    D: Cursor<Item = S::Item>,
{
    if len > 0 {
        // SAFETY: contiguous cursors address `len` consecutive slots; the
        // caller vouches for liveness and bounds. `ptr::copy` tolerates
        // overlap in either direction.
        unsafe { ptr::copy(first.slot(), dest.slot(), len) };
    }
    first.advance_by(len);
    dest.advance_by(len);
    (first, dest)
}

/// Move `len` elements from `first` into the slots ending at `dest_last` in
/// one copy and return the destination start.
///
/// # Safety
///
/// Same as [`forward`].
#[inline]
pub(crate) unsafe fn backward<S, D>(first: S, len: usize, dest_last: D) -> D
where
    S: Cursor,
    D: BidirectionalCursor<Item = S::Item>,
{
    let mut dest_first = dest_last;
    dest_first.retreat_by(len);
    if len > 0 {
        // SAFETY: as in `forward`.
        unsafe { ptr::copy(first.slot(), dest_first.slot(), len) };
    }
    dest_first
}
