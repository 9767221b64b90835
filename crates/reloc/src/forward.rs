//! Forward (left-to-right) range relocation.
//!
//! Elements are relocated in increasing index order, so the destination may
//! overlap the source as long as it does not start after it: every source
//! slot is read before the traversal can reach it as a destination.

use reloc_core::{
    Cursor, CursorCategory, NoThrowCursor, RelocError, Relocate, RelocationFailed, Strategy,
};

use crate::bulk;
use crate::guard::{Pending, RollbackGuard};
use crate::precondition;

/// Relocate every element in `[first, last)` into raw slots starting at
/// `dest`, in increasing order.
///
/// Returns `(last, dest_end)` where `dest_end` is one past the last written
/// destination slot, so calls can be chained.
///
/// On failure of element `k`, the `k` destination slots already written and
/// all source slots from `k` onward are destroyed before the error is
/// returned: neither range holds a live element afterward.
///
/// # Panics
///
/// When both cursors are contiguous, panics if the ranges overlap and
/// `dest` starts after `first` (see the `checked` feature).
///
/// # Safety
///
/// - Every slot in `[first, last)` holds a live element, and `last` is
///   reachable from `first`.
/// - `dest` is followed by at least as many slots as the source range, all
///   raw except where they overlap the source range.
/// - If the ranges overlap, `dest` does not come after `first`.
///
/// After the call every source slot is raw, whatever the outcome.
///
/// # Example
///
/// ```
/// use std::mem::MaybeUninit;
/// use reloc::SlotPtr;
///
/// let mut src = [String::from("a"), String::from("b")].map(MaybeUninit::new);
/// let mut dst = [const { MaybeUninit::<String>::uninit() }; 2];
/// let s = src.as_mut_ptr().cast::<String>();
/// let d = dst.as_mut_ptr().cast::<String>();
/// unsafe {
///     let (_, end) = reloc::relocate(SlotPtr::new(s), SlotPtr::at(s, 2), SlotPtr::new(d))
///         .unwrap_or_else(|e| e.unreachable());
///     assert_eq!(end, SlotPtr::at(d, 2));
///     assert_eq!(dst[1].assume_init_read(), "b");
///     assert_eq!(dst[0].assume_init_read(), "a");
/// }
/// ```
pub unsafe fn relocate<S, D>(
    first: S,
    last: S,
    dest: D,
) -> Result<(S, D), RelocationFailed<RelocError<S::Item>>>
where
    S: Cursor,
    S::Item: Relocate,
    D: NoThrowCursor<Item = S::Item>,
{
    if let Some(len) = contiguous_len(&first, &last) {
        if D::CATEGORY == CursorCategory::Contiguous {
            precondition::check_forward(first.slot(), dest.slot(), len);
        }
        if bulk::eligible::<S, D>() {
            // SAFETY: forwarded from this function's contract.
            return Ok(unsafe { bulk::forward(first, len, dest) });
        }
    }
    // SAFETY: forwarded from this function's contract.
    unsafe { relocate_looped(Pending::Until { start: first, end: last }, dest) }
}

/// Relocate `count` elements starting at `first` into raw slots starting at
/// `dest`, in increasing order.
///
/// Same contract and failure behaviour as [`relocate`]; the source range is
/// given by a count instead of an end cursor. `count == 0` constructs and
/// destroys nothing and returns `(first, dest)`.
///
/// # Safety
///
/// As for [`relocate`], with `[first, first + count)` as the source range.
pub unsafe fn relocate_n<S, D>(
    first: S,
    count: usize,
    dest: D,
) -> Result<(S, D), RelocationFailed<RelocError<S::Item>>>
where
    S: Cursor,
    S::Item: Relocate,
    D: NoThrowCursor<Item = S::Item>,
{
    if count == 0 {
        return Ok((first, dest));
    }
    if S::CATEGORY == CursorCategory::Contiguous && D::CATEGORY == CursorCategory::Contiguous {
        precondition::check_forward(first.slot(), dest.slot(), count);
    }
    if bulk::eligible::<S, D>() {
        // SAFETY: forwarded from this function's contract.
        return Ok(unsafe { bulk::forward(first, count, dest) });
    }
    // SAFETY: forwarded from this function's contract.
    unsafe {
        relocate_looped(
            Pending::Counted {
                start: first,
                len: count,
            },
            dest,
        )
    }
}

/// Length of `[first, last)` when `S` is contiguous.
fn contiguous_len<S: Cursor>(first: &S, last: &S) -> Option<usize> {
    if S::CATEGORY != CursorCategory::Contiguous {
        return None;
    }
    let len = first.distance_to(last);
    debug_assert!(len.is_some(), "contiguous range end precedes its start");
    len
}

/// Element-by-element forward relocation under a rollback guard.
///
/// # Safety
///
/// The `pending` slots are live and `dest` satisfies [`relocate`]'s
/// destination contract for them.
unsafe fn relocate_looped<S, D>(
    pending: Pending<S>,
    mut dest: D,
) -> Result<(S, D), RelocationFailed<RelocError<S::Item>>>
where
    S: Cursor,
    S::Item: Relocate,
    D: NoThrowCursor<Item = S::Item>,
{
    let mut guard = RollbackGuard::new(dest.clone(), pending);
    let mut index = 0;
    while let Some(src) = guard.pending.front() {
        let dst = dest.slot();
        if src == dst {
            // Already in place: the live source becomes the written slot.
            guard.written += 1;
            guard.pending.pop_front();
            dest.advance();
            index += 1;
            continue;
        }
        // SAFETY: `src` is pending, hence live; `dst` is a different slot and
        // raw because it is either outside the source range or a source slot
        // already vacated.
        let built =
            unsafe { <<S::Item as Relocate>::Strategy as Strategy<S::Item>>::construct(src, dst) };
        built.map_err(|reason| RelocationFailed::new(index, reason))?;
        guard.written += 1;
        guard.pending.pop_front();
        // SAFETY: `construct` succeeded and `src` is no longer tracked.
        unsafe { <<S::Item as Relocate>::Strategy as Strategy<S::Item>>::retire(src) };
        dest.advance();
        index += 1;
    }
    let (_, pending) = guard.into_parts();
    Ok((pending.into_start(), dest))
}
