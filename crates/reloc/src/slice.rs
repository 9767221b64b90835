//! Index-based helpers over `MaybeUninit` buffers.
//!
//! These pick the overlap-safe relocator for a shift within one buffer and
//! bounds-check the indices, leaving only liveness to the caller.

use std::mem::MaybeUninit;
use std::ops::Range;

use reloc_core::{RelocError, Relocate, RelocationFailed};

use crate::backward::relocate_backward;
use crate::forward::relocate_n;
use crate::slot::SlotPtr;

/// Relocate `buf[src]` down so that it starts at index `dst`.
///
/// Returns the index one past the last written slot (`dst + src.len()`).
/// On failure every element of `buf[src]` has been destroyed and no slot
/// written by this call is live.
///
/// # Panics
///
/// Panics if `src` is not within `buf` or if `dst > src.start`.
///
/// # Safety
///
/// The slots in `buf[src]` must be live, and the slots in
/// `buf[dst..src.start]` must be raw.
pub unsafe fn shift_left<T: Relocate>(
    buf: &mut [MaybeUninit<T>],
    src: Range<usize>,
    dst: usize,
) -> Result<usize, RelocationFailed<RelocError<T>>> {
    assert!(
        src.start <= src.end && src.end <= buf.len(),
        "source range {src:?} outside buffer of {} slots",
        buf.len()
    );
    assert!(
        dst <= src.start,
        "shift_left destination {dst} is right of source start {}",
        src.start
    );
    let base = buf.as_mut_ptr().cast::<T>();
    let len = src.end - src.start;
    // SAFETY: indices are in bounds; liveness is the caller's contract and
    // a left shift is the direction `relocate_n` handles.
    let moved = unsafe { relocate_n(SlotPtr::at(base, src.start), len, SlotPtr::at(base, dst)) };
    moved?;
    Ok(dst + len)
}

/// Relocate `buf[src]` up so that it ends just before index `dst_end`.
///
/// Returns the index of the first written slot (`dst_end - src.len()`).
/// On failure every element of `buf[src]` has been destroyed and no slot
/// written by this call is live.
///
/// # Panics
///
/// Panics if `src` is not within `buf`, if `dst_end > buf.len()` or if
/// `dst_end < src.end`.
///
/// # Safety
///
/// The slots in `buf[src]` must be live, and the slots in
/// `buf[src.end..dst_end]` must be raw.
pub unsafe fn shift_right<T: Relocate>(
    buf: &mut [MaybeUninit<T>],
    src: Range<usize>,
    dst_end: usize,
) -> Result<usize, RelocationFailed<RelocError<T>>> {
    assert!(
        src.start <= src.end && dst_end <= buf.len(),
        "shift of {src:?} to end at {dst_end} outside buffer of {} slots",
        buf.len()
    );
    assert!(
        dst_end >= src.end,
        "shift_right destination end {dst_end} is left of source end {}",
        src.end
    );
    let base = buf.as_mut_ptr().cast::<T>();
    let len = src.end - src.start;
    // SAFETY: as in `shift_left`, mirrored for a right shift.
    let moved = unsafe {
        relocate_backward(
            SlotPtr::at(base, src.start),
            SlotPtr::at(base, src.end),
            SlotPtr::at(base, dst_end),
        )
    };
    moved?;
    Ok(dst_end - len)
}
