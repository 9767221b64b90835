//! Overlap-direction checks for contiguous ranges.
//!
//! Only contiguous cursors expose addresses cheaply enough to check. With the
//! `checked` feature (default) violations panic in every build; without it
//! they are `debug_assert!`s.

use std::mem;

macro_rules! precondition {
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(feature = "checked") {
            assert!($cond, $($arg)+);
        } else {
            debug_assert!($cond, $($arg)+);
        }
    };
}

/// Byte range `[lo, hi)` covered by `len` slots starting at `first`.
fn span<T>(first: *const T, len: usize) -> (usize, usize) {
    let lo = first as usize;
    (lo, lo + len * mem::size_of::<T>())
}

fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Whether a forward relocation of `len` slots from `src` to `dst` reads
/// every source slot before overwriting it.
pub(crate) fn forward_is_safe<T>(src: *const T, dst: *const T, len: usize) -> bool {
    if len == 0 {
        return true;
    }
    !overlaps(span(src, len), span(dst, len)) || dst as usize <= src as usize
}

/// Whether a backward relocation of `len` slots from `src` into the `len`
/// slots starting at `dst_first` reads every source slot before overwriting
/// it.
pub(crate) fn backward_is_safe<T>(src: *const T, dst_first: *const T, len: usize) -> bool {
    if len == 0 {
        return true;
    }
    let s = span(src, len);
    let d = span(dst_first, len);
    !overlaps(s, d) || d.1 >= s.1
}

pub(crate) fn check_forward<T>(src: *const T, dst: *const T, len: usize) {
    precondition!(
        forward_is_safe(src, dst, len),
        "forward relocation into an overlapping destination must not start after the source \
         (src {src:p}, dst {dst:p}, len {len})"
    );
}

pub(crate) fn check_backward<T>(src: *const T, dst_first: *const T, len: usize) {
    precondition!(
        backward_is_safe(src, dst_first, len),
        "backward relocation into an overlapping destination must not end before the source \
         (src {src:p}, dst {dst_first:p}, len {len})"
    );
}
