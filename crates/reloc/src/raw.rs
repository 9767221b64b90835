//! The single-slot relocation primitive.
//!
//! Every `unsafe` block in this crate carries a `// SAFETY:` comment naming
//! the caller obligation it relies on.

use reloc_core::{RelocError, Relocate, Strategy};

/// Relocate the value at `src` into the raw slot at `dst`.
///
/// On `Ok`, `src` is raw and `dst` holds the value. On `Err`, nothing has
/// changed: `src` is still live and unmodified, `dst` is still raw, and no
/// destructor has run.
///
/// # Safety
///
/// - `src` must point to a live, aligned `T`.
/// - `dst` must point to raw, aligned storage for a `T`.
/// - `src` and `dst` must be different slots.
///
/// # Example
///
/// ```
/// use std::mem::MaybeUninit;
///
/// let mut src = MaybeUninit::new(String::from("slot"));
/// let mut dst = MaybeUninit::<String>::uninit();
/// unsafe {
///     reloc::relocate_at(src.as_mut_ptr(), dst.as_mut_ptr()).unwrap();
///     assert_eq!(dst.assume_init_read(), "slot");
/// }
/// ```
#[inline]
pub unsafe fn relocate_at<T: Relocate>(src: *mut T, dst: *mut T) -> Result<(), RelocError<T>> {
    debug_assert!(!src.is_null() && !dst.is_null(), "null slot");
    debug_assert!(src.is_aligned() && dst.is_aligned(), "misaligned slot");
    debug_assert!(
        std::mem::size_of::<T>() == 0 || src != dst,
        "relocating a slot onto itself"
    );
    // SAFETY: forwarded from this function's contract.
    unsafe { <T::Strategy as Strategy<T>>::construct(src, dst)? };
    // SAFETY: `construct` succeeded, so `src` is moved-from and unretired.
    unsafe { <T::Strategy as Strategy<T>>::retire(src) };
    Ok(())
}
