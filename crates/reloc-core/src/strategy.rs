//! Relocation strategy tags.
//!
//! A [`Strategy`] performs one relocation in two halves: [`construct`]
//! builds the destination, [`retire`] ends the source's lifetime. Splitting
//! the step lets a range relocator account for the destination before the
//! source's destructor runs, so a panicking destructor never leaves an
//! element counted twice.
//!
//! The set of strategies is closed: [`Bitwise`] and [`MoveThenDrop`].
//!
//! [`construct`]: Strategy::construct
//! [`retire`]: Strategy::retire

use std::convert::Infallible;
use std::ptr;

use crate::traits::{MoveConstruct, TriviallyRelocatable};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Bitwise {}
    impl Sealed for super::MoveThenDrop {}
}

/// Runtime-visible name of a strategy tag, for diagnostics and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Byte copy, infallible, bulk-copy eligible.
    Bitwise,
    /// Move constructor followed by a drop of the source, may fail.
    MoveThenDrop,
}

/// How a single value of `T` is relocated.
///
/// # Safety
///
/// Implementations must uphold the contracts documented on
/// [`construct`](Strategy::construct) and [`retire`](Strategy::retire).
/// This trait is sealed.
pub unsafe trait Strategy<T>: sealed::Sealed {
    /// Error raised by [`construct`](Strategy::construct).
    type Error;

    /// Tag value, resolved at compile time.
    const KIND: StrategyKind;

    /// Build the value at `dst` from the value at `src`.
    ///
    /// On `Ok`, `dst` is live and `src` must be passed to
    /// [`retire`](Strategy::retire) exactly once. On `Err`, `src` is live
    /// and unmodified and `dst` is still raw.
    ///
    /// # Safety
    ///
    /// `src` must point to a live `T`, `dst` to raw storage for a `T`. Both
    /// must be aligned and must not be the same slot.
    unsafe fn construct(src: *mut T, dst: *mut T) -> Result<(), Self::Error>;

    /// End the lifetime of a source whose value was constructed elsewhere.
    ///
    /// # Safety
    ///
    /// `src` must have been passed to a successful
    /// [`construct`](Strategy::construct) and not retired since.
    unsafe fn retire(src: *mut T);
}

/// Strategy tag for [`TriviallyRelocatable`] types.
#[derive(Debug)]
pub enum Bitwise {}

// SAFETY: a byte copy of a trivially relocatable value is a valid value, and
// the source bytes are abandoned without running a destructor.
unsafe impl<T: TriviallyRelocatable> Strategy<T> for Bitwise {
    type Error = Infallible;

    const KIND: StrategyKind = StrategyKind::Bitwise;

    #[inline(always)]
    unsafe fn construct(src: *mut T, dst: *mut T) -> Result<(), Infallible> {
        // SAFETY: caller guarantees both pointers are valid, aligned and
        // distinct slots.
        unsafe { ptr::copy_nonoverlapping(src, dst, 1) };
        Ok(())
    }

    #[inline(always)]
    unsafe fn retire(_src: *mut T) {}
}

/// Strategy tag for [`MoveConstruct`] types.
#[derive(Debug)]
pub enum MoveThenDrop {}

// SAFETY: `move_construct` leaves `src` untouched on error, and on success
// the moved-from `src` is dropped exactly once in `retire`.
unsafe impl<T: MoveConstruct> Strategy<T> for MoveThenDrop {
    type Error = T::Error;

    const KIND: StrategyKind = StrategyKind::MoveThenDrop;

    #[inline]
    unsafe fn construct(src: *mut T, dst: *mut T) -> Result<(), T::Error> {
        // SAFETY: caller guarantees `src` is live and not aliased by `dst`.
        let value = T::move_construct(unsafe { &mut *src })?;
        // SAFETY: caller guarantees `dst` is raw, aligned storage.
        unsafe { dst.write(value) };
        Ok(())
    }

    #[inline]
    unsafe fn retire(src: *mut T) {
        // SAFETY: caller guarantees `src` holds a moved-from, still-live value.
        unsafe { ptr::drop_in_place(src) };
    }
}
