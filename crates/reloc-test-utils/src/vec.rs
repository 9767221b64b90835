//! A small resizable array built on the relocators.
//!
//! [`ShiftVec`] exists to exercise the caller side of the relocation
//! contract: after a failed relocation it restores its own length. The
//! policy is truncation. Every element at or after the first position the
//! failed operation touched is gone, so `len` drops to that position and the
//! prefix before it is unaffected.

use std::error::Error;
use std::fmt;
use std::mem::MaybeUninit;
use std::slice;

use reloc::{relocate_n, shift_left, shift_right, SlotPtr};
use reloc_core::{RelocError, Relocate, RelocationFailed};

/// Errors from [`ShiftVec`] operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShiftVecError<E> {
    /// A fixed-capacity vector is full.
    CapacityExceeded {
        /// Length the operation needed.
        requested: usize,
        /// The vector's capacity.
        capacity: usize,
    },
    /// Index past the end of the vector.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Length at the time of the call.
        len: usize,
    },
    /// An element failed to relocate; the vector was truncated.
    Relocation(RelocationFailed<E>),
}

impl<E: fmt::Display> fmt::Display for ShiftVecError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "capacity exceeded: requested {requested} elements, capacity {capacity}"
            ),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::Relocation(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for ShiftVecError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Relocation(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> From<RelocationFailed<E>> for ShiftVecError<E> {
    fn from(err: RelocationFailed<E>) -> Self {
        Self::Relocation(err)
    }
}

type Result<T, E> = std::result::Result<T, ShiftVecError<E>>;

/// Resizable array of `T` backed by a boxed `MaybeUninit` buffer.
///
/// Slots `0..len` are live, the rest raw.
pub struct ShiftVec<T: Relocate> {
    buf: Box<[MaybeUninit<T>]>,
    len: usize,
    growable: bool,
}

impl<T: Relocate> ShiftVec<T> {
    const MIN_GROWTH: usize = 4;

    /// Growable vector with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Box::new_uninit_slice(capacity),
            len: 0,
            growable: true,
        }
    }

    /// Vector that never grows past `capacity` elements.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            buf: Box::new_uninit_slice(capacity),
            len: 0,
            growable: false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `0..len` are live.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().cast::<T>(), self.len) }
    }

    /// Append `value`, growing if needed.
    pub fn push(&mut self, value: T) -> Result<(), RelocError<T>> {
        self.insert(self.len, value)
    }

    /// Insert `value` at `index`, shifting the suffix up by one.
    ///
    /// If the shift fails, the vector is truncated to `index` and `value` is
    /// dropped.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), RelocError<T>> {
        if index > self.len {
            return Err(ShiftVecError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        self.reserve_one()?;
        let len = self.len;
        // Suffix ownership passes to the relocator until it returns.
        self.len = index;
        // SAFETY: `index..len` is live, `len` is raw and within capacity.
        let shifted = unsafe { shift_right(&mut self.buf[..], index..len, len + 1) };
        shifted?;
        self.buf[index].write(value);
        self.len = len + 1;
        Ok(())
    }

    /// Remove and return the element at `index`, shifting the suffix down.
    ///
    /// If the shift fails, the vector is truncated to `index` and the
    /// removed element is dropped.
    pub fn remove(&mut self, index: usize) -> Result<T, RelocError<T>> {
        if index >= self.len {
            return Err(ShiftVecError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let len = self.len;
        self.len = index;
        // SAFETY: `index < len`, so the slot is live; it is raw afterwards.
        let value = unsafe { self.buf[index].assume_init_read() };
        // SAFETY: `index + 1..len` is live and `index` was just vacated.
        let shifted = unsafe { shift_left(&mut self.buf[..], index + 1..len, index) };
        shifted?;
        self.len = len - 1;
        Ok(value)
    }

    /// Make room for one more element.
    fn reserve_one(&mut self) -> Result<(), RelocError<T>> {
        if self.len < self.capacity() {
            return Ok(());
        }
        if !self.growable {
            return Err(ShiftVecError::CapacityExceeded {
                requested: self.len + 1,
                capacity: self.capacity(),
            });
        }
        let new_capacity = (self.capacity() * 2).max(Self::MIN_GROWTH);
        let mut fresh: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(new_capacity);
        let len = self.len;
        self.len = 0;
        // SAFETY: the old buffer holds `len` live elements and the fresh one
        // is raw and disjoint with room for all of them.
        let moved = unsafe {
            relocate_n(
                SlotPtr::new(self.buf.as_mut_ptr().cast::<T>()),
                len,
                SlotPtr::new(fresh.as_mut_ptr().cast::<T>()),
            )
        };
        // Every old slot is raw now, whatever the outcome.
        self.buf = fresh;
        moved?;
        self.len = len;
        Ok(())
    }
}

impl<T: Relocate> Drop for ShiftVec<T> {
    fn drop(&mut self) {
        for slot in &mut self.buf[..self.len] {
            // SAFETY: slots `0..len` are live.
            unsafe { slot.assume_init_drop() };
        }
    }
}

impl<T: Relocate + fmt::Debug> fmt::Debug for ShiftVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
