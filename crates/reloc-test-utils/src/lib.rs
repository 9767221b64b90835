//! Test utilities and instrumented fixtures for reloc development.
//!
//! Provides [`Slots`], a raw slot buffer that remembers which slots are
//! live, the instrumented element types in [`fixtures`], and the
//! [`ShiftVec`](vec::ShiftVec) fixture container.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod fixtures;
pub mod vec;

use std::mem::{self, MaybeUninit};
use std::ops::Range;
use std::ptr::NonNull;

use reloc::SlotPtr;

pub use fixtures::{Ledger, MoveFault, Plain, Tracked};
pub use vec::{ShiftVec, ShiftVecError};

/// A fixed array of raw slots with a liveness map.
///
/// The relocators do not know which slots are live, so tests record the
/// expected outcome with [`set_live`](Slots::set_live) after each call.
/// Dropping a `Slots` drops exactly the slots marked live.
///
/// All cursors and table entries derive from one base pointer, so they stay
/// valid for the lifetime of the buffer.
pub struct Slots<T> {
    base: NonNull<MaybeUninit<T>>,
    live: Vec<bool>,
}

impl<T> Slots<T> {
    /// `len` raw slots.
    pub fn raw(len: usize) -> Self {
        let buf: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(len);
        let base = NonNull::new(Box::into_raw(buf).cast::<MaybeUninit<T>>())
            .unwrap_or(NonNull::dangling());
        Self {
            base,
            live: vec![false; len],
        }
    }

    /// Slots initialised from `values`; `None` leaves a slot raw.
    pub fn from_values(values: impl IntoIterator<Item = Option<T>>) -> Self {
        let values: Vec<Option<T>> = values.into_iter().collect();
        let mut slots = Self::raw(values.len());
        for (i, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                slots.put(i, value);
            }
        }
        slots
    }

    /// Slots `0..values.len()` live with `values`, followed by `spare` raw slots.
    pub fn filled(values: impl IntoIterator<Item = T>, spare: usize) -> Self {
        let values: Vec<Option<T>> = values
            .into_iter()
            .map(Some)
            .chain((0..spare).map(|_| None))
            .collect();
        Self::from_values(values)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Base pointer of the slot array.
    pub fn base(&self) -> *mut T {
        self.base.as_ptr().cast::<T>()
    }

    /// Contiguous cursor at slot `index` (may be one past the end).
    pub fn cursor(&self, index: usize) -> SlotPtr<T> {
        assert!(index <= self.len(), "cursor {index} outside {} slots", self.len());
        SlotPtr::at(self.base(), index)
    }

    /// Slot index a contiguous cursor points at.
    pub fn index_of(&self, cursor: &SlotPtr<T>) -> usize {
        (cursor.as_ptr() as usize - self.base() as usize) / mem::size_of::<T>()
    }

    /// Slot addresses in the given index order, for [`reloc::SlotTable`].
    pub fn table(&self, order: impl IntoIterator<Item = usize>) -> Vec<*mut T> {
        order
            .into_iter()
            .map(|i| {
                assert!(i < self.len(), "slot {i} outside {} slots", self.len());
                self.base().wrapping_add(i)
            })
            .collect()
    }

    /// Construct `value` in raw slot `index`.
    pub fn put(&mut self, index: usize, value: T) {
        assert!(!self.live[index], "slot {index} is already live");
        // SAFETY: `index` is in bounds and the slot is raw.
        unsafe { self.base().add(index).write(value) };
        self.live[index] = true;
    }

    /// Take the value out of live slot `index`, leaving it raw.
    pub fn take(&mut self, index: usize) -> T {
        assert!(self.live[index], "slot {index} is raw");
        self.live[index] = false;
        // SAFETY: `index` is in bounds and was live.
        unsafe { self.base().add(index).read() }
    }

    /// Record the liveness of `range` after a relocation.
    pub fn set_live(&mut self, range: Range<usize>, live: bool) {
        self.live[range].fill(live);
    }

    /// Record that `src` slots moved into `dst` slots (ranges may overlap).
    pub fn record_move(&mut self, src: Range<usize>, dst: Range<usize>) {
        assert_eq!(src.len(), dst.len(), "moved ranges differ in length");
        self.set_live(src, false);
        self.set_live(dst, true);
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.live[index]
    }

    /// Number of slots marked live.
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    /// Shared access to a live slot.
    pub fn get(&self, index: usize) -> Option<&T> {
        if !self.live[index] {
            return None;
        }
        // SAFETY: the slot is in bounds and live.
        Some(unsafe { &*self.base().add(index) })
    }

    /// Project every slot through `f`, `None` for raw slots.
    pub fn view<U>(&self, f: impl Fn(&T) -> U) -> Vec<Option<U>> {
        (0..self.len()).map(|i| self.get(i).map(&f)).collect()
    }

    /// The whole buffer as `MaybeUninit` slots.
    ///
    /// Liveness is not updated by writes through this slice.
    pub fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: `base` owns `len` slots for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr(), self.len()) }
    }
}

impl<T> Drop for Slots<T> {
    fn drop(&mut self) {
        for i in 0..self.len() {
            if self.live[i] {
                // SAFETY: the slot is in bounds and live.
                unsafe { self.base().add(i).drop_in_place() };
            }
        }
        // SAFETY: `base` and `len` came from `Box::into_raw` in `raw`.
        drop(unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.base.as_ptr(),
                self.len(),
            ))
        });
    }
}
