//! Benchmark profiles and element types for the reloc primitives.
//!
//! - [`BenchProfile`]: element count, overlap shift and seed for a run
//! - [`Packed`] and [`Looped`]: the same 32-byte payload, relocated by the
//!   bulk path and by the element-wise path respectively
//! - [`Buffer`]: an owned slot buffer the benchmarks relocate within

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::convert::Infallible;
use std::mem::MaybeUninit;

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reloc::SlotPtr;
use reloc_core::MoveConstruct;

/// Sizing for one benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BenchProfile {
    /// Elements relocated per iteration.
    pub element_count: usize,
    /// Distance between source and destination for overlapping runs.
    pub shift: usize,
    /// Seed for payload generation.
    pub seed: u64,
}

impl BenchProfile {
    /// Default element count.
    pub const DEFAULT_ELEMENT_COUNT: usize = 10_000;
    /// Default overlap shift.
    pub const DEFAULT_SHIFT: usize = 16;
    /// Default seed.
    pub const DEFAULT_SEED: u64 = 42;

    /// A profile with the given count and shift and the default seed.
    pub fn new(element_count: usize, shift: usize) -> Self {
        Self {
            element_count,
            shift,
            seed: Self::DEFAULT_SEED,
        }
    }

    /// Buffer length that fits the elements plus the shift.
    pub fn capacity(&self) -> usize {
        self.element_count + self.shift
    }

    /// Deterministic payloads for this profile.
    pub fn payloads(&self) -> Vec<[u64; 4]> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.element_count)
            .map(|_| {
                [
                    rng.next_u64(),
                    rng.next_u64(),
                    rng.next_u64(),
                    rng.next_u64(),
                ]
            })
            .collect()
    }
}

impl Default for BenchProfile {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ELEMENT_COUNT, Self::DEFAULT_SHIFT)
    }
}

/// Bitwise-relocatable payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packed(pub [u64; 4]);

reloc_core::trivially_relocatable!(unsafe Packed);

/// Same payload as [`Packed`], relocated one element at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Looped(pub [u64; 4]);

impl MoveConstruct for Looped {
    type Error = Infallible;

    fn move_construct(src: &mut Self) -> Result<Self, Infallible> {
        Ok(*src)
    }
}

reloc_core::move_relocatable!(Looped);

/// Owned storage for `capacity` elements, live in `0..len`.
///
/// Benchmarks move the live window around with the relocation primitives
/// and report its new start through [`Buffer::set_window`].
pub struct Buffer<T> {
    slots: Box<[MaybeUninit<T>]>,
    start: usize,
    len: usize,
}

impl<T> Buffer<T> {
    /// A buffer of `capacity` slots with `values` live at the front.
    ///
    /// # Panics
    ///
    /// If `values` does not fit.
    pub fn new(values: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut slots: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(capacity);
        let mut len = 0;
        for value in values {
            assert!(len < capacity, "buffer of {capacity} slots overflowed");
            slots[len].write(value);
            len += 1;
        }
        Self {
            slots,
            start: 0,
            len,
        }
    }

    /// Start of the live window.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Contiguous cursor at slot `index`.
    pub fn cursor(&mut self, index: usize) -> SlotPtr<T> {
        assert!(index <= self.capacity(), "cursor {index} outside buffer");
        SlotPtr::at(self.slots.as_mut_ptr().cast::<T>(), index)
    }

    /// Raw slots for [`reloc::shift_left`] and [`reloc::shift_right`].
    pub fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<T>] {
        &mut self.slots
    }

    /// Record that the live window now starts at `start`.
    ///
    /// # Safety
    ///
    /// `start..start + len` must hold the live elements and nothing else may.
    pub unsafe fn set_window(&mut self, start: usize) {
        debug_assert!(start + self.len <= self.capacity());
        self.start = start;
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        for slot in &mut self.slots[self.start..self.start + self.len] {
            // SAFETY: the window holds exactly the live elements.
            unsafe { slot.assume_init_drop() };
        }
    }
}
