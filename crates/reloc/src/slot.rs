//! Concrete cursors over slot storage.
//!
//! - [`SlotPtr`]: contiguous cursor over a raw `*mut T` array. Unlocks the
//!   overlap check and the bulk-copy path.
//! - [`SlotTable`]: bidirectional cursor over a table of slot addresses, for
//!   storage that is not laid out contiguously (or to force the per-element
//!   path).
//! - [`SinglePass`]: restricts any cursor to single-pass traversal.

use std::fmt;
use std::mem;

use reloc_core::{BidirectionalCursor, Cursor, CursorCategory, NoThrowCursor};

/// Contiguous cursor over an array of `T` slots.
///
/// Navigation uses wrapping pointer arithmetic and never dereferences, so it
/// is safe to step a `SlotPtr` anywhere; only the relocators touch the slots
/// and their contracts require the walked range to be valid.
pub struct SlotPtr<T> {
    ptr: *mut T,
}

impl<T> SlotPtr<T> {
    /// Cursor at `ptr`.
    ///
    /// `ptr` must be aligned and non-null for the relocators to use it, even
    /// for zero-length ranges (it is never dereferenced in that case).
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized: positions of zero-sized slots cannot be
    /// told apart by address.
    pub fn new(ptr: *mut T) -> Self {
        assert!(
            mem::size_of::<T>() != 0,
            "SlotPtr does not support zero-sized element types"
        );
        Self { ptr }
    }

    /// Cursor at index `index` of the array starting at `base`.
    pub fn at(base: *mut T, index: usize) -> Self {
        let mut cursor = Self::new(base);
        cursor.advance_by(index);
        cursor
    }

    /// The raw slot address.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr
    }
}

impl<T> Clone for SlotPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotPtr<T> {}

impl<T> PartialEq for SlotPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for SlotPtr<T> {}

impl<T> fmt::Debug for SlotPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotPtr").field(&self.ptr).finish()
    }
}

// SAFETY: consecutive positions are consecutive `T` slots of one array, and
// `distance_to` is exact for any pair of positions with `end >= self`.
unsafe impl<T> Cursor for SlotPtr<T> {
    type Item = T;

    const CATEGORY: CursorCategory = CursorCategory::Contiguous;

    #[inline(always)]
    fn slot(&self) -> *mut T {
        self.ptr
    }

    #[inline(always)]
    fn advance(&mut self) {
        self.ptr = self.ptr.wrapping_add(1);
    }

    #[inline(always)]
    fn same_position(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }

    #[inline(always)]
    fn advance_by(&mut self, n: usize) {
        self.ptr = self.ptr.wrapping_add(n);
    }

    #[inline]
    fn distance_to(&self, end: &Self) -> Option<usize> {
        let bytes = (end.ptr as usize).checked_sub(self.ptr as usize)?;
        Some(bytes / mem::size_of::<T>())
    }
}

// SAFETY: `wrapping_sub(1)` undoes `wrapping_add(1)`.
unsafe impl<T> BidirectionalCursor for SlotPtr<T> {
    #[inline(always)]
    fn retreat(&mut self) {
        self.ptr = self.ptr.wrapping_sub(1);
    }

    #[inline(always)]
    fn retreat_by(&mut self, n: usize) {
        self.ptr = self.ptr.wrapping_sub(n);
    }
}

// SAFETY: pointer arithmetic and comparison cannot panic.
unsafe impl<T> NoThrowCursor for SlotPtr<T> {}

/// Bidirectional cursor over a table of slot addresses.
///
/// Position `i` names the slot `table[i]`; position `table.len()` is the
/// one-past-the-end position and has no slot. The table itself is borrowed
/// and never modified.
pub struct SlotTable<'a, T> {
    table: &'a [*mut T],
    pos: usize,
}

impl<'a, T> SlotTable<'a, T> {
    /// Cursor at position `pos` of `table`.
    ///
    /// # Panics
    ///
    /// Panics if `pos > table.len()`.
    pub fn new(table: &'a [*mut T], pos: usize) -> Self {
        assert!(
            pos <= table.len(),
            "position {pos} outside table of {} slots",
            table.len()
        );
        Self { table, pos }
    }

    /// Cursor at the first slot.
    pub fn begin(table: &'a [*mut T]) -> Self {
        Self { table, pos: 0 }
    }

    /// Cursor one past the last slot.
    pub fn end(table: &'a [*mut T]) -> Self {
        Self {
            table,
            pos: table.len(),
        }
    }

    /// Current position within the table.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<T> Clone for SlotTable<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotTable<'_, T> {}

impl<T> fmt::Debug for SlotTable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTable")
            .field("pos", &self.pos)
            .field("len", &self.table.len())
            .finish()
    }
}

// SAFETY: slots come from the caller's table; the relocators only ask for
// `slot()` at positions strictly inside the range they were handed.
unsafe impl<T> Cursor for SlotTable<'_, T> {
    type Item = T;

    const CATEGORY: CursorCategory = CursorCategory::Bidirectional;

    #[inline]
    fn slot(&self) -> *mut T {
        self.table[self.pos]
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn same_position(&self, other: &Self) -> bool {
        self.pos == other.pos
    }

    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }

    #[inline]
    fn distance_to(&self, end: &Self) -> Option<usize> {
        end.pos.checked_sub(self.pos)
    }
}

// SAFETY: `pos -= 1` undoes `pos += 1`.
unsafe impl<T> BidirectionalCursor for SlotTable<'_, T> {
    #[inline]
    fn retreat(&mut self) {
        self.pos -= 1;
    }
}

// SAFETY: positions stay within `0..=table.len()` while walking a valid
// range, so the index arithmetic cannot overflow and `slot()` is only called
// on in-bounds positions.
unsafe impl<T> NoThrowCursor for SlotTable<'_, T> {}

/// Restricts a cursor to single-pass traversal.
///
/// Relocators treat the wrapped cursor as the weakest category: no overlap
/// check, no bulk path, forward forms only.
#[derive(Debug)]
pub struct SinglePass<C> {
    inner: C,
}

impl<C: Cursor> SinglePass<C> {
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Unwrap the underlying cursor.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

// SAFETY: delegates to `C`, and `SinglePass` is the weakest category.
unsafe impl<C: Cursor> Cursor for SinglePass<C> {
    type Item = C::Item;

    const CATEGORY: CursorCategory = CursorCategory::SinglePass;

    #[inline]
    fn slot(&self) -> *mut C::Item {
        self.inner.slot()
    }

    #[inline]
    fn advance(&mut self) {
        self.inner.advance();
    }

    #[inline]
    fn same_position(&self, other: &Self) -> bool {
        self.inner.same_position(&other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ptr_distance_counts_elements() {
        let mut data = [0u64; 8];
        let base = data.as_mut_ptr();
        let first = SlotPtr::at(base, 2);
        let last = SlotPtr::at(base, 7);
        assert_eq!(first.distance_to(&last), Some(5));
        assert_eq!(last.distance_to(&first), None);
    }

    #[test]
    fn slot_ptr_retreat_undoes_advance() {
        let mut data = [0u32; 4];
        let start = SlotPtr::new(data.as_mut_ptr());
        let mut c = start;
        c.advance();
        c.advance();
        c.retreat_by(2);
        assert!(c.same_position(&start));
    }

    #[test]
    #[should_panic(expected = "zero-sized")]
    fn slot_ptr_rejects_zero_sized_types() {
        let mut unit = [(); 4];
        let _ = SlotPtr::new(unit.as_mut_ptr());
    }

    #[test]
    fn slot_table_walks_in_table_order() {
        let mut data = [10u8, 20, 30];
        let base = data.as_mut_ptr();
        let table = [base.wrapping_add(2), base, base.wrapping_add(1)];
        let mut c = SlotTable::begin(&table);
        let mut seen = Vec::new();
        while !c.same_position(&SlotTable::end(&table)) {
            seen.push(unsafe { *c.slot() });
            c.advance();
        }
        assert_eq!(seen, vec![30, 10, 20]);
    }

    #[test]
    #[should_panic(expected = "outside table")]
    fn slot_table_rejects_position_past_end() {
        let table: [*mut u8; 2] = [std::ptr::null_mut(); 2];
        let _ = SlotTable::new(&table, 3);
    }

    #[test]
    fn single_pass_downgrades_category() {
        assert_eq!(
            <SinglePass<SlotPtr<u32>> as Cursor>::CATEGORY,
            CursorCategory::SinglePass
        );
        assert_eq!(
            <SlotTable<'_, u32> as Cursor>::CATEGORY,
            CursorCategory::Bidirectional
        );
    }
}
