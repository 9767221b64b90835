//! Backward (right-to-left) range relocation.
//!
//! Elements are relocated in decreasing index order, so the destination may
//! overlap the source as long as it does not end before it. This is the
//! direction a container uses to open a gap by shifting a suffix up.

use reloc_core::{
    BidirectionalCursor, CursorCategory, NoThrowCursor, RelocError, Relocate, RelocationFailed,
    Strategy,
};

use crate::bulk;
use crate::guard::{Pending, RollbackGuard};
use crate::precondition;

/// Relocate every element in `[first, last)` into the raw slots ending just
/// before `dest_last`, last element first.
///
/// Returns the destination start, `dest_last` minus the range length.
///
/// On failure, every destination slot written so far and every source slot
/// not yet relocated is destroyed before the error is returned. The error's
/// `index` counts from the back: index 0 is the element at `last - 1`.
///
/// # Panics
///
/// When both cursors are contiguous, panics if the ranges overlap and
/// `dest_last` comes before `last` (see the `checked` feature).
///
/// # Safety
///
/// - Every slot in `[first, last)` holds a live element, and `last` is
///   reachable from `first`.
/// - `dest_last` is preceded by at least as many slots as the source range,
///   all raw except where they overlap the source range.
/// - If the ranges overlap, `dest_last` does not come before `last`.
///
/// After the call every source slot is raw, whatever the outcome.
pub unsafe fn relocate_backward<S, D>(
    first: S,
    last: S,
    dest_last: D,
) -> Result<D, RelocationFailed<RelocError<S::Item>>>
where
    S: BidirectionalCursor,
    S::Item: Relocate,
    D: BidirectionalCursor<Item = S::Item> + NoThrowCursor,
{
    if S::CATEGORY == CursorCategory::Contiguous {
        let len = first.distance_to(&last);
        debug_assert!(len.is_some(), "contiguous range end precedes its start");
        if let Some(len) = len {
            if D::CATEGORY == CursorCategory::Contiguous {
                let mut dest_first = dest_last.clone();
                dest_first.retreat_by(len);
                precondition::check_backward(first.slot(), dest_first.slot(), len);
            }
            if bulk::eligible::<S, D>() {
                // SAFETY: forwarded from this function's contract.
                return Ok(unsafe { bulk::backward(first, len, dest_last) });
            }
        }
    }

    let mut guard = RollbackGuard::new(dest_last, Pending::Until { start: first, end: last });
    let mut index = 0;
    while let Some(src) = guard.pending.back() {
        let mut dest = guard.written_start.clone();
        dest.retreat();
        let dst = dest.slot();
        if src == dst {
            // Already in place: the live source becomes the written slot.
            guard.written_start = dest;
            guard.written += 1;
            guard.pending.pop_back();
            index += 1;
            continue;
        }
        // SAFETY: `src` is the last pending slot, hence live; `dst` is a
        // different slot below every written slot and is raw or already
        // vacated.
        let built =
            unsafe { <<S::Item as Relocate>::Strategy as Strategy<S::Item>>::construct(src, dst) };
        built.map_err(|reason| RelocationFailed::new(index, reason))?;
        guard.written_start = dest;
        guard.written += 1;
        guard.pending.pop_back();
        // SAFETY: `construct` succeeded and `src` is no longer tracked.
        unsafe { <<S::Item as Relocate>::Strategy as Strategy<S::Item>>::retire(src) };
        index += 1;
    }
    let (dest_first, _) = guard.into_parts();
    Ok(dest_first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{SlotPtr, SlotTable};
    use reloc_core::MoveConstruct;
    use std::convert::Infallible;
    use std::mem::MaybeUninit;

    #[derive(Debug, PartialEq)]
    struct Owned(Box<u32>);

    impl MoveConstruct for Owned {
        type Error = Infallible;

        fn move_construct(src: &mut Self) -> Result<Self, Infallible> {
            Ok(Owned(std::mem::replace(&mut src.0, Box::new(u32::MAX))))
        }
    }

    reloc_core::move_relocatable!(Owned);

    #[test]
    fn right_shift_over_overlap() {
        let mut data = [10u64, 20, 30, 40, 0];
        let base = data.as_mut_ptr();
        let first =
            unsafe { relocate_backward(SlotPtr::new(base), SlotPtr::at(base, 4), SlotPtr::at(base, 5)) }
                .unwrap();
        assert_eq!(first, SlotPtr::at(base, 1));
        assert_eq!(&data[1..], &[10, 20, 30, 40]);
    }

    #[test]
    fn empty_range_returns_dest_last() {
        let mut data = [0u8; 3];
        let base = data.as_mut_ptr();
        let first =
            unsafe { relocate_backward(SlotPtr::at(base, 1), SlotPtr::at(base, 1), SlotPtr::at(base, 3)) }
                .unwrap();
        assert_eq!(first, SlotPtr::at(base, 3));
    }

    #[test]
    fn table_cursors_walk_from_the_back() {
        let mut data = [1u32, 2, 3, 0, 0, 0];
        let base = data.as_mut_ptr();
        let src_table = [base, base.wrapping_add(1), base.wrapping_add(2)];
        let dst_table = [base.wrapping_add(5), base.wrapping_add(4), base.wrapping_add(3)];
        let first = unsafe {
            relocate_backward(
                SlotTable::begin(&src_table),
                SlotTable::end(&src_table),
                SlotTable::end(&dst_table),
            )
        }
        .unwrap();
        assert_eq!(first.position(), 0);
        assert_eq!(&data[3..], &[3, 2, 1]);
    }

    #[test]
    #[should_panic(expected = "backward relocation")]
    fn left_shift_with_backward_relocator_is_rejected() {
        let mut data = [1u32, 2, 3, 4];
        let base = data.as_mut_ptr();
        let _ = unsafe {
            relocate_backward(SlotPtr::at(base, 1), SlotPtr::at(base, 4), SlotPtr::at(base, 3))
        };
    }

    #[test]
    fn move_constructed_range_onto_itself_stays_put() {
        let mut slots = [7, 8, 9].map(|v| MaybeUninit::new(Owned(Box::new(v))));
        let base = slots.as_mut_ptr().cast::<Owned>();
        let first = unsafe {
            relocate_backward(SlotPtr::new(base), SlotPtr::at(base, 3), SlotPtr::at(base, 3))
        }
        .unwrap();
        assert_eq!(first, SlotPtr::new(base));
        let values: Vec<u32> = slots
            .into_iter()
            .map(|slot| *unsafe { slot.assume_init() }.0)
            .collect();
        assert_eq!(values, vec![7, 8, 9]);
    }

    #[test]
    fn bitwise_range_onto_itself_through_a_table() {
        let mut data = [1u32, 2, 3];
        let base = data.as_mut_ptr();
        let table = [base, base.wrapping_add(1), base.wrapping_add(2)];
        let first = unsafe {
            relocate_backward(
                SlotTable::begin(&table),
                SlotTable::end(&table),
                SlotTable::end(&table),
            )
        }
        .unwrap();
        assert_eq!(first.position(), 0);
        assert_eq!(data, [1, 2, 3]);
    }
}
