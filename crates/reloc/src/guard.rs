//! Rollback on failure.
//!
//! [`RollbackGuard`] tracks the two sets of live slots a range relocation
//! owns mid-flight: destination slots already written, and source slots not
//! yet relocated. If it is dropped while armed (an element error returned
//! through `?`, or a panic unwinding through the relocator) it destroys both
//! sets, destination first. On success the relocator takes its cursors back
//! with [`RollbackGuard::into_parts`] and nothing is destroyed.

use std::mem::ManuallyDrop;
use std::ptr;

use reloc_core::{BidirectionalCursor, Cursor};

/// Source slots still holding live, not-yet-relocated elements.
pub(crate) enum Pending<S> {
    /// Every position from `start` up to, not including, `end`.
    Until {
        /// First pending position.
        start: S,
        /// One past the last pending position.
        end: S,
    },
    /// `len` positions starting at `start`.
    Counted {
        /// First pending position.
        start: S,
        /// Number of pending positions.
        len: usize,
    },
}

impl<S: Cursor> Pending<S> {
    /// Slot of the first pending element, or `None` when nothing is pending.
    pub(crate) fn front(&self) -> Option<*mut S::Item> {
        match self {
            Self::Until { start, end } if !start.same_position(end) => Some(start.slot()),
            Self::Counted { start, len } if *len > 0 => Some(start.slot()),
            _ => None,
        }
    }

    /// Drop the first pending element from the set (it has been relocated).
    pub(crate) fn pop_front(&mut self) {
        match self {
            Self::Until { start, .. } => start.advance(),
            Self::Counted { start, len } => {
                start.advance();
                *len -= 1;
            }
        }
    }

    /// The position following the last element relocated so far.
    pub(crate) fn into_start(self) -> S {
        match self {
            Self::Until { start, .. } | Self::Counted { start, .. } => start,
        }
    }

    /// Destroy every pending element, returning how many were destroyed.
    ///
    /// # Safety
    ///
    /// Every pending slot must hold a live element.
    unsafe fn destroy(&mut self) -> usize {
        let mut destroyed = 0;
        while let Some(slot) = self.front() {
            self.pop_front();
            // SAFETY: `slot` was pending, hence live; it left the set above so
            // a panicking destructor cannot cause a second drop.
            unsafe { ptr::drop_in_place(slot) };
            destroyed += 1;
        }
        destroyed
    }
}

impl<S: BidirectionalCursor> Pending<S> {
    /// Slot of the last pending element, or `None` when nothing is pending.
    ///
    /// Only end-bounded sets are walked from the back.
    pub(crate) fn back(&self) -> Option<*mut S::Item> {
        let Self::Until { start, end } = self else {
            unreachable!("counted pending sets are only walked from the front");
        };
        if start.same_position(end) {
            return None;
        }
        let mut last = end.clone();
        last.retreat();
        Some(last.slot())
    }

    /// Drop the last pending element from the set (it has been relocated).
    pub(crate) fn pop_back(&mut self) {
        let Self::Until { end, .. } = self else {
            unreachable!("counted pending sets are only walked from the front");
        };
        end.retreat();
    }
}

/// Scoped cleanup for an in-flight range relocation.
///
/// Destination slots `[written_start, written_start + written)` are live, as
/// are all `pending` source slots. Everything else in both ranges is raw.
pub(crate) struct RollbackGuard<S: Cursor, D: Cursor<Item = S::Item>> {
    /// Lowest written destination position.
    pub(crate) written_start: D,
    /// Number of live destination slots from `written_start` onward.
    pub(crate) written: usize,
    /// Live source slots not yet relocated.
    pub(crate) pending: Pending<S>,
}

impl<S: Cursor, D: Cursor<Item = S::Item>> RollbackGuard<S, D> {
    /// Arm a guard over an untouched source and an empty destination.
    pub(crate) fn new(written_start: D, pending: Pending<S>) -> Self {
        Self {
            written_start,
            written: 0,
            pending,
        }
    }

    /// Disarm, handing back the destination start and the pending set.
    pub(crate) fn into_parts(self) -> (D, Pending<S>) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so each field is read exactly once.
        unsafe { (ptr::read(&this.written_start), ptr::read(&this.pending)) }
    }
}

impl<S: Cursor, D: Cursor<Item = S::Item>> Drop for RollbackGuard<S, D> {
    fn drop(&mut self) {
        let mut written = 0;
        while self.written > 0 {
            let slot = self.written_start.slot();
            self.written_start.advance();
            self.written -= 1;
            // SAFETY: the slot was counted as written, hence live.
            unsafe { ptr::drop_in_place(slot) };
            written += 1;
        }
        // SAFETY: pending slots are live by the guard's invariant.
        let pending = unsafe { self.pending.destroy() };
        log::debug!(
            "relocation rolled back: destroyed {written} destination and {pending} source elements"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotPtr;
    use std::cell::RefCell;
    use std::mem::MaybeUninit;
    use std::rc::Rc;

    struct Noisy {
        id: u32,
        log: Rc<RefCell<Vec<u32>>>,
    }

    impl Drop for Noisy {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.id);
        }
    }

    fn fill(buf: &mut [MaybeUninit<Noisy>], ids: &[u32], log: &Rc<RefCell<Vec<u32>>>) {
        for (slot, &id) in buf.iter_mut().zip(ids) {
            slot.write(Noisy {
                id,
                log: Rc::clone(log),
            });
        }
    }

    #[test]
    fn drop_destroys_destination_then_source() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut src: [MaybeUninit<Noisy>; 4] = [const { MaybeUninit::uninit() }; 4];
        let mut dst: [MaybeUninit<Noisy>; 4] = [const { MaybeUninit::uninit() }; 4];
        fill(&mut dst[..2], &[100, 101], &log);
        fill(&mut src[2..], &[2, 3], &log);

        let src_base = src.as_mut_ptr().cast::<Noisy>();
        let dst_base = dst.as_mut_ptr().cast::<Noisy>();
        let mut guard = RollbackGuard::new(
            SlotPtr::new(dst_base),
            Pending::Counted {
                start: SlotPtr::at(src_base, 2),
                len: 2,
            },
        );
        guard.written = 2;
        drop(guard);

        assert_eq!(*log.borrow(), vec![100, 101, 2, 3]);
    }

    #[test]
    fn into_parts_destroys_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut src: [MaybeUninit<Noisy>; 2] = [const { MaybeUninit::uninit() }; 2];
        fill(&mut src, &[1, 2], &log);
        let base = src.as_mut_ptr().cast::<Noisy>();

        let guard: RollbackGuard<SlotPtr<Noisy>, SlotPtr<Noisy>> = RollbackGuard::new(
            SlotPtr::new(base),
            Pending::Until {
                start: SlotPtr::new(base),
                end: SlotPtr::at(base, 2),
            },
        );
        let (_, pending) = guard.into_parts();
        assert!(log.borrow().is_empty());

        let start = pending.into_start();
        assert_eq!(start, SlotPtr::new(base));
        unsafe {
            src[0].assume_init_drop();
            src[1].assume_init_drop();
        }
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn pending_back_walks_from_the_end() {
        let mut data = [1u32, 2, 3];
        let base = data.as_mut_ptr();
        let mut pending = Pending::Until {
            start: SlotPtr::new(base),
            end: SlotPtr::at(base, 3),
        };
        let mut order = Vec::new();
        while let Some(slot) = pending.back() {
            order.push(unsafe { *slot });
            pending.pop_back();
        }
        assert_eq!(order, vec![3, 2, 1]);
        assert!(pending.front().is_none());
    }
}
