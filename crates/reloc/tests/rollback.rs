//! Failure of the k-th element step must leave zero live elements in either
//! range, for every relocator, traversal and overlap configuration.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use proptest::prelude::*;
use reloc::{relocate, relocate_backward, relocate_n, MoveConstruct, SlotTable};
use reloc_test_utils::{Ledger, MoveFault, Slots, Tracked};

/// `n` tracked elements at `src_start`, raw slots everywhere else.
fn setup(ledger: &std::sync::Arc<Ledger>, len: usize, n: usize, src_start: usize) -> Slots<Tracked> {
    let mut slots = Slots::raw(len);
    for i in 0..n {
        slots.put(src_start + i, ledger.track(i as u64));
    }
    slots
}

/// Element count `n`, failing move `k`, and a shift distance in `1..=n`.
fn n_and_k() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..32).prop_flat_map(|n| (Just(n), 1..=n, 1..=n))
}

proptest! {
    #[test]
    fn forward_disjoint_rolls_back((n, k, _) in n_and_k()) {
        let ledger = Ledger::new();
        let mut slots = setup(&ledger, 2 * n, n, 0);
        ledger.fail_on(k);

        let err = unsafe { relocate(slots.cursor(0), slots.cursor(n), slots.cursor(n)) }
            .unwrap_err();
        slots.set_live(0..2 * n, false);

        prop_assert_eq!(err.index, k - 1);
        prop_assert_eq!(err.reason, MoveFault { attempt: k, value: (k - 1) as u64 });
        prop_assert_eq!(ledger.moves(), k);
        prop_assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn forward_left_shift_rolls_back((n, k, shift) in n_and_k()) {
        let ledger = Ledger::new();
        let mut slots = setup(&ledger, n + shift, n, shift);
        ledger.fail_on(k);

        let result = unsafe { relocate_n(slots.cursor(shift), n, slots.cursor(0)) };
        slots.set_live(0..n + shift, false);

        prop_assert!(result.is_err());
        prop_assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn backward_right_shift_rolls_back((n, k, shift) in n_and_k()) {
        let ledger = Ledger::new();
        let mut slots = setup(&ledger, n + shift, n, 0);
        ledger.fail_on(k);

        let err = unsafe {
            relocate_backward(slots.cursor(0), slots.cursor(n), slots.cursor(n + shift))
        }
        .unwrap_err();
        slots.set_live(0..n + shift, false);

        // Backward traversal meets the highest element first.
        prop_assert_eq!(err.index, k - 1);
        prop_assert_eq!(err.reason.value, (n - k) as u64);
        prop_assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn table_cursors_roll_back((n, k, _) in n_and_k()) {
        let ledger = Ledger::new();
        let mut slots = setup(&ledger, 2 * n, n, 0);
        // Destination visits the spare slots in reverse order.
        let table = slots.table((n..2 * n).rev());
        ledger.fail_on(k);

        let result = unsafe {
            relocate_n(slots.cursor(0), n, SlotTable::begin(&table))
        };
        slots.set_live(0..2 * n, false);

        prop_assert!(result.is_err());
        prop_assert_eq!(ledger.live(), 0);
    }
}

#[test]
fn failure_on_first_element_destroys_whole_source() {
    let ledger = Ledger::new();
    let mut slots = setup(&ledger, 8, 4, 0);
    ledger.fail_on(1);
    let drops_before = ledger.drops();

    let err = unsafe { relocate(slots.cursor(0), slots.cursor(4), slots.cursor(4)) }.unwrap_err();
    slots.set_live(0..8, false);

    assert_eq!(err.index, 0);
    assert_eq!(ledger.drops() - drops_before, 4);
    assert_eq!(ledger.live(), 0);
}

#[test]
fn failure_on_last_element_destroys_written_prefix() {
    let ledger = Ledger::new();
    let mut slots = setup(&ledger, 8, 4, 0);
    ledger.fail_on(4);

    let err = unsafe { relocate_n(slots.cursor(0), 4, slots.cursor(4)) }.unwrap_err();
    slots.set_live(0..8, false);

    assert_eq!(err.index, 3);
    assert_eq!(ledger.live(), 0);
}

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static PANIC_ON: Cell<usize> = const { Cell::new(0) };
}

/// Panics (instead of returning an error) on a chosen move.
struct Volatile(u32);

impl Volatile {
    fn new(value: u32) -> Self {
        LIVE.with(|l| l.set(l.get() + 1));
        Volatile(value)
    }
}

impl MoveConstruct for Volatile {
    type Error = ();

    fn move_construct(src: &mut Self) -> Result<Self, ()> {
        let remaining = PANIC_ON.with(|p| {
            let left = p.get();
            p.set(left.saturating_sub(1));
            left
        });
        if remaining == 1 {
            panic!("move constructor panicked");
        }
        Ok(Volatile::new(src.0))
    }
}

impl Drop for Volatile {
    fn drop(&mut self) {
        LIVE.with(|l| l.set(l.get() - 1));
    }
}

reloc::move_relocatable!(Volatile);

#[test]
fn panicking_move_unwinds_through_the_guard() {
    for k in 1..=5 {
        LIVE.with(|l| l.set(0));
        PANIC_ON.with(|p| p.set(k));
        let mut slots = Slots::raw(10);
        for i in 0..5 {
            slots.put(i, Volatile::new(i as u32));
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
            relocate_backward(slots.cursor(0), slots.cursor(5), slots.cursor(10))
        }));
        slots.set_live(0..10, false);

        assert!(outcome.is_err(), "move {k} should have panicked");
        assert_eq!(LIVE.with(Cell::get), 0, "leak after panic on move {k}");
    }
}
