//! Instrumented element types.
//!
//! - [`Tracked`]: a move-constructed element that reports every
//!   construction, move and drop to a shared [`Ledger`], and can be told to
//!   fail its k-th move.
//! - [`Plain`]: a bitwise-relocatable element for the bulk-copy path.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::Arc;

use reloc_core::MoveConstruct;

/// Shared instance accounting for [`Tracked`] values.
///
/// `live` goes up on every construction (including a successful move) and
/// down on every drop, so after any balanced sequence of operations it is
/// the number of `Tracked` objects currently alive.
#[derive(Debug, Default)]
pub struct Ledger {
    live: AtomicIsize,
    moves: AtomicUsize,
    drops: AtomicUsize,
    /// 1-based move attempt that fails; 0 disables failure.
    fail_on: AtomicUsize,
}

impl Ledger {
    /// A ledger whose elements never fail to move.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A ledger whose `move_number`-th move attempt (1-based) fails.
    pub fn failing_on(move_number: usize) -> Arc<Self> {
        let ledger = Self::new();
        ledger.fail_on(move_number);
        ledger
    }

    /// Arm (or with 0, disarm) failure of the `move_number`-th move attempt,
    /// counting attempts from now.
    pub fn fail_on(&self, move_number: usize) {
        self.moves.store(0, Ordering::SeqCst);
        self.fail_on.store(move_number, Ordering::SeqCst);
    }

    /// Construct a new tracked element holding `value`.
    pub fn track(self: &Arc<Self>, value: u64) -> Tracked {
        self.live.fetch_add(1, Ordering::SeqCst);
        Tracked {
            value,
            ledger: Arc::clone(self),
        }
    }

    /// Number of tracked elements currently alive.
    pub fn live(&self) -> isize {
        self.live.load(Ordering::SeqCst)
    }

    /// Move attempts since construction or the last [`fail_on`](Self::fail_on).
    pub fn moves(&self) -> usize {
        self.moves.load(Ordering::SeqCst)
    }

    /// Total drops observed.
    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

/// Error raised by a [`Tracked`] move that was told to fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveFault {
    /// Which move attempt failed (1-based).
    pub attempt: usize,
    /// Value of the element that refused to move.
    pub value: u64,
}

impl fmt::Display for MoveFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "move attempt {} of element {} failed",
            self.attempt, self.value
        )
    }
}

impl Error for MoveFault {}

/// An element whose lifecycle is counted by a [`Ledger`].
#[derive(Debug)]
pub struct Tracked {
    value: u64,
    ledger: Arc<Ledger>,
}

impl Tracked {
    /// The payload.
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl MoveConstruct for Tracked {
    type Error = MoveFault;

    fn move_construct(src: &mut Self) -> Result<Self, MoveFault> {
        let attempt = src.ledger.moves.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == src.ledger.fail_on.load(Ordering::SeqCst) {
            return Err(MoveFault {
                attempt,
                value: src.value,
            });
        }
        Ok(src.ledger.track(src.value))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.live.fetch_sub(1, Ordering::SeqCst);
        self.ledger.drops.fetch_add(1, Ordering::SeqCst);
    }
}

reloc_core::move_relocatable!(Tracked);

/// A bitwise-relocatable element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Plain(pub u32);

reloc_core::trivially_relocatable!(unsafe Plain);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_counts_live_instances() {
        let ledger = Ledger::new();
        let a = ledger.track(1);
        let b = ledger.track(2);
        assert_eq!(ledger.live(), 2);
        drop(a);
        assert_eq!(ledger.live(), 1);
        drop(b);
        assert_eq!(ledger.live(), 0);
        assert_eq!(ledger.drops(), 2);
    }

    #[test]
    fn move_construct_adds_an_instance() {
        let ledger = Ledger::new();
        let mut src = ledger.track(5);
        let moved = Tracked::move_construct(&mut src).unwrap();
        assert_eq!(moved.value(), 5);
        assert_eq!(ledger.live(), 2);
        assert_eq!(ledger.moves(), 1);
    }

    #[test]
    fn kth_move_fails_once() {
        let ledger = Ledger::failing_on(2);
        let mut src = ledger.track(9);
        let _first = Tracked::move_construct(&mut src).unwrap();
        let err = Tracked::move_construct(&mut src).unwrap_err();
        assert_eq!(
            err,
            MoveFault {
                attempt: 2,
                value: 9
            }
        );
        assert!(Tracked::move_construct(&mut src).is_ok());
    }

    #[test]
    fn fail_on_resets_the_attempt_count() {
        let ledger = Ledger::new();
        let mut src = ledger.track(1);
        let _ = Tracked::move_construct(&mut src).unwrap();
        ledger.fail_on(1);
        assert_eq!(ledger.moves(), 0);
        assert!(Tracked::move_construct(&mut src).is_err());
    }
}
