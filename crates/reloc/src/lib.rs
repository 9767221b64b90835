//! Failure-safe relocation of object ranges into raw storage.
//!
//! A relocation moves a live value into raw storage and leaves the source
//! raw, as one step. This crate relocates whole ranges, forward or backward,
//! with overlapping source and destination, and guarantees that a failing
//! element step leaves no live element in either range.
//!
//! # Architecture
//!
//! ```text
//! relocate / relocate_n           relocate_backward
//!        │ (increasing order)            │ (decreasing order)
//!        └──────────────┬────────────────┘
//!                       ├── precondition: overlap direction (contiguous only)
//!                       ├── bulk: one ptr::copy   (contiguous + Bitwise)
//!                       └── loop under RollbackGuard
//!                             └── relocate_at / Strategy::{construct, retire}
//! ```
//!
//! # Choosing a direction
//!
//! - Destination at or below the source (closing a gap, erasing): forward.
//! - Destination at or above the source (opening a gap, inserting): backward.
//! - Disjoint ranges: either.
//!
//! # Caller contract
//!
//! The relocators never allocate and never touch a caller's length fields.
//! After a failure the caller must record that the source range and the
//! destination range are both raw.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod backward;
mod bulk;
pub mod forward;
mod guard;
mod precondition;
pub mod raw;
pub mod slice;
pub mod slot;

// Public re-exports for the primary API surface.
pub use backward::relocate_backward;
pub use forward::{relocate, relocate_n};
pub use raw::relocate_at;
pub use slice::{shift_left, shift_right};
pub use slot::{SinglePass, SlotPtr, SlotTable};

pub use reloc_core::{
    move_relocatable, trivially_relocatable, BidirectionalCursor, Bitwise, Cursor,
    CursorCategory, MoveConstruct, MoveThenDrop, NoThrowCursor, RelocError, Relocate,
    RelocationFailed, Strategy, StrategyKind, TriviallyRelocatable,
};
