//! Core traits, capability tags and error types for `reloc`.
//!
//! This is the leaf crate of the workspace. It defines what it means for a
//! type to be relocatable, how positions in slot storage are described, and
//! the error a failed relocation reports. The algorithms themselves live in
//! the `reloc` crate.
//!
//! # Capability tags
//!
//! Every dispatch decision is made on a small closed set of statically
//! resolved tags, never on runtime state:
//!
//! ```text
//! Relocate::Strategy ── Bitwise       (TriviallyRelocatable types, bulk-copy eligible)
//!                    └─ MoveThenDrop  (MoveConstruct types, may fail per element)
//!
//! Cursor::CATEGORY   ── SinglePass ⊂ Bidirectional ⊂ Contiguous
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod cursor;
pub mod error;
pub mod strategy;
pub mod traits;

pub use cursor::{BidirectionalCursor, Cursor, CursorCategory, NoThrowCursor};
pub use error::RelocationFailed;
pub use strategy::{Bitwise, MoveThenDrop, Strategy, StrategyKind};
pub use traits::{MoveConstruct, RelocError, Relocate, TriviallyRelocatable};
