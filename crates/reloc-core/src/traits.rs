//! What it means for a type to be relocatable.
//!
//! A relocation moves a live value into raw storage and leaves the source
//! slot raw, as one step. Types opt in through [`Relocate`], naming one of two
//! strategies:
//!
//! - [`Bitwise`](crate::Bitwise): the type implements
//!   [`TriviallyRelocatable`]. Relocation is a byte copy and never fails, so
//!   contiguous ranges collapse into a single memory move.
//! - [`MoveThenDrop`](crate::MoveThenDrop): the type implements
//!   [`MoveConstruct`]. Relocation runs the type's move constructor and then
//!   drops the moved-from source. The move constructor may fail.

use std::mem::MaybeUninit;
use std::ptr::NonNull;

use crate::strategy::{Bitwise, Strategy};

/// A fallible move constructor.
///
/// `move_construct` builds a new value out of `src`. On `Ok`, `src` is left
/// in a moved-from state that is still safe to drop; the relocation machinery
/// drops it immediately. On `Err`, `src` must be left exactly as it was.
pub trait MoveConstruct: Sized {
    /// Error raised when the move step fails.
    type Error;

    /// Construct a new value from `src`, leaving `src` moved-from.
    fn move_construct(src: &mut Self) -> Result<Self, Self::Error>;
}

/// Marker for types whose relocation is a plain byte copy.
///
/// # Safety
///
/// Implementors promise that copying the bytes of a live value to new storage
/// and then treating the old bytes as raw (never dropping them) yields a
/// valid value with no observable difference from a move. Types holding
/// pointers into themselves, or registering their own address elsewhere,
/// must not implement this trait.
pub unsafe trait TriviallyRelocatable: Sized {}

/// Selects how values of a type are relocated.
///
/// ```
/// use reloc_core::{MoveConstruct, MoveThenDrop, Relocate, Strategy, StrategyKind};
///
/// struct Account {
///     balance: u64,
/// }
///
/// impl MoveConstruct for Account {
///     type Error = std::convert::Infallible;
///
///     fn move_construct(src: &mut Self) -> Result<Self, Self::Error> {
///         Ok(Account { balance: std::mem::take(&mut src.balance) })
///     }
/// }
///
/// impl Relocate for Account {
///     type Strategy = MoveThenDrop;
/// }
///
/// assert_eq!(
///     <MoveThenDrop as Strategy<Account>>::KIND,
///     StrategyKind::MoveThenDrop
/// );
/// ```
pub trait Relocate: Sized {
    /// The relocation strategy tag: [`Bitwise`] or
    /// [`MoveThenDrop`](crate::MoveThenDrop).
    type Strategy: Strategy<Self>;
}

/// The error a single relocation of `T` can raise.
pub type RelocError<T> = <<T as Relocate>::Strategy as Strategy<T>>::Error;

/// Declare types trivially relocatable.
///
/// Implements [`TriviallyRelocatable`] and [`Relocate`] with the
/// [`Bitwise`] strategy. The leading `unsafe` acknowledges the
/// [`TriviallyRelocatable`] contract.
///
/// ```
/// use reloc_core::{Relocate, Strategy, StrategyKind};
///
/// #[derive(Clone, Copy)]
/// struct Point {
///     x: f32,
///     y: f32,
/// }
///
/// reloc_core::trivially_relocatable!(unsafe Point);
///
/// assert_eq!(
///     <<Point as Relocate>::Strategy as Strategy<Point>>::KIND,
///     StrategyKind::Bitwise
/// );
/// ```
#[macro_export]
macro_rules! trivially_relocatable {
    (unsafe $($t:ty),+ $(,)?) => {
        $(
            unsafe impl $crate::TriviallyRelocatable for $t {}

            impl $crate::Relocate for $t {
                type Strategy = $crate::Bitwise;
            }
        )+
    };
}

trivially_relocatable!(
    unsafe (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
);

macro_rules! generic_bitwise {
    ($(<$($p:ident $(: $bound:path)?),*> $t:ty;)+) => {
        $(
            // SAFETY: none of these types observe their own address.
            unsafe impl<$($p $(: $bound)?),*> TriviallyRelocatable for $t {}

            impl<$($p $(: $bound)?),*> Relocate for $t {
                type Strategy = Bitwise;
            }
        )+
    };
}

generic_bitwise! {
    <T> *const T;
    <T> *mut T;
    <T> NonNull<T>;
    <T> Box<T>;
    <T> Vec<T>;
    <T> MaybeUninit<T>;
    <T: TriviallyRelocatable> Option<T>;
}

// SAFETY: an array of bitwise-relocatable elements is relocated by copying
// each element's bytes.
unsafe impl<T: TriviallyRelocatable, const N: usize> TriviallyRelocatable for [T; N] {}

impl<T: TriviallyRelocatable, const N: usize> Relocate for [T; N] {
    type Strategy = Bitwise;
}

macro_rules! tuple_bitwise {
    ($(($($p:ident),+))+) => {
        $(
            // SAFETY: a tuple is bitwise relocatable when every field is.
            unsafe impl<$($p: TriviallyRelocatable),+> TriviallyRelocatable for ($($p,)+) {}

            impl<$($p: TriviallyRelocatable),+> Relocate for ($($p,)+) {
                type Strategy = Bitwise;
            }
        )+
    };
}

tuple_bitwise! {
    (A)
    (A, B)
    (A, B, C)
    (A, B, C, D)
    (A, B, C, D, E)
    (A, B, C, D, E, F)
}

/// Convenience for implementing [`Relocate`] on a [`MoveConstruct`] type.
///
/// ```
/// use reloc_core::{MoveConstruct, RelocError};
///
/// struct Handle(Option<u32>);
///
/// impl MoveConstruct for Handle {
///     type Error = &'static str;
///
///     fn move_construct(src: &mut Self) -> Result<Self, Self::Error> {
///         src.0.take().map(|id| Handle(Some(id))).ok_or("handle already moved")
///     }
/// }
///
/// reloc_core::move_relocatable!(Handle);
///
/// let reason: RelocError<Handle> = "handle already moved";
/// assert_eq!(reason, "handle already moved");
/// ```
#[macro_export]
macro_rules! move_relocatable {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::Relocate for $t {
                type Strategy = $crate::MoveThenDrop;
            }
        )+
    };
}
