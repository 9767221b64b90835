//! Error types for relocation.
//!
//! Only one failure is reportable: an element's move step failed. By the
//! time a caller sees [`RelocationFailed`] every element of both ranges has
//! already been destroyed. Precondition violations (wrong-direction overlap)
//! are not errors; they panic.

use std::convert::Infallible;
use std::error::Error;
use std::fmt;

/// A relocation step failed and both ranges were rolled back.
///
/// `index` is the position of the failing element in traversal order
/// (0 is the first element processed, which for backward relocation is the
/// last element of the range). `reason` is the error returned by the
/// element's move step, passed through unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelocationFailed<E> {
    /// Traversal index of the element whose move step failed.
    pub index: usize,
    /// The error raised by the element's move step.
    pub reason: E,
}

impl<E> RelocationFailed<E> {
    /// Wrap an element error raised at `index`.
    pub fn new(index: usize, reason: E) -> Self {
        Self { index, reason }
    }

    /// Convert the element error, keeping the index.
    pub fn map_reason<F>(self, f: impl FnOnce(E) -> F) -> RelocationFailed<F> {
        RelocationFailed {
            index: self.index,
            reason: f(self.reason),
        }
    }
}

impl RelocationFailed<Infallible> {
    /// Statically discharge the error of an infallible relocation.
    pub fn unreachable(self) -> ! {
        match self.reason {}
    }
}

impl<E: fmt::Display> fmt::Display for RelocationFailed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "relocation of element {} failed: {}",
            self.index, self.reason
        )
    }
}

impl<E: Error + 'static> Error for RelocationFailed<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.reason)
    }
}
