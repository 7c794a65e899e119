//! Numeric conversions between primitive kinds.

use tsbc_core::NumericKind;

use super::CoercionStep;
use crate::lattice::widens_to;

/// The single numeric step converting `from` to `to`.
///
/// Returns `None` when the kinds are equal. Pairs the lattice does not
/// consider widening produce a [`CoercionStep::Narrow`].
pub fn numeric_step(from: NumericKind, to: NumericKind) -> Option<CoercionStep> {
    if from == to {
        None
    } else if widens_to(from, to) {
        Some(CoercionStep::Widen { from, to })
    } else {
        Some(CoercionStep::Narrow { from, to })
    }
}

/// Widening step into an operating kind, `None` for identity.
///
/// Callers only pass pairs produced by promotion, so a narrowing result here
/// is a resolver bug and is reported as `None` with a debug assertion.
pub fn widening_step(from: NumericKind, to: NumericKind) -> Option<CoercionStep> {
    debug_assert!(widens_to(from, to), "{} does not widen to {}", from, to);
    numeric_step(from, to)
}
