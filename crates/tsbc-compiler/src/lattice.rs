//! Numeric type lattice and binary promotion.
//!
//! The promotion rules live in [`PROMOTION_TABLE`], indexed by the
//! declaration order of [`NumericKind`]. Every lookup goes through the table
//! so the rules can be audited (and tested) one pair at a time.

use thiserror::Error;
use tsbc_core::{NumericKind, TypeKind};

/// The context a promotion is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionContext {
    /// Arithmetic, bitwise, relational and equality operands.
    BinaryNumeric,
    /// `+` where either side may be text.
    StringContext,
}

/// Why two types have no common operating type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromotionError {
    #[error("operands must be numeric")]
    NonNumeric,
    #[error(
        "in a binary numeric context, arbitrary-precision integers may combine only with other integral kinds"
    )]
    BigIntWithFloating,
}

use NumericKind::{BigInt as Big, Byte, Char, Double, Float, Int, Long, Short};

/// Binary numeric promotion, `PROMOTION_TABLE[left][right]`.
///
/// `None` marks the big-integer/floating-point pairs, which have no
/// operating type.
#[rustfmt::skip]
pub const PROMOTION_TABLE: [[Option<NumericKind>; 8]; 8] = [
    // byte
    [Some(Int), Some(Int), Some(Int), Some(Int), Some(Long), Some(Float), Some(Double), Some(Big)],
    // short
    [Some(Int), Some(Int), Some(Int), Some(Int), Some(Long), Some(Float), Some(Double), Some(Big)],
    // char
    [Some(Int), Some(Int), Some(Int), Some(Int), Some(Long), Some(Float), Some(Double), Some(Big)],
    // int
    [Some(Int), Some(Int), Some(Int), Some(Int), Some(Long), Some(Float), Some(Double), Some(Big)],
    // long
    [Some(Long), Some(Long), Some(Long), Some(Long), Some(Long), Some(Float), Some(Double), Some(Big)],
    // float
    [Some(Float), Some(Float), Some(Float), Some(Float), Some(Float), Some(Float), Some(Double), None],
    // double
    [Some(Double), Some(Double), Some(Double), Some(Double), Some(Double), Some(Double), Some(Double), None],
    // bigint
    [Some(Big), Some(Big), Some(Big), Some(Big), Some(Big), None, None, Some(Big)],
];

/// Promote a pair of numeric kinds to their operating kind.
#[inline]
pub fn promote_numeric(left: NumericKind, right: NumericKind) -> Result<NumericKind, PromotionError> {
    PROMOTION_TABLE[left as usize][right as usize].ok_or(PromotionError::BigIntWithFloating)
}

/// Promotion of a single operand (shift operands, exponents).
///
/// `byte`, `short` and `char` become `int`; everything else is unchanged.
#[inline]
pub fn unary_promote(kind: NumericKind) -> NumericKind {
    match kind {
        Byte | Short | Char => Int,
        other => other,
    }
}

/// Promote two static types in the given context.
///
/// Boxed operands are looked up through their primitive counterpart; the
/// caller is responsible for emitting the unbox step.
pub fn promote(
    left: &TypeKind,
    right: &TypeKind,
    context: PromotionContext,
) -> Result<TypeKind, PromotionError> {
    if context == PromotionContext::StringContext
        && (*left == TypeKind::String || *right == TypeKind::String)
    {
        return Ok(TypeKind::String);
    }
    let (Some(l), Some(r)) = (left.numeric_kind(), right.numeric_kind()) else {
        return Err(PromotionError::NonNumeric);
    };
    promote_numeric(l, r).map(NumericKind::primitive)
}

/// Whether `from` converts to `to` without a narrowing step.
///
/// Follows the target runtime: `byte`/`short` do not widen to `char` and
/// `char` does not widen to `byte`/`short`. Every fixed-width integral
/// kind widens to the big integer; floating kinds do not.
pub fn widens_to(from: NumericKind, to: NumericKind) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (Byte, Short) => true,
        (Byte | Short | Char, Int | Long | Float | Double | Big) => true,
        (Int, Long | Float | Double | Big) => true,
        (Long, Float | Double | Big) => true,
        (Float, Double) => true,
        _ => false,
    }
}
