//! Arbitrary-precision integer strategy.
//!
//! Entered whenever promotion selects the unlimited-width kind. Fixed-width
//! integral operands are widened to `bigint` (through `long`); every
//! operation delegates to the big-integer operation set, so nothing
//! overflows. Division truncates toward zero and fails on a zero divisor,
//! remainder takes the sign of the dividend, comparisons use three-way
//! comparison and equality is value equality.
//!
//! Two operations take an `int` operand instead of a `bigint`: the exponent
//! of `**` and the amount of a shift. Wider amounts are truncated to their
//! low 32 bits by the operation itself. `>>>` has no zero-fill form for an
//! unlimited width and performs the signed shift.

use tsbc_core::{BinaryOperator, CompilationError, NumericKind, Span, TypeKind};

use super::{
    ArithmeticOp, BitwiseOp, CompareOp, Comparand, Operation, ResolvedBinaryOp, ShiftOp,
    promotion_error,
};
use crate::conversion::promote_operand;
use crate::lattice::{PromotionError, unary_promote};

const BIG: NumericKind = NumericKind::BigInt;

pub(super) fn resolve_arithmetic(
    left: &TypeKind,
    right: &TypeKind,
    op: ArithmeticOp,
) -> ResolvedBinaryOp {
    ResolvedBinaryOp::promoted(
        left,
        right,
        BIG,
        Operation::Arithmetic { op, kind: BIG },
        TypeKind::BigInt,
    )
}

pub(super) fn resolve_bitwise(left: &TypeKind, right: &TypeKind, op: BitwiseOp) -> ResolvedBinaryOp {
    ResolvedBinaryOp::promoted(
        left,
        right,
        BIG,
        Operation::Bitwise { op, kind: BIG },
        TypeKind::BigInt,
    )
}

pub(super) fn resolve_compare(left: &TypeKind, right: &TypeKind, op: CompareOp) -> ResolvedBinaryOp {
    ResolvedBinaryOp::promoted(
        left,
        right,
        BIG,
        Operation::Compare {
            op,
            operands: Comparand::Numeric(BIG),
        },
        TypeKind::Boolean,
    )
}

/// `bigint` base raised to an integral exponent.
///
/// The base is widened to `bigint` even when only the exponent was one.
pub(super) fn resolve_power(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    if left.is_floating() || right.is_floating() {
        return Err(promotion_error(
            PromotionError::BigIntWithFloating,
            op,
            left,
            right,
            span,
        ));
    }
    let Some(r) = right.numeric_kind() else {
        return Err(promotion_error(PromotionError::NonNumeric, op, left, right, span));
    };

    let exponent = unary_promote(r);
    Ok(ResolvedBinaryOp {
        operating_type: TypeKind::BigInt,
        left_coercion: promote_operand(left, BIG),
        right_coercion: promote_operand(right, exponent),
        result_type: TypeKind::BigInt,
        operation: Operation::Power {
            kind: BIG,
            exponent,
        },
    })
}

pub(super) fn resolve_shift(
    left: &TypeKind,
    right: &TypeKind,
    op: ShiftOp,
    amount: NumericKind,
) -> ResolvedBinaryOp {
    let op = match op {
        ShiftOp::UnsignedRight => ShiftOp::Right,
        other => other,
    };
    ResolvedBinaryOp {
        operating_type: TypeKind::BigInt,
        left_coercion: promote_operand(left, BIG),
        right_coercion: promote_operand(right, amount),
        result_type: TypeKind::BigInt,
        operation: Operation::Shift {
            op,
            kind: BIG,
            amount,
        },
    }
}
