//! Numeric operator resolution.
//!
//! Handles arithmetic, exponent, bitwise, shift and relational operators on
//! primitive and boxed numeric operands. Promotion that lands on the
//! unlimited-width kind is handed to the big-integer strategy.

use tsbc_core::{BinaryOperator, CompilationError, NumericKind, Span, TypeKind, TypeTraits};

use super::{
    ArithmeticOp, BitwiseOp, CompareOp, Comparand, Operation, ResolvedBinaryOp, ShiftOp, bigint,
    promotion_error,
};
use crate::conversion::{CoercionStep, promote_operand};
use crate::lattice::{PromotionContext, PromotionError, promote, promote_numeric, unary_promote};

pub(super) fn resolve_arithmetic(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    if op == BinaryOperator::Add
        && promote(left, right, PromotionContext::StringContext) == Ok(TypeKind::String)
    {
        return Ok(resolve_concat(left, right));
    }

    let kind = operating_kind(left, right, op, span)?;
    let arith = arithmetic_op(op);
    if kind == NumericKind::BigInt {
        return Ok(bigint::resolve_arithmetic(left, right, arith));
    }

    Ok(ResolvedBinaryOp::promoted(
        left,
        right,
        kind,
        Operation::Arithmetic { op: arith, kind },
        kind.primitive(),
    ))
}

fn resolve_concat(left: &TypeKind, right: &TypeKind) -> ResolvedBinaryOp {
    let to_text = |ty: &TypeKind| {
        if *ty == TypeKind::String {
            Vec::new()
        } else {
            vec![CoercionStep::ToStringConv]
        }
    };
    ResolvedBinaryOp {
        operating_type: TypeKind::String,
        left_coercion: to_text(left),
        right_coercion: to_text(right),
        result_type: TypeKind::String,
        operation: Operation::Concat,
    }
}

pub(super) fn resolve_power(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    let (Some(l), Some(r)) = (left.numeric_kind(), right.numeric_kind()) else {
        return Err(promotion_error(PromotionError::NonNumeric, op, left, right, span));
    };

    if l == NumericKind::BigInt || r == NumericKind::BigInt {
        return bigint::resolve_power(left, right, op, span);
    }

    let kind = NumericKind::Double;
    Ok(ResolvedBinaryOp::promoted(
        left,
        right,
        kind,
        Operation::Power {
            kind,
            exponent: kind,
        },
        TypeKind::Double,
    ))
}

pub(super) fn resolve_bitwise(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    require_integral(left, right, op, span)?;
    let kind = operating_kind(left, right, op, span)?;
    let bit_op = match op {
        BinaryOperator::BitAnd => BitwiseOp::And,
        BinaryOperator::BitOr => BitwiseOp::Or,
        _ => BitwiseOp::Xor,
    };
    if kind == NumericKind::BigInt {
        return Ok(bigint::resolve_bitwise(left, right, bit_op));
    }

    Ok(ResolvedBinaryOp::promoted(
        left,
        right,
        kind,
        Operation::Bitwise { op: bit_op, kind },
        kind.primitive(),
    ))
}

/// Shifts: the left operand alone picks the operating type; the amount is
/// promoted on its own.
pub(super) fn resolve_shift(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    require_integral(left, right, op, span)?;
    let (Some(l), Some(r)) = (left.numeric_kind(), right.numeric_kind()) else {
        return Err(promotion_error(PromotionError::NonNumeric, op, left, right, span));
    };

    let kind = unary_promote(l);
    let amount = unary_promote(r);
    let shift_op = match op {
        BinaryOperator::Shl => ShiftOp::Left,
        BinaryOperator::Shr => ShiftOp::Right,
        _ => ShiftOp::UnsignedRight,
    };
    if kind == NumericKind::BigInt {
        return Ok(bigint::resolve_shift(left, right, shift_op, amount));
    }

    Ok(ResolvedBinaryOp {
        operating_type: kind.primitive(),
        left_coercion: promote_operand(left, kind),
        right_coercion: promote_operand(right, amount),
        result_type: kind.primitive(),
        operation: Operation::Shift {
            op: shift_op,
            kind,
            amount,
        },
    })
}

pub(super) fn resolve_relational(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    let kind = operating_kind(left, right, op, span)?;
    let cmp = match op {
        BinaryOperator::Lt => CompareOp::Lt,
        BinaryOperator::Le => CompareOp::Le,
        BinaryOperator::Gt => CompareOp::Gt,
        _ => CompareOp::Ge,
    };
    if kind == NumericKind::BigInt {
        return Ok(bigint::resolve_compare(left, right, cmp));
    }

    Ok(ResolvedBinaryOp::promoted(
        left,
        right,
        kind,
        Operation::Compare {
            op: cmp,
            operands: Comparand::Numeric(kind),
        },
        TypeKind::Boolean,
    ))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Binary numeric promotion of two static types.
pub(super) fn operating_kind(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<NumericKind, CompilationError> {
    let (Some(l), Some(r)) = (left.numeric_kind(), right.numeric_kind()) else {
        return Err(promotion_error(PromotionError::NonNumeric, op, left, right, span));
    };
    promote_numeric(l, r).map_err(|err| promotion_error(err, op, left, right, span))
}

fn require_integral(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<(), CompilationError> {
    if (left.traits() | right.traits()).contains(TypeTraits::FLOATING) {
        return Err(CompilationError::static_type(
            op,
            left,
            right,
            "operands must be integral",
            span,
        ));
    }
    Ok(())
}

fn arithmetic_op(op: BinaryOperator) -> ArithmeticOp {
    match op {
        BinaryOperator::Add => ArithmeticOp::Add,
        BinaryOperator::Sub => ArithmeticOp::Sub,
        BinaryOperator::Mul => ArithmeticOp::Mul,
        BinaryOperator::Div => ArithmeticOp::Div,
        _ => ArithmeticOp::Mod,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(1, 1, 5)
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    #[test]
    fn int_add() {
        let resolved =
            resolve_arithmetic(&TypeKind::Int, &TypeKind::Int, BinaryOperator::Add, span()).unwrap();
        assert_eq!(
            resolved,
            ResolvedBinaryOp {
                operating_type: TypeKind::Int,
                left_coercion: vec![],
                right_coercion: vec![],
                result_type: TypeKind::Int,
                operation: Operation::Arithmetic {
                    op: ArithmeticOp::Add,
                    kind: NumericKind::Int
                },
            }
        );
    }

    #[test]
    fn byte_times_byte_is_int() {
        let resolved =
            resolve_arithmetic(&TypeKind::Byte, &TypeKind::Byte, BinaryOperator::Mul, span()).unwrap();
        assert_eq!(resolved.result_type, TypeKind::Int);
        assert_eq!(
            resolved.left_coercion,
            vec![CoercionStep::Widen {
                from: NumericKind::Byte,
                to: NumericKind::Int
            }]
        );
    }

    #[test]
    fn long_and_float_operate_in_float() {
        let resolved =
            resolve_arithmetic(&TypeKind::Long, &TypeKind::Float, BinaryOperator::Div, span()).unwrap();
        assert_eq!(resolved.operating_type, TypeKind::Float);
        assert_eq!(
            resolved.left_coercion,
            vec![CoercionStep::Widen {
                from: NumericKind::Long,
                to: NumericKind::Float
            }]
        );
    }

    #[test]
    fn concat_converts_only_non_text_side() {
        let resolved =
            resolve_arithmetic(&TypeKind::Char, &TypeKind::String, BinaryOperator::Add, span()).unwrap();
        assert_eq!(resolved.left_coercion, vec![CoercionStep::ToStringConv]);
        assert!(resolved.right_coercion.is_empty());
    }

    #[test]
    fn subtraction_has_no_string_context() {
        let err = resolve_arithmetic(&TypeKind::String, &TypeKind::Int, BinaryOperator::Sub, span())
            .unwrap_err();
        assert!(matches!(err, CompilationError::StaticType { .. }));
    }

    #[test]
    fn boolean_arithmetic_is_rejected() {
        assert!(
            resolve_arithmetic(&TypeKind::Boolean, &TypeKind::Int, BinaryOperator::Add, span()).is_err()
        );
    }

    // =========================================================================
    // Exponent
    // =========================================================================

    #[test]
    fn int_power_is_double() {
        let resolved =
            resolve_power(&TypeKind::Int, &TypeKind::Int, BinaryOperator::Exp, span()).unwrap();
        assert_eq!(resolved.result_type, TypeKind::Double);
        assert_eq!(
            resolved.operation,
            Operation::Power {
                kind: NumericKind::Double,
                exponent: NumericKind::Double
            }
        );
        assert_eq!(
            resolved.right_coercion,
            vec![CoercionStep::Widen {
                from: NumericKind::Int,
                to: NumericKind::Double
            }]
        );
    }

    // =========================================================================
    // Bitwise and shifts
    // =========================================================================

    #[test]
    fn bitwise_on_float_is_rejected() {
        let err = resolve_bitwise(&TypeKind::Float, &TypeKind::Int, BinaryOperator::BitOr, span())
            .unwrap_err();
        assert!(err.to_string().contains("integral"));
    }

    #[test]
    fn bitwise_int_long() {
        let resolved =
            resolve_bitwise(&TypeKind::Int, &TypeKind::BoxedLong, BinaryOperator::BitXor, span())
                .unwrap();
        assert_eq!(resolved.result_type, TypeKind::Long);
        assert_eq!(
            resolved.operation,
            Operation::Bitwise {
                op: BitwiseOp::Xor,
                kind: NumericKind::Long
            }
        );
    }

    #[test]
    fn shift_type_follows_left_operand() {
        let resolved =
            resolve_shift(&TypeKind::Int, &TypeKind::Long, BinaryOperator::Shl, span()).unwrap();
        assert_eq!(resolved.result_type, TypeKind::Int);
        assert!(resolved.right_coercion.is_empty());
        assert_eq!(
            resolved.operation,
            Operation::Shift {
                op: ShiftOp::Left,
                kind: NumericKind::Int,
                amount: NumericKind::Long
            }
        );

        let resolved =
            resolve_shift(&TypeKind::Long, &TypeKind::Short, BinaryOperator::UShr, span()).unwrap();
        assert_eq!(resolved.result_type, TypeKind::Long);
        assert_eq!(
            resolved.right_coercion,
            vec![CoercionStep::Widen {
                from: NumericKind::Short,
                to: NumericKind::Int
            }]
        );
    }

    #[test]
    fn shift_of_byte_is_int() {
        let resolved =
            resolve_shift(&TypeKind::BoxedByte, &TypeKind::Int, BinaryOperator::Shr, span()).unwrap();
        assert_eq!(resolved.result_type, TypeKind::Int);
        assert_eq!(resolved.left_coercion.len(), 2);
    }

    #[test]
    fn shift_of_double_is_rejected() {
        assert!(resolve_shift(&TypeKind::Double, &TypeKind::Int, BinaryOperator::Shl, span()).is_err());
        assert!(resolve_shift(&TypeKind::Int, &TypeKind::Float, BinaryOperator::Shl, span()).is_err());
    }

    // =========================================================================
    // Relational
    // =========================================================================

    #[test]
    fn relational_result_is_boolean() {
        let resolved =
            resolve_relational(&TypeKind::Char, &TypeKind::Double, BinaryOperator::Le, span()).unwrap();
        assert_eq!(resolved.result_type, TypeKind::Boolean);
        assert_eq!(resolved.operating_type, TypeKind::Double);
        assert_eq!(
            resolved.operation,
            Operation::Compare {
                op: CompareOp::Le,
                operands: Comparand::Numeric(NumericKind::Double)
            }
        );
    }

    #[test]
    fn relational_on_strings_is_rejected() {
        assert!(
            resolve_relational(&TypeKind::String, &TypeKind::String, BinaryOperator::Lt, span()).is_err()
        );
    }
}
