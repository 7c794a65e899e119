//! Equality operators (`==`, `!=`, `===`, `!==`).

use tsbc_core::{BinaryOperator, CompilationError, NumericKind, Span, TypeKind};

use super::{
    CompareOp, Comparand, Operation, ResolvedBinaryOp, bigint, primitive::operating_kind,
};
use crate::conversion::{CoercionStep, box_operand};

pub(super) fn resolve_equality(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    let cmp = if op.is_negated() {
        CompareOp::Ne
    } else {
        CompareOp::Eq
    };

    // Numeric pairs, boxed or not, compare promoted values.
    if left.is_numeric() && right.is_numeric() {
        let kind = operating_kind(left, right, op, span)?;
        if kind == NumericKind::BigInt {
            return Ok(bigint::resolve_compare(left, right, cmp));
        }
        return Ok(ResolvedBinaryOp::promoted(
            left,
            right,
            kind,
            Operation::Compare {
                op: cmp,
                operands: Comparand::Numeric(kind),
            },
            TypeKind::Boolean,
        ));
    }

    if left.is_boolean() && right.is_boolean() {
        let unbox = |ty: &TypeKind| {
            if ty.is_boxed() {
                vec![CoercionStep::Unbox(TypeKind::Boolean)]
            } else {
                Vec::new()
            }
        };
        return Ok(ResolvedBinaryOp {
            operating_type: TypeKind::Boolean,
            left_coercion: unbox(left),
            right_coercion: unbox(right),
            result_type: TypeKind::Boolean,
            operation: Operation::Compare {
                op: cmp,
                operands: Comparand::Boolean,
            },
        });
    }

    let null_vs_primitive = (*left == TypeKind::Null && right.is_primitive())
        || (*right == TypeKind::Null && left.is_primitive());
    if null_vs_primitive {
        return Err(CompilationError::static_type(
            op,
            left,
            right,
            "a primitive value is never null",
            span,
        ));
    }

    let strict = matches!(op, BinaryOperator::StrictEq | BinaryOperator::StrictNotEq);
    if strict && !identical_reference_types(left, right) {
        return Err(CompilationError::static_type(
            op,
            left,
            right,
            "strict equality requires identical reference types",
            span,
        ));
    }

    Ok(ResolvedBinaryOp {
        operating_type: TypeKind::Object,
        left_coercion: box_operand(left),
        right_coercion: box_operand(right),
        result_type: TypeKind::Boolean,
        operation: Operation::Compare {
            op: cmp,
            operands: Comparand::Reference,
        },
    })
}

fn identical_reference_types(left: &TypeKind, right: &TypeKind) -> bool {
    if left.is_primitive() || right.is_primitive() {
        return false;
    }
    left == right || *left == TypeKind::Null || *right == TypeKind::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbc_core::ClassId;

    fn eq(left: TypeKind, op: BinaryOperator, right: TypeKind) -> Result<ResolvedBinaryOp, CompilationError> {
        resolve_equality(&left, &right, op, Span::default())
    }

    #[test]
    fn numeric_equality_promotes() {
        let resolved = eq(TypeKind::Int, BinaryOperator::Eq, TypeKind::Double).unwrap();
        assert_eq!(
            resolved.operation,
            Operation::Compare {
                op: CompareOp::Eq,
                operands: Comparand::Numeric(NumericKind::Double)
            }
        );
        assert_eq!(resolved.result_type, TypeKind::Boolean);
    }

    #[test]
    fn strict_equality_allows_boxed_numeric_pairs() {
        let resolved = eq(TypeKind::BoxedInt, BinaryOperator::StrictEq, TypeKind::Int).unwrap();
        assert_eq!(resolved.left_coercion, vec![CoercionStep::Unbox(TypeKind::Int)]);
        assert!(resolved.right_coercion.is_empty());
    }

    #[test]
    fn not_equal_is_negated_compare() {
        let resolved = eq(TypeKind::Long, BinaryOperator::StrictNotEq, TypeKind::Long).unwrap();
        assert_eq!(
            resolved.operation,
            Operation::Compare {
                op: CompareOp::Ne,
                operands: Comparand::Numeric(NumericKind::Long)
            }
        );
    }

    #[test]
    fn boolean_equality() {
        let resolved = eq(TypeKind::BoxedBoolean, BinaryOperator::Eq, TypeKind::Boolean).unwrap();
        assert_eq!(resolved.left_coercion, vec![CoercionStep::Unbox(TypeKind::Boolean)]);
        assert_eq!(
            resolved.operation,
            Operation::Compare {
                op: CompareOp::Eq,
                operands: Comparand::Boolean
            }
        );
    }

    #[test]
    fn reference_equality_is_value_equality() {
        let resolved = eq(TypeKind::String, BinaryOperator::Eq, TypeKind::Object).unwrap();
        assert_eq!(
            resolved.operation,
            Operation::Compare {
                op: CompareOp::Eq,
                operands: Comparand::Reference
            }
        );
    }

    #[test]
    fn loose_equality_boxes_primitive_side() {
        let resolved = eq(TypeKind::Int, BinaryOperator::NotEq, TypeKind::String).unwrap();
        assert_eq!(resolved.left_coercion, vec![CoercionStep::Box(TypeKind::BoxedInt)]);
    }

    #[test]
    fn strict_equality_requires_identical_references() {
        assert!(eq(TypeKind::String, BinaryOperator::StrictEq, TypeKind::Object).is_err());
        assert!(eq(TypeKind::Int, BinaryOperator::StrictEq, TypeKind::String).is_err());
        assert!(eq(TypeKind::String, BinaryOperator::StrictEq, TypeKind::String).is_ok());
        assert!(eq(TypeKind::Null, BinaryOperator::StrictEq, TypeKind::String).is_ok());
        let list = TypeKind::Reference(ClassId::LIST);
        assert!(eq(list.clone(), BinaryOperator::StrictNotEq, list).is_ok());
    }

    #[test]
    fn boxed_null_check_is_reference_comparison() {
        let resolved = eq(TypeKind::BoxedInt, BinaryOperator::Eq, TypeKind::Null).unwrap();
        assert!(resolved.left_coercion.is_empty());
        assert_eq!(
            resolved.operation,
            Operation::Compare {
                op: CompareOp::Eq,
                operands: Comparand::Reference
            }
        );
    }

    #[test]
    fn primitive_against_null_is_rejected() {
        let err = eq(TypeKind::Int, BinaryOperator::Eq, TypeKind::Null).unwrap_err();
        assert!(err.to_string().contains("never null"));
    }
}
