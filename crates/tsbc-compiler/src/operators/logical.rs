//! Short-circuit operators (`&&`, `||`, `??`).
//!
//! These never fail to resolve: when the branch types have no closer common
//! type the result is `Object` and primitive branches are boxed.

use tsbc_core::{BinaryOperator, TypeKind};

use super::{LogicalOp, Operation, ResolvedBinaryOp};
use crate::conversion::{CoercionStep, box_operand, promote_operand};
use crate::lattice::promote_numeric;

/// `&&`/`||`: the result is the least upper bound of both branch types.
pub(super) fn resolve_logical(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
) -> ResolvedBinaryOp {
    let logical = if op == BinaryOperator::LogicalAnd {
        LogicalOp::And
    } else {
        LogicalOp::Or
    };
    let operation = Operation::Logical(logical);

    if left.is_boolean() && right.is_boolean() {
        let unbox = |ty: &TypeKind| {
            if ty.is_boxed() {
                vec![CoercionStep::Unbox(TypeKind::Boolean)]
            } else {
                Vec::new()
            }
        };
        return ResolvedBinaryOp {
            operating_type: TypeKind::Boolean,
            left_coercion: unbox(left),
            right_coercion: unbox(right),
            result_type: TypeKind::Boolean,
            operation,
        };
    }

    if left == right {
        return ResolvedBinaryOp {
            operating_type: left.clone(),
            left_coercion: Vec::new(),
            right_coercion: Vec::new(),
            result_type: left.clone(),
            operation,
        };
    }

    if let (Some(l), Some(r)) = (left.numeric_kind(), right.numeric_kind())
        && let Ok(kind) = promote_numeric(l, r)
    {
        return ResolvedBinaryOp::promoted(left, right, kind, operation, kind.primitive());
    }

    ResolvedBinaryOp {
        operating_type: TypeKind::Object,
        left_coercion: box_operand(left),
        right_coercion: box_operand(right),
        result_type: TypeKind::Object,
        operation,
    }
}

/// `??`: the right operand only runs when the left is a null reference.
pub(super) fn resolve_nullish(left: &TypeKind, right: &TypeKind) -> ResolvedBinaryOp {
    if left.is_statically_non_null() {
        return ResolvedBinaryOp {
            operating_type: left.clone(),
            left_coercion: Vec::new(),
            right_coercion: Vec::new(),
            result_type: left.clone(),
            operation: Operation::Nullish {
                right_reachable: false,
            },
        };
    }

    let (result, right_coercion) = if left == right || *right == TypeKind::Null {
        (left.clone(), Vec::new())
    } else if *left == TypeKind::Null {
        (right.boxed(), box_operand(right))
    } else if left.is_boxed() && left.unboxed() == right.unboxed() {
        (left.clone(), box_operand(right))
    } else {
        (TypeKind::Object, box_operand(right))
    };

    ResolvedBinaryOp {
        operating_type: result.clone(),
        left_coercion: Vec::new(),
        right_coercion,
        result_type: result,
        operation: Operation::Nullish {
            right_reachable: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbc_core::NumericKind;

    // =========================================================================
    // Logical
    // =========================================================================

    #[test]
    fn boolean_operands() {
        let resolved =
            resolve_logical(&TypeKind::Boolean, &TypeKind::BoxedBoolean, BinaryOperator::LogicalAnd);
        assert_eq!(resolved.result_type, TypeKind::Boolean);
        assert_eq!(resolved.right_coercion, vec![CoercionStep::Unbox(TypeKind::Boolean)]);
        assert_eq!(resolved.operation, Operation::Logical(LogicalOp::And));
    }

    #[test]
    fn same_type_is_kept() {
        let resolved = resolve_logical(&TypeKind::String, &TypeKind::String, BinaryOperator::LogicalOr);
        assert_eq!(resolved.result_type, TypeKind::String);
        assert!(resolved.left_coercion.is_empty());
    }

    #[test]
    fn numeric_branches_promote() {
        let resolved = resolve_logical(&TypeKind::Int, &TypeKind::Double, BinaryOperator::LogicalOr);
        assert_eq!(resolved.result_type, TypeKind::Double);
        assert_eq!(
            resolved.left_coercion,
            vec![CoercionStep::Widen {
                from: NumericKind::Int,
                to: NumericKind::Double
            }]
        );
    }

    #[test]
    fn mixed_branches_are_objects() {
        let resolved = resolve_logical(&TypeKind::Int, &TypeKind::String, BinaryOperator::LogicalAnd);
        assert_eq!(resolved.result_type, TypeKind::Object);
        assert_eq!(resolved.left_coercion, vec![CoercionStep::Box(TypeKind::BoxedInt)]);
        assert!(resolved.right_coercion.is_empty());

        let resolved = resolve_logical(&TypeKind::BigInt, &TypeKind::Double, BinaryOperator::LogicalOr);
        assert_eq!(resolved.result_type, TypeKind::Object);
    }

    // =========================================================================
    // Nullish
    // =========================================================================

    #[test]
    fn non_null_left_makes_right_unreachable() {
        let resolved = resolve_nullish(&TypeKind::Int, &TypeKind::Int);
        assert_eq!(
            resolved.operation,
            Operation::Nullish {
                right_reachable: false
            }
        );
        assert_eq!(resolved.result_type, TypeKind::Int);
    }

    #[test]
    fn boxed_left_with_matching_primitive_right() {
        let resolved = resolve_nullish(&TypeKind::BoxedInt, &TypeKind::Int);
        assert_eq!(resolved.result_type, TypeKind::BoxedInt);
        assert_eq!(resolved.right_coercion, vec![CoercionStep::Box(TypeKind::BoxedInt)]);
    }

    #[test]
    fn null_sides() {
        let resolved = resolve_nullish(&TypeKind::Null, &TypeKind::Long);
        assert_eq!(resolved.result_type, TypeKind::BoxedLong);

        let resolved = resolve_nullish(&TypeKind::String, &TypeKind::Null);
        assert_eq!(resolved.result_type, TypeKind::String);
        assert!(resolved.right_coercion.is_empty());
    }

    #[test]
    fn unrelated_sides_are_objects() {
        let resolved = resolve_nullish(&TypeKind::String, &TypeKind::Int);
        assert_eq!(resolved.result_type, TypeKind::Object);
        assert_eq!(resolved.right_coercion, vec![CoercionStep::Box(TypeKind::BoxedInt)]);
        assert_eq!(
            resolved.operation,
            Operation::Nullish {
                right_reachable: true
            }
        );
    }
}
