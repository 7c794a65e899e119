//! The `in` operator.
//!
//! The right operand selects a membership protocol; only a right operand
//! with no protocol at all is a static error. The probe itself is never
//! rejected statically: probes that are not valid indices evaluate to
//! `false` at run time.

use tsbc_core::{BinaryOperator, CompilationError, Span, TypeKind};

use super::{MembershipKind, Operation, ResolvedBinaryOp};
use crate::conversion::CoercionStep;
use crate::registry::{ClassOracle, MembershipProtocol};

pub(super) fn resolve_membership(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    oracle: &dyn ClassOracle,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    let kind = match right {
        TypeKind::Array(_) => MembershipKind::Array,
        TypeKind::String => MembershipKind::Text,
        TypeKind::Object => MembershipKind::Dynamic,
        TypeKind::Reference(class) => match oracle.membership(*class) {
            Some(MembershipProtocol::List) => MembershipKind::List,
            Some(MembershipProtocol::Map) => MembershipKind::Map,
            None => return Err(no_protocol(left, right, op, span)),
        },
        _ => return Err(no_protocol(left, right, op, span)),
    };

    // Map keys are looked up by their text form.
    let left_coercion = if kind == MembershipKind::Map && *left != TypeKind::String {
        vec![CoercionStep::ToStringConv]
    } else {
        Vec::new()
    };

    Ok(ResolvedBinaryOp {
        operating_type: right.clone(),
        left_coercion,
        right_coercion: Vec::new(),
        result_type: TypeKind::Boolean,
        operation: Operation::Membership(kind),
    })
}

fn no_protocol(left: &TypeKind, right: &TypeKind, op: BinaryOperator, span: Span) -> CompilationError {
    CompilationError::static_type(
        op,
        left,
        right,
        "right operand has no membership protocol",
        span,
    )
}
