//! Binary operator resolution.
//!
//! Given the static types of both operands, resolution decides:
//! - the operating type the operation is evaluated in
//! - the coercion steps applied to each operand
//! - the concrete [`Operation`] and its result type
//!
//! Rules are grouped by operator family. Numeric families consult the
//! arbitrary-precision strategy in [`bigint`] whenever promotion lands on
//! the unlimited-width kind.

mod bigint;
mod equality;
mod logical;
mod membership;
mod primitive;

use tracing::debug;
use tsbc_core::{BinaryOperator, CompilationError, NumericKind, OperatorCategory, Span, TypeKind};

use crate::context::CompilationContext;
use crate::conversion::{CoercionStep, promote_operand};
use crate::lattice::PromotionError;

/// Arithmetic operators sharing one opcode family per numeric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    /// `<<`
    Left,
    /// `>>`, sign-extending
    Right,
    /// `>>>`, zero-filling for fixed widths
    UnsignedRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// What a comparison compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparand {
    /// Promoted numeric values.
    Numeric(NumericKind),
    /// Primitive booleans.
    Boolean,
    /// Value equality of references (null-safe).
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

/// Membership protocol selected for `in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipKind {
    /// Index bounds over a list.
    List,
    /// Key lookup using the text form of the probe.
    Map,
    /// Index bounds over an array.
    Array,
    /// Index bounds over the UTF-16 units of a string.
    Text,
    /// Protocol chosen from the runtime value (`any` operands).
    Dynamic,
}

/// The concrete operation emitted for a resolved binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Arithmetic in `kind` (`int`, `long`, `float`, `double` or `bigint`).
    Arithmetic { op: ArithmeticOp, kind: NumericKind },
    /// String concatenation.
    Concat,
    /// Exponentiation. `double` operands, or a `bigint` base with an
    /// integral exponent of kind `exponent`.
    Power {
        kind: NumericKind,
        exponent: NumericKind,
    },
    Bitwise { op: BitwiseOp, kind: NumericKind },
    /// Shift of a `kind` value by an amount of kind `amount`. Amounts wider
    /// than `int` are converted by the shift itself.
    Shift {
        op: ShiftOp,
        kind: NumericKind,
        amount: NumericKind,
    },
    Compare { op: CompareOp, operands: Comparand },
    /// Short-circuit `&&`/`||`; expressed entirely as control flow.
    Logical(LogicalOp),
    /// `??`; the right operand is skipped when the left is statically non-null.
    Nullish { right_reachable: bool },
    Membership(MembershipKind),
}

/// Full resolution of one binary node. Created per node, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBinaryOp {
    /// Common evaluation type.
    pub operating_type: TypeKind,
    /// Steps applied to the left operand after it is evaluated.
    pub left_coercion: Vec<CoercionStep>,
    /// Steps applied to the right operand after it is evaluated.
    pub right_coercion: Vec<CoercionStep>,
    /// Static type of the expression.
    pub result_type: TypeKind,
    pub operation: Operation,
}

impl ResolvedBinaryOp {
    /// Resolution where both operands are promoted to `kind`.
    pub(crate) fn promoted(
        left: &TypeKind,
        right: &TypeKind,
        kind: NumericKind,
        operation: Operation,
        result_type: TypeKind,
    ) -> Self {
        Self {
            operating_type: kind.primitive(),
            left_coercion: promote_operand(left, kind),
            right_coercion: promote_operand(right, kind),
            result_type,
            operation,
        }
    }

    /// Whether either coercion contains a narrowing step.
    pub fn has_narrowing(&self) -> bool {
        self.left_coercion
            .iter()
            .chain(&self.right_coercion)
            .any(CoercionStep::is_narrowing)
    }
}

/// Resolve a binary operator for the given operand types.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_binary(
    left: &TypeKind,
    right: &TypeKind,
    op: BinaryOperator,
    ctx: &CompilationContext<'_>,
    span: Span,
) -> Result<ResolvedBinaryOp, CompilationError> {
    let resolved = match op.category() {
        OperatorCategory::Arithmetic => primitive::resolve_arithmetic(left, right, op, span),
        OperatorCategory::Exponent => primitive::resolve_power(left, right, op, span),
        OperatorCategory::Bitwise => primitive::resolve_bitwise(left, right, op, span),
        OperatorCategory::Shift => primitive::resolve_shift(left, right, op, span),
        OperatorCategory::Relational => primitive::resolve_relational(left, right, op, span),
        OperatorCategory::Equality => equality::resolve_equality(left, right, op, span),
        OperatorCategory::Logical => Ok(logical::resolve_logical(left, right, op)),
        OperatorCategory::Nullish => Ok(logical::resolve_nullish(left, right)),
        OperatorCategory::Membership => {
            membership::resolve_membership(left, right, op, ctx.oracle(), span)
        }
    }?;

    debug!(
        operator = %op,
        left = %left,
        right = %right,
        operating = %resolved.operating_type,
        result = %resolved.result_type,
        "resolved binary operator"
    );
    debug_assert!(!resolved.has_narrowing(), "narrowing in binary promotion");

    Ok(resolved)
}

/// Map a lattice failure onto a static type error for `op`.
pub(crate) fn promotion_error(
    err: PromotionError,
    op: BinaryOperator,
    left: &TypeKind,
    right: &TypeKind,
    span: Span,
) -> CompilationError {
    CompilationError::static_type(op, left, right, err.to_string(), span)
}
