//! Lowering of emission plans to bytecode.
//!
//! Each directive maps onto a short, fixed opcode sequence. Operand kinds are
//! already settled by resolution, so lowering never inspects values.

use num_bigint::BigInt;
use tracing::trace;
use tsbc_core::{
    CompilationError, LiteralExpr, LiteralKind, NumericKind, Span, TypeKind, TypedExpr,
};

use super::{BytecodeEmitter, EmitError};
use crate::bytecode::{OpCode, type_tag};
use crate::conversion::CoercionStep;
use crate::operators::{
    ArithmeticOp, BitwiseOp, CompareOp, Comparand, MembershipKind, Operation, ShiftOp,
};
use crate::options::CompilerOptions;
use crate::plan::{BinaryPlan, BranchCondition, EmitDirective, PlannedExpr, Side};

/// Emit the bytecode for a planned expression. The value is left on the
/// stack.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn lower(
    plan: &PlannedExpr<'_>,
    emitter: &mut BytecodeEmitter<'_>,
    options: &CompilerOptions,
) -> Result<(), CompilationError> {
    match plan {
        PlannedExpr::Leaf(expr) => lower_leaf(expr, emitter, options),
        PlannedExpr::Binary(binary) => lower_binary(binary, emitter, options),
    }
}

fn lower_binary(
    plan: &BinaryPlan<'_>,
    emitter: &mut BytecodeEmitter<'_>,
    options: &CompilerOptions,
) -> Result<(), CompilationError> {
    let span = plan.node.span;

    for directive in &plan.directives {
        if options.debug {
            emitter.set_line(span.line);
        }
        trace!(%directive, offset = emitter.current_offset(), "lowering directive");

        match directive {
            EmitDirective::EvaluateOperand(Side::Left) => lower(&plan.left, emitter, options)?,
            EmitDirective::EvaluateOperand(Side::Right) => lower(&plan.right, emitter, options)?,
            EmitDirective::EvaluateOperand(Side::Result) => {
                return Err(invalid("the result is not an operand", span));
            }
            EmitDirective::ApplyCoercion(_, step) => lower_coercion(step, emitter, span)?,
            EmitDirective::Branch(condition, label) => {
                let op = match condition {
                    BranchCondition::IfFalsy => OpCode::JumpIfFalsy,
                    BranchCondition::IfTruthy => OpCode::JumpIfTruthy,
                    BranchCondition::IfNonNull => OpCode::JumpIfNonNull,
                };
                emitter.emit_branch(op, *label);
            }
            EmitDirective::Discard => emitter.emit(OpCode::Pop),
            EmitDirective::EmitOperation(operation) => {
                for op in operation_ops(operation, span)? {
                    emitter.emit(op);
                }
            }
            EmitDirective::Label(label) => {
                emitter
                    .bind_label(*label)
                    .map_err(|err| emit_error(err, span))?;
            }
        }
    }
    Ok(())
}

// =============================================================================
// Leaves
// =============================================================================

fn lower_leaf(
    expr: &TypedExpr<'_>,
    emitter: &mut BytecodeEmitter<'_>,
    options: &CompilerOptions,
) -> Result<(), CompilationError> {
    if options.debug {
        emitter.set_line(expr.span().line);
    }
    match expr {
        TypedExpr::Literal(literal) => lower_literal(literal, emitter),
        TypedExpr::Local(local) => {
            emitter.emit_get_local(local.slot);
            Ok(())
        }
        TypedExpr::Increment(local) => {
            emitter.emit_pre_inc(local.slot);
            Ok(())
        }
        TypedExpr::Binary(_) => Err(invalid("binary node was not planned", expr.span())),
    }
}

fn lower_literal(
    literal: &LiteralExpr<'_>,
    emitter: &mut BytecodeEmitter<'_>,
) -> Result<(), CompilationError> {
    let span = literal.span;
    let to_emit_error = |err| emit_error(err, span);

    if let LiteralKind::Null = literal.kind {
        emitter.emit_null();
        return Ok(());
    }

    match (&literal.kind, literal.ty.unboxed()) {
        (LiteralKind::Bool(value), _) => emitter.emit_bool(*value),
        (LiteralKind::String(text), _) => emitter.emit_string(text).map_err(to_emit_error)?,
        (LiteralKind::Char(unit), _) => {
            emitter
                .emit_int(i32::from(*unit))
                .map_err(to_emit_error)?;
            emitter.emit(OpCode::I32toU16);
        }
        (LiteralKind::BigInt(text), _) => {
            let value: BigInt = text
                .parse()
                .map_err(|_| invalid(format!("invalid bigint literal '{}'", text), span))?;
            emitter.emit_big_int(value).map_err(to_emit_error)?;
        }
        (LiteralKind::Int(value), target) => lower_int_literal(*value, &target, emitter, span)?,
        (LiteralKind::Double(value), TypeKind::Float) => {
            emitter.emit_float(*value as f32).map_err(to_emit_error)?
        }
        (LiteralKind::Double(value), _) => emitter.emit_double(*value).map_err(to_emit_error)?,
        (LiteralKind::Null, _) => emitter.emit_null(),
    }

    if literal.ty.is_boxed() {
        lower_coercion(&CoercionStep::Box(literal.ty.clone()), emitter, span)?;
    }
    Ok(())
}

fn lower_int_literal(
    value: i64,
    target: &TypeKind,
    emitter: &mut BytecodeEmitter<'_>,
    span: Span,
) -> Result<(), CompilationError> {
    let out_of_range = || invalid(format!("literal {} does not fit '{}'", value, target), span);
    let to_emit_error = |err| emit_error(err, span);

    match target.numeric_kind() {
        Some(NumericKind::Long) => emitter.emit_long(value).map_err(to_emit_error),
        Some(NumericKind::Float) => emitter.emit_float(value as f32).map_err(to_emit_error),
        Some(NumericKind::Double) => emitter.emit_double(value as f64).map_err(to_emit_error),
        Some(NumericKind::BigInt) => emitter
            .emit_big_int(BigInt::from(value))
            .map_err(to_emit_error),
        Some(kind) => {
            let (min, max, narrow) = match kind {
                NumericKind::Byte => (i64::from(i8::MIN), i64::from(i8::MAX), Some(OpCode::I32toI8)),
                NumericKind::Short => (
                    i64::from(i16::MIN),
                    i64::from(i16::MAX),
                    Some(OpCode::I32toI16),
                ),
                NumericKind::Char => (0, i64::from(u16::MAX), Some(OpCode::I32toU16)),
                _ => (i64::from(i32::MIN), i64::from(i32::MAX), None),
            };
            if !(min..=max).contains(&value) {
                return Err(out_of_range());
            }
            let int = i32::try_from(value).map_err(|_| out_of_range())?;
            emitter.emit_int(int).map_err(to_emit_error)?;
            if let Some(op) = narrow {
                emitter.emit(op);
            }
            Ok(())
        }
        None => Err(out_of_range()),
    }
}

// =============================================================================
// Coercions
// =============================================================================

fn lower_coercion(
    step: &CoercionStep,
    emitter: &mut BytecodeEmitter<'_>,
    span: Span,
) -> Result<(), CompilationError> {
    match step {
        CoercionStep::Unbox(ty) => emitter.emit_byte(OpCode::Unbox, tag(ty, span)?),
        CoercionStep::Box(ty) => emitter.emit_byte(OpCode::Box, tag(ty, span)?),
        CoercionStep::ToStringConv => emitter.emit(OpCode::ToString),
        CoercionStep::Widen { from, to } | CoercionStep::Narrow { from, to } => {
            for op in conversion_ops(*from, *to) {
                emitter.emit(op);
            }
        }
    }
    Ok(())
}

fn tag(ty: &TypeKind, span: Span) -> Result<u8, CompilationError> {
    type_tag(ty).ok_or_else(|| invalid(format!("'{}' has no primitive form", ty), span))
}

/// Opcodes converting a value of kind `from` into kind `to`.
///
/// `byte`, `short` and `char` go through `int` on both sides, and the
/// float/bigint pairs go through `double`.
pub fn conversion_ops(from: NumericKind, to: NumericKind) -> Vec<OpCode> {
    use NumericKind as K;

    let mut ops = Vec::with_capacity(3);
    if from == to {
        return ops;
    }

    let source = match from {
        K::Byte => {
            ops.push(OpCode::I8toI32);
            K::Int
        }
        K::Short => {
            ops.push(OpCode::I16toI32);
            K::Int
        }
        K::Char => {
            ops.push(OpCode::U16toI32);
            K::Int
        }
        other => other,
    };
    let target = match to {
        K::Byte | K::Short | K::Char => K::Int,
        other => other,
    };

    let direct: &[OpCode] = match (source, target) {
        (K::Int, K::Long) => &[OpCode::I32toI64],
        (K::Int, K::Float) => &[OpCode::I32toF32],
        (K::Int, K::Double) => &[OpCode::I32toF64],
        (K::Int, K::BigInt) => &[OpCode::I32toBig],
        (K::Long, K::Int) => &[OpCode::I64toI32],
        (K::Long, K::Float) => &[OpCode::I64toF32],
        (K::Long, K::Double) => &[OpCode::I64toF64],
        (K::Long, K::BigInt) => &[OpCode::I64toBig],
        (K::Float, K::Int) => &[OpCode::F32toI32],
        (K::Float, K::Long) => &[OpCode::F32toI64],
        (K::Float, K::Double) => &[OpCode::F32toF64],
        (K::Float, K::BigInt) => &[OpCode::F32toF64, OpCode::F64toBig],
        (K::Double, K::Int) => &[OpCode::F64toI32],
        (K::Double, K::Long) => &[OpCode::F64toI64],
        (K::Double, K::Float) => &[OpCode::F64toF32],
        (K::Double, K::BigInt) => &[OpCode::F64toBig],
        (K::BigInt, K::Int) => &[OpCode::BigtoI32],
        (K::BigInt, K::Long) => &[OpCode::BigtoI64],
        (K::BigInt, K::Float) => &[OpCode::BigtoF64, OpCode::F64toF32],
        (K::BigInt, K::Double) => &[OpCode::BigtoF64],
        _ => &[],
    };
    ops.extend_from_slice(direct);

    match to {
        K::Byte => ops.push(OpCode::I32toI8),
        K::Short => ops.push(OpCode::I32toI16),
        K::Char => ops.push(OpCode::I32toU16),
        _ => {}
    }
    ops
}

// =============================================================================
// Operations
// =============================================================================

fn operation_ops(operation: &Operation, span: Span) -> Result<Vec<OpCode>, CompilationError> {
    let unsupported =
        |what: &str, kind: NumericKind| invalid(format!("no {} operation for '{}'", what, kind), span);

    let ops = match *operation {
        Operation::Arithmetic { op, kind } => {
            let row = match kind {
                NumericKind::Int => [OpCode::AddI32, OpCode::SubI32, OpCode::MulI32, OpCode::DivI32, OpCode::ModI32],
                NumericKind::Long => [OpCode::AddI64, OpCode::SubI64, OpCode::MulI64, OpCode::DivI64, OpCode::ModI64],
                NumericKind::Float => [OpCode::AddF32, OpCode::SubF32, OpCode::MulF32, OpCode::DivF32, OpCode::ModF32],
                NumericKind::Double => [OpCode::AddF64, OpCode::SubF64, OpCode::MulF64, OpCode::DivF64, OpCode::ModF64],
                NumericKind::BigInt => [OpCode::AddBig, OpCode::SubBig, OpCode::MulBig, OpCode::DivBig, OpCode::ModBig],
                other => return Err(unsupported("arithmetic", other)),
            };
            let column = match op {
                ArithmeticOp::Add => 0,
                ArithmeticOp::Sub => 1,
                ArithmeticOp::Mul => 2,
                ArithmeticOp::Div => 3,
                ArithmeticOp::Mod => 4,
            };
            vec![row[column]]
        }
        Operation::Concat => vec![OpCode::Concat],
        Operation::Power { kind, exponent } => match kind {
            NumericKind::Double => vec![OpCode::PowF64],
            NumericKind::BigInt => {
                let mut ops = amount_to_int(exponent);
                ops.push(OpCode::PowBig);
                ops
            }
            other => return Err(unsupported("power", other)),
        },
        Operation::Bitwise { op, kind } => {
            let row = match kind {
                NumericKind::Int => [OpCode::BitAndI32, OpCode::BitOrI32, OpCode::BitXorI32],
                NumericKind::Long => [OpCode::BitAndI64, OpCode::BitOrI64, OpCode::BitXorI64],
                NumericKind::BigInt => [OpCode::BitAndBig, OpCode::BitOrBig, OpCode::BitXorBig],
                other => return Err(unsupported("bitwise", other)),
            };
            let column = match op {
                BitwiseOp::And => 0,
                BitwiseOp::Or => 1,
                BitwiseOp::Xor => 2,
            };
            vec![row[column]]
        }
        Operation::Shift { op, kind, amount } => {
            let shift = match (kind, op) {
                (NumericKind::Int, ShiftOp::Left) => OpCode::ShlI32,
                (NumericKind::Int, ShiftOp::Right) => OpCode::ShrI32,
                (NumericKind::Int, ShiftOp::UnsignedRight) => OpCode::UshrI32,
                (NumericKind::Long, ShiftOp::Left) => OpCode::ShlI64,
                (NumericKind::Long, ShiftOp::Right) => OpCode::ShrI64,
                (NumericKind::Long, ShiftOp::UnsignedRight) => OpCode::UshrI64,
                (NumericKind::BigInt, ShiftOp::Left) => OpCode::ShlBig,
                (NumericKind::BigInt, _) => OpCode::ShrBig,
                (other, _) => return Err(unsupported("shift", other)),
            };
            let mut ops = amount_to_int(amount);
            ops.push(shift);
            ops
        }
        Operation::Compare { op, operands } => compare_ops(op, operands, span)?,
        Operation::Membership(kind) => vec![match kind {
            MembershipKind::List => OpCode::InList,
            MembershipKind::Map => OpCode::InMap,
            MembershipKind::Array => OpCode::InArray,
            MembershipKind::Text => OpCode::InText,
            MembershipKind::Dynamic => OpCode::InDynamic,
        }],
        Operation::Logical(_) | Operation::Nullish { .. } => {
            return Err(invalid("short-circuit operators are lowered as branches", span));
        }
    };
    Ok(ops)
}

/// Shift amounts and big-integer exponents are taken as `int`.
fn amount_to_int(kind: NumericKind) -> Vec<OpCode> {
    match kind {
        NumericKind::Long => vec![OpCode::I64toI32],
        NumericKind::BigInt => vec![OpCode::BigtoI32],
        _ => Vec::new(),
    }
}

fn compare_ops(op: CompareOp, operands: Comparand, span: Span) -> Result<Vec<OpCode>, CompilationError> {
    let (equal, ordered) = match operands {
        Comparand::Numeric(NumericKind::Int) => (
            OpCode::EqI32,
            Some([OpCode::LtI32, OpCode::LeI32, OpCode::GtI32, OpCode::GeI32]),
        ),
        Comparand::Numeric(NumericKind::Long) => (
            OpCode::EqI64,
            Some([OpCode::LtI64, OpCode::LeI64, OpCode::GtI64, OpCode::GeI64]),
        ),
        Comparand::Numeric(NumericKind::Float) => (
            OpCode::EqF32,
            Some([OpCode::LtF32, OpCode::LeF32, OpCode::GtF32, OpCode::GeF32]),
        ),
        Comparand::Numeric(NumericKind::Double) => (
            OpCode::EqF64,
            Some([OpCode::LtF64, OpCode::LeF64, OpCode::GtF64, OpCode::GeF64]),
        ),
        Comparand::Numeric(NumericKind::BigInt) => (
            OpCode::EqBig,
            Some([OpCode::LtBig, OpCode::LeBig, OpCode::GtBig, OpCode::GeBig]),
        ),
        Comparand::Numeric(other) => {
            return Err(invalid(format!("no comparison for '{}'", other), span));
        }
        Comparand::Boolean => (OpCode::EqBool, None),
        Comparand::Reference => (OpCode::EqRef, None),
    };

    let ops = match op {
        CompareOp::Eq => vec![equal],
        CompareOp::Ne => vec![equal, OpCode::Not],
        ordering => {
            let Some(row) = ordered else {
                return Err(invalid("operands are not ordered", span));
            };
            let column = match ordering {
                CompareOp::Lt => 0,
                CompareOp::Le => 1,
                CompareOp::Gt => 2,
                _ => 3,
            };
            vec![row[column]]
        }
    };
    Ok(ops)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn invalid(message: impl Into<String>, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: message.into(),
        span,
    }
}

fn emit_error(err: EmitError, span: Span) -> CompilationError {
    invalid(err.to_string(), span)
}
