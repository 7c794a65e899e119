//! tsbc compiler core
//!
//! Resolves binary expressions over a JVM-style type lattice and lowers them
//! to typed stack bytecode.
//!
//! ## Pipeline
//!
//! - **Resolution**: for each binary node, pick the operating type, the
//!   operand coercions and the concrete operation ([`operators`])
//! - **Planning**: order evaluation, coercion, branches and the operation
//!   into emission directives ([`plan`])
//! - **Emission**: lower directives into a [`bytecode::BytecodeChunk`]
//!   ([`emit`])
//!
//! ## Modules
//!
//! - [`lattice`]: numeric kinds, promotion table and widening order
//! - [`conversion`]: coercion steps and type-to-type conversions
//! - [`operators`]: binary operator semantics table
//! - [`registry`]: class oracle for reference types
//! - [`context`]: per-compilation options, oracle and diagnostics
//! - [`options`]: compiler configuration

pub mod bytecode;
pub mod context;
pub mod conversion;
pub mod emit;
pub mod lattice;
pub mod operators;
pub mod options;
pub mod plan;
pub mod registry;

pub use context::{CompilationContext, Diagnostic, Severity};
pub use conversion::{CoercionStep, Conversion, find_conversion};
pub use emit::{BytecodeEmitter, EmitError, JumpLabel};
pub use lattice::{PromotionContext, PromotionError, promote, promote_numeric};
pub use operators::{Operation, ResolvedBinaryOp, resolve_binary};
pub use options::{Associativity, CompilerOptions};
pub use plan::{BinaryPlan, EmitDirective, ExpChain, PlannedExpr, Planner};
pub use registry::{ClassOracle, ClassRegistry, MembershipProtocol};

// Re-export CompilationError from core for convenience
pub use tsbc_core::CompilationError;

use bumpalo::Bump;
use tracing::debug;
use tsbc_core::{Span, TypeKind, TypedExpr};

use bytecode::{BytecodeChunk, ConstantPool, OpCode};

/// A compiled expression: its bytecode, constants and static type.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    /// Instructions, ending in `RETURN`.
    pub chunk: BytecodeChunk,
    pub constants: ConstantPool,
    /// Static type of the value left by the chunk.
    pub result_type: TypeKind,
    /// Non-fatal diagnostics such as unreachable `??` operands.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile a typed expression.
///
/// Resolution and planning errors surface immediately; there is no
/// recovery within an expression.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_expression<'ast>(
    expr: &'ast TypedExpr<'ast>,
    options: &CompilerOptions,
    oracle: &dyn ClassOracle,
) -> Result<CompiledExpression, CompilationError> {
    let mut ctx = CompilationContext::new(options, oracle);
    let plan = Planner::new(&mut ctx).plan(expr)?;
    finish(&plan, ctx, expr.span())
}

/// Compile a flat `**` chain, grouped by
/// [`CompilerOptions::exp_associativity`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_exp_chain<'ast>(
    chain: ExpChain<'ast>,
    arena: &'ast Bump,
    options: &CompilerOptions,
    oracle: &dyn ClassOracle,
) -> Result<CompiledExpression, CompilationError> {
    let span = chain.span();
    let mut ctx = CompilationContext::new(options, oracle);
    let plan = Planner::new(&mut ctx).plan_exp_chain(chain, arena)?;
    finish(&plan, ctx, span)
}

fn finish(
    plan: &PlannedExpr<'_>,
    mut ctx: CompilationContext<'_>,
    span: Span,
) -> Result<CompiledExpression, CompilationError> {
    let options = ctx.options();
    let mut constants = ConstantPool::new();
    let mut emitter = BytecodeEmitter::new(&mut constants);
    emit::lower(plan, &mut emitter, options)?;
    emitter.emit(OpCode::Return);
    let chunk = emitter
        .finish()
        .map_err(|err| CompilationError::InvalidOperation {
            message: err.to_string(),
            span,
        })?;

    let result_type = plan.static_type().clone();
    debug!(
        result = %result_type,
        bytes = chunk.len(),
        constants = constants.len(),
        "compiled expression"
    );

    Ok(CompiledExpression {
        chunk,
        constants,
        result_type,
        diagnostics: ctx.take_diagnostics(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use tsbc_core::{BinaryExpr, BinaryOperator, LiteralExpr, LiteralKind, LocalExpr, Span};

    #[test]
    fn compile_leaf() {
        let arena = Bump::new();
        let expr = arena.alloc(TypedExpr::Literal(LiteralExpr::new(
            LiteralKind::Bool(true),
            Span::default(),
        )));
        let compiled =
            compile_expression(expr, &CompilerOptions::default(), &ClassRegistry::new()).unwrap();

        compiled
            .chunk
            .assert_opcodes(&[OpCode::PushTrue, OpCode::Return]);
        assert_eq!(compiled.result_type, TypeKind::Boolean);
    }

    #[test]
    fn compile_binary_reports_diagnostics() {
        let arena = Bump::new();
        let left = arena.alloc(TypedExpr::Literal(LiteralExpr::new(
            LiteralKind::Int(5),
            Span::new(1, 1, 1),
        )));
        let right = arena.alloc(TypedExpr::Increment(LocalExpr::new(
            0,
            TypeKind::Int,
            Span::new(1, 6, 3),
        )));
        let node = arena.alloc(BinaryExpr::new(
            left,
            BinaryOperator::NullishCoalesce,
            right,
            Span::new(1, 1, 8),
        ));
        let expr = arena.alloc(TypedExpr::Binary(node));

        let compiled = compile_expression(
            expr,
            &CompilerOptions::default(),
            &ClassRegistry::with_runtime_classes(),
        )
        .unwrap();

        compiled.chunk.assert_opcodes(&[OpCode::Constant, OpCode::Return]);
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.result_type, TypeKind::Int);
    }

    #[test]
    fn compile_errors_surface() {
        let arena = Bump::new();
        let left = arena.alloc(TypedExpr::Local(LocalExpr::new(
            0,
            TypeKind::Double,
            Span::default(),
        )));
        let right = arena.alloc(TypedExpr::Local(LocalExpr::new(
            1,
            TypeKind::Int,
            Span::default(),
        )));
        let node = arena.alloc(BinaryExpr::new(left, BinaryOperator::BitXor, right, Span::new(2, 3, 5)));
        let expr = arena.alloc(TypedExpr::Binary(node));

        let err = compile_expression(expr, &CompilerOptions::default(), &ClassRegistry::new())
            .unwrap_err();
        assert_eq!(err.span(), Span::new(2, 3, 5));
        assert!(err.to_string().contains("'^'"));
    }
}
