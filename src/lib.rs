//! tsbc: binary-expression resolution and code generation
//!
//! Compiles typed binary expressions into typed stack bytecode and runs them
//! on a reference VM.
//!
//! ```text
//! TypedExpr ──resolve/plan──▶ BinaryPlan ──lower──▶ BytecodeChunk ──▶ Vm
//! ```
//!
//! The compiler itself lives in `tsbc-compiler`; this crate re-exports it
//! and adds the [`vm`].

pub mod vm;

pub use tsbc_compiler::{
    Associativity, BinaryPlan, ClassOracle, ClassRegistry, CoercionStep, CompilationContext,
    CompiledExpression, CompilerOptions, Diagnostic, EmitDirective, ExpChain, MembershipProtocol,
    Operation, PlannedExpr, Planner, ResolvedBinaryOp, Severity, compile_exp_chain,
    compile_expression, promote, promote_numeric, resolve_binary,
};
pub use tsbc_core::{
    BinaryExpr, BinaryOperator, ClassId, CompilationError, LiteralExpr, LiteralKind, LocalExpr,
    NumericKind, RuntimeError, Span, TsbcError, TypeKind, TypedExpr,
};
pub use vm::{Value, Vm};

/// Compile `expr` and run it with `locals` in slots 0, 1, ...
///
/// Diagnostics are dropped; use [`compile_expression`] to inspect them.
pub fn evaluate<'ast>(
    expr: &'ast TypedExpr<'ast>,
    options: &CompilerOptions,
    oracle: &dyn ClassOracle,
    locals: impl IntoIterator<Item = Value>,
) -> Result<Value, TsbcError> {
    let compiled = compile_expression(expr, options, oracle)?;
    let mut vm = Vm::with_locals(locals);
    Ok(vm.run(&compiled)?)
}
