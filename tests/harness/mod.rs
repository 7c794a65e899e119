//! Test harness for expression integration tests
//!
//! Builds typed expression trees in a bump arena and runs them through the
//! compiler and the reference VM.

#![allow(dead_code)]

use bumpalo::Bump;
use tracing_subscriber::EnvFilter;
use tsbc::*;

/// Arena-backed builder for typed expressions.
pub struct Exprs<'a> {
    arena: &'a Bump,
}

impl<'a> Exprs<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    /// Literal with an explicit static type.
    pub fn literal(&self, kind: LiteralKind<'a>, ty: TypeKind) -> &'a TypedExpr<'a> {
        self.arena.alloc(TypedExpr::Literal(
            LiteralExpr::new(kind, Span::default()).typed(ty),
        ))
    }

    pub fn int(&self, value: i64) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Int(value), TypeKind::Int)
    }

    pub fn long(&self, value: i64) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Int(value), TypeKind::Long)
    }

    pub fn float(&self, value: f64) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Double(value), TypeKind::Float)
    }

    pub fn double(&self, value: f64) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Double(value), TypeKind::Double)
    }

    pub fn big(&self, digits: &str) -> &'a TypedExpr<'a> {
        let digits = self.arena.alloc_str(digits);
        self.literal(LiteralKind::BigInt(digits), TypeKind::BigInt)
    }

    pub fn string(&self, text: &str) -> &'a TypedExpr<'a> {
        let text = self.arena.alloc_str(text);
        self.literal(LiteralKind::String(text), TypeKind::String)
    }

    pub fn char(&self, c: char) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Char(c as u16), TypeKind::Char)
    }

    pub fn boolean(&self, value: bool) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Bool(value), TypeKind::Boolean)
    }

    pub fn null(&self) -> &'a TypedExpr<'a> {
        self.literal(LiteralKind::Null, TypeKind::Null)
    }

    pub fn local(&self, slot: u16, ty: TypeKind) -> &'a TypedExpr<'a> {
        self.arena
            .alloc(TypedExpr::Local(LocalExpr::new(slot, ty, Span::default())))
    }

    /// `++local`
    pub fn increment(&self, slot: u16, ty: TypeKind) -> &'a TypedExpr<'a> {
        self.arena
            .alloc(TypedExpr::Increment(LocalExpr::new(slot, ty, Span::default())))
    }

    pub fn binary(
        &self,
        left: &'a TypedExpr<'a>,
        op: BinaryOperator,
        right: &'a TypedExpr<'a>,
    ) -> &'a TypedExpr<'a> {
        let node = self
            .arena
            .alloc(BinaryExpr::new(left, op, right, Span::new(1, 1, 1)));
        self.arena.alloc(TypedExpr::Binary(node))
    }

    /// Binary expression whose value flows into a slot of type `context`.
    pub fn binary_as(
        &self,
        left: &'a TypedExpr<'a>,
        op: BinaryOperator,
        right: &'a TypedExpr<'a>,
        context: TypeKind,
    ) -> &'a TypedExpr<'a> {
        let node = self.arena.alloc(
            BinaryExpr::new(left, op, right, Span::new(1, 1, 1)).with_context(context),
        );
        self.arena.alloc(TypedExpr::Binary(node))
    }
}

/// Route compiler traces to the test output. Set `RUST_LOG=tsbc_compiler=trace`
/// to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Compile with default options and the runtime class registry.
pub fn compile<'a>(expr: &'a TypedExpr<'a>) -> Result<CompiledExpression, CompilationError> {
    init_tracing();
    compile_expression(
        expr,
        &CompilerOptions::default(),
        &ClassRegistry::with_runtime_classes(),
    )
}

pub fn try_eval<'a>(expr: &'a TypedExpr<'a>, locals: Vec<Value>) -> Result<Value, TsbcError> {
    init_tracing();
    evaluate(
        expr,
        &CompilerOptions::default(),
        &ClassRegistry::with_runtime_classes(),
        locals,
    )
}

/// Evaluate an expression that is expected to succeed.
pub fn eval<'a>(expr: &'a TypedExpr<'a>) -> Value {
    eval_with(expr, Vec::new())
}

pub fn eval_with<'a>(expr: &'a TypedExpr<'a>, locals: Vec<Value>) -> Value {
    try_eval(expr, locals).unwrap_or_else(|err| panic!("evaluation failed: {}", err))
}

/// Run an expression and return its value along with the final locals.
pub fn run_with_locals<'a>(expr: &'a TypedExpr<'a>, locals: Vec<Value>) -> (Value, Vm) {
    let compiled = compile(expr).unwrap_or_else(|err| panic!("compilation failed: {}", err));
    let mut vm = Vm::with_locals(locals);
    let value = vm
        .run(&compiled)
        .unwrap_or_else(|err| panic!("execution failed: {}", err));
    (value, vm)
}

pub fn as_int(value: Value) -> i32 {
    match value {
        Value::Int(v) => v,
        other => panic!("expected int, got {:?}", other),
    }
}

pub fn as_long(value: Value) -> i64 {
    match value {
        Value::Long(v) => v,
        other => panic!("expected long, got {:?}", other),
    }
}

/// Assert that compilation fails with a static type error.
#[track_caller]
pub fn assert_static_error<'a>(expr: &'a TypedExpr<'a>) -> CompilationError {
    match compile(expr) {
        Err(err @ CompilationError::StaticType { .. }) => err,
        Err(other) => panic!("expected static type error, got {}", other),
        Ok(compiled) => panic!("expected static type error, compiled to {:?}", compiled.result_type),
    }
}

/// Assert that evaluation fails with the given runtime error.
#[track_caller]
pub fn assert_runtime_error<'a>(expr: &'a TypedExpr<'a>, locals: Vec<Value>, expected: RuntimeError) {
    match try_eval(expr, locals) {
        Err(TsbcError::Runtime(err)) => assert_eq!(err, expected),
        other => panic!("expected runtime error {}, got {:?}", expected, other),
    }
}
