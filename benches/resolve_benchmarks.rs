//! Performance benchmarks for binary expression compilation.
//!
//! - Resolution: single operator/type pairs through the coercion resolver
//! - Planning: deep left-nested trees
//! - End to end: compile and run on the reference VM

use bumpalo::Bump;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tsbc::*;

fn int(arena: &Bump, value: i64) -> &TypedExpr<'_> {
    arena.alloc(TypedExpr::Literal(
        LiteralExpr::new(LiteralKind::Int(value), Span::default()).typed(TypeKind::Int),
    ))
}

fn local(arena: &Bump, slot: u16, ty: TypeKind) -> &TypedExpr<'_> {
    arena.alloc(TypedExpr::Local(LocalExpr::new(slot, ty, Span::default())))
}

fn binary<'a>(
    arena: &'a Bump,
    left: &'a TypedExpr<'a>,
    op: BinaryOperator,
    right: &'a TypedExpr<'a>,
) -> &'a TypedExpr<'a> {
    let node = arena.alloc(BinaryExpr::new(left, op, right, Span::default()));
    arena.alloc(TypedExpr::Binary(node))
}

/// `x op 1 op 2 op ... op depth`, nested to the left.
fn chain<'a>(
    arena: &'a Bump,
    op: BinaryOperator,
    head: &'a TypedExpr<'a>,
    depth: i64,
) -> &'a TypedExpr<'a> {
    (1..=depth).fold(head, |acc, i| binary(arena, acc, op, int(arena, i)))
}

fn resolution_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/pairs");
    let options = CompilerOptions::default();
    let registry = ClassRegistry::with_runtime_classes();
    let ctx = CompilationContext::new(&options, &registry);

    let pairs = [
        ("int_add_int", TypeKind::Int, BinaryOperator::Add, TypeKind::Int),
        ("boxed_mul_double", TypeKind::BoxedInt, BinaryOperator::Mul, TypeKind::Double),
        ("string_concat", TypeKind::String, BinaryOperator::Add, TypeKind::Long),
        ("bigint_shift", TypeKind::BigInt, BinaryOperator::Shl, TypeKind::Long),
        ("loose_equality", TypeKind::Boolean, BinaryOperator::Eq, TypeKind::Int),
        ("nullish", TypeKind::BoxedLong, BinaryOperator::NullishCoalesce, TypeKind::Long),
        (
            "membership",
            TypeKind::Int,
            BinaryOperator::In,
            TypeKind::Reference(ClassId::HASH_MAP),
        ),
    ];

    for (name, left, op, right) in &pairs {
        group.bench_function(*name, |b| {
            b.iter(|| {
                resolve_binary(
                    black_box(left),
                    black_box(right),
                    *op,
                    &ctx,
                    Span::default(),
                )
            });
        });
    }

    group.finish();
}

fn planning_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/planning");
    let options = CompilerOptions::default();
    let registry = ClassRegistry::with_runtime_classes();

    for depth in [8, 64, 256] {
        let arena = Bump::new();
        let expr = chain(&arena, BinaryOperator::Add, local(&arena, 0, TypeKind::Byte), depth);

        group.bench_with_input(BenchmarkId::new("add_chain", depth), &expr, |b, expr| {
            b.iter(|| {
                let mut ctx = CompilationContext::new(&options, &registry);
                let plan = Planner::new(&mut ctx).plan(black_box(expr));
                black_box(plan.is_ok())
            });
        });
    }

    group.finish();
}

fn end_to_end_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/end_to_end");
    let options = CompilerOptions::default();
    let registry = ClassRegistry::with_runtime_classes();

    let arena = Bump::new();
    let mixed = chain(&arena, BinaryOperator::Mul, local(&arena, 0, TypeKind::Long), 32);
    let text = chain(&arena, BinaryOperator::Add, local(&arena, 1, TypeKind::String), 32);

    group.bench_function("compile_long_chain", |b| {
        b.iter(|| compile_expression(black_box(mixed), &options, &registry));
    });

    group.bench_function("compile_concat_chain", |b| {
        b.iter(|| compile_expression(black_box(text), &options, &registry));
    });

    let compiled = compile_expression(mixed, &options, &registry);
    if let Ok(compiled) = compiled {
        group.bench_function("run_long_chain", |b| {
            let mut vm = Vm::with_locals([Value::Long(3), Value::str("s")]);
            b.iter(|| {
                vm.reset();
                black_box(vm.run(&compiled))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    resolution_benchmarks,
    planning_benchmarks,
    end_to_end_benchmarks
);
criterion_main!(benches);
