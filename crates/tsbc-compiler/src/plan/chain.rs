//! Folding of `**` chains.
//!
//! A parser that sees `a ** b ** c` can collect the operands in a flat
//! [`ExpChain`] and let the configured associativity decide the tree shape.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use tsbc_core::{BinaryExpr, BinaryOperator, Span, TypedExpr};

use crate::options::Associativity;

/// Operands of an exponent chain, in source order.
pub struct ExpChain<'ast> {
    first: &'ast TypedExpr<'ast>,
    rest: BumpVec<'ast, &'ast TypedExpr<'ast>>,
}

impl<'ast> ExpChain<'ast> {
    /// Start a chain with its first operand.
    pub fn new_in(arena: &'ast Bump, first: &'ast TypedExpr<'ast>) -> Self {
        Self {
            first,
            rest: BumpVec::new_in(arena),
        }
    }

    pub fn push(&mut self, operand: &'ast TypedExpr<'ast>) {
        self.rest.push(operand);
    }

    /// Number of operands, including the first.
    pub fn operand_count(&self) -> usize {
        self.rest.len() + 1
    }

    /// Source range from the first to the last operand.
    pub fn span(&self) -> Span {
        let last = self.rest.last().copied().unwrap_or(self.first);
        self.first.span().merge(last.span())
    }

    /// Build the expression tree.
    ///
    /// `Left` yields `(a ** b) ** c`, `Right` yields `a ** (b ** c)`. Each
    /// node spans its two operands.
    pub fn fold(self, arena: &'ast Bump, associativity: Associativity) -> &'ast TypedExpr<'ast> {
        match associativity {
            Associativity::Left => self
                .rest
                .into_iter()
                .fold(self.first, |acc, next| join(arena, acc, next)),
            Associativity::Right => {
                let mut rest = self.rest;
                let Some(mut acc) = rest.pop() else {
                    return self.first;
                };
                while let Some(prev) = rest.pop() {
                    acc = join(arena, prev, acc);
                }
                join(arena, self.first, acc)
            }
        }
    }
}

fn join<'ast>(
    arena: &'ast Bump,
    left: &'ast TypedExpr<'ast>,
    right: &'ast TypedExpr<'ast>,
) -> &'ast TypedExpr<'ast> {
    let span = left.span().merge(right.span());
    let node = arena.alloc(BinaryExpr::new(left, BinaryOperator::Exp, right, span));
    arena.alloc(TypedExpr::Binary(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbc_core::{LiteralExpr, LiteralKind};

    fn int<'a>(arena: &'a Bump, value: i64, col: u32) -> &'a TypedExpr<'a> {
        arena.alloc(TypedExpr::Literal(LiteralExpr::new(
            LiteralKind::Int(value),
            Span::new(1, col, 1),
        )))
    }

    fn literal(expr: &TypedExpr<'_>) -> i64 {
        match expr {
            TypedExpr::Literal(LiteralExpr {
                kind: LiteralKind::Int(v),
                ..
            }) => *v,
            other => panic!("expected literal, got {:?}", other),
        }
    }

    fn binary<'a>(expr: &'a TypedExpr<'a>) -> &'a BinaryExpr<'a> {
        match expr {
            TypedExpr::Binary(node) => node,
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn single_operand_is_returned() {
        let arena = Bump::new();
        let chain = ExpChain::new_in(&arena, int(&arena, 2, 1));
        assert_eq!(chain.operand_count(), 1);
        assert_eq!(literal(chain.fold(&arena, Associativity::Left)), 2);
    }

    #[test]
    fn left_fold() {
        let arena = Bump::new();
        let mut chain = ExpChain::new_in(&arena, int(&arena, 2, 1));
        chain.push(int(&arena, 3, 6));
        chain.push(int(&arena, 2, 11));

        let root = binary(chain.fold(&arena, Associativity::Left));
        assert_eq!(root.op, BinaryOperator::Exp);
        assert_eq!(literal(root.right), 2);
        let inner = binary(root.left);
        assert_eq!(literal(inner.left), 2);
        assert_eq!(literal(inner.right), 3);
        assert_eq!(root.span, Span::new(1, 1, 11));
    }

    #[test]
    fn right_fold() {
        let arena = Bump::new();
        let mut chain = ExpChain::new_in(&arena, int(&arena, 2, 1));
        chain.push(int(&arena, 3, 6));
        chain.push(int(&arena, 2, 11));

        let root = binary(chain.fold(&arena, Associativity::Right));
        assert_eq!(literal(root.left), 2);
        let inner = binary(root.right);
        assert_eq!(literal(inner.left), 3);
        assert_eq!(literal(inner.right), 2);
    }
}
