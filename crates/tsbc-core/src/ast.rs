//! Typed expression nodes consumed by the compiler.
//!
//! Upstream type checking has already run: every leaf carries its static
//! [`TypeKind`]. Binary nodes carry no type of their own; the planner derives
//! it bottom-up while resolving each operator. Nodes are arena allocated and
//! borrow their children for `'ast`.

use crate::{BinaryOperator, Span, TypeKind};

/// A typed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedExpr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Read of a local slot
    Local(LocalExpr),
    /// Prefix increment of a local slot (`++x`)
    Increment(LocalExpr),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
}

impl<'ast> TypedExpr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Local(e) | Self::Increment(e) => e.span,
            Self::Binary(e) => e.span,
        }
    }

    /// The static type of a leaf node. `None` for binary nodes.
    pub fn leaf_type(&self) -> Option<&TypeKind> {
        match self {
            Self::Literal(e) => Some(&e.ty),
            Self::Local(e) | Self::Increment(e) => Some(&e.ty),
            Self::Binary(_) => None,
        }
    }

    /// Whether evaluating the expression can have an observable effect.
    pub fn has_side_effects(&self) -> bool {
        match self {
            Self::Literal(_) | Self::Local(_) => false,
            Self::Increment(_) => true,
            Self::Binary(e) => e.left.has_side_effects() || e.right.has_side_effects(),
        }
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast TypedExpr<'ast>,
    /// Operator
    pub op: BinaryOperator,
    /// Right operand
    pub right: &'ast TypedExpr<'ast>,
    /// Type the enclosing context expects, if any (assignment target, cast).
    pub context_type: Option<TypeKind>,
    /// Source location
    pub span: Span,
}

impl<'ast> BinaryExpr<'ast> {
    pub fn new(
        left: &'ast TypedExpr<'ast>,
        op: BinaryOperator,
        right: &'ast TypedExpr<'ast>,
        span: Span,
    ) -> Self {
        Self {
            left,
            op,
            right,
            context_type: None,
            span,
        }
    }

    /// Set the type the enclosing context expects.
    pub fn with_context(mut self, ty: TypeKind) -> Self {
        self.context_type = Some(ty);
        self
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Static type assigned by the type checker
    pub ty: TypeKind,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Null literal
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal, any fixed-width integral type
    Int(i64),
    /// Floating-point literal
    Double(f64),
    /// UTF-16 code unit literal
    Char(u16),
    /// String literal
    String(&'ast str),
    /// Big integer literal in decimal, without the `n` suffix
    BigInt(&'ast str),
}

impl<'ast> LiteralExpr<'ast> {
    /// Literal with its natural type: `int`, `double`, `boolean`, `char`,
    /// `String`, `bigint` or `null`.
    pub fn new(kind: LiteralKind<'ast>, span: Span) -> Self {
        let ty = match &kind {
            LiteralKind::Null => TypeKind::Null,
            LiteralKind::Bool(_) => TypeKind::Boolean,
            LiteralKind::Int(_) => TypeKind::Int,
            LiteralKind::Double(_) => TypeKind::Double,
            LiteralKind::Char(_) => TypeKind::Char,
            LiteralKind::String(_) => TypeKind::String,
            LiteralKind::BigInt(_) => TypeKind::BigInt,
        };
        Self { kind, ty, span }
    }

    /// Override the static type (`5 as long`, `Integer x = 5`).
    pub fn typed(mut self, ty: TypeKind) -> Self {
        self.ty = ty;
        self
    }

    /// Whether the literal kind can inhabit its static type.
    pub fn is_well_typed(&self) -> bool {
        match (&self.kind, &self.ty) {
            (LiteralKind::Null, ty) => ty.is_reference(),
            (LiteralKind::Bool(_), ty) => ty.is_boolean(),
            (LiteralKind::Int(_), ty) => ty.is_numeric(),
            (LiteralKind::Double(_), ty) => ty.is_floating(),
            (LiteralKind::Char(_), ty) => ty.unboxed() == TypeKind::Char,
            (LiteralKind::String(_), ty) => matches!(ty, TypeKind::String | TypeKind::Object),
            (LiteralKind::BigInt(_), ty) => ty.is_big_int(),
        }
    }
}

/// A local slot with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalExpr {
    pub slot: u16,
    pub ty: TypeKind,
    pub span: Span,
}

impl LocalExpr {
    pub fn new(slot: u16, ty: TypeKind, span: Span) -> Self {
        Self { slot, ty, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn literal_natural_types() {
        let span = Span::new(1, 1, 1);
        assert_eq!(LiteralExpr::new(LiteralKind::Int(1), span).ty, TypeKind::Int);
        assert_eq!(
            LiteralExpr::new(LiteralKind::BigInt("10"), span).ty,
            TypeKind::BigInt
        );
        assert_eq!(LiteralExpr::new(LiteralKind::Null, span).ty, TypeKind::Null);
    }

    #[test]
    fn literal_well_typed() {
        let span = Span::default();
        assert!(LiteralExpr::new(LiteralKind::Int(5), span)
            .typed(TypeKind::BoxedLong)
            .is_well_typed());
        assert!(LiteralExpr::new(LiteralKind::Null, span)
            .typed(TypeKind::BoxedInt)
            .is_well_typed());
        assert!(!LiteralExpr::new(LiteralKind::Null, span)
            .typed(TypeKind::Int)
            .is_well_typed());
        assert!(!LiteralExpr::new(LiteralKind::Double(1.5), span)
            .typed(TypeKind::Int)
            .is_well_typed());
    }

    #[test]
    fn binary_span_and_side_effects() {
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
        let binary = arena.alloc(BinaryExpr::new(
            left,
            BinaryOperator::NullishCoalesce,
            right,
            Span::new(1, 1, 8),
        ));
        let expr = TypedExpr::Binary(binary);

        assert_eq!(expr.span(), Span::new(1, 1, 8));
        assert!(expr.has_side_effects());
        assert!(expr.leaf_type().is_none());
        assert!(!left.has_side_effects());
    }
}
