//! Core types shared by the tsbc compiler and runtime.
//!
//! - [`TypeKind`] and [`NumericKind`]: the static type lattice
//! - [`ClassId`]: stable identity for class reference types
//! - [`BinaryOperator`]: the operators the expression engine resolves
//! - [`TypedExpr`] and friends: the typed input tree
//! - error types for compilation and execution

pub mod ast;
pub mod class_id;
pub mod error;
pub mod ops;
pub mod span;
pub mod types;

pub use ast::{BinaryExpr, LiteralExpr, LiteralKind, LocalExpr, TypedExpr};
pub use class_id::ClassId;
pub use error::{CompilationError, RuntimeError, TsbcError};
pub use ops::{BinaryOperator, OperatorCategory};
pub use span::Span;
pub use types::{NumericKind, TypeKind, TypeTraits};
