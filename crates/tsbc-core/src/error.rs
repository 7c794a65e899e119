//! Error types for the expression engine.
//!
//! Errors are split by phase:
//!
//! ```text
//! TsbcError (top-level wrapper)
//! ├── CompilationError - operator/type resolution failures (static)
//! └── RuntimeError     - failures raised by emitted code
//! ```
//!
//! Compile-time problems that do not stop compilation (an unreachable
//! nullish right operand, for example) are reported as diagnostics by the
//! compiler, not through these types.

use thiserror::Error;

use crate::{BinaryOperator, Span, TypeKind};

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors raised while resolving or planning a binary expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// No rule exists for the operator and operand type pair.
    #[error("at {span}: operator '{operator}' cannot be applied to '{left}' and '{right}': {reason}")]
    StaticType {
        operator: BinaryOperator,
        left: TypeKind,
        right: TypeKind,
        reason: String,
        span: Span,
    },

    /// A source type name could not be mapped to a type.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    /// The expression is well typed but cannot be lowered.
    #[error("at {span}: {message}")]
    InvalidOperation { message: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::StaticType { span, .. } => *span,
            CompilationError::UnknownType { span, .. } => *span,
            CompilationError::InvalidOperation { span, .. } => *span,
        }
    }

    /// Shorthand for a [`CompilationError::StaticType`] error.
    pub fn static_type(
        operator: BinaryOperator,
        left: &TypeKind,
        right: &TypeKind,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        CompilationError::StaticType {
            operator,
            left: left.clone(),
            right: right.clone(),
            reason: reason.into(),
            span,
        }
    }
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors raised by executing emitted code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Integer division/modulo by zero, or a negative big-integer exponent.
    #[error("arithmetic error: {message}")]
    Arithmetic { message: String },

    /// A null wrapper reference reached an unboxing instruction.
    #[error("cannot unbox null to {target}")]
    NullUnboxing { target: TypeKind },

    /// An instruction popped more values than the stack holds.
    #[error("operand stack underflow at offset {offset}")]
    StackUnderflow { offset: usize },

    /// The byte at `offset` is not a known opcode.
    #[error("invalid opcode {byte:#04x} at offset {offset}")]
    InvalidOpcode { byte: u8, offset: usize },

    /// A constant index is out of range or names the wrong constant kind.
    #[error("invalid constant index {index}")]
    InvalidConstant { index: u32 },

    /// An instruction's inline operand runs past the end of the chunk.
    #[error("truncated operand at offset {offset}")]
    MissingOperand { offset: usize },

    /// A local slot was read before being assigned.
    #[error("unknown local slot {slot}")]
    UnknownLocal { slot: u16 },

    /// A value of the wrong runtime kind reached an instruction.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl RuntimeError {
    pub fn division_by_zero() -> Self {
        RuntimeError::Arithmetic {
            message: "division or modulo by zero".to_string(),
        }
    }

    pub fn negative_exponent() -> Self {
        RuntimeError::Arithmetic {
            message: "negative exponent".to_string(),
        }
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Unified error for compiling and running expressions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TsbcError {
    /// A compilation error.
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// A runtime error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl TsbcError {
    /// Check if this is a compilation error.
    pub fn is_compilation(&self) -> bool {
        matches!(self, TsbcError::Compilation(_))
    }

    /// Check if this is a runtime error.
    pub fn is_runtime(&self) -> bool {
        matches!(self, TsbcError::Runtime(_))
    }
}
