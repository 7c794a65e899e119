//! Coercion steps and type-to-type conversions.
//!
//! A [`CoercionStep`] is one instruction-level change of representation
//! applied to an operand. The resolver only ever produces unbox, widen, box
//! and to-string steps for binary operands; [`find_conversion`] additionally
//! produces narrowing steps for context boundaries (assignment targets and
//! explicit casts).

use std::fmt;

use tsbc_core::{NumericKind, TypeKind};

use crate::registry::ClassOracle;

mod primitive;

pub use primitive::{numeric_step, widening_step};

/// A single representation change applied to a value on the stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CoercionStep {
    /// Unwrap a boxed reference into the given primitive type.
    ///
    /// Fails at run time with `NullUnboxing` when the reference is null.
    Unbox(TypeKind),
    /// Lossless (type-level) numeric conversion.
    Widen { from: NumericKind, to: NumericKind },
    /// Range-reducing numeric conversion. Never part of a binary promotion.
    Narrow { from: NumericKind, to: NumericKind },
    /// Wrap a primitive into the given boxed type.
    Box(TypeKind),
    /// Convert any value to its text form (`"null"` for null references).
    ToStringConv,
}

impl CoercionStep {
    /// Whether the step can lose range or precision beyond what the lattice
    /// accepts.
    pub fn is_narrowing(&self) -> bool {
        matches!(self, CoercionStep::Narrow { .. })
    }
}

impl fmt::Display for CoercionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionStep::Unbox(to) => write!(f, "unbox({})", to),
            CoercionStep::Widen { from, to } => write!(f, "widen({} -> {})", from, to),
            CoercionStep::Narrow { from, to } => write!(f, "narrow({} -> {})", from, to),
            CoercionStep::Box(to) => write!(f, "box({})", to),
            CoercionStep::ToStringConv => f.write_str("to-string"),
        }
    }
}

/// A full conversion between two static types.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Steps applied in order.
    pub steps: Vec<CoercionStep>,
    /// Whether this conversion can be applied implicitly.
    pub is_implicit: bool,
}

impl Conversion {
    /// No conversion needed.
    pub(crate) fn identity() -> Self {
        Self {
            steps: Vec::new(),
            is_implicit: true,
        }
    }

    fn from_steps(steps: Vec<CoercionStep>) -> Self {
        let is_implicit = !steps
            .iter()
            .any(|s| s.is_narrowing() || *s == CoercionStep::ToStringConv);
        Self { steps, is_implicit }
    }

    /// Check if this is an exact match (no conversion).
    pub fn is_exact(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Find the steps converting a value of type `from` into type `to`.
///
/// Returns `None` when no conversion exists. Narrowing and to-string
/// conversions are returned with `is_implicit == false`.
pub fn find_conversion(
    from: &TypeKind,
    to: &TypeKind,
    oracle: &dyn ClassOracle,
) -> Option<Conversion> {
    if from == to {
        return Some(Conversion::identity());
    }

    match (from, to) {
        (TypeKind::Null, target) if target.is_reference() => Some(Conversion::identity()),
        (source, TypeKind::Object) if source.is_reference() => Some(Conversion::identity()),
        (source, TypeKind::Object) => Some(Conversion::from_steps(vec![CoercionStep::Box(
            source.boxed(),
        )])),
        (TypeKind::Reference(a), TypeKind::Reference(b)) => oracle
            .is_assignable(*a, *b)
            .then(Conversion::identity),
        (TypeKind::Boolean, TypeKind::BoxedBoolean) => Some(Conversion::from_steps(vec![
            CoercionStep::Box(TypeKind::BoxedBoolean),
        ])),
        (TypeKind::BoxedBoolean, TypeKind::Boolean) => Some(Conversion::from_steps(vec![
            CoercionStep::Unbox(TypeKind::Boolean),
        ])),
        (_, TypeKind::String) => Some(Conversion::from_steps(vec![CoercionStep::ToStringConv])),
        _ => numeric_conversion(from, to),
    }
}

fn numeric_conversion(from: &TypeKind, to: &TypeKind) -> Option<Conversion> {
    let source = from.numeric_kind()?;
    let target = to.numeric_kind()?;

    let mut steps = Vec::with_capacity(3);
    if from.is_boxed() {
        steps.push(CoercionStep::Unbox(source.primitive()));
    }
    steps.extend(numeric_step(source, target));
    if to.is_boxed() {
        steps.push(CoercionStep::Box(to.clone()));
    }
    Some(Conversion::from_steps(steps))
}

/// Steps that bring an operand of type `from` to the primitive operating kind.
///
/// Used by the resolver: the result never contains a narrowing step.
pub(crate) fn promote_operand(from: &TypeKind, operating: NumericKind) -> Vec<CoercionStep> {
    let mut steps = Vec::new();
    let Some(kind) = from.numeric_kind() else {
        return steps;
    };
    if from.is_boxed() {
        steps.push(CoercionStep::Unbox(kind.primitive()));
    }
    steps.extend(widening_step(kind, operating));
    steps
}

/// Steps that box a primitive operand; references are left alone.
pub(crate) fn box_operand(from: &TypeKind) -> Vec<CoercionStep> {
    if from.is_primitive() {
        vec![CoercionStep::Box(from.boxed())]
    } else {
        Vec::new()
    }
}
