//! Expression emission planner.
//!
//! The planner walks a typed expression tree bottom-up, resolves every binary
//! node and turns it into an ordered list of [`EmitDirective`]s:
//!
//! ```text
//! evaluate left -> coerce left -> [branch, discard] -> evaluate right
//!               -> coerce right -> operate -> [label] -> [boundary coercions]
//! ```
//!
//! Short-circuit operators have no operation of their own: the branch and
//! its label are the whole operation. A `??` whose left side can never be
//! null does not evaluate its right side at all.

mod chain;
mod labels;

pub use chain::ExpChain;
pub use labels::{Label, LabelAllocator};

use std::fmt;

use bumpalo::Bump;
use tracing::debug;
use tsbc_core::{BinaryExpr, CompilationError, LiteralExpr, Span, TypeKind, TypedExpr};

use crate::context::CompilationContext;
use crate::conversion::{CoercionStep, find_conversion};
use crate::operators::{LogicalOp, Operation, ResolvedBinaryOp, resolve_binary};

/// Which value a directive refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    /// The value produced by the operation (context boundary).
    Result,
}

/// Condition tested by a branch. The tested value stays on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchCondition {
    IfFalsy,
    IfTruthy,
    IfNonNull,
}

/// One step of an emission plan.
#[derive(Debug, Clone, PartialEq)]
pub enum EmitDirective {
    EvaluateOperand(Side),
    ApplyCoercion(Side, CoercionStep),
    /// Jump to the label when the condition holds, keeping the tested value.
    Branch(BranchCondition, Label),
    /// Pop the value a branch kept on the fall-through path.
    Discard,
    EmitOperation(Operation),
    Label(Label),
}

impl fmt::Display for EmitDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitDirective::EvaluateOperand(side) => write!(f, "evaluate {:?}", side),
            EmitDirective::ApplyCoercion(side, step) => write!(f, "coerce {:?}: {}", side, step),
            EmitDirective::Branch(cond, label) => write!(f, "branch {:?} -> {}", cond, label),
            EmitDirective::Discard => write!(f, "discard"),
            EmitDirective::EmitOperation(op) => write!(f, "operate {:?}", op),
            EmitDirective::Label(label) => write!(f, "{}:", label),
        }
    }
}

static DYNAMIC: TypeKind = TypeKind::Object;

/// A planned expression: either a leaf evaluated directly or a planned
/// binary node.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedExpr<'ast> {
    Leaf(&'ast TypedExpr<'ast>),
    Binary(Box<BinaryPlan<'ast>>),
}

impl<'ast> PlannedExpr<'ast> {
    /// Static type of the value this expression leaves on the stack.
    pub fn static_type(&self) -> &TypeKind {
        match self {
            PlannedExpr::Leaf(expr) => expr.leaf_type().unwrap_or(&DYNAMIC),
            PlannedExpr::Binary(plan) => &plan.result_type,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PlannedExpr::Leaf(expr) => expr.span(),
            PlannedExpr::Binary(plan) => plan.node.span,
        }
    }
}

/// Plan for a single binary node.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPlan<'ast> {
    pub node: &'ast BinaryExpr<'ast>,
    pub left: PlannedExpr<'ast>,
    pub right: PlannedExpr<'ast>,
    pub resolved: ResolvedBinaryOp,
    pub directives: Vec<EmitDirective>,
    /// Type after boundary coercions; equals the context type when one is set.
    pub result_type: TypeKind,
}

impl BinaryPlan<'_> {
    /// Whether the right operand is evaluated on some path.
    pub fn evaluates_right(&self) -> bool {
        self.directives
            .contains(&EmitDirective::EvaluateOperand(Side::Right))
    }
}

/// Builds emission plans for one compile unit.
pub struct Planner<'c, 'a> {
    ctx: &'c mut CompilationContext<'a>,
    labels: LabelAllocator,
}

impl<'c, 'a> Planner<'c, 'a> {
    pub fn new(ctx: &'c mut CompilationContext<'a>) -> Self {
        Self {
            ctx,
            labels: LabelAllocator::new(),
        }
    }

    /// Number of labels allocated so far.
    pub fn label_count(&self) -> u32 {
        self.labels.count()
    }

    /// Plan any expression.
    pub fn plan<'ast>(
        &mut self,
        expr: &'ast TypedExpr<'ast>,
    ) -> Result<PlannedExpr<'ast>, CompilationError> {
        match expr {
            TypedExpr::Binary(node) => Ok(PlannedExpr::Binary(Box::new(self.plan_binary(node)?))),
            TypedExpr::Literal(literal) => {
                check_literal(literal)?;
                Ok(PlannedExpr::Leaf(expr))
            }
            TypedExpr::Local(_) => Ok(PlannedExpr::Leaf(expr)),
            TypedExpr::Increment(local) => {
                if !(local.ty.is_numeric() && local.ty.is_primitive()) {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("cannot increment a value of type '{}'", local.ty),
                        span: local.span,
                    });
                }
                Ok(PlannedExpr::Leaf(expr))
            }
        }
    }

    /// Fold an exponent chain with the configured associativity and plan it.
    pub fn plan_exp_chain<'ast>(
        &mut self,
        chain: ExpChain<'ast>,
        arena: &'ast Bump,
    ) -> Result<PlannedExpr<'ast>, CompilationError> {
        let associativity = self.ctx.options().exp_associativity;
        debug!(?associativity, operands = chain.operand_count(), "folding exponent chain");
        self.plan(chain.fold(arena, associativity))
    }

    /// Plan a binary node and its operands.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn plan_binary<'ast>(
        &mut self,
        node: &'ast BinaryExpr<'ast>,
    ) -> Result<BinaryPlan<'ast>, CompilationError> {
        let left = self.plan(node.left)?;
        let right = self.plan(node.right)?;

        let resolved = resolve_binary(
            left.static_type(),
            right.static_type(),
            node.op,
            self.ctx,
            node.span,
        )?;

        let mut directives = Vec::with_capacity(
            resolved.left_coercion.len() + resolved.right_coercion.len() + 6,
        );
        directives.push(EmitDirective::EvaluateOperand(Side::Left));
        push_coercions(&mut directives, Side::Left, &resolved.left_coercion);

        match resolved.operation {
            Operation::Logical(op) => {
                let condition = match op {
                    LogicalOp::And => BranchCondition::IfFalsy,
                    LogicalOp::Or => BranchCondition::IfTruthy,
                };
                self.push_short_circuit(&mut directives, condition, &resolved);
            }
            Operation::Nullish {
                right_reachable: true,
            } => {
                self.push_short_circuit(&mut directives, BranchCondition::IfNonNull, &resolved);
            }
            Operation::Nullish {
                right_reachable: false,
            } => {
                if self.ctx.options().warn_unreachable_nullish {
                    self.ctx.warn(
                        format!(
                            "left operand of '??' has type '{}' and is never null; the right operand is never evaluated",
                            left.static_type()
                        ),
                        node.span,
                    );
                }
            }
            operation => {
                directives.push(EmitDirective::EvaluateOperand(Side::Right));
                push_coercions(&mut directives, Side::Right, &resolved.right_coercion);
                directives.push(EmitDirective::EmitOperation(operation));
            }
        }

        let result_type = match &node.context_type {
            Some(target) if *target != resolved.result_type => {
                let conversion = find_conversion(&resolved.result_type, target, self.ctx.oracle())
                    .ok_or_else(|| CompilationError::InvalidOperation {
                        message: format!(
                            "cannot convert '{}' to '{}'",
                            resolved.result_type, target
                        ),
                        span: node.span,
                    })?;
                push_coercions(&mut directives, Side::Result, &conversion.steps);
                target.clone()
            }
            _ => resolved.result_type.clone(),
        };

        debug!(
            operator = %node.op,
            result = %result_type,
            directives = directives.len(),
            "planned binary expression"
        );

        Ok(BinaryPlan {
            node,
            left,
            right,
            resolved,
            directives,
            result_type,
        })
    }

    fn push_short_circuit(
        &mut self,
        directives: &mut Vec<EmitDirective>,
        condition: BranchCondition,
        resolved: &ResolvedBinaryOp,
    ) {
        let end = self.labels.fresh();
        directives.push(EmitDirective::Branch(condition, end));
        directives.push(EmitDirective::Discard);
        directives.push(EmitDirective::EvaluateOperand(Side::Right));
        push_coercions(directives, Side::Right, &resolved.right_coercion);
        directives.push(EmitDirective::Label(end));
    }
}

fn push_coercions(directives: &mut Vec<EmitDirective>, side: Side, steps: &[CoercionStep]) {
    directives.extend(
        steps
            .iter()
            .map(|step| EmitDirective::ApplyCoercion(side, step.clone())),
    );
}

fn check_literal(literal: &LiteralExpr<'_>) -> Result<(), CompilationError> {
    if literal.is_well_typed() {
        Ok(())
    } else {
        Err(CompilationError::InvalidOperation {
            message: format!("literal {:?} cannot have type '{}'", literal.kind, literal.ty),
            span: literal.span,
        })
    }
}
