//! Binary operator definitions.

use std::fmt;

/// Binary operators accepted by the expression engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic operators
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Exp,

    // Bitwise operators
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,

    // Shift operators
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,

    // Relational operators
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,

    // Equality operators
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,

    // Short-circuit operators
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `??`
    NullishCoalesce,

    /// `in`
    In,
}

/// Rule family an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Arithmetic,
    Exponent,
    Bitwise,
    Shift,
    Relational,
    Equality,
    Logical,
    Nullish,
    Membership,
}

impl BinaryOperator {
    /// Every operator, in declaration order.
    pub const ALL: [BinaryOperator; 24] = {
        use BinaryOperator::*;
        [
            Add, Sub, Mul, Div, Mod, Exp, BitAnd, BitOr, BitXor, Shl, Shr, UShr, Lt, Le, Gt, Ge,
            Eq, NotEq, StrictEq, StrictNotEq, LogicalAnd, LogicalOr, NullishCoalesce, In,
        ]
    };

    /// Source-level spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Exp => "**",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::UShr => ">>>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::StrictEq => "===",
            BinaryOperator::StrictNotEq => "!==",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::NullishCoalesce => "??",
            BinaryOperator::In => "in",
        }
    }

    pub fn category(&self) -> OperatorCategory {
        use BinaryOperator::*;
        match self {
            Add | Sub | Mul | Div | Mod => OperatorCategory::Arithmetic,
            Exp => OperatorCategory::Exponent,
            BitAnd | BitOr | BitXor => OperatorCategory::Bitwise,
            Shl | Shr | UShr => OperatorCategory::Shift,
            Lt | Le | Gt | Ge => OperatorCategory::Relational,
            Eq | NotEq | StrictEq | StrictNotEq => OperatorCategory::Equality,
            LogicalAnd | LogicalOr => OperatorCategory::Logical,
            NullishCoalesce => OperatorCategory::Nullish,
            In => OperatorCategory::Membership,
        }
    }

    /// Whether `a op b` resolves to the same types as `b op a`.
    pub fn is_commutative(&self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Add | Mul | BitAnd | BitOr | BitXor | Eq | NotEq | StrictEq | StrictNotEq
        )
    }

    /// Whether the right operand may be skipped at run time.
    pub fn is_short_circuit(&self) -> bool {
        matches!(
            self,
            BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr | BinaryOperator::NullishCoalesce
        )
    }

    /// Whether the operator yields a boolean regardless of operand types.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self.category(),
            OperatorCategory::Relational | OperatorCategory::Equality | OperatorCategory::Membership
        )
    }

    /// Whether the operator inverts the result of its positive counterpart.
    pub fn is_negated(&self) -> bool {
        matches!(self, BinaryOperator::NotEq | BinaryOperator::StrictNotEq)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for op in BinaryOperator::ALL {
            assert!(seen.insert(op.symbol()), "duplicate symbol {}", op);
        }
    }

    #[test]
    fn short_circuit_operators() {
        let short: Vec<_> = BinaryOperator::ALL
            .into_iter()
            .filter(|op| op.is_short_circuit())
            .collect();
        assert_eq!(
            short,
            vec![
                BinaryOperator::LogicalAnd,
                BinaryOperator::LogicalOr,
                BinaryOperator::NullishCoalesce
            ]
        );
    }

    #[test]
    fn categories() {
        assert_eq!(BinaryOperator::UShr.category(), OperatorCategory::Shift);
        assert_eq!(BinaryOperator::Exp.category(), OperatorCategory::Exponent);
        assert_eq!(BinaryOperator::In.category(), OperatorCategory::Membership);
        assert!(BinaryOperator::StrictNotEq.is_comparison());
        assert!(!BinaryOperator::Sub.is_commutative());
    }

    #[test]
    fn display_uses_symbol() {
        assert_eq!(BinaryOperator::NullishCoalesce.to_string(), "??");
        assert_eq!(format!("{}", BinaryOperator::In), "in");
    }
}
