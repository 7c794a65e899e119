//! Compiler configuration.

use rustc_hash::FxHashMap;
use tsbc_core::{CompilationError, Span, TypeKind};

/// Grouping of `a ** b ** c` chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    /// `(a ** b) ** c`
    #[default]
    Left,
    /// `a ** (b ** c)`
    Right,
}

/// Options controlling expression compilation.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Record source line numbers for every emitted instruction.
    pub debug: bool,
    /// How exponent chains are grouped when folded from a flat list.
    pub exp_associativity: Associativity,
    /// Report a warning when a nullish right operand can never run.
    pub warn_unreachable_nullish: bool,
    /// Source type names mapped to static types.
    pub type_aliases: FxHashMap<String, TypeKind>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            debug: false,
            exp_associativity: Associativity::Left,
            warn_unreachable_nullish: true,
            type_aliases: default_type_aliases(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_exp_associativity(mut self, associativity: Associativity) -> Self {
        self.exp_associativity = associativity;
        self
    }

    pub fn with_warn_unreachable_nullish(mut self, warn: bool) -> Self {
        self.warn_unreachable_nullish = warn;
        self
    }

    /// Add or replace a type alias.
    pub fn with_type_alias(mut self, name: impl Into<String>, ty: TypeKind) -> Self {
        self.type_aliases.insert(name.into(), ty);
        self
    }

    /// Resolve a source type name through the alias table.
    ///
    /// A trailing `[]` resolves to an array of the element type.
    pub fn resolve_type_name(&self, name: &str, span: Span) -> Result<TypeKind, CompilationError> {
        let name = name.trim();
        if let Some(element) = name.strip_suffix("[]") {
            return Ok(TypeKind::array_of(self.resolve_type_name(element, span)?));
        }
        self.type_aliases
            .get(name)
            .cloned()
            .ok_or_else(|| CompilationError::UnknownType {
                name: name.to_string(),
                span,
            })
    }
}

fn default_type_aliases() -> FxHashMap<String, TypeKind> {
    let entries = [
        ("boolean", TypeKind::Boolean),
        ("byte", TypeKind::Byte),
        ("short", TypeKind::Short),
        ("char", TypeKind::Char),
        ("int", TypeKind::Int),
        ("long", TypeKind::Long),
        ("float", TypeKind::Float),
        ("double", TypeKind::Double),
        ("number", TypeKind::Double),
        ("bigint", TypeKind::BigInt),
        ("Boolean", TypeKind::BoxedBoolean),
        ("Byte", TypeKind::BoxedByte),
        ("Short", TypeKind::BoxedShort),
        ("Character", TypeKind::BoxedChar),
        ("Integer", TypeKind::BoxedInt),
        ("Long", TypeKind::BoxedLong),
        ("Float", TypeKind::BoxedFloat),
        ("Double", TypeKind::BoxedDouble),
        ("BigInteger", TypeKind::BoxedBigInt),
        ("string", TypeKind::String),
        ("String", TypeKind::String),
        ("any", TypeKind::Object),
        ("unknown", TypeKind::Object),
        ("Object", TypeKind::Object),
    ];
    entries
        .into_iter()
        .map(|(name, ty)| (name.to_string(), ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbc_core::ClassId;

    #[test]
    fn defaults() {
        let options = CompilerOptions::default();
        assert!(!options.debug);
        assert_eq!(options.exp_associativity, Associativity::Left);
        assert!(options.warn_unreachable_nullish);
    }

    #[test]
    fn builtin_aliases() {
        let options = CompilerOptions::default();
        let span = Span::default();
        assert_eq!(options.resolve_type_name("number", span), Ok(TypeKind::Double));
        assert_eq!(options.resolve_type_name("Integer", span), Ok(TypeKind::BoxedInt));
        assert_eq!(options.resolve_type_name("any", span), Ok(TypeKind::Object));
        assert_eq!(options.resolve_type_name("bigint", span), Ok(TypeKind::BigInt));
    }

    #[test]
    fn array_suffix() {
        let options = CompilerOptions::default();
        assert_eq!(
            options.resolve_type_name("int[][]", Span::default()),
            Ok(TypeKind::array_of(TypeKind::array_of(TypeKind::Int)))
        );
    }

    #[test]
    fn custom_alias() {
        let options = CompilerOptions::new()
            .with_type_alias("List", TypeKind::Reference(ClassId::LIST))
            .with_debug(true);
        assert!(options.debug);
        assert_eq!(
            options.resolve_type_name("List", Span::default()),
            Ok(TypeKind::Reference(ClassId::LIST))
        );
    }

    #[test]
    fn unknown_name() {
        let err = CompilerOptions::default()
            .resolve_type_name("Widget", Span::new(2, 4, 6))
            .unwrap_err();
        assert_eq!(
            err,
            CompilationError::UnknownType {
                name: "Widget".to_string(),
                span: Span::new(2, 4, 6)
            }
        );
    }
}
