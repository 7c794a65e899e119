//! CompilationContext - options, class oracle and collected diagnostics.

use std::fmt;

use tracing::warn;
use tsbc_core::{ClassId, CompilationError, Span, TypeKind};

use crate::options::CompilerOptions;
use crate::registry::ClassOracle;

/// Severity of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Note,
}

/// A non-fatal message produced while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        write!(f, "{} at {}: {}", label, self.span, self.message)
    }
}

/// Per-compilation state shared by the resolver, planner and emitter.
///
/// One context belongs to one compile unit; parallel drivers create one each.
pub struct CompilationContext<'a> {
    options: &'a CompilerOptions,
    oracle: &'a dyn ClassOracle,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CompilationContext<'a> {
    pub fn new(options: &'a CompilerOptions, oracle: &'a dyn ClassOracle) -> Self {
        Self {
            options,
            oracle,
            diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &'a CompilerOptions {
        self.options
    }

    pub fn oracle(&self) -> &'a dyn ClassOracle {
        self.oracle
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>, span: Span) {
        let message = message.into();
        warn!(%span, "{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
            span,
        });
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the collected diagnostics, leaving the context empty.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Resolve a source type name.
    ///
    /// Aliases win; otherwise a qualified name known to the oracle resolves
    /// to a class reference.
    pub fn resolve_type(&self, name: &str, span: Span) -> Result<TypeKind, CompilationError> {
        match self.options.resolve_type_name(name, span) {
            Ok(ty) => Ok(ty),
            Err(err) => {
                let id = ClassId::from_name(name.trim());
                if self.oracle.class_name(id).is_some() {
                    Ok(TypeKind::Reference(id))
                } else {
                    Err(err)
                }
            }
        }
    }
}
