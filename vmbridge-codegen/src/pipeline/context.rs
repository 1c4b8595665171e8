//! Compilation context passed through pipeline phases.

use std::fmt;

use eyre::{Result, eyre};
use vmbridge_ir::ModelIR;
use vmbridge_source::{
    Config, MarkerConfig, SymbolTable, TypeSourceLocator, syntax::SourceFile,
};

use super::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::{closure::Closure, harvest::HarvestResult};

/// Settings that drive model extraction.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Namespace of the generated code; also drives the schema package.
    pub namespace: String,
    /// Simple or qualified name of the root view model, if pinned.
    pub view_model: Option<String>,
    pub markers: MarkerConfig,
}

impl GeneratorOptions {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            view_model: None,
            markers: MarkerConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            namespace: config.project.namespace.clone(),
            view_model: config.project.view_model.clone(),
            markers: config.markers.clone(),
        }
    }

    /// Pin the root view model.
    pub fn view_model(mut self, name: impl Into<String>) -> Self {
        self.view_model = Some(name.into());
        self
    }
}

/// Context passed through all pipeline phases.
///
/// This struct carries the state of generation through each phase,
/// accumulating results and diagnostics along the way.
pub struct CompilationContext {
    pub options: GeneratorOptions,
    /// Every declaration known to the session.
    pub symbols: SymbolTable,
    /// Finds sources for dependent types that are not yet in `symbols`.
    pub locator: Box<dyn TypeSourceLocator>,
    /// Root and harvested members (populated by HarvestPhase).
    pub harvest: Option<HarvestResult>,
    /// Dependent-type closure (populated by ResolvePhase).
    pub closure: Option<Closure>,
    /// The frozen model IR (populated by LowerPhase).
    pub ir: Option<ModelIR>,
    /// Diagnostics collected during generation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a new compilation context.
    pub fn new(options: GeneratorOptions, locator: impl TypeSourceLocator + 'static) -> Self {
        Self {
            options,
            symbols: SymbolTable::new(),
            locator: Box::new(locator),
            harvest: None,
            closure: None,
            ir: None,
            diagnostics: Vec::new(),
        }
    }

    /// Merge a parsed input file into the session.
    pub fn add_source(&mut self, file: SourceFile) {
        for duplicate in self.symbols.merge(file) {
            self.add_diagnostic(
                Diagnostic::warning(
                    "load",
                    format!(
                        "type '{}' is already defined in '{}'; keeping the first definition",
                        duplicate.name,
                        duplicate.first.display()
                    ),
                )
                .kind(DiagnosticKind::DuplicateTypeDefinition)
                .at(duplicate.duplicate.display().to_string()),
            );
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic::warning(phase, message));
    }

    /// Add an info diagnostic.
    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic::info(phase, message));
    }

    /// Add a fully built diagnostic.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(phase = %diagnostic.phase, "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.kind == Some(kind))
    }

    /// Take the IR out of the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the IR has not been set (i.e., LowerPhase hasn't run).
    pub fn take_ir(&mut self) -> Result<ModelIR> {
        self.ir
            .take()
            .ok_or_else(|| eyre!("model IR not set - did the lower phase run?"))
    }
}

impl fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("options", &self.options)
            .field("symbols", &self.symbols.len())
            .field("harvest", &self.harvest)
            .field("closure", &self.closure)
            .field("ir", &self.ir)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use vmbridge_source::{MemoryLocator, parse_source};

    use super::*;

    fn make_context() -> CompilationContext {
        CompilationContext::new(GeneratorOptions::new("Demo"), MemoryLocator::new())
    }

    #[test]
    fn test_context_creation() {
        let ctx = make_context();

        assert!(ctx.harvest.is_none());
        assert!(ctx.ir.is_none());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = make_context();

        ctx.add_error("test", "test error");
        ctx.add_warning("test", "test warning");
        ctx.add_info("test", "just info");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn test_take_ir_before_lowering_fails() {
        let mut ctx = make_context();
        assert!(ctx.take_ir().is_err());
    }

    #[test]
    fn test_duplicate_sources_are_reported() {
        let mut ctx = make_context();
        let src = "namespace Demo; public class Item { }";
        ctx.add_source(parse_source(src, Path::new("a/Item.cs")).unwrap());
        ctx.add_source(parse_source(src, Path::new("b/Item.cs")).unwrap());

        let duplicates: Vec<_> = ctx
            .diagnostics_of(DiagnosticKind::DuplicateTypeDefinition)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].location.as_deref(), Some("b/Item.cs"));
        assert!(!ctx.has_errors());
    }
}
