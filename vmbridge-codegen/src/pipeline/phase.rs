//! Pipeline phase trait.

use eyre::Result;

use super::CompilationContext;

/// A phase in the generation pipeline.
///
/// Phases are executed in order by the pipeline. Each phase reads and
/// extends the compilation context.
///
/// Built-in phases:
/// - `HarvestPhase` - selects the root and harvests observable members and commands
/// - `ResolvePhase` - computes the dependent-type closure
/// - `LowerPhase` - maps types and freezes the model IR
pub trait Phase: Send + Sync {
    /// The name of this phase (used in diagnostics and plugin hooks).
    fn name(&self) -> &'static str;

    /// A human-readable description of what this phase does.
    fn description(&self) -> &'static str;

    /// Run this phase on the compilation context.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails fatally. Non-fatal issues should
    /// be recorded as diagnostics instead.
    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;
}
