//! Pipeline orchestrator.

use eyre::Result;

use super::{
    CompilationContext, Phase, Plugin,
    phases::{HarvestPhase, LowerPhase, ResolvePhase},
};

/// The generation pipeline orchestrator.
///
/// The pipeline runs the built-in phases (harvest, resolve, lower) followed
/// by any user phases, calling plugin hooks before and after each phase.
/// Phases run sequentially; the resolver's work queue and the symbol table
/// it extends are not shared across threads.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new().plugin(MyPlugin::new());
///
/// let mut ctx = pipeline.run(ctx)?;
/// let ir = ctx.take_ir()?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a new pipeline with the built-in phases.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run the pipeline on a loaded context.
    ///
    /// Executes all phases in order:
    /// 1. HarvestPhase - selects the root, harvests members
    /// 2. ResolvePhase - computes the dependent-type closure
    /// 3. LowerPhase - maps types, freezes the IR
    /// 4. User phases (if any)
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally (e.g. no root view model).
    pub fn run(&self, mut ctx: CompilationContext) -> Result<CompilationContext> {
        let builtin_phases: Vec<Box<dyn Phase>> = vec![
            Box::new(HarvestPhase),
            Box::new(ResolvePhase),
            Box::new(LowerPhase),
        ];

        for phase in builtin_phases.iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();
        let _span = tracing::debug_span!("phase", name = phase_name).entered();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        tracing::debug!(description = phase.description(), "running phase");
        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
