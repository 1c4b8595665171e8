//! Generation pipeline.
//!
//! This module provides a [`Pipeline`] orchestrator that manages the phases
//! from loaded declarations to the frozen model IR. The pipeline provides:
//!
//! - Explicit phase boundaries (harvest → resolve → lower)
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection
//! - Shared state via [`CompilationContext`]
//!
//! # Example
//!
//! ```ignore
//! use vmbridge_codegen::pipeline::{CompilationContext, GeneratorOptions, Pipeline};
//!
//! let mut ctx = CompilationContext::new(GeneratorOptions::new("Demo"), locator);
//! ctx.add_source(parse_file(path)?);
//!
//! let mut ctx = Pipeline::new().run(ctx)?;
//! for diag in ctx.warnings() {
//!     eprintln!("{}", diag);
//! }
//! let ir = ctx.take_ir()?;
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::{CompilationContext, GeneratorOptions};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use phase::Phase;
pub use plugin::Plugin;
pub use runner::Pipeline;
