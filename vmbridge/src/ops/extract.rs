//! Extract operation - declarations to frozen model.

use eyre::{Context, Result};
use tracing::{debug, info, warn};
use vmbridge_codegen::pipeline::{CompilationContext, Diagnostic, GeneratorOptions, Pipeline};
use vmbridge_ir::ModelIR;
use vmbridge_source::{Config, DirectoryLocator, collect_sources, parse_file, syntax::SourceFile};

/// The frozen model and every diagnostic raised while building it.
#[derive(Debug)]
pub struct Extracted {
    pub ir: ModelIR,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse every configured source file.
///
/// Parse failures are returned as-is so the caller can render them with
/// their source labels.
pub fn load_sources(config: &Config) -> vmbridge_source::Result<Vec<SourceFile>> {
    let paths = collect_sources(&config.project.sources)?;
    debug!(count = paths.len(), "collected source files");
    paths.iter().map(|path| parse_file(path)).collect()
}

/// Run the pipeline over `sources`.
///
/// `view_model` pins the root, taking precedence over `project.view_model`.
/// Soft diagnostics are logged and kept on the result; only a missing or
/// ambiguous root fails.
pub fn extract(
    config: &Config,
    sources: Vec<SourceFile>,
    view_model: Option<&str>,
) -> Result<Extracted> {
    let mut options = GeneratorOptions::from_config(config);
    if let Some(name) = view_model {
        options = options.view_model(name);
    }

    let locator = DirectoryLocator::new(config.project.search_paths.iter().cloned());
    let mut ctx = CompilationContext::new(options, locator);
    for file in sources {
        ctx.add_source(file);
    }

    let mut ctx = Pipeline::new().run(ctx).wrap_err("Model extraction failed")?;

    for diag in ctx.warnings() {
        match &diag.location {
            Some(location) => warn!(phase = %diag.phase, %location, "{}", diag.message),
            None => warn!(phase = %diag.phase, "{}", diag.message),
        }
    }

    let ir = ctx.take_ir()?;
    info!(
        view_model = %ir.view_model.full_name(),
        properties = ir.view_model.properties.len(),
        commands = ir.view_model.commands.len(),
        messages = ir.messages.len(),
        "extracted model"
    );

    Ok(Extracted {
        ir,
        diagnostics: std::mem::take(&mut ctx.diagnostics),
    })
}
