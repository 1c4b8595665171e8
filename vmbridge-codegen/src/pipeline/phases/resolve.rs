//! Resolve phase - dependent-type closure.

use eyre::{Result, eyre};

use crate::{
    attributes::Marker,
    closure::{ClosureResolver, Pending},
    pipeline::{CompilationContext, Diagnostic, DiagnosticKind, Phase},
};

/// Phase that discovers every dependent type reachable from the harvested
/// properties and command parameters, loading missing sources on demand.
pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Compute the closure of dependent types"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let harvest = ctx
            .harvest
            .as_ref()
            .ok_or_else(|| eyre!("harvest result not set - did the harvest phase run?"))?;

        let symbols = &ctx.symbols;
        let scope = |owner| symbols.get(owner).scope.clone();
        let properties = harvest
            .properties
            .iter()
            .map(|p| Pending::new(p.ty.clone(), scope(p.owner)));
        let parameters = harvest.commands.iter().flat_map(|c| {
            c.params
                .iter()
                .map(move |p| Pending::new(p.ty.clone(), scope(c.owner)))
        });
        let roots: Vec<Pending> = properties.chain(parameters).collect();

        let observable = Marker::new(&ctx.options.markers.observable_property);
        let closure = ClosureResolver::new(&mut ctx.symbols, ctx.locator.as_ref(), &observable)
            .resolve(roots);

        tracing::debug!(
            types = closure.types.len(),
            visited = closure.visited.len(),
            unresolved = closure.unresolved.len(),
            "resolved dependent types"
        );

        let mut diagnostics = Vec::new();
        for failure in &closure.parse_failures {
            diagnostics.push(
                Diagnostic::warning(
                    self.name(),
                    format!("failed to parse source for '{}': {}", failure.name, failure.message),
                )
                .kind(DiagnosticKind::SourceParse),
            );
        }
        for duplicate in &closure.duplicates {
            diagnostics.push(
                Diagnostic::warning(
                    self.name(),
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
        for diagnostic in diagnostics {
            ctx.add_diagnostic(diagnostic);
        }

        ctx.closure = Some(closure);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use vmbridge_source::{MemoryLocator, parse_source};

    use super::*;
    use crate::pipeline::{GeneratorOptions, phases::HarvestPhase};

    #[test]
    fn test_resolves_from_properties_and_parameters() {
        let locator = MemoryLocator::new()
            .with_source("Tag", "namespace Demo.Models; public class Tag { public string Label; }")
            .with_source("Broken", "namespace Demo.Models; public class Broken {");
        let mut ctx = CompilationContext::new(GeneratorOptions::new("Demo"), locator);
        ctx.add_source(
            parse_source(
                r#"
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;
using Demo.Models;
namespace Demo;
public partial class MainViewModel : ObservableObject
{
    [ObservableProperty] private List<Tag> _tags;
    [RelayCommand] private void Open(Broken target) { }
}
"#,
                Path::new("MainViewModel.cs"),
            )
            .unwrap(),
        );

        HarvestPhase.run(&mut ctx).unwrap();
        ResolvePhase.run(&mut ctx).unwrap();

        let closure = ctx.closure.as_ref().unwrap();
        assert_eq!(closure.types.keys().collect::<Vec<_>>(), vec!["Demo.Models.Tag"]);
        assert!(closure.unresolved.contains("Broken"));
        assert_eq!(ctx.diagnostics_of(DiagnosticKind::SourceParse).count(), 1);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_requires_harvest() {
        let mut ctx = CompilationContext::new(GeneratorOptions::new("Demo"), MemoryLocator::new());
        assert!(ResolvePhase.run(&mut ctx).is_err());
    }
}
