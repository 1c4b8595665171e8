//! Harvest phase - root selection, member harvesting and attribute matching.

use eyre::Result;
use indexmap::IndexSet;
use vmbridge_core::to_snake_case;
use vmbridge_ir::{AUXILIARY_MESSAGES, FIXED_RPCS};
use vmbridge_source::{SymbolTable, TypeId, syntax::DeclKind};

use crate::{
    CodegenError,
    attributes::Marker,
    harvest::{self, HarvestResult},
    pipeline::{CompilationContext, Diagnostic, DiagnosticKind, GeneratorOptions, Phase},
};

/// Phase that selects the root view model and harvests its observable
/// properties and commands.
pub struct HarvestPhase;

impl Phase for HarvestPhase {
    fn name(&self) -> &'static str {
        "harvest"
    }

    fn description(&self) -> &'static str {
        "Select the root view model and harvest observable members and commands"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let root = select_root(&ctx.symbols, &ctx.options)?;
        let (result, diagnostics) = harvest_root(&ctx.symbols, &ctx.options, root);

        tracing::debug!(
            root = %ctx.symbols.get(root).full_name(),
            properties = result.properties.len(),
            commands = result.commands.len(),
            "harvested view model"
        );

        for diagnostic in diagnostics {
            ctx.add_diagnostic(diagnostic);
        }
        ctx.harvest = Some(result);
        Ok(())
    }
}

/// Pick the root declaration.
///
/// Candidates are non-abstract, non-generic classes that derive from the
/// configured base (resolved or by name at the first unresolved link) or
/// carry it as an attribute.
fn select_root(table: &SymbolTable, options: &GeneratorOptions) -> Result<TypeId> {
    let base = Marker::new(&options.markers.view_model_base);
    let base_name = simple_name(base.configured());

    let candidates: Vec<TypeId> = table
        .iter()
        .filter(|decl| matches!(decl.kind, DeclKind::Class | DeclKind::Record))
        .filter(|decl| !decl.has_modifier("abstract") && !decl.is_generic())
        .filter(|decl| {
            let derives = table
                .ancestor_names(decl.id)
                .iter()
                .skip(1)
                .any(|name| simple_name(name) == base_name);
            derives || base.matches_any(&decl.attributes, &decl.scope, table)
        })
        .map(|decl| decl.id)
        .collect();

    let selected = match &options.view_model {
        Some(wanted) => candidates.iter().copied().find(|id| {
            let decl = table.get(*id);
            decl.name == *wanted || decl.full_name() == *wanted
        }),
        None => candidates.first().copied(),
    };

    selected.ok_or_else(|| {
        let message = match &options.view_model {
            Some(wanted) if candidates.is_empty() => format!(
                "view model '{}' not found: no class derives from '{}'",
                wanted, base_name
            ),
            Some(wanted) => format!(
                "view model '{}' not found among {} candidate(s) deriving from '{}'",
                wanted,
                candidates.len(),
                base_name
            ),
            None => format!(
                "no view model found: no class derives from '{}' or carries it as an attribute",
                base_name
            ),
        };
        CodegenError::Configuration(message).into()
    })
}

fn harvest_root(
    table: &SymbolTable,
    options: &GeneratorOptions,
    root: TypeId,
) -> (HarvestResult, Vec<Diagnostic>) {
    let observable = Marker::new(&options.markers.observable_property);
    let command = Marker::new(&options.markers.command);
    let root_name = table.get(root).name.clone();

    let mut properties = Vec::new();
    let mut commands = Vec::new();
    let mut property_names = IndexSet::new();
    let mut command_names = IndexSet::new();
    let mut diagnostics = Vec::new();

    for handle in harvest::members(table, root) {
        let scope = &table.get(handle.owner).scope;
        let attributes = &handle.member.attributes;

        if observable.matches_any(attributes, scope, table) {
            let Some(property) = harvest::observable(handle) else {
                continue;
            };
            if property_names.insert(to_snake_case(&property.name)) {
                properties.push(property);
            } else {
                diagnostics.push(duplicate(&root_name, &property.name, "property"));
            }
        } else if command.matches_any(attributes, scope, table) {
            let Some(cmd) = harvest::command(handle) else {
                continue;
            };
            if shadows_generated_rpc(&cmd.method_name) {
                diagnostics.push(
                    Diagnostic::warning(
                        "harvest",
                        format!(
                            "command '{}' collides with a generated service member; it is not exposed",
                            cmd.method_name
                        ),
                    )
                    .kind(DiagnosticKind::DuplicateMember)
                    .at(format!("{}.{}", root_name, cmd.method_name)),
                );
                continue;
            }
            let property = command_property(&cmd.method_name, cmd.is_async);
            if command_names.insert(property.clone()) {
                commands.push(cmd);
            } else {
                diagnostics.push(duplicate(&root_name, &property, "command"));
            }
        }
    }

    let result = HarvestResult {
        root,
        properties,
        commands,
    };
    (result, diagnostics)
}

/// Name of the generated command property (`SaveAsync` -> `SaveCommand`).
pub(crate) fn command_property(method_name: &str, is_async: bool) -> String {
    let base = if is_async {
        vmbridge_core::strip_async_suffix(method_name)
    } else {
        method_name
    };
    format!("{}Command", base)
}

/// Whether a command's RPC or its request/response messages would clash
/// with the members every generated service declares.
fn shadows_generated_rpc(method_name: &str) -> bool {
    let request = format!("{}Request", method_name);
    let response = format!("{}Response", method_name);
    FIXED_RPCS.contains(&method_name)
        || AUXILIARY_MESSAGES
            .iter()
            .any(|name| *name == request || *name == response)
}

fn duplicate(root: &str, name: &str, what: &str) -> Diagnostic {
    Diagnostic::warning(
        "harvest",
        format!("duplicate {} '{}'; keeping the first declaration", what, name),
    )
    .kind(DiagnosticKind::DuplicateMember)
    .at(format!("{}.{}", root, name))
}

fn simple_name(name: &str) -> &str {
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use vmbridge_source::{MemoryLocator, parse_source};

    use super::*;

    fn context(src: &str, options: GeneratorOptions) -> CompilationContext {
        let mut ctx = CompilationContext::new(options, MemoryLocator::new());
        ctx.add_source(parse_source(src, Path::new("MainViewModel.cs")).unwrap());
        ctx
    }

    const SOURCE: &str = r#"
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;

namespace Demo.ViewModels;

public abstract class ViewModelBase : ObservableObject { }

public partial class MainViewModel : ViewModelBase
{
    [ObservableProperty] private string _name;
    [ObservableProperty] private int count;
    [ObservableProperty] private string name;

    public string Plain { get; set; }

    [RelayCommand] private void Reset() { }
    [RelayCommand] private async Task SaveAsync(string path, CancellationToken token) { }
    [RelayCommand] private void Save() { }
}

public partial class OtherViewModel : ObservableObject { }
"#;

    #[test]
    fn test_selects_first_derived_class() {
        let mut ctx = context(SOURCE, GeneratorOptions::new("Demo.ViewModels"));
        HarvestPhase.run(&mut ctx).unwrap();

        let harvest = ctx.harvest.as_ref().unwrap();
        assert_eq!(ctx.symbols.get(harvest.root).name, "MainViewModel");

        let properties: Vec<&str> = harvest.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(properties, vec!["Name", "Count"]);

        let commands: Vec<&str> = harvest
            .commands
            .iter()
            .map(|c| c.method_name.as_str())
            .collect();
        assert_eq!(commands, vec!["Reset", "SaveAsync"]);
        assert_eq!(harvest.commands[1].params.len(), 1);

        let duplicates: Vec<_> = ctx.diagnostics_of(DiagnosticKind::DuplicateMember).collect();
        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[1].location.as_deref(), Some("MainViewModel.SaveCommand"));
    }

    #[test]
    fn test_properties_with_the_same_wire_name_keep_the_first() {
        let src = r#"
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;
namespace Demo;
public partial class MainViewModel : ObservableObject
{
    [ObservableProperty] private string _userId;
    [ObservableProperty] private string _userID;
    [ObservableProperty] private string _email;
}
"#;
        let mut ctx = context(src, GeneratorOptions::new("Demo"));
        HarvestPhase.run(&mut ctx).unwrap();

        let harvest = ctx.harvest.as_ref().unwrap();
        let properties: Vec<&str> = harvest.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(properties, vec!["UserId", "Email"]);

        let duplicates: Vec<_> = ctx.diagnostics_of(DiagnosticKind::DuplicateMember).collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].location.as_deref(), Some("MainViewModel.UserID"));
    }

    #[test]
    fn test_commands_clashing_with_service_members_are_dropped() {
        let src = r#"
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;
namespace Demo;
public partial class MainViewModel : ObservableObject
{
    [RelayCommand] private void Ping() { }
    [RelayCommand] private Task GetState() { }
    [RelayCommand] private void Subscribe() { }
    [RelayCommand] private void ConnectionStatus() { }
    [RelayCommand] private void Refresh() { }
}
"#;
        let mut ctx = context(src, GeneratorOptions::new("Demo"));
        HarvestPhase.run(&mut ctx).unwrap();

        let harvest = ctx.harvest.as_ref().unwrap();
        let commands: Vec<&str> = harvest
            .commands
            .iter()
            .map(|c| c.method_name.as_str())
            .collect();
        assert_eq!(commands, vec!["Refresh"]);

        let locations: Vec<_> = ctx
            .diagnostics_of(DiagnosticKind::DuplicateMember)
            .filter_map(|d| d.location.as_deref())
            .collect();
        assert_eq!(
            locations,
            vec![
                "MainViewModel.Ping",
                "MainViewModel.GetState",
                "MainViewModel.Subscribe",
                "MainViewModel.ConnectionStatus",
            ]
        );
    }

    #[test]
    fn test_pinned_view_model() {
        let options = GeneratorOptions::new("Demo.ViewModels").view_model("Demo.ViewModels.OtherViewModel");
        let mut ctx = context(SOURCE, options);
        HarvestPhase.run(&mut ctx).unwrap();

        let root = ctx.harvest.as_ref().unwrap().root;
        assert_eq!(ctx.symbols.get(root).name, "OtherViewModel");
    }

    #[test]
    fn test_missing_root_is_a_configuration_error() {
        let mut ctx = context(
            "namespace Demo; public class Plain { }",
            GeneratorOptions::new("Demo"),
        );
        let err = HarvestPhase.run(&mut ctx).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CodegenError>(),
            Some(CodegenError::Configuration(_))
        ));
        assert!(ctx.harvest.is_none());
    }

    #[test]
    fn test_attribute_marked_root() {
        let mut options = GeneratorOptions::new("Demo");
        options.markers.view_model_base = "Demo.ViewModelAttribute".into();
        let mut ctx = context(
            "namespace Demo; [ViewModel] public class Shell { }",
            options,
        );
        HarvestPhase.run(&mut ctx).unwrap();

        let root = ctx.harvest.as_ref().unwrap().root;
        assert_eq!(ctx.symbols.get(root).name, "Shell");
    }

    #[test]
    fn test_command_property_names() {
        assert_eq!(command_property("Foo", false), "FooCommand");
        assert_eq!(command_property("FooAsync", true), "FooCommand");
        assert_eq!(command_property("FooAsync", false), "FooAsyncCommand");
        assert_eq!(command_property("Async", true), "AsyncCommand");
    }
}
