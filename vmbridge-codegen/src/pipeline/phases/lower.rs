//! Lower phase - maps harvested members to wire types and freezes the model IR.
//!
//! Members are bound again against the final symbol table, since the resolve
//! phase may have merged sources that were missing during harvesting. A
//! member whose type still references an undeclared type is dropped; a
//! command loses all of itself if any parameter is dropped.

use eyre::{Result, eyre};
use indexmap::{IndexMap, IndexSet};
use vmbridge_core::{to_pascal_case, to_snake_case};
use vmbridge_ir::{
    AUXILIARY_MESSAGES, CommandDescriptor, MessageDescriptor, ModelIR, ModelMeta, ParameterDescriptor,
    PropertyDescriptor, TypeKind, TypeRef, ViewModelDescriptor, WireType,
};
use vmbridge_source::{SymbolTable, TypeId, bind, is_declared, syntax::TypeSyntax};

use crate::{
    attributes::Marker,
    closure::Closure,
    harvest::{DataMember, HarvestResult, data_members},
    mapper::{MappingWarning, TypeMapper},
    pipeline::{CompilationContext, Diagnostic, DiagnosticKind, Phase},
};

use super::harvest::command_property;

/// Phase that maps types and produces the frozen [`ModelIR`].
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Map host types to wire types and freeze the model IR"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let harvest = ctx
            .harvest
            .as_ref()
            .ok_or_else(|| eyre!("harvest result not set - did the harvest phase run?"))?;
        let closure = ctx
            .closure
            .as_ref()
            .ok_or_else(|| eyre!("closure not set - did the resolve phase run?"))?;

        let observable = Marker::new(&ctx.options.markers.observable_property);
        let reserved = generated_names(&ctx.symbols, harvest);
        let lowering = Lowering::new(&ctx.symbols, closure, &observable, reserved);
        let (ir, diagnostics) = lowering.lower(harvest, &ctx.options.namespace);

        tracing::debug!(
            view_model = %ir.view_model.full_name(),
            properties = ir.view_model.properties.len(),
            commands = ir.view_model.commands.len(),
            messages = ir.messages.len(),
            "froze model IR"
        );

        for diagnostic in diagnostics {
            ctx.add_diagnostic(diagnostic);
        }
        ctx.ir = Some(ir);
        Ok(())
    }
}

/// Derive the schema package from a namespace (`Demo.ViewModels` -> `demo.view_models`).
pub fn package_name(namespace: &str) -> String {
    namespace
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(to_snake_case)
        .collect::<Vec<_>>()
        .join(".")
}

struct Lowering<'a> {
    table: &'a SymbolTable,
    closure: &'a Closure,
    observable: &'a Marker,
    names: IndexMap<String, String>,
    mapper: TypeMapper,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lowering<'a> {
    fn new(
        table: &'a SymbolTable,
        closure: &'a Closure,
        observable: &'a Marker,
        reserved: IndexSet<String>,
    ) -> Self {
        let names = message_names(table, closure, reserved);
        Self {
            table,
            closure,
            observable,
            mapper: TypeMapper::new(names.clone()),
            names,
            diagnostics: Vec::new(),
        }
    }

    fn lower(mut self, harvest: &HarvestResult, namespace: &str) -> (ModelIR, Vec<Diagnostic>) {
        let table = self.table;
        let root = table.get(harvest.root);
        let root_name = root.name.clone();

        let properties = harvest
            .properties
            .iter()
            .filter_map(|member| self.property(&root_name, member))
            .collect();
        let commands = harvest
            .commands
            .iter()
            .filter_map(|cmd| {
                let bound: Result<Vec<_>, String> = cmd
                    .params
                    .iter()
                    .map(|p| self.resolve(&p.ty, cmd.owner).map(|ty| (p, ty)))
                    .collect();
                let bound = match bound {
                    Ok(bound) => bound,
                    Err(missing) => {
                        self.diagnostics.push(
                            Diagnostic::warning(
                                "lower",
                                format!(
                                    "command '{}' is dropped: parameter type '{}' could not be resolved",
                                    cmd.method_name, missing
                                ),
                            )
                            .kind(DiagnosticKind::UnresolvedDependentType)
                            .at(format!("{}.{}", root_name, cmd.method_name)),
                        );
                        return None;
                    }
                };
                let parameters = bound
                    .into_iter()
                    .map(|(p, ty)| {
                        let location = format!("{}.{}({})", root_name, cmd.method_name, p.name);
                        let wire = self.map_type(&ty, &location);
                        ParameterDescriptor {
                            name: p.name.clone(),
                            ty,
                            wire,
                        }
                    })
                    .collect();
                Some(CommandDescriptor {
                    method_name: cmd.method_name.clone(),
                    command_property: command_property(&cmd.method_name, cmd.is_async),
                    parameters,
                    is_async: cmd.is_async,
                })
            })
            .collect();

        let view_model = ViewModelDescriptor {
            name: root_name,
            namespace: root.namespace.clone(),
            properties,
            commands,
        };

        let messages = self.messages(&view_model);

        let ir = ModelIR {
            meta: ModelMeta {
                namespace: namespace.to_string(),
                package: package_name(namespace),
            },
            view_model,
            messages,
        };
        (ir, self.diagnostics)
    }

    fn property(&mut self, owner_name: &str, member: &DataMember) -> Option<PropertyDescriptor> {
        let location = format!("{}.{}", owner_name, member.name);
        let (ty, wire) = self.bind_and_map(&member.ty, member.owner, &location)?;
        Some(PropertyDescriptor {
            name: member.name.clone(),
            ty,
            wire,
            writable: member.writable,
        })
    }

    /// Bind and map a written type, or `None` when it references an
    /// undeclared type.
    fn bind_and_map(
        &mut self,
        syntax: &TypeSyntax,
        owner: TypeId,
        location: &str,
    ) -> Option<(TypeRef, WireType)> {
        let ty = match self.resolve(syntax, owner) {
            Ok(ty) => ty,
            Err(missing) => {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "lower",
                        format!("type '{}' could not be resolved; member is dropped", missing),
                    )
                    .kind(DiagnosticKind::UnresolvedDependentType)
                    .at(location),
                );
                return None;
            }
        };
        let wire = self.map_type(&ty, location);
        Some((ty, wire))
    }

    /// Bind a written type in its owner's scope. Fails with the name of the
    /// first undeclared type it references.
    fn resolve(&self, syntax: &TypeSyntax, owner: TypeId) -> Result<TypeRef, String> {
        let table = self.table;
        let ty = bind(syntax, &table.get(owner).scope, table);
        match undeclared(&ty, table) {
            Some(missing) => Err(missing),
            None => Ok(ty),
        }
    }

    fn map_type(&mut self, ty: &TypeRef, location: &str) -> WireType {
        let mut warnings = Vec::new();
        let wire = self.mapper.map(ty, &mut warnings);
        self.diagnostics
            .extend(warnings.into_iter().map(|w| unmappable(w, location)));
        wire
    }

    /// Messages for dependent types reachable from the view model, in
    /// discovery order.
    fn messages(&mut self, view_model: &ViewModelDescriptor) -> Vec<MessageDescriptor> {
        let (table, closure) = (self.table, self.closure);
        let mut built: IndexMap<String, (MessageDescriptor, Vec<Diagnostic>)> = IndexMap::new();

        for (full_name, id) in &closure.types {
            let Some(name) = self.names.get(full_name).cloned() else {
                continue;
            };
            let decl = table.get(*id);
            let owner_name = &decl.name;
            let outer = std::mem::take(&mut self.diagnostics);
            let mut wire_names = IndexSet::new();
            let mut fields = Vec::new();
            for member in data_members(table, *id, self.observable) {
                if !wire_names.insert(to_snake_case(&member.name)) {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            "lower",
                            format!(
                                "field '{}' has the same wire name as an earlier field; keeping the first declaration",
                                member.name
                            ),
                        )
                        .kind(DiagnosticKind::DuplicateMember)
                        .at(format!("{}.{}", owner_name, member.name)),
                    );
                    continue;
                }
                if let Some(field) = self.property(owner_name, &member) {
                    fields.push(field);
                }
            }
            let own = std::mem::replace(&mut self.diagnostics, outer);

            built.insert(
                name.clone(),
                (
                    MessageDescriptor {
                        name,
                        host_type: full_name.clone(),
                        value_type: decl.is_value_type(),
                        fields,
                    },
                    own,
                ),
            );
        }

        let mut reachable = IndexSet::new();
        let mut queue: Vec<&WireType> = view_model
            .properties
            .iter()
            .map(|p| &p.wire)
            .chain(
                view_model
                    .commands
                    .iter()
                    .flat_map(|c| c.parameters.iter().map(|p| &p.wire)),
            )
            .collect();
        while let Some(wire) = queue.pop() {
            let Some(name) = message_of(wire) else {
                continue;
            };
            if reachable.insert(name.to_string())
                && let Some((message, _)) = built.get(name)
            {
                queue.extend(message.fields.iter().map(|f| &f.wire));
            }
        }

        let mut messages = Vec::new();
        for (name, (message, diagnostics)) in built {
            if reachable.contains(&name) {
                self.diagnostics.extend(diagnostics);
                messages.push(message);
            }
        }
        messages
    }
}

/// Schema names the generated file declares for the view model itself.
fn generated_names(table: &SymbolTable, harvest: &HarvestResult) -> IndexSet<String> {
    let root = &table.get(harvest.root).name;
    let mut names: IndexSet<String> = AUXILIARY_MESSAGES.iter().map(|n| n.to_string()).collect();
    names.insert(format!("{}State", root));
    names.insert(format!("{}Service", root));
    for cmd in &harvest.commands {
        names.insert(format!("{}Request", cmd.method_name));
        names.insert(format!("{}Response", cmd.method_name));
    }
    names
}

/// Message names for every type in the closure, keyed by full host name.
///
/// Names are simple names. A type whose simple name is taken, by an earlier
/// type or by a generated name, is prefixed with its PascalCase namespace,
/// then numbered from 2 until the name is free.
fn message_names(
    table: &SymbolTable,
    closure: &Closure,
    reserved: IndexSet<String>,
) -> IndexMap<String, String> {
    let mut taken = reserved;
    let mut names = IndexMap::new();
    for (full_name, id) in &closure.types {
        let decl = table.get(*id);
        let prefixed = format!("{}{}", to_pascal_case(&decl.namespace.replace('.', "_")), decl.name);
        let mut name = decl.name.clone();
        if taken.contains(&name) {
            name = prefixed.clone();
        }
        let mut counter = 2;
        while taken.contains(&name) {
            name = format!("{}{}", prefixed, counter);
            counter += 1;
        }
        taken.insert(name.clone());
        names.insert(full_name.clone(), name);
    }
    names
}

/// The first named type inside `ty` that is not declared in the table.
fn undeclared(ty: &TypeRef, table: &SymbolTable) -> Option<String> {
    let mut missing = None;
    ty.walk(&mut |t| {
        if missing.is_none() && t.kind == TypeKind::Named && !is_declared(t, table) {
            missing = Some(t.name.clone());
        }
    });
    missing
}

fn message_of(wire: &WireType) -> Option<&str> {
    match wire {
        WireType::Message(name) => Some(name),
        WireType::Repeated(inner) | WireType::Map(_, inner) => message_of(inner),
        WireType::Scalar(_) | WireType::WellKnown(_) => None,
    }
}

fn unmappable(warning: MappingWarning, location: &str) -> Diagnostic {
    Diagnostic::warning(
        "lower",
        format!("type '{}' is mapped to google.protobuf.Any: {}", warning.ty, warning.reason),
    )
    .kind(DiagnosticKind::UnmappableType)
    .at(location)
}
