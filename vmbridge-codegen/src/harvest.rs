//! Symbol harvesting.
//!
//! Members are collected along the ownership chain (self, base, base's base,
//! ...) and then from every transitively implemented interface. A member whose
//! identity key (name, plus parameter types for methods) was already seen is
//! skipped, so an override in a derived class hides the base declaration.

use indexmap::IndexSet;
use vmbridge_core::field_to_property_name;
use vmbridge_source::{
    SymbolTable, TypeId,
    builtins::{CANCELLATION_TOKEN, is_deferred},
    syntax::{DeclKind, Member, MemberKind, Param, TypeSyntax},
};

use crate::attributes::Marker;

/// A member together with the declaration that owns it.
#[derive(Debug, Clone, Copy)]
pub struct MemberHandle<'a> {
    pub owner: TypeId,
    pub member: &'a Member,
}

/// Harvest the members of `root`, its ancestors and its interfaces.
pub fn members(table: &SymbolTable, root: TypeId) -> Vec<MemberHandle<'_>> {
    let owners = table
        .ancestors(root)
        .into_iter()
        .chain(table.all_interfaces(root));

    let mut seen = IndexSet::new();
    let mut handles = Vec::new();
    for owner in owners {
        for member in &table.get(owner).members {
            if seen.insert(member.identity_key()) {
                handles.push(MemberHandle { owner, member });
            }
        }
    }
    handles
}

/// A value-carrying member exposed as a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMember {
    /// Property name (for marked fields, the generated property's name).
    pub name: String,
    pub ty: TypeSyntax,
    /// Declaration whose scope the type is written in.
    pub owner: TypeId,
    pub writable: bool,
}

/// A method exposed as a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMember {
    pub method_name: String,
    pub return_type: TypeSyntax,
    pub params: Vec<Param>,
    pub is_async: bool,
    pub owner: TypeId,
}

/// Members of the root view model selected by the harvest phase.
#[derive(Debug, Clone)]
pub struct HarvestResult {
    pub root: TypeId,
    /// Observable properties in harvest order, unique by name.
    pub properties: Vec<DataMember>,
    /// Commands in harvest order.
    pub commands: Vec<CommandMember>,
}

/// Convert a harvested member into an observable property, if it carries one.
///
/// Marked fields become generated properties (`_userName` -> `UserName`) and
/// are always writable.
pub fn observable(handle: MemberHandle<'_>) -> Option<DataMember> {
    let MemberHandle { owner, member } = handle;
    match &member.kind {
        MemberKind::Field { ty, .. } => Some(DataMember {
            name: field_to_property_name(&member.name),
            ty: ty.clone(),
            owner,
            writable: true,
        }),
        MemberKind::Property { ty, has_setter } => Some(DataMember {
            name: member.name.clone(),
            ty: ty.clone(),
            owner,
            writable: *has_setter,
        }),
        MemberKind::Method { .. } | MemberKind::EnumMember => None,
    }
}

/// Convert a harvested method into a command.
///
/// `CancellationToken` parameters are supplied by the host and dropped.
pub fn command(handle: MemberHandle<'_>) -> Option<CommandMember> {
    let MemberHandle { owner, member } = handle;
    let MemberKind::Method {
        return_type,
        params,
        ..
    } = &member.kind
    else {
        return None;
    };

    let is_async =
        member.has_modifier("async") || return_type.simple_name().is_some_and(is_deferred);
    let params = params
        .iter()
        .filter(|p| p.ty.simple_name() != Some(CANCELLATION_TOKEN))
        .cloned()
        .collect();

    Some(CommandMember {
        method_name: member.name.clone(),
        return_type: return_type.clone(),
        params,
        is_async,
        owner,
    })
}

/// Data members of a dependent type, in harvest order.
///
/// Public instance fields and properties are included, as are interface
/// members and fields carrying the observable marker. Names are unique:
/// the first member producing a name wins.
pub fn data_members(table: &SymbolTable, id: TypeId, observable_marker: &Marker) -> Vec<DataMember> {
    let mut names = IndexSet::new();
    let mut result = Vec::new();

    for handle in members(table, id) {
        let owner = table.get(handle.owner);
        let member = handle.member;
        if member.is_static() {
            continue;
        }

        let exposed = owner.kind == DeclKind::Interface
            || member.has_modifier("public")
            || (matches!(member.kind, MemberKind::Field { .. })
                && observable_marker.matches_any(&member.attributes, &owner.scope, table));
        if !exposed {
            continue;
        }

        if let Some(data) = observable(handle)
            && names.insert(data.name.clone())
        {
            result.push(data);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use vmbridge_source::parse_source;

    use super::*;

    fn table(src: &str) -> SymbolTable {
        let mut table = SymbolTable::new();
        table.merge(parse_source(src, Path::new("Test.cs")).unwrap());
        table
    }

    fn names(handles: &[MemberHandle<'_>]) -> Vec<String> {
        handles.iter().map(|h| h.member.identity_key()).collect()
    }

    #[test]
    fn test_members_walk_base_chain_then_interfaces() {
        let table = table(
            r#"
namespace Demo;
public interface IHasId { int Id { get; } }
public class Base : IHasId {
    public int Id { get; set; }
    public virtual string Title { get; set; }
    public void Load(int page) { }
}
public class Derived : Base {
    public override string Title { get; set; }
    public string Extra;
    public void Load(string filter) { }
}
"#,
        );
        let derived = table.find("Demo.Derived").unwrap();

        let handles = members(&table, derived);
        assert_eq!(
            names(&handles),
            vec!["Title", "Extra", "Load(string)", "Id", "Load(int)"]
        );
        assert_eq!(handles[0].owner, derived);
    }

    #[test]
    fn test_members_survive_inheritance_cycles() {
        let table = table(
            r#"
namespace Demo;
public class A : B { public int X; }
public class B : A { public int Y; }
"#,
        );
        let a = table.find("Demo.A").unwrap();
        assert_eq!(names(&members(&table, a)), vec!["X", "Y"]);
    }

    #[test]
    fn test_data_members_visibility() {
        let table = table(
            r#"
using CommunityToolkit.Mvvm.ComponentModel;
namespace Demo;
public partial class Item {
    public string Name { get; set; }
    public int Count { get; }
    private int hidden;
    public static int Shared;
    public const int Max = 3;
    [ObservableProperty] private string _title;
    public string Describe() => Name;
}
"#,
        );
        let item = table.find("Demo.Item").unwrap();
        let marker = Marker::new("CommunityToolkit.Mvvm.ComponentModel.ObservablePropertyAttribute");

        let data = data_members(&table, item, &marker);
        let summary: Vec<(&str, bool)> = data
            .iter()
            .map(|d| (d.name.as_str(), d.writable))
            .collect();
        assert_eq!(
            summary,
            vec![("Name", true), ("Count", false), ("Title", true)]
        );
    }

    #[test]
    fn test_command_detection() {
        let table = table(
            r#"
namespace Demo;
public class Vm {
    public void Reset() { }
    public async Task SaveAsync(string name, CancellationToken token) { }
    public ValueTask<int> CountAsync() => default;
    public string Title { get; set; }
}
"#,
        );
        let vm = table.find("Demo.Vm").unwrap();
        let commands: Vec<(String, bool, usize)> = members(&table, vm)
            .into_iter()
            .filter_map(command)
            .map(|c| (c.method_name, c.is_async, c.params.len()))
            .collect();

        assert_eq!(
            commands,
            vec![
                ("Reset".to_string(), false, 0),
                ("SaveAsync".to_string(), true, 1),
                ("CountAsync".to_string(), true, 0),
            ]
        );
    }
}
