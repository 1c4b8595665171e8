//! Symbol arena.
//!
//! Declarations from every merged source file live in one `SymbolTable`,
//! addressed by `TypeId`. Inheritance is modelled as explicit links: each
//! declaration has at most one `base` and a list of directly implemented
//! `interfaces`.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::syntax::{Attribute, DeclKind, Member, SourceFile, TypeDeclSyntax, TypeSyntax};

/// Index of a declaration in a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(usize);

/// Name lookup context of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub namespace: String,
    pub usings: Vec<String>,
    /// Generic parameters in scope (`T` in `Page<T>`).
    pub type_params: Vec<String>,
}

impl Scope {
    /// Candidate qualified names for `name`, innermost namespace first,
    /// then each imported namespace.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        let mut namespace = self.namespace.as_str();
        loop {
            if namespace.is_empty() {
                candidates.push(name.to_string());
                break;
            }
            candidates.push(format!("{}.{}", namespace, name));
            namespace = namespace.rsplit_once('.').map_or("", |(outer, _)| outer);
        }
        for using in &self.usings {
            candidates.push(format!("{}.{}", using, name));
        }
        candidates
    }
}

/// A declaration in the arena.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub id: TypeId,
    pub name: String,
    pub namespace: String,
    pub kind: DeclKind,
    pub generic_params: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub modifiers: Vec<String>,
    pub base_list: Vec<TypeSyntax>,
    pub members: Vec<Member>,
    pub scope: Scope,
    pub path: PathBuf,
    /// Resolved base declaration.
    pub base: Option<TypeId>,
    /// Name of the base as written when it is not declared in any source.
    pub external_base: Option<String>,
    /// Directly implemented interfaces declared in sources.
    pub interfaces: Vec<TypeId>,
}

impl TypeDecl {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// Structs and `record struct`s.
    pub fn is_value_type(&self) -> bool {
        match self.kind {
            DeclKind::Struct => true,
            DeclKind::Record => self.has_modifier("struct"),
            _ => false,
        }
    }
}

/// A second definition of an already-known type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateDefinition {
    pub name: String,
    pub first: PathBuf,
    pub duplicate: PathBuf,
}

/// Arena of all declarations known to a generation session.
#[derive(Debug, Default)]
pub struct SymbolTable {
    types: Vec<TypeDecl>,
    by_full_name: IndexMap<String, TypeId>,
    by_simple_name: IndexMap<String, Vec<TypeId>>,
    global_usings: Vec<String>,
    files: IndexSet<PathBuf>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0]
    }

    /// All declarations in merge order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    /// Returns true if a file at `path` has already been merged.
    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Add the declarations of a parsed file and re-link inheritance.
    ///
    /// Partial declarations of the same type are combined. Any other
    /// redefinition of a known fully-qualified name is ignored and returned
    /// as a [`DuplicateDefinition`]; the first definition wins.
    pub fn merge(&mut self, file: SourceFile) -> Vec<DuplicateDefinition> {
        let mut duplicates = Vec::new();
        if !self.files.insert(file.path.clone()) {
            return duplicates;
        }
        for using in file.global_usings {
            if !self.global_usings.contains(&using) {
                self.global_usings.push(using);
            }
        }

        for decl in file.types {
            let full_name = decl.full_name();
            match self.by_full_name.get(&full_name) {
                Some(&existing) => {
                    let first = &mut self.types[existing.0];
                    if first.has_modifier("partial") && decl.modifiers.iter().any(|m| m == "partial")
                    {
                        combine_partial(first, decl);
                    } else {
                        duplicates.push(DuplicateDefinition {
                            name: full_name,
                            first: first.path.clone(),
                            duplicate: file.path.clone(),
                        });
                    }
                }
                None => self.insert(decl, &file.usings, &file.path),
            }
        }

        self.link();
        duplicates
    }

    fn insert(&mut self, decl: TypeDeclSyntax, usings: &[String], path: &Path) {
        let id = TypeId(self.types.len());
        let full_name = decl.full_name();
        let scope = Scope {
            namespace: decl.namespace.clone(),
            usings: usings.to_vec(),
            type_params: decl.generic_params.clone(),
        };

        self.by_full_name.insert(full_name, id);
        self.by_simple_name
            .entry(decl.name.clone())
            .or_default()
            .push(id);
        self.types.push(TypeDecl {
            id,
            name: decl.name,
            namespace: decl.namespace,
            kind: decl.kind,
            generic_params: decl.generic_params,
            attributes: decl.attributes,
            modifiers: decl.modifiers,
            base_list: decl.base_list,
            members: decl.members,
            scope,
            path: path.to_path_buf(),
            base: None,
            external_base: None,
            interfaces: Vec::new(),
        });
    }

    /// Look up a type by fully-qualified name, falling back to the first
    /// declaration with the same simple name.
    pub fn find(&self, name: &str) -> Option<TypeId> {
        if let Some(&id) = self.by_full_name.get(name) {
            return Some(id);
        }
        let simple = name.rsplit_once('.').map_or(name, |(_, simple)| simple);
        self.by_simple_name
            .get(simple)
            .and_then(|ids| ids.first().copied())
    }

    /// Namespaces imported by `global using` in any merged file.
    pub fn global_usings(&self) -> &[String] {
        &self.global_usings
    }

    /// Resolve a name as written inside `scope`.
    pub fn resolve(&self, name: &str, scope: &Scope) -> Option<TypeId> {
        let global = self
            .global_usings
            .iter()
            .map(|using| format!("{}.{}", using, name));
        scope
            .candidates(name)
            .into_iter()
            .chain(global)
            .find_map(|candidate| self.by_full_name.get(&candidate).copied())
            .or_else(|| self.find(name))
    }

    /// Recompute `base`, `external_base` and `interfaces` for every declaration.
    fn link(&mut self) {
        for index in 0..self.types.len() {
            let decl = &self.types[index];
            let mut base = None;
            let mut external_base = None;
            let mut interfaces = Vec::new();

            if decl.kind != DeclKind::Enum {
                let can_inherit = matches!(decl.kind, DeclKind::Class | DeclKind::Record);
                for (position, entry) in decl.base_list.iter().enumerate() {
                    let TypeSyntax::Named { name, .. } = entry else {
                        continue;
                    };
                    match self.resolve(name, &decl.scope) {
                        Some(id) if id == decl.id => {}
                        Some(id) => match self.types[id.0].kind {
                            DeclKind::Interface => interfaces.push(id),
                            DeclKind::Class | DeclKind::Record
                                if position == 0 && can_inherit =>
                            {
                                base = Some(id)
                            }
                            _ => {}
                        },
                        None if position == 0 && can_inherit && !looks_like_interface(name) => {
                            external_base = Some(name.clone());
                        }
                        None => {}
                    }
                }
            }

            let decl = &mut self.types[index];
            decl.base = base;
            decl.external_base = external_base;
            decl.interfaces = interfaces;
        }
    }

    /// The inheritance chain starting at `id` itself, following resolved bases.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        let mut current = self.get(id).base;
        while let Some(next) = current {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = self.get(next).base;
        }
        chain
    }

    /// Names along the inheritance chain, including the first external base.
    pub fn ancestor_names(&self, id: TypeId) -> Vec<String> {
        let chain = self.ancestors(id);
        let mut names: Vec<String> = chain.iter().map(|id| self.get(*id).name.clone()).collect();
        if let Some(external) = chain.last().and_then(|last| self.get(*last).external_base.clone()) {
            names.push(external);
        }
        names
    }

    /// All interfaces implemented by `id`, its ancestors and, transitively,
    /// by those interfaces. Ordered by discovery.
    pub fn all_interfaces(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen: IndexSet<TypeId> = IndexSet::new();
        let mut queue: Vec<TypeId> = self
            .ancestors(id)
            .iter()
            .flat_map(|ancestor| self.get(*ancestor).interfaces.iter().copied())
            .collect();
        let mut next = 0;
        while next < queue.len() {
            let interface = queue[next];
            next += 1;
            if seen.insert(interface) {
                queue.extend(self.get(interface).interfaces.iter().copied());
            }
        }
        seen.into_iter().collect()
    }
}

fn combine_partial(first: &mut TypeDecl, other: TypeDeclSyntax) {
    first.attributes.extend(other.attributes);
    for entry in other.base_list {
        if !first.base_list.contains(&entry) {
            first.base_list.push(entry);
        }
    }
    first.members.extend(other.members);
}

/// `IFoo` style names are treated as interfaces when undeclared.
fn looks_like_interface(name: &str) -> bool {
    let simple = name.rsplit_once('.').map_or(name, |(_, simple)| simple);
    let mut chars = simple.chars();
    matches!((chars.next(), chars.next()), (Some('I'), Some(c)) if c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    fn table(files: &[(&str, &str)]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (path, src) in files {
            table.merge(parse_source(src, Path::new(path)).unwrap());
        }
        table
    }

    fn id(table: &SymbolTable, name: &str) -> TypeId {
        table.find(name).unwrap()
    }

    #[test]
    fn test_links_base_and_interfaces() {
        let table = table(&[(
            "Vm.cs",
            r#"
namespace Demo;
public interface INamed { string Name { get; } }
public interface ITitled : INamed { string Title { get; } }
public class ViewModelBase : ObservableObject, INamed { public string Name { get; set; } }
public class MainViewModel : ViewModelBase, ITitled, IDisposable { }
"#,
        )]);

        let main = id(&table, "MainViewModel");
        let base = id(&table, "ViewModelBase");
        assert_eq!(table.get(main).base, Some(base));
        assert_eq!(table.get(base).external_base.as_deref(), Some("ObservableObject"));
        assert_eq!(table.ancestors(main), vec![main, base]);
        assert_eq!(
            table.ancestor_names(main),
            vec!["MainViewModel", "ViewModelBase", "ObservableObject"]
        );

        let interfaces: Vec<&str> = table
            .all_interfaces(main)
            .into_iter()
            .map(|id| table.get(id).name.as_str())
            .collect();
        assert_eq!(interfaces, vec!["ITitled", "INamed"]);
    }

    #[test]
    fn test_undeclared_interface_is_not_a_base() {
        let table = table(&[("A.cs", "namespace Demo; class A : IDisposable { }")]);
        let a = table.get(id(&table, "A"));
        assert_eq!(a.base, None);
        assert_eq!(a.external_base, None);
    }

    #[test]
    fn test_resolve_prefers_scope_then_usings() {
        let table = table(&[
            ("Models.cs", "namespace Demo.Models; public class Item { }"),
            ("Other.cs", "namespace Other; public class Item { }"),
            (
                "Vm.cs",
                "using Demo.Models; namespace Demo.ViewModels; class Vm { Item Selected; }",
            ),
        ]);

        let vm = table.get(id(&table, "Demo.ViewModels.Vm"));
        let resolved = table.resolve("Item", &vm.scope).unwrap();
        assert_eq!(table.get(resolved).full_name(), "Demo.Models.Item");

        let other = Scope {
            namespace: "Other".to_string(),
            ..Scope::default()
        };
        let resolved = table.resolve("Item", &other).unwrap();
        assert_eq!(table.get(resolved).full_name(), "Other.Item");
    }

    #[test]
    fn test_duplicate_definition_first_wins() {
        let mut table = SymbolTable::new();
        table.merge(parse_source("namespace Demo; class Item { int A; }", Path::new("A.cs")).unwrap());
        let duplicates = table.merge(
            parse_source("namespace Demo; class Item { int B; }", Path::new("B.cs")).unwrap(),
        );

        assert_eq!(
            duplicates,
            vec![DuplicateDefinition {
                name: "Demo.Item".to_string(),
                first: PathBuf::from("A.cs"),
                duplicate: PathBuf::from("B.cs"),
            }]
        );
        let item = table.get(id(&table, "Demo.Item"));
        assert_eq!(item.members[0].name, "A");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_partial_declarations_are_combined() {
        let table = table(&[
            ("Vm.cs", "namespace Demo; partial class Vm : ObservableObject { int _a; }"),
            ("Vm.Commands.cs", "namespace Demo; partial class Vm { void Run() { } }"),
        ]);
        let vm = table.get(id(&table, "Vm"));
        let names: Vec<&str> = vm.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["_a", "Run"]);
        assert_eq!(vm.external_base.as_deref(), Some("ObservableObject"));
    }

    #[test]
    fn test_merging_same_file_twice_is_ignored() {
        let mut table = SymbolTable::new();
        let file = parse_source("class A { }", Path::new("A.cs")).unwrap();
        table.merge(file.clone());
        assert!(table.merge(file).is_empty());
        assert_eq!(table.len(), 1);
        assert!(table.contains_file(Path::new("A.cs")));
    }

    #[test]
    fn test_base_cycle_terminates() {
        let table = table(&[("C.cs", "class A : B { } class B : A { }")]);
        let a = id(&table, "A");
        assert_eq!(table.ancestors(a).len(), 2);
    }

    #[test]
    fn test_looks_like_interface() {
        assert!(looks_like_interface("IDisposable"));
        assert!(looks_like_interface("System.IComparable"));
        assert!(!looks_like_interface("Item"));
        assert!(!looks_like_interface("Icon"));
    }
}
