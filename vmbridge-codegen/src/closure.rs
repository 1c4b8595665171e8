//! Dependent-type closure resolution.
//!
//! Starting from the types of the harvested properties and command
//! parameters, the resolver discovers every declared data type reachable
//! through generic arguments, array elements and the data members of
//! discovered types. Traversal is breadth-first with a visited set keyed by
//! canonical type name, so cyclic type graphs terminate.
//!
//! Types that are not yet known are looked up by simple name through the
//! session's [`TypeSourceLocator`]; located files are parsed, merged into the
//! symbol table and the reference is bound again.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use vmbridge_ir::{TypeKind, TypeRef};
use vmbridge_source::{
    DuplicateDefinition, Scope, SymbolTable, TypeId, TypeSourceLocator, bind, is_declared,
    syntax::TypeSyntax,
};

use crate::{attributes::Marker, harvest::data_members};

/// A type reference waiting to be visited, with the scope it was written in.
#[derive(Debug, Clone)]
pub struct Pending {
    pub ty: TypeSyntax,
    pub scope: Scope,
}

impl Pending {
    pub fn new(ty: TypeSyntax, scope: Scope) -> Self {
        Self { ty, scope }
    }
}

/// A dependent type source that was located but failed to parse.
#[derive(Debug, Clone, Serialize)]
pub struct ParseFailure {
    pub name: String,
    pub message: String,
}

/// Result of closure resolution.
#[derive(Debug, Default)]
pub struct Closure {
    /// Declared data types, keyed by full name, in discovery order.
    pub types: IndexMap<String, TypeId>,
    /// Every canonical type name visited.
    pub visited: IndexSet<String>,
    /// Names that could not be resolved, as written.
    pub unresolved: IndexSet<String>,
    pub parse_failures: Vec<ParseFailure>,
    /// Duplicate definitions found in located sources.
    pub duplicates: Vec<DuplicateDefinition>,
}

/// Breadth-first closure resolver.
pub struct ClosureResolver<'a> {
    table: &'a mut SymbolTable,
    locator: &'a dyn TypeSourceLocator,
    observable: &'a Marker,
    queue: VecDeque<Pending>,
    closure: Closure,
}

impl<'a> ClosureResolver<'a> {
    pub fn new(
        table: &'a mut SymbolTable,
        locator: &'a dyn TypeSourceLocator,
        observable: &'a Marker,
    ) -> Self {
        Self {
            table,
            locator,
            observable,
            queue: VecDeque::new(),
            closure: Closure::default(),
        }
    }

    /// Compute the closure of `roots`.
    pub fn resolve(mut self, roots: impl IntoIterator<Item = Pending>) -> Closure {
        self.queue.extend(roots);

        while let Some(pending) = self.queue.pop_front() {
            let ty = bind(&pending.ty, &pending.scope, self.table);
            if !self.closure.visited.insert(ty.canonical_name()) {
                continue;
            }
            self.visit(pending, ty);
        }

        self.closure
    }

    fn visit(&mut self, pending: Pending, ty: TypeRef) {
        let Pending { ty: syntax, scope } = pending;
        match syntax {
            TypeSyntax::Nullable(inner) | TypeSyntax::Array(inner) => {
                self.queue.push_back(Pending::new(*inner, scope));
            }
            // Generic definitions (including awaitable wrappers) are never
            // expanded; only their arguments are.
            TypeSyntax::Named { ref args, .. } if !args.is_empty() => {
                for arg in args {
                    self.queue.push_back(Pending::new(arg.clone(), scope.clone()));
                }
            }
            TypeSyntax::Named { .. } if ty.kind == TypeKind::Named => {
                if let Some(id) = self.lookup(&syntax, &scope, &ty) {
                    self.record(id);
                }
            }
            TypeSyntax::Named { .. } | TypeSyntax::Tuple(_) => {}
        }
    }

    fn lookup(&mut self, syntax: &TypeSyntax, scope: &Scope, ty: &TypeRef) -> Option<TypeId> {
        if is_declared(ty, self.table) {
            return self.table.find(&ty.name);
        }

        let simple = ty.simple_name().to_string();
        match self.locator.locate(&simple) {
            None => {
                tracing::debug!(name = %ty.name, "no source found for dependent type");
            }
            Some(Err(error)) => {
                self.closure.parse_failures.push(ParseFailure {
                    name: ty.name.clone(),
                    message: error.to_string(),
                });
            }
            Some(Ok(file)) => {
                self.closure.duplicates.extend(self.table.merge(file));
                let rebound = bind(syntax, scope, self.table);
                if is_declared(&rebound, self.table) {
                    self.closure.visited.insert(rebound.canonical_name());
                    return self.table.find(&rebound.name);
                }
            }
        }

        self.closure.unresolved.insert(ty.name.clone());
        None
    }

    fn record(&mut self, id: TypeId) {
        let decl = self.table.get(id);
        if !decl.kind.is_data_type() || decl.is_generic() {
            return;
        }
        if self.closure.types.insert(decl.full_name(), id).is_some() {
            return;
        }

        for member in data_members(self.table, id, self.observable) {
            let scope = self.table.get(member.owner).scope.clone();
            self.queue.push_back(Pending::new(member.ty, scope));
        }
    }
}
