//! Binding of written types to [`TypeRef`]s.

use vmbridge_ir::TypeRef;

use crate::{
    builtins,
    symbols::{Scope, SymbolTable},
    syntax::{DeclKind, TypeSyntax},
};

/// Bind a written type against the symbol table.
///
/// Keywords and framework types bind to primitives, framework collections to
/// generics with their namespace stripped, and declared types to their
/// fully-qualified name. Anything else is returned as written with kind
/// `Named`; callers can tell it apart with [`is_declared`].
pub fn bind(ty: &TypeSyntax, scope: &Scope, table: &SymbolTable) -> TypeRef {
    match ty {
        TypeSyntax::Nullable(inner) => TypeRef::nullable(bind(inner, scope, table)),
        TypeSyntax::Array(element) => TypeRef::array(bind(element, scope, table)),
        TypeSyntax::Tuple(_) => TypeRef::primitive("ValueTuple"),
        TypeSyntax::Named { name, args } => {
            let args: Vec<TypeRef> = args.iter().map(|arg| bind(arg, scope, table)).collect();
            bind_named(name, args, scope, table)
        }
    }
}

fn bind_named(name: &str, args: Vec<TypeRef>, scope: &Scope, table: &SymbolTable) -> TypeRef {
    if args.is_empty() {
        if let Some(keyword) = builtins::keyword(name) {
            return TypeRef::primitive(keyword);
        }
        if scope.type_params.iter().any(|p| p == name) {
            return TypeRef::primitive(name);
        }
    }

    if let Some(id) = table.resolve(name, scope) {
        let decl = table.get(id);
        return match decl.kind {
            DeclKind::Enum => TypeRef::enumeration(decl.full_name()),
            _ if args.is_empty() => TypeRef::named(decl.full_name()),
            _ => TypeRef::generic(decl.full_name(), args),
        };
    }

    if args.is_empty() {
        if let Some(framework) = builtins::framework_type(name) {
            return TypeRef::primitive(framework);
        }
        TypeRef::named(name)
    } else {
        let name = builtins::framework_generic(name).map_or_else(|| name.to_string(), str::to_string);
        TypeRef::generic(name, args)
    }
}

/// Returns true if `ty` names a declaration in the table.
pub fn is_declared(ty: &TypeRef, table: &SymbolTable) -> bool {
    table.find(&ty.name).is_some_and(|id| table.get(id).full_name() == ty.name)
}
