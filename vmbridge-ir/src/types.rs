//! Host type references.

use std::fmt;

use serde::Serialize;

/// Classification of a host type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// A built-in host type (`int`, `string`, `DateTime`, ...).
    Primitive,
    /// A declared enumeration.
    Enum,
    /// An array of the element type (`T[]`).
    Array(Box<TypeRef>),
    /// A generic instantiation with ordered type arguments.
    Generic(Vec<TypeRef>),
    /// Any other named type, declared or not.
    Named,
}

/// A reference to a host type as it appears on a property, field or parameter.
///
/// `name` holds the definition name: the fully qualified name when the type
/// was resolved against the symbol table, otherwise the name as written. For
/// generics it is the name without type arguments (`List`), for arrays it is
/// the element's canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub kind: TypeKind,
}

impl TypeRef {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Primitive,
        }
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Enum,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Named,
        }
    }

    pub fn array(element: TypeRef) -> Self {
        Self {
            name: element.canonical_name(),
            kind: TypeKind::Array(Box::new(element)),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Generic(args),
        }
    }

    /// Wrap a type in the host's nullable wrapper.
    pub fn nullable(inner: TypeRef) -> Self {
        Self::generic("Nullable", vec![inner])
    }

    /// The canonical, fully spelled-out name used as an identity key.
    ///
    /// Two references with the same canonical name denote the same type.
    pub fn canonical_name(&self) -> String {
        match &self.kind {
            TypeKind::Array(element) => format!("{}[]", element.canonical_name()),
            TypeKind::Generic(args) => {
                let args: Vec<String> = args.iter().map(TypeRef::canonical_name).collect();
                format!("{}<{}>", self.name, args.join(", "))
            }
            _ => self.name.clone(),
        }
    }

    /// The last segment of the definition name (`Demo.Models.Item` -> `Item`).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Type arguments for generics, empty otherwise.
    pub fn type_args(&self) -> &[TypeRef] {
        match &self.kind {
            TypeKind::Generic(args) => args,
            _ => &[],
        }
    }

    /// Element type for arrays.
    pub fn element(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The wrapped type if this is `Nullable<T>`.
    pub fn nullable_inner(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeKind::Generic(args)
                if args.len() == 1 && matches!(self.simple_name(), "Nullable") =>
            {
                args.first()
            }
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum)
    }

    /// Visit this reference and every reference nested inside it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeRef)) {
        visit(self);
        match &self.kind {
            TypeKind::Array(element) => element.walk(visit),
            TypeKind::Generic(args) => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}
