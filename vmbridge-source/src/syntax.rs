//! Syntax tree for declaration sources.
//!
//! The tree keeps declarations only. Method bodies, initializers and attribute
//! arguments are skipped (arguments are retained as raw text).

use std::{fmt, path::PathBuf};

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Namespaces imported with `using`.
    pub usings: Vec<String>,
    /// Namespaces imported with `global using`; these apply to every file.
    pub global_usings: Vec<String>,
    /// All type declarations, nested ones flattened, in source order.
    pub types: Vec<TypeDeclSyntax>,
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Struct,
    Record,
    Interface,
    Enum,
}

impl DeclKind {
    /// Returns true for kinds that carry data members and can become messages.
    pub fn is_data_type(&self) -> bool {
        matches!(self, DeclKind::Class | DeclKind::Struct | DeclKind::Record)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Struct => "struct",
            DeclKind::Record => "record",
            DeclKind::Interface => "interface",
            DeclKind::Enum => "enum",
        }
    }
}

/// A type declaration.
#[derive(Debug, Clone)]
pub struct TypeDeclSyntax {
    pub name: String,
    /// Enclosing namespace. Nested types share the namespace of their outer type.
    pub namespace: String,
    pub kind: DeclKind,
    pub generic_params: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub modifiers: Vec<String>,
    /// Entries after `:` in declaration order.
    pub base_list: Vec<TypeSyntax>,
    pub members: Vec<Member>,
}

impl TypeDeclSyntax {
    /// Fully-qualified name (`Demo.Models.Item`).
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// An attribute application (`[Name(args)]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written, possibly qualified (`Mvvm.ObservableProperty`).
    pub name: String,
    /// Raw argument text between the parentheses.
    pub args: Option<String>,
    /// Explicit target (`field`, `property`, ...).
    pub target: Option<String>,
}

/// A member of a type declaration.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub attributes: Vec<Attribute>,
    pub modifiers: Vec<String>,
}

impl Member {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static") || self.has_modifier("const")
    }

    /// Stable identity used to deduplicate members across a hierarchy.
    ///
    /// Fields and properties are identified by name, methods by name and
    /// parameter types.
    pub fn identity_key(&self) -> String {
        match &self.kind {
            MemberKind::Method { params, .. } => {
                let params: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
                format!("{}({})", self.name, params.join(","))
            }
            _ => self.name.clone(),
        }
    }
}

/// Member-specific data.
#[derive(Debug, Clone)]
pub enum MemberKind {
    Field {
        ty: TypeSyntax,
        readonly: bool,
    },
    Property {
        ty: TypeSyntax,
        has_setter: bool,
    },
    Method {
        return_type: TypeSyntax,
        params: Vec<Param>,
        generic_params: Vec<String>,
    },
    EnumMember,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeSyntax,
    pub modifiers: Vec<String>,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSyntax {
    /// A possibly qualified name with optional type arguments.
    Named { name: String, args: Vec<TypeSyntax> },
    /// `T[]`, `T[,]`.
    Array(Box<TypeSyntax>),
    /// `T?`.
    Nullable(Box<TypeSyntax>),
    /// `(A, B)`.
    Tuple(Vec<TypeSyntax>),
}

impl TypeSyntax {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeSyntax::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeSyntax>) -> Self {
        TypeSyntax::Named {
            name: name.into(),
            args,
        }
    }

    /// The last segment of a named type (`System.String` -> `String`).
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeSyntax::Named { name, .. } => name.rsplit('.').next(),
            _ => None,
        }
    }

    /// Returns true if the written type is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSyntax::Named { name, args } if name == "void" && args.is_empty())
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSyntax::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeSyntax::Array(element) => write!(f, "{}[]", element),
            TypeSyntax::Nullable(inner) => write!(f, "{}?", inner),
            TypeSyntax::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}
