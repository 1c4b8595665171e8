//! Host type to wire type mapping.
//!
//! [`TypeMapper::map`] is total: every [`TypeRef`] maps to some [`WireType`].
//! Rules are tried in order and the first match wins:
//!
//! 1. `Nullable<T>` unwraps to `T`
//! 2. enums map to `int32`
//! 3. primitives map to scalars
//! 4. calendar and identifier types map to well-known types or strings
//! 5. `object`/`dynamic` map to `Any`
//! 6. resolved dependent types map to their generated message
//! 7. `byte[]` maps to `bytes`; other arrays and sequences to `repeated`
//! 8. dictionaries with an eligible key map to `map<K, V>`
//! 9. anything else maps to `Any` and records a warning
//!
//! Collections nested directly inside collections cannot be expressed in
//! the schema and also degrade to `Any`.

use indexmap::IndexMap;
use vmbridge_ir::{ScalarKind, TypeKind, TypeRef, WellKnownKind, WireType};
use vmbridge_source::builtins;

/// A type that fell through to `Any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingWarning {
    /// Canonical name of the offending type.
    pub ty: String,
    pub reason: String,
}

/// Maps host types to wire types.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    /// Full host type name to generated message name.
    messages: IndexMap<String, String>,
}

impl TypeMapper {
    pub fn new(messages: IndexMap<String, String>) -> Self {
        Self { messages }
    }

    /// Map a type, appending a warning for every degradation to `Any`.
    pub fn map(&self, ty: &TypeRef, warnings: &mut Vec<MappingWarning>) -> WireType {
        if let Some(inner) = ty.nullable_inner() {
            return self.map(inner, warnings);
        }
        match &ty.kind {
            TypeKind::Enum => WireType::Scalar(ScalarKind::Int32),
            TypeKind::Primitive => self.map_primitive(ty, warnings),
            TypeKind::Named => match self.messages.get(&ty.name) {
                Some(message) => WireType::Message(message.clone()),
                None => unmappable(ty, "no message is generated for this type", warnings),
            },
            TypeKind::Array(element) => {
                if element.kind == TypeKind::Primitive && element.name == "byte" {
                    WireType::Scalar(ScalarKind::Bytes)
                } else {
                    self.map_repeated(ty, element, warnings)
                }
            }
            TypeKind::Generic(args) => match args.as_slice() {
                [element] if builtins::is_sequence(&ty.name) => {
                    self.map_repeated(ty, element, warnings)
                }
                [key, value] if builtins::is_dictionary(&ty.name) => {
                    self.map_dictionary(ty, key, value, warnings)
                }
                _ => unmappable(ty, "unsupported generic type", warnings),
            },
        }
    }

    fn map_primitive(&self, ty: &TypeRef, warnings: &mut Vec<MappingWarning>) -> WireType {
        match primitive(&ty.name) {
            Some(wire) => wire,
            None => unmappable(ty, "unsupported built-in type", warnings),
        }
    }

    fn map_repeated(
        &self,
        ty: &TypeRef,
        element: &TypeRef,
        warnings: &mut Vec<MappingWarning>,
    ) -> WireType {
        let mut scratch = Vec::new();
        let inner = self.map(element, &mut scratch);
        if inner.is_collection() {
            return unmappable(ty, "nested collections are not supported", warnings);
        }
        warnings.extend(scratch);
        WireType::repeated(inner)
    }

    fn map_dictionary(
        &self,
        ty: &TypeRef,
        key: &TypeRef,
        value: &TypeRef,
        warnings: &mut Vec<MappingWarning>,
    ) -> WireType {
        let mut scratch = Vec::new();
        let key = self.map(key, &mut scratch);
        let value = self.map(value, &mut scratch);
        if value.is_collection() {
            return unmappable(ty, "nested collections are not supported", warnings);
        }
        match WireType::map(&key, value) {
            Some(map) => {
                warnings.extend(scratch);
                map
            }
            None => unmappable(ty, "dictionary key is not a string, bool or integer", warnings),
        }
    }
}

fn primitive(name: &str) -> Option<WireType> {
    let scalar = |kind| Some(WireType::Scalar(kind));
    let well_known = |kind| Some(WireType::WellKnown(kind));
    match name {
        "bool" => scalar(ScalarKind::Bool),
        "string" | "char" => scalar(ScalarKind::String),
        "sbyte" | "short" | "int" => scalar(ScalarKind::Int32),
        "byte" | "ushort" | "uint" => scalar(ScalarKind::UInt32),
        "long" | "nint" => scalar(ScalarKind::Int64),
        "ulong" | "nuint" => scalar(ScalarKind::UInt64),
        "float" => scalar(ScalarKind::Float),
        "double" | "decimal" => scalar(ScalarKind::Double),
        "DateTime" | "DateTimeOffset" | "DateOnly" => well_known(WellKnownKind::Timestamp),
        "TimeSpan" | "TimeOnly" => well_known(WellKnownKind::Duration),
        "BigInteger" | "Guid" | "Uri" | "Version" => scalar(ScalarKind::String),
        "object" | "dynamic" => Some(WireType::ANY),
        _ => None,
    }
}

fn unmappable(ty: &TypeRef, reason: &str, warnings: &mut Vec<MappingWarning>) -> WireType {
    warnings.push(MappingWarning {
        ty: ty.canonical_name(),
        reason: reason.to_string(),
    });
    WireType::ANY
}
