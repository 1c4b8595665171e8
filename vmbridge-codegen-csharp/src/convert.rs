//! C# value conversions.
//!
//! Three type worlds meet in the generated code: host types (the view model's
//! own declarations), schema types (classes generated from the `.proto` file)
//! and client types (plain .NET types derived from the wire type alone, since
//! the client never references the host assembly). Every function here returns
//! a C# expression; `expr` arguments are simple member accesses or lambda
//! parameters and may be repeated in the output.

use vmbridge_codegen::Wrapper;
use vmbridge_core::{to_pascal_case, to_snake_case};
use vmbridge_ir::{ModelIR, ScalarKind, TypeKind, TypeRef, WellKnownKind, WireType};
use vmbridge_source::builtins;

/// Alias under which generated files import the schema namespace.
pub const PROTOS: &str = "Protos";

/// Built-in types that are not value types.
const REFERENCE_PRIMITIVES: &[&str] = &["string", "object", "dynamic", "Uri", "Version"];

/// The C# property generated for a schema field (`user_id` -> `UserId`).
pub fn proto_member(name: &str) -> String {
    to_pascal_case(&to_snake_case(name))
}

/// A generated schema class, through the [`PROTOS`] alias.
pub fn proto_message(name: &str) -> String {
    format!("{}.{}", PROTOS, name)
}

/// The C# class of a pack wrapper (`StringValue`, `Timestamp`, `Protos.Item`).
pub fn wrapper_type(wrapper: &Wrapper) -> String {
    match wrapper {
        Wrapper::Message(name) => proto_message(name),
        other => other.message_name().to_string(),
    }
}

/// The C# type of a single schema value.
pub fn proto_type(wire: &WireType) -> String {
    match wire {
        WireType::Scalar(ScalarKind::Bytes) => "ByteString".to_string(),
        WireType::Scalar(kind) => scalar_type(*kind).to_string(),
        WireType::WellKnown(kind) => kind.short_name().to_string(),
        WireType::Message(name) => proto_message(name),
        WireType::Repeated(inner) => format!("RepeatedField<{}>", proto_type(inner)),
        WireType::Map(key, value) => {
            format!("MapField<{}, {}>", scalar_type(*key), proto_type(value))
        }
    }
}

fn scalar_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::String => "string",
        ScalarKind::Int32 => "int",
        ScalarKind::Int64 => "long",
        ScalarKind::UInt32 => "uint",
        ScalarKind::UInt64 => "ulong",
        ScalarKind::Float => "float",
        ScalarKind::Double => "double",
        ScalarKind::Bytes => "byte[]",
    }
}

/// Spell a host type with every declared or framework name fully qualified.
pub fn host_type(ty: &TypeRef) -> String {
    match &ty.kind {
        TypeKind::Array(element) => format!("{}[]", host_type(element)),
        TypeKind::Generic(args) => match ty.nullable_inner() {
            Some(inner) => format!("{}?", host_type(inner)),
            None => {
                let args: Vec<String> = args.iter().map(host_type).collect();
                format!("{}<{}>", qualify(&ty.name), args.join(", "))
            }
        },
        _ => qualify(&ty.name),
    }
}

fn qualify(name: &str) -> String {
    if let Some(keyword) = builtins::keyword(name) {
        return keyword.to_string();
    }
    match builtins::framework_namespace(name) {
        Some(namespace) => format!("global::{}.{}", namespace, name),
        None if name.contains('.') => format!("global::{}", name),
        None => name.to_string(),
    }
}

fn element_of(ty: &TypeRef) -> &TypeRef {
    ty.element()
        .or_else(|| ty.type_args().first())
        .unwrap_or(ty)
}

/// Conversions between host values and schema values, used by the server.
pub struct HostConversions<'a> {
    ir: &'a ModelIR,
}

impl<'a> HostConversions<'a> {
    pub fn new(ir: &'a ModelIR) -> Self {
        Self { ir }
    }

    fn is_value_type(&self, ty: &TypeRef) -> bool {
        match &ty.kind {
            TypeKind::Primitive => !REFERENCE_PRIMITIVES.contains(&ty.name.as_str()),
            TypeKind::Enum => true,
            TypeKind::Named => self
                .ir
                .messages
                .iter()
                .any(|m| m.host_type == ty.name && m.value_type),
            TypeKind::Generic(_) => ty.nullable_inner().is_some() || ty.name == "ImmutableArray",
            TypeKind::Array(_) => false,
        }
    }

    /// Whether converting a host value of `ty` can produce `null`.
    fn yields_null(&self, ty: &TypeRef, wire: &WireType) -> bool {
        match wire {
            WireType::Scalar(_) => false,
            WireType::WellKnown(WellKnownKind::Any) => true,
            _ => ty.nullable_inner().is_some() || !self.is_value_type(ty),
        }
    }

    /// Host value → schema value.
    ///
    /// Collections produce an `IEnumerable` (repeated) or a dictionary (map)
    /// ready for `AddRange`/`Add` on the generated field.
    pub fn to_wire(&self, expr: &str, ty: &TypeRef, wire: &WireType) -> String {
        if let Some(inner) = ty.nullable_inner() {
            if !self.is_value_type(inner) {
                return self.to_wire(expr, inner, wire);
            }
            return match wire {
                WireType::Scalar(_) => self.to_wire(&format!("({} ?? default)", expr), inner, wire),
                _ => format!(
                    "({}.HasValue ? {} : null)",
                    expr,
                    self.to_wire(&format!("{}.Value", expr), inner, wire)
                ),
            };
        }

        match wire {
            WireType::Scalar(kind) => scalar_to_wire(expr, ty, *kind),
            WireType::WellKnown(WellKnownKind::Timestamp) => match ty.name.as_str() {
                "DateTimeOffset" => format!("Timestamp.FromDateTimeOffset({})", expr),
                "DateOnly" => format!(
                    "Timestamp.FromDateTime({}.ToDateTime(global::System.TimeOnly.MinValue, global::System.DateTimeKind.Utc))",
                    expr
                ),
                _ => format!("Timestamp.FromDateTime({}.ToUniversalTime())", expr),
            },
            WireType::WellKnown(WellKnownKind::Duration) => match ty.name.as_str() {
                "TimeOnly" => format!("Duration.FromTimeSpan({}.ToTimeSpan())", expr),
                _ => format!("Duration.FromTimeSpan({})", expr),
            },
            WireType::WellKnown(WellKnownKind::Any) => format!("PackAny({})", expr),
            WireType::Message(_) => format!("ToProto({})", expr),
            WireType::Repeated(inner) => self.sequence_to_wire(expr, ty, inner),
            WireType::Map(key, value) => self.map_to_wire(expr, ty, *key, value),
        }
    }

    fn sequence_to_wire(&self, expr: &str, ty: &TypeRef, inner: &WireType) -> String {
        let element = element_of(ty);
        let mut out = if ty.name == "ImmutableArray" {
            expr.to_string()
        } else {
            format!(
                "({} ?? global::System.Linq.Enumerable.Empty<{}>())",
                expr,
                host_type(element)
            )
        };
        let item = self.to_wire("item", element, inner);
        if item != "item" {
            out = format!("{}.Select(item => {})", out, item);
        }
        if self.yields_null(element, inner) {
            out = format!("{}.OfType<{}>()", out, proto_type(inner));
        }
        out
    }

    fn map_to_wire(&self, expr: &str, ty: &TypeRef, key: ScalarKind, value: &WireType) -> String {
        let [host_key, host_value] = ty.type_args() else {
            return "new global::System.Collections.Generic.Dictionary<string, string>()"
                .to_string();
        };
        let mut source = format!(
            "({} ?? global::System.Linq.Enumerable.Empty<global::System.Collections.Generic.KeyValuePair<{}, {}>>())",
            expr,
            host_type(host_key),
            host_type(host_value)
        );
        if self.yields_null(host_value, value) {
            source = format!("{}.Where(entry => entry.Value is not null)", source);
        }
        format!(
            "{}.ToDictionary(entry => {}, entry => {})",
            source,
            self.to_wire("entry.Key", host_key, &WireType::Scalar(key)),
            self.to_wire("entry.Value", host_value, value)
        )
    }

    /// Schema value → host value.
    pub fn from_wire(&self, expr: &str, ty: &TypeRef, wire: &WireType) -> String {
        if let Some(inner) = ty.nullable_inner() {
            if !self.is_value_type(inner) || matches!(wire, WireType::Scalar(_)) {
                return self.from_wire(expr, inner, wire);
            }
            return format!(
                "({} is null ? null : ({}?){})",
                expr,
                host_type(inner),
                self.from_wire(expr, inner, wire)
            );
        }

        match wire {
            WireType::Scalar(kind) => scalar_from_wire(expr, ty, *kind),
            WireType::WellKnown(WellKnownKind::Timestamp) => match ty.name.as_str() {
                "DateTimeOffset" => format!("({}?.ToDateTimeOffset() ?? default)", expr),
                "DateOnly" => format!(
                    "global::System.DateOnly.FromDateTime({}?.ToDateTime() ?? default)",
                    expr
                ),
                _ => format!("({}?.ToDateTime() ?? default)", expr),
            },
            WireType::WellKnown(WellKnownKind::Duration) => match ty.name.as_str() {
                "TimeOnly" => format!(
                    "global::System.TimeOnly.FromTimeSpan({}?.ToTimeSpan() ?? default)",
                    expr
                ),
                _ => format!("({}?.ToTimeSpan() ?? default)", expr),
            },
            WireType::WellKnown(WellKnownKind::Any) => match ty.name.as_str() {
                "object" | "dynamic" => expr.to_string(),
                _ => "default!".to_string(),
            },
            WireType::Message(_) => format!("FromProto({})", expr),
            WireType::Repeated(inner) => self.sequence_from_wire(expr, ty, inner),
            WireType::Map(key, value) => self.map_from_wire(expr, ty, *key, value),
        }
    }

    fn sequence_from_wire(&self, expr: &str, ty: &TypeRef, inner: &WireType) -> String {
        let element = element_of(ty);
        let item = self.from_wire("item", element, inner);
        let items = if item == "item" {
            expr.to_string()
        } else {
            format!("{}.Select(item => {})", expr, item)
        };

        if ty.element().is_some() {
            return format!("{}.ToArray()", items);
        }
        match ty.name.as_str() {
            "HashSet" | "ISet" => format!("{}.ToHashSet()", items),
            "ObservableCollection" | "Queue" | "Stack" | "LinkedList" => {
                format!("new {}({})", host_type(ty), items)
            }
            "Collection" => format!("new {}({}.ToList())", host_type(ty), items),
            "ReadOnlyCollection" => format!("{}.ToList().AsReadOnly()", items),
            "ImmutableArray" | "ImmutableList" => format!(
                "global::System.Collections.Immutable.{}.CreateRange({})",
                ty.name, items
            ),
            _ => format!("{}.ToList()", items),
        }
    }

    fn map_from_wire(&self, expr: &str, ty: &TypeRef, key: ScalarKind, value: &WireType) -> String {
        let [host_key, host_value] = ty.type_args() else {
            return "default!".to_string();
        };
        let dictionary = format!(
            "{}.ToDictionary(entry => {}, entry => {})",
            expr,
            self.from_wire("entry.Key", host_key, &WireType::Scalar(key)),
            self.from_wire("entry.Value", host_value, value)
        );
        match ty.name.as_str() {
            "SortedDictionary" | "ConcurrentDictionary" => {
                format!("new {}({})", host_type(ty), dictionary)
            }
            "ImmutableDictionary" => format!(
                "global::System.Collections.Immutable.ImmutableDictionary.CreateRange({})",
                dictionary
            ),
            _ => dictionary,
        }
    }

    /// Pack a host value into an `Any?`, or `None` when the wire type has no
    /// wrapper.
    pub fn pack(&self, expr: &str, ty: &TypeRef, wire: &WireType) -> Option<String> {
        let value = self.to_wire(expr, ty, wire);
        Some(match Wrapper::for_wire(wire)? {
            wrapper @ Wrapper::Scalar(_) => format!(
                "Any.Pack(new {} {{ Value = {} }})",
                wrapper_type(&wrapper),
                value
            ),
            _ => format!("PackAny({})", value),
        })
    }

    /// Unpack an `Any` into a host value, or `None` when the wire type has
    /// no wrapper.
    pub fn unpack(&self, any: &str, ty: &TypeRef, wire: &WireType) -> Option<String> {
        let wrapper = Wrapper::for_wire(wire)?;
        let unpacked = format!("{}.Unpack<{}>()", any, wrapper_type(&wrapper));
        let value = if wrapper.has_value_field() {
            format!("{}.Value", unpacked)
        } else {
            unpacked
        };
        Some(self.from_wire(&value, ty, wire))
    }
}

fn scalar_to_wire(expr: &str, ty: &TypeRef, kind: ScalarKind) -> String {
    if ty.is_enum() {
        return format!("(int){}", expr);
    }
    if kind == ScalarKind::Bytes {
        return format!(
            "ByteString.CopyFrom({} ?? global::System.Array.Empty<byte>())",
            expr
        );
    }
    match ty.name.as_str() {
        "string" => format!("({} ?? string.Empty)", expr),
        "char" | "Guid" | "BigInteger" => format!("{}.ToString()", expr),
        "Uri" | "Version" => format!("({}?.ToString() ?? string.Empty)", expr),
        "nint" => format!("(long){}", expr),
        "nuint" => format!("(ulong){}", expr),
        "decimal" => format!("(double){}", expr),
        _ => expr.to_string(),
    }
}

fn scalar_from_wire(expr: &str, ty: &TypeRef, kind: ScalarKind) -> String {
    if ty.is_enum() {
        return format!("({}){}", host_type(ty), expr);
    }
    if kind == ScalarKind::Bytes {
        return format!("{}.ToByteArray()", expr);
    }
    match ty.name.as_str() {
        "char" => format!("({e}.Length > 0 ? {e}[0] : default)", e = expr),
        "Guid" => format!("global::System.Guid.Parse({})", expr),
        "BigInteger" => format!("global::System.Numerics.BigInteger.Parse({})", expr),
        "Uri" => format!(
            "new global::System.Uri({}, global::System.UriKind.RelativeOrAbsolute)",
            expr
        ),
        "Version" => format!("global::System.Version.Parse({})", expr),
        name @ ("sbyte" | "short" | "byte" | "ushort" | "nint" | "nuint" | "decimal") => {
            format!("({}){}", name, expr)
        }
        _ => expr.to_string(),
    }
}

// ============================================================================
// Client side
// ============================================================================

/// The client-side .NET type of a wire type.
pub fn client_type(wire: &WireType) -> String {
    match wire {
        WireType::Scalar(kind) => scalar_type(*kind).to_string(),
        WireType::WellKnown(WellKnownKind::Timestamp) => "DateTime".to_string(),
        WireType::WellKnown(WellKnownKind::Duration) => "TimeSpan".to_string(),
        WireType::WellKnown(WellKnownKind::Any) => "Any?".to_string(),
        WireType::Message(name) => format!("{}?", proto_message(name)),
        WireType::Repeated(inner) => format!("IReadOnlyList<{}>", element_type(inner)),
        WireType::Map(key, value) => format!(
            "IReadOnlyDictionary<{}, {}>",
            scalar_type(*key),
            element_type(value)
        ),
    }
}

fn element_type(wire: &WireType) -> String {
    let ty = client_type(wire);
    match ty.strip_suffix('?') {
        Some(stripped) => stripped.to_string(),
        None => ty,
    }
}

/// Initial value of a client field when `default` is not appropriate.
pub fn client_default(wire: &WireType) -> Option<String> {
    match wire {
        WireType::Scalar(ScalarKind::String) => Some("string.Empty".to_string()),
        WireType::Scalar(ScalarKind::Bytes) => Some("Array.Empty<byte>()".to_string()),
        WireType::Repeated(inner) => Some(format!("Array.Empty<{}>()", element_type(inner))),
        WireType::Map(key, value) => Some(format!(
            "new Dictionary<{}, {}>()",
            scalar_type(*key),
            element_type(value)
        )),
        _ => None,
    }
}

/// Schema value → client value.
pub fn client_from_wire(expr: &str, wire: &WireType) -> String {
    match wire {
        WireType::Scalar(ScalarKind::Bytes) => format!("{}.ToByteArray()", expr),
        WireType::Scalar(_) | WireType::Message(_) => expr.to_string(),
        WireType::WellKnown(WellKnownKind::Timestamp) => {
            format!("({}?.ToDateTime() ?? default)", expr)
        }
        WireType::WellKnown(WellKnownKind::Duration) => {
            format!("({}?.ToTimeSpan() ?? default)", expr)
        }
        WireType::WellKnown(WellKnownKind::Any) => expr.to_string(),
        WireType::Repeated(inner) => match client_from_wire("item", inner).as_str() {
            "item" => format!("{}.ToList()", expr),
            item => format!("{}.Select(item => {}).ToList()", expr, item),
        },
        WireType::Map(_, value) => format!(
            "{}.ToDictionary(entry => entry.Key, entry => {})",
            expr,
            client_from_wire("entry.Value", value)
        ),
    }
}

/// Client value → schema value.
///
/// Repeated values produce an `IEnumerable` for `AddRange`, maps a
/// dictionary for `Add`.
pub fn client_to_wire(expr: &str, wire: &WireType) -> String {
    match wire {
        WireType::Scalar(ScalarKind::String) => format!("({} ?? string.Empty)", expr),
        WireType::Scalar(ScalarKind::Bytes) => format!("ByteString.CopyFrom({})", expr),
        WireType::Scalar(_) | WireType::Message(_) => expr.to_string(),
        WireType::WellKnown(WellKnownKind::Timestamp) => {
            format!("Timestamp.FromDateTime({}.ToUniversalTime())", expr)
        }
        WireType::WellKnown(WellKnownKind::Duration) => format!("Duration.FromTimeSpan({})", expr),
        WireType::WellKnown(WellKnownKind::Any) => expr.to_string(),
        WireType::Repeated(inner) => match client_to_wire("item", inner).as_str() {
            "item" => expr.to_string(),
            item => format!("{}.Select(item => {})", expr, item),
        },
        WireType::Map(_, value) => format!(
            "{}.ToDictionary(entry => entry.Key, entry => {})",
            expr,
            client_to_wire("entry.Value", value)
        ),
    }
}

/// Pack a client value into an `Any?`.
pub fn client_pack(expr: &str, wire: &WireType) -> Option<String> {
    let value = client_to_wire(expr, wire);
    Some(match Wrapper::for_wire(wire)? {
        wrapper @ Wrapper::Scalar(_) => format!(
            "Any.Pack(new {} {{ Value = {} }})",
            wrapper_type(&wrapper),
            value
        ),
        Wrapper::Message(_) => format!("PackAny({})", value),
        Wrapper::WellKnown(_) => format!("Any.Pack({})", value),
    })
}

/// Unpack an `Any` into a client value.
pub fn client_unpack(any: &str, wire: &WireType) -> Option<String> {
    let wrapper = Wrapper::for_wire(wire)?;
    let unpacked = format!("{}.Unpack<{}>()", any, wrapper_type(&wrapper));
    let value = if wrapper.has_value_field() {
        format!("{}.Value", unpacked)
    } else {
        unpacked
    };
    Some(client_from_wire(&value, wire))
}

#[cfg(test)]
mod tests {
    use vmbridge_codegen::testing::sample_model;
    use vmbridge_ir::MessageDescriptor;

    use super::*;

    fn string() -> WireType {
        WireType::Scalar(ScalarKind::String)
    }

    #[test]
    fn test_proto_member() {
        assert_eq!(proto_member("UserID"), "UserId");
        assert_eq!(proto_member("Name"), "Name");
        assert_eq!(proto_member("retryCount"), "RetryCount");
    }

    #[test]
    fn test_host_type_qualifies_names() {
        let ty = TypeRef::generic(
            "Dictionary",
            vec![
                TypeRef::primitive("string"),
                TypeRef::generic("List", vec![TypeRef::named("Demo.Item")]),
            ],
        );
        assert_eq!(
            host_type(&ty),
            "global::System.Collections.Generic.Dictionary<string, global::System.Collections.Generic.List<global::Demo.Item>>"
        );
        assert_eq!(
            host_type(&TypeRef::nullable(TypeRef::primitive("DateTime"))),
            "global::System.DateTime?"
        );
        assert_eq!(host_type(&TypeRef::array(TypeRef::primitive("int"))), "int[]");
    }

    #[test]
    fn test_scalar_conversions() {
        let ir = sample_model();
        let host = HostConversions::new(&ir);

        assert_eq!(
            host.to_wire("vm.Name", &TypeRef::primitive("string"), &string()),
            "(vm.Name ?? string.Empty)"
        );
        assert_eq!(
            host.to_wire("vm.Id", &TypeRef::primitive("Guid"), &string()),
            "vm.Id.ToString()"
        );
        assert_eq!(
            host.from_wire("m.Id", &TypeRef::primitive("Guid"), &string()),
            "global::System.Guid.Parse(m.Id)"
        );

        let status = TypeRef::enumeration("Demo.Status");
        let int32 = WireType::Scalar(ScalarKind::Int32);
        assert_eq!(host.to_wire("vm.Status", &status, &int32), "(int)vm.Status");
        assert_eq!(
            host.from_wire("m.Status", &status, &int32),
            "(global::Demo.Status)m.Status"
        );
    }

    #[test]
    fn test_nullable_value_types() {
        let ir = sample_model();
        let host = HostConversions::new(&ir);
        let count = TypeRef::nullable(TypeRef::primitive("int"));
        let int32 = WireType::Scalar(ScalarKind::Int32);
        assert_eq!(host.to_wire("vm.Count", &count, &int32), "(vm.Count ?? default)");

        let at = TypeRef::nullable(TypeRef::primitive("DateTime"));
        let timestamp = WireType::WellKnown(WellKnownKind::Timestamp);
        assert_eq!(
            host.to_wire("vm.At", &at, &timestamp),
            "(vm.At.HasValue ? Timestamp.FromDateTime(vm.At.Value.ToUniversalTime()) : null)"
        );
        assert_eq!(
            host.from_wire("m.At", &at, &timestamp),
            "(m.At is null ? null : (global::System.DateTime?)(m.At?.ToDateTime() ?? default))"
        );
    }

    #[test]
    fn test_collections() {
        let mut ir = sample_model();
        ir.messages.push(MessageDescriptor {
            name: "Item".into(),
            host_type: "Demo.Item".into(),
            value_type: false,
            fields: Vec::new(),
        });
        let host = HostConversions::new(&ir);

        let items = TypeRef::generic("List", vec![TypeRef::named("Demo.Item")]);
        let wire = WireType::repeated(WireType::Message("Item".into()));
        assert_eq!(
            host.to_wire("vm.Items", &items, &wire),
            "(vm.Items ?? global::System.Linq.Enumerable.Empty<global::Demo.Item>()).Select(item => ToProto(item)).OfType<Protos.Item>()"
        );
        assert_eq!(
            host.from_wire("m.Items", &items, &wire),
            "m.Items.Select(item => FromProto(item)).ToList()"
        );

        let tags = TypeRef::generic("HashSet", vec![TypeRef::primitive("int")]);
        let wire = WireType::repeated(WireType::Scalar(ScalarKind::Int32));
        assert_eq!(host.from_wire("m.Tags", &tags, &wire), "m.Tags.ToHashSet()");

        let stock = TypeRef::generic(
            "Dictionary",
            vec![TypeRef::primitive("string"), TypeRef::primitive("int")],
        );
        let wire = WireType::Map(
            ScalarKind::String,
            Box::new(WireType::Scalar(ScalarKind::Int32)),
        );
        assert_eq!(
            host.from_wire("m.Stock", &stock, &wire),
            "m.Stock.ToDictionary(entry => entry.Key, entry => entry.Value)"
        );
    }

    #[test]
    fn test_pack_and_unpack_share_wrappers() {
        let ir = sample_model();
        let host = HostConversions::new(&ir);
        let int = TypeRef::primitive("int");
        let int32 = WireType::Scalar(ScalarKind::Int32);

        assert_eq!(
            host.pack("vm.Count", &int, &int32).as_deref(),
            Some("Any.Pack(new Int32Value { Value = vm.Count })")
        );
        assert_eq!(
            host.unpack("value", &int, &int32).as_deref(),
            Some("value.Unpack<Int32Value>().Value")
        );
        assert_eq!(
            client_pack("value", &int32).as_deref(),
            Some("Any.Pack(new Int32Value { Value = value })")
        );
        assert_eq!(
            client_unpack("value", &int32).as_deref(),
            Some("value.Unpack<Int32Value>().Value")
        );

        let list = WireType::repeated(int32);
        assert!(host.pack("vm.Values", &int, &list).is_none());
        assert!(client_unpack("value", &list).is_none());
    }

    #[test]
    fn test_client_types() {
        assert_eq!(client_type(&string()), "string");
        assert_eq!(
            client_type(&WireType::repeated(WireType::Message("Item".into()))),
            "IReadOnlyList<Protos.Item>"
        );
        assert_eq!(
            client_from_wire("state.At", &WireType::WellKnown(WellKnownKind::Timestamp)),
            "(state.At?.ToDateTime() ?? default)"
        );
        assert_eq!(client_default(&string()).as_deref(), Some("string.Empty"));
        assert_eq!(client_default(&WireType::Scalar(ScalarKind::Bool)), None);
    }
}
