//! Pack/unpack table shared by every backend.
//!
//! Single values travel inside `google.protobuf.Any` when pushed through
//! `UpdatePropertyValue` or property-change notifications. Each wire type
//! that can travel that way has exactly one wrapper message.

use vmbridge_ir::{PropertyDescriptor, ScalarKind, WellKnownKind, WireType};

/// The message a single value is wrapped in before packing into `Any`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Wrapper {
    /// A `google.protobuf` wrapper for a scalar (`StringValue`, `Int32Value`, ...).
    Scalar(ScalarKind),
    /// A well-known message packed as itself (`Timestamp`, `Duration`).
    WellKnown(WellKnownKind),
    /// A generated message packed as itself.
    Message(String),
}

impl Wrapper {
    /// The wrapper for `wire`, or `None` when values of this type are only
    /// readable through `GetState`.
    pub fn for_wire(wire: &WireType) -> Option<Self> {
        match wire {
            WireType::Scalar(kind) => Some(Wrapper::Scalar(*kind)),
            WireType::WellKnown(WellKnownKind::Any) => None,
            WireType::WellKnown(kind) => Some(Wrapper::WellKnown(*kind)),
            WireType::Message(name) => Some(Wrapper::Message(name.clone())),
            WireType::Repeated(_) | WireType::Map(..) => None,
        }
    }

    /// The unqualified message name (`StringValue`, `Timestamp`, `Item`).
    pub fn message_name(&self) -> &str {
        match self {
            Wrapper::Scalar(kind) => scalar_wrapper(*kind),
            Wrapper::WellKnown(kind) => kind.short_name(),
            Wrapper::Message(name) => name,
        }
    }

    /// The fully-qualified proto name (`google.protobuf.StringValue`).
    pub fn proto_name(&self, package: &str) -> String {
        match self {
            Wrapper::Scalar(kind) => format!("google.protobuf.{}", scalar_wrapper(*kind)),
            Wrapper::WellKnown(kind) => kind.proto_name().to_string(),
            Wrapper::Message(name) => format!("{}.{}", package, name),
        }
    }

    /// Whether the packed message stores the value in a `value` field.
    pub fn has_value_field(&self) -> bool {
        matches!(self, Wrapper::Scalar(_))
    }

    /// The import declaring this wrapper, if it is not generated.
    pub fn import_path(&self) -> Option<&'static str> {
        match self {
            Wrapper::Scalar(_) => Some("google/protobuf/wrappers.proto"),
            Wrapper::WellKnown(kind) => Some(kind.import_path()),
            Wrapper::Message(_) => None,
        }
    }
}

/// Whether remote clients may set `property` through `UpdatePropertyValue`.
pub fn accepts_updates(property: &PropertyDescriptor) -> bool {
    property.writable && Wrapper::for_wire(&property.wire).is_some()
}

fn scalar_wrapper(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "BoolValue",
        ScalarKind::String => "StringValue",
        ScalarKind::Int32 => "Int32Value",
        ScalarKind::Int64 => "Int64Value",
        ScalarKind::UInt32 => "UInt32Value",
        ScalarKind::UInt64 => "UInt64Value",
        ScalarKind::Float => "FloatValue",
        ScalarKind::Double => "DoubleValue",
        ScalarKind::Bytes => "BytesValue",
    }
}
