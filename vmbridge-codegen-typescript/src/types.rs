//! TypeScript value conversions over protoc-gen-js message classes.
//!
//! Proxy state uses plain TypeScript values: `Date` for timestamps,
//! milliseconds for durations, arrays and `Map`s for collections. Generated
//! messages stay messages, referenced through the `pb` namespace import.

use vmbridge_codegen::Wrapper;
use vmbridge_ir::{ScalarKind, WellKnownKind, WireType};

use crate::naming::accessor;

/// Namespace under which the generated message module is imported.
pub const PB: &str = "pb";

/// The TypeScript type of a proxy value.
pub fn ts_type(wire: &WireType) -> String {
    match wire {
        WireType::WellKnown(WellKnownKind::Any) | WireType::Message(_) => {
            format!("{} | undefined", element_type(wire))
        }
        WireType::Repeated(inner) => format!("ReadonlyArray<{}>", element_type(inner)),
        WireType::Map(key, value) => format!(
            "ReadonlyMap<{}, {}>",
            scalar_type(*key),
            element_type(value)
        ),
        _ => element_type(wire),
    }
}

fn element_type(wire: &WireType) -> String {
    match wire {
        WireType::Scalar(kind) => scalar_type(*kind).to_string(),
        WireType::WellKnown(WellKnownKind::Timestamp) => "Date".to_string(),
        WireType::WellKnown(WellKnownKind::Duration) => "number".to_string(),
        WireType::WellKnown(WellKnownKind::Any) => "Any".to_string(),
        WireType::Message(name) => format!("{}.{}", PB, name),
        WireType::Repeated(_) | WireType::Map(..) => ts_type(wire),
    }
}

fn scalar_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "boolean",
        ScalarKind::String => "string",
        ScalarKind::Bytes => "Uint8Array",
        ScalarKind::Int32
        | ScalarKind::Int64
        | ScalarKind::UInt32
        | ScalarKind::UInt64
        | ScalarKind::Float
        | ScalarKind::Double => "number",
    }
}

/// Initial proxy value before the first `GetState`.
pub fn default_value(wire: &WireType) -> &'static str {
    match wire {
        WireType::Scalar(ScalarKind::Bool) => "false",
        WireType::Scalar(ScalarKind::String) => "''",
        WireType::Scalar(ScalarKind::Bytes) => "new Uint8Array()",
        WireType::Scalar(_) => "0",
        WireType::WellKnown(WellKnownKind::Timestamp) => "new Date(0)",
        WireType::WellKnown(WellKnownKind::Duration) => "0",
        WireType::WellKnown(WellKnownKind::Any) | WireType::Message(_) => "undefined",
        WireType::Repeated(_) => "[]",
        WireType::Map(..) => "new Map()",
    }
}

/// Read field `name` of `message` as a proxy value.
pub fn read(message: &str, name: &str, wire: &WireType) -> String {
    let field = accessor(name);
    match wire {
        WireType::Scalar(ScalarKind::Bytes) => format!("{}.get{}_asU8()", message, field),
        WireType::WellKnown(WellKnownKind::Timestamp) => {
            format!("toDate({}.get{}())", message, field)
        }
        WireType::WellKnown(WellKnownKind::Duration) => {
            format!("toMillis({}.get{}())", message, field)
        }
        WireType::Repeated(inner) => {
            let list = match **inner {
                WireType::Scalar(ScalarKind::Bytes) => {
                    format!("{}.get{}List_asU8()", message, field)
                }
                _ => format!("{}.get{}List()", message, field),
            };
            match element_from_wire(inner) {
                Some(convert) => format!("{}.map({})", list, convert),
                None => list,
            }
        }
        WireType::Map(_, value) => {
            let convert = match **value {
                WireType::Scalar(ScalarKind::Bytes) => "(value) => value as Uint8Array",
                _ => element_from_wire(value).unwrap_or("(value) => value"),
            };
            format!("toMap({}.get{}Map(), {})", message, field, convert)
        }
        _ => format!("{}.get{}()", message, field),
    }
}

/// Statement setting field `name` of `message` from the proxy value `value`.
pub fn write(message: &str, name: &str, wire: &WireType, value: &str) -> String {
    let field = accessor(name);
    match wire {
        WireType::WellKnown(WellKnownKind::Timestamp) => {
            format!("{}.set{}(Timestamp.fromDate({}));", message, field, value)
        }
        WireType::WellKnown(WellKnownKind::Duration) => {
            format!("{}.set{}(fromMillis({}));", message, field, value)
        }
        WireType::Repeated(inner) => match element_to_wire(inner) {
            Some(convert) => format!("{}.set{}List({}.map({}));", message, field, value, convert),
            None => format!("{}.set{}List([...{}]);", message, field, value),
        },
        WireType::Map(_, inner) => format!(
            "fillMap({}.get{}Map(), {}, {});",
            message,
            field,
            value,
            element_to_wire(inner).unwrap_or("(item) => item")
        ),
        _ => format!("{}.set{}({});", message, field, value),
    }
}

fn element_from_wire(wire: &WireType) -> Option<&'static str> {
    match wire {
        WireType::WellKnown(WellKnownKind::Timestamp) => Some("toDate"),
        WireType::WellKnown(WellKnownKind::Duration) => Some("toMillis"),
        _ => None,
    }
}

fn element_to_wire(wire: &WireType) -> Option<&'static str> {
    match wire {
        WireType::WellKnown(WellKnownKind::Timestamp) => Some("(item) => Timestamp.fromDate(item)"),
        WireType::WellKnown(WellKnownKind::Duration) => Some("(item) => fromMillis(item)"),
        _ => None,
    }
}

/// How a proxy value travels inside `google.protobuf.Any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packing {
    /// Fully-qualified proto type name recorded in the `Any`.
    pub type_name: String,
    /// The message class holding the value (`StringValue`, `pb.Order`).
    pub class: String,
    wrapper: Wrapper,
}

impl Packing {
    /// The packing for `wire`, or `None` when it only travels in `GetState`.
    pub fn for_wire(wire: &WireType, package: &str) -> Option<Self> {
        let wrapper = Wrapper::for_wire(wire)?;
        let class = match &wrapper {
            Wrapper::Message(name) => format!("{}.{}", PB, name),
            other => other.message_name().to_string(),
        };
        Some(Self {
            type_name: wrapper.proto_name(package),
            class,
            wrapper,
        })
    }

    /// Statements and final expression packing `value` into an `Any`.
    ///
    /// Message values may be `undefined`; the expression is then `undefined`.
    pub fn pack(&self, value: &str) -> (Vec<String>, String) {
        match &self.wrapper {
            Wrapper::Scalar(_) => (
                vec![
                    format!("const wrapper = new {}();", self.class),
                    format!("wrapper.setValue({});", value),
                ],
                format!("pack(wrapper, '{}')", self.type_name),
            ),
            Wrapper::WellKnown(WellKnownKind::Timestamp) => (
                Vec::new(),
                format!("pack(Timestamp.fromDate({}), '{}')", value, self.type_name),
            ),
            Wrapper::WellKnown(WellKnownKind::Duration) => (
                Vec::new(),
                format!("pack(fromMillis({}), '{}')", value, self.type_name),
            ),
            Wrapper::WellKnown(_) => (
                Vec::new(),
                format!("pack({}, '{}')", value, self.type_name),
            ),
            Wrapper::Message(_) => (
                Vec::new(),
                format!(
                    "{v} === undefined ? undefined : pack({v}, '{t}')",
                    v = value,
                    t = self.type_name
                ),
            ),
        }
    }

    /// Expression unpacking `any`; yields the message class or `null`.
    pub fn unpack(&self, any: &str) -> String {
        format!(
            "{}.unpack({}.deserializeBinary, '{}')",
            any, self.class, self.type_name
        )
    }

    /// Proxy value from an unpacked, non-null message.
    pub fn value_of(&self, unpacked: &str) -> String {
        match &self.wrapper {
            Wrapper::Scalar(ScalarKind::Bytes) => format!("{}.getValue_asU8()", unpacked),
            Wrapper::Scalar(_) => format!("{}.getValue()", unpacked),
            Wrapper::WellKnown(WellKnownKind::Timestamp) => format!("{}.toDate()", unpacked),
            Wrapper::WellKnown(WellKnownKind::Duration) => format!("toMillis({})", unpacked),
            Wrapper::WellKnown(_) | Wrapper::Message(_) => unpacked.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> WireType {
        WireType::Scalar(ScalarKind::String)
    }

    #[test]
    fn test_ts_types() {
        assert_eq!(ts_type(&WireType::Scalar(ScalarKind::Int64)), "number");
        assert_eq!(
            ts_type(&WireType::WellKnown(WellKnownKind::Timestamp)),
            "Date"
        );
        assert_eq!(ts_type(&WireType::Message("Order".into())), "pb.Order | undefined");
        assert_eq!(
            ts_type(&WireType::repeated(WireType::Message("Order".into()))),
            "ReadonlyArray<pb.Order>"
        );
        assert_eq!(
            ts_type(&WireType::Map(ScalarKind::String, Box::new(WireType::Scalar(ScalarKind::Int32)))),
            "ReadonlyMap<string, number>"
        );
    }

    #[test]
    fn test_read_converts_well_known_types() {
        assert_eq!(read("state", "Name", &string()), "state.getName()");
        assert_eq!(
            read("state", "PlacedAt", &WireType::WellKnown(WellKnownKind::Timestamp)),
            "toDate(state.getPlacedAt())"
        );
        assert_eq!(
            read("state", "Lines", &WireType::repeated(string())),
            "state.getLinesList()"
        );
        assert_eq!(
            read(
                "state",
                "Stock",
                &WireType::Map(ScalarKind::String, Box::new(WireType::Scalar(ScalarKind::Int32)))
            ),
            "toMap(state.getStockMap(), (value) => value)"
        );
    }

    #[test]
    fn test_write_statements() {
        assert_eq!(
            write("request", "Id", &string(), "id"),
            "request.setId(id);"
        );
        assert_eq!(
            write(
                "request",
                "Delay",
                &WireType::WellKnown(WellKnownKind::Duration),
                "delay"
            ),
            "request.setDelay(fromMillis(delay));"
        );
        assert_eq!(
            write("request", "Tags", &WireType::repeated(string()), "tags"),
            "request.setTagsList([...tags]);"
        );
    }

    #[test]
    fn test_scalar_packing() {
        let packing = Packing::for_wire(&string(), "demo").unwrap();
        let (statements, expr) = packing.pack("value");
        assert_eq!(
            statements,
            ["const wrapper = new StringValue();", "wrapper.setValue(value);"]
        );
        assert_eq!(expr, "pack(wrapper, 'google.protobuf.StringValue')");
        assert_eq!(
            packing.unpack("any"),
            "any.unpack(StringValue.deserializeBinary, 'google.protobuf.StringValue')"
        );
        assert_eq!(packing.value_of("unpacked"), "unpacked.getValue()");
    }

    #[test]
    fn test_message_packing_uses_package() {
        let packing = Packing::for_wire(&WireType::Message("Order".into()), "demo.orders").unwrap();
        assert_eq!(packing.class, "pb.Order");
        assert_eq!(packing.type_name, "demo.orders.Order");
        assert_eq!(
            packing.pack("value").1,
            "value === undefined ? undefined : pack(value, 'demo.orders.Order')"
        );
    }

    #[test]
    fn test_collections_do_not_pack() {
        assert!(Packing::for_wire(&WireType::repeated(string()), "demo").is_none());
        assert!(Packing::for_wire(&WireType::ANY, "demo").is_none());
    }
}
