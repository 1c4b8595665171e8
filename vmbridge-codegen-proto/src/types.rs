//! Wire type rendering for proto3.

use std::collections::BTreeSet;

use vmbridge_ir::{ModelIR, WellKnownKind, WireType};

/// Imports every schema needs: `Any` for property values, `Empty` for the
/// fixed RPCs.
const BASE_IMPORTS: [&str; 2] = ["google/protobuf/any.proto", "google/protobuf/empty.proto"];

/// Render a wire type as a proto3 field type.
///
/// Repeated types include the `repeated` label.
pub fn proto_type(wire: &WireType) -> String {
    match wire {
        WireType::Scalar(kind) => kind.proto_name().to_string(),
        WireType::Message(name) => name.clone(),
        WireType::WellKnown(kind) => kind.proto_name().to_string(),
        WireType::Repeated(inner) => format!("repeated {}", proto_type(inner)),
        WireType::Map(key, value) => format!("map<{}, {}>", key.proto_name(), proto_type(value)),
    }
}

/// The sorted, deduplicated import list for `ir`.
pub fn imports(ir: &ModelIR) -> BTreeSet<&'static str> {
    let mut used = BTreeSet::from(BASE_IMPORTS);
    let mut visit = |kind: WellKnownKind| {
        used.insert(kind.import_path());
    };

    for property in &ir.view_model.properties {
        property.wire.visit_well_known(&mut visit);
    }
    for message in &ir.messages {
        for field in &message.fields {
            field.wire.visit_well_known(&mut visit);
        }
    }
    for command in &ir.view_model.commands {
        for param in &command.parameters {
            param.wire.visit_well_known(&mut visit);
        }
    }

    used
}

#[cfg(test)]
mod tests {
    use vmbridge_codegen::testing::sample_model;
    use vmbridge_ir::{PropertyDescriptor, ScalarKind, TypeRef};

    use super::*;

    #[test]
    fn test_proto_type() {
        assert_eq!(proto_type(&WireType::Scalar(ScalarKind::UInt64)), "uint64");
        assert_eq!(
            proto_type(&WireType::repeated(WireType::Message("Item".into()))),
            "repeated Item"
        );
        assert_eq!(
            proto_type(&WireType::Map(
                ScalarKind::String,
                Box::new(WireType::WellKnown(WellKnownKind::Timestamp))
            )),
            "map<string, google.protobuf.Timestamp>"
        );
        assert_eq!(proto_type(&WireType::ANY), "google.protobuf.Any");
    }

    #[test]
    fn test_imports_only_include_used_well_known_types() {
        let mut ir = sample_model();
        assert_eq!(
            imports(&ir).into_iter().collect::<Vec<_>>(),
            vec!["google/protobuf/any.proto", "google/protobuf/empty.proto"]
        );

        ir.view_model.properties.push(PropertyDescriptor {
            name: "History".into(),
            ty: TypeRef::generic("List", vec![TypeRef::primitive("TimeSpan")]),
            wire: WireType::repeated(WireType::WellKnown(WellKnownKind::Duration)),
            writable: false,
        });
        assert_eq!(
            imports(&ir).into_iter().collect::<Vec<_>>(),
            vec![
                "google/protobuf/any.proto",
                "google/protobuf/duration.proto",
                "google/protobuf/empty.proto",
            ]
        );
    }
}
