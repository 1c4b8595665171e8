//! Wire representation of host values.

use serde::Serialize;

/// Scalar kinds available in the wire schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ScalarKind {
    Bool,
    String,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bytes,
}

impl ScalarKind {
    /// The proto3 keyword for this scalar.
    pub fn proto_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Bytes => "bytes",
        }
    }

    /// Returns true if the scalar may be used as a map key.
    ///
    /// Keys must be strings, booleans or integers of any width.
    pub fn is_map_key_eligible(&self) -> bool {
        matches!(
            self,
            ScalarKind::Bool
                | ScalarKind::String
                | ScalarKind::Int32
                | ScalarKind::Int64
                | ScalarKind::UInt32
                | ScalarKind::UInt64
        )
    }
}

/// Well-known message types from `google/protobuf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WellKnownKind {
    Timestamp,
    Duration,
    Any,
}

impl WellKnownKind {
    /// The fully-qualified proto type name.
    pub fn proto_name(&self) -> &'static str {
        match self {
            WellKnownKind::Timestamp => "google.protobuf.Timestamp",
            WellKnownKind::Duration => "google.protobuf.Duration",
            WellKnownKind::Any => "google.protobuf.Any",
        }
    }

    /// The import path declaring this type.
    pub fn import_path(&self) -> &'static str {
        match self {
            WellKnownKind::Timestamp => "google/protobuf/timestamp.proto",
            WellKnownKind::Duration => "google/protobuf/duration.proto",
            WellKnownKind::Any => "google/protobuf/any.proto",
        }
    }

    /// The unqualified message name (`Timestamp`).
    pub fn short_name(&self) -> &'static str {
        match self {
            WellKnownKind::Timestamp => "Timestamp",
            WellKnownKind::Duration => "Duration",
            WellKnownKind::Any => "Any",
        }
    }
}

/// How a host value is represented in the generated schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum WireType {
    Scalar(ScalarKind),
    /// A message generated for a dependent type, by simple name.
    Message(String),
    Repeated(Box<WireType>),
    /// An associative collection. The key is always map-key-eligible.
    Map(ScalarKind, Box<WireType>),
    WellKnown(WellKnownKind),
}

impl WireType {
    pub const ANY: WireType = WireType::WellKnown(WellKnownKind::Any);

    pub fn repeated(inner: WireType) -> Self {
        WireType::Repeated(Box::new(inner))
    }

    /// Build a map type, or `None` when the key is not map-key-eligible.
    pub fn map(key: &WireType, value: WireType) -> Option<Self> {
        match key {
            WireType::Scalar(kind) if kind.is_map_key_eligible() => {
                Some(WireType::Map(*kind, Box::new(value)))
            }
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, WireType::WellKnown(WellKnownKind::Any))
    }

    /// Returns true for repeated and map types.
    pub fn is_collection(&self) -> bool {
        matches!(self, WireType::Repeated(_) | WireType::Map(..))
    }

    /// Visit every well-known type referenced by this wire type.
    pub fn visit_well_known(&self, visit: &mut impl FnMut(WellKnownKind)) {
        match self {
            WireType::WellKnown(kind) => visit(*kind),
            WireType::Repeated(inner) | WireType::Map(_, inner) => inner.visit_well_known(visit),
            WireType::Scalar(_) | WireType::Message(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_key_eligibility() {
        assert!(ScalarKind::String.is_map_key_eligible());
        assert!(ScalarKind::Bool.is_map_key_eligible());
        assert!(ScalarKind::UInt64.is_map_key_eligible());
        assert!(!ScalarKind::Double.is_map_key_eligible());
        assert!(!ScalarKind::Bytes.is_map_key_eligible());
    }

    #[test]
    fn test_map_rejects_ineligible_keys() {
        let value = WireType::Scalar(ScalarKind::Int32);
        assert!(WireType::map(&WireType::Scalar(ScalarKind::String), value.clone()).is_some());
        assert!(WireType::map(&WireType::Scalar(ScalarKind::Float), value.clone()).is_none());
        assert!(WireType::map(&WireType::Message("Item".into()), value).is_none());
    }

    #[test]
    fn test_visit_well_known_descends_into_collections() {
        let ty = WireType::Map(
            ScalarKind::String,
            Box::new(WireType::WellKnown(WellKnownKind::Timestamp)),
        );
        let mut seen = Vec::new();
        ty.visit_well_known(&mut |k| seen.push(k));
        assert_eq!(seen, vec![WellKnownKind::Timestamp]);
    }
}
