//! Schema file generators.

mod schema_proto;

pub use schema_proto::SchemaProto;
