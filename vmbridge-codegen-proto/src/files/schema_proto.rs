//! The `.proto` schema for one view model.

use std::path::{Path, PathBuf};

use vmbridge_codegen::{CodeBuilder, GENERATED_HEADER};
use vmbridge_core::{FileRules, GeneratedFile, to_snake_case};
use vmbridge_ir::{ConnectionState, ModelIR, PropertyDescriptor};

use crate::types::{imports, proto_type};

const EMPTY: &str = "google.protobuf.Empty";

/// The schema file: state message, dependent messages, fixed auxiliary
/// messages, per-command request/response pairs and the service.
pub struct SchemaProto<'a> {
    ir: &'a ModelIR,
}

impl<'a> SchemaProto<'a> {
    pub fn new(ir: &'a ModelIR) -> Self {
        Self { ir }
    }

    /// `<snake_name>.proto`.
    pub fn file_name(&self) -> String {
        format!("{}.proto", to_snake_case(&self.ir.view_model.name))
    }

    fn header(&self, b: &mut CodeBuilder) {
        b.push_line("syntax = \"proto3\";")
            .push_blank()
            .push_line(&format!("package {};", self.ir.meta.package))
            .push_blank()
            .push_line(&format!(
                "option csharp_namespace = \"{}\";",
                self.ir.meta.proto_namespace()
            ))
            .push_blank();
        for import in imports(self.ir) {
            b.push_line(&format!("import \"{}\";", import));
        }
    }

    fn messages(&self, b: &mut CodeBuilder) {
        let vm = &self.ir.view_model;
        message(b, &vm.state_message(), vm.numbered_properties());
        for dependent in &self.ir.messages {
            message(b, &dependent.name, dependent.numbered_fields());
        }

        for name in ["UpdatePropertyValueRequest", "PropertyChangeNotification"] {
            b.push_blank().push_block(&format!("message {} {{", name), "}", |b| {
                b.push_line("string property_name = 1;")
                    .push_line("google.protobuf.Any new_value = 2;");
            });
        }
        b.push_blank()
            .push_block("message SubscribeRequest {", "}", |b| {
                b.push_line("string client_id = 1;");
            })
            .push_blank()
            .push_block("enum ConnectionStatus {", "}", |b| {
                for state in ConnectionState::ALL {
                    b.push_line(&format!("{} = {};", state.wire_name(), state.wire_value()));
                }
            })
            .push_blank()
            .push_block("message ConnectionStatusResponse {", "}", |b| {
                b.push_line("ConnectionStatus status = 1;");
            });
    }

    fn command_messages(&self, b: &mut CodeBuilder) {
        for command in &self.ir.view_model.commands {
            b.push_blank();
            if command.parameters.is_empty() {
                b.push_line(&format!("message {} {{}}", command.request_message()));
            } else {
                b.push_block(&format!("message {} {{", command.request_message()), "}", |b| {
                    for (number, param) in command.numbered_parameters() {
                        b.push_line(&field(&proto_type(&param.wire), &param.name, number));
                    }
                });
            }
            b.push_blank()
                .push_line(&format!("message {} {{}}", command.response_message()));
        }
    }

    fn service(&self, b: &mut CodeBuilder) {
        let vm = &self.ir.view_model;
        b.push_blank().push_block(&format!("service {} {{", vm.service_name()), "}", |b| {
            b.push_line(&rpc("GetState", EMPTY, &vm.state_message()))
                .push_line(&rpc("UpdatePropertyValue", "UpdatePropertyValueRequest", EMPTY))
                .push_line(&rpc(
                    "SubscribeToPropertyChanges",
                    "SubscribeRequest",
                    "stream PropertyChangeNotification",
                ))
                .push_line(&rpc("Ping", EMPTY, "ConnectionStatusResponse"));
            for command in &vm.commands {
                b.push_line(&rpc(
                    &command.method_name,
                    &command.request_message(),
                    &command.response_message(),
                ));
            }
        });
    }
}

fn message<'p>(
    b: &mut CodeBuilder,
    name: &str,
    fields: impl Iterator<Item = (u32, &'p PropertyDescriptor)>,
) {
    b.push_blank().push_block(&format!("message {} {{", name), "}", |b| {
        for (number, property) in fields {
            b.push_line(&field(&proto_type(&property.wire), &property.name, number));
        }
    });
}

fn field(ty: &str, name: &str, number: u32) -> String {
    format!("{} {} = {};", ty, to_snake_case(name), number)
}

fn rpc(name: &str, request: &str, response: &str) -> String {
    format!("rpc {}({}) returns ({});", name, request, response)
}

impl GeneratedFile for SchemaProto<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(self.file_name())
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        let mut builder = CodeBuilder::proto();
        self.header(&mut builder);
        self.messages(&mut builder);
        self.command_messages(&mut builder);
        self.service(&mut builder);
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use vmbridge_codegen::testing::sample_model;

    use super::*;

    #[test]
    fn test_file_name_is_snake_case() {
        let ir = sample_model();
        assert_eq!(SchemaProto::new(&ir).file_name(), "main_view_model.proto");
    }

    #[test]
    fn test_field_uses_snake_case_names() {
        assert_eq!(field("string", "UserName", 1), "string user_name = 1;");
        assert_eq!(field("int32", "retryCount", 2), "int32 retry_count = 2;");
    }

    #[test]
    fn test_connection_status_enum() {
        let ir = sample_model();
        let out = SchemaProto::new(&ir).render();
        assert!(out.contains(
            "enum ConnectionStatus {\n  UNKNOWN = 0;\n  CONNECTED = 1;\n  DISCONNECTED = 2;\n}"
        ));
    }
}
