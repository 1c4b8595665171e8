//! Schema backend.

use vmbridge_codegen::Backend;
use vmbridge_core::GeneratedFile;
use vmbridge_ir::ModelIR;

use crate::files::SchemaProto;

/// Generator for the `.proto` schema shared by the server and both clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generator;

impl Backend for Generator {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn files<'a>(&self, ir: &'a ModelIR) -> Vec<Box<dyn GeneratedFile + 'a>> {
        vec![Box::new(SchemaProto::new(ir))]
    }
}
