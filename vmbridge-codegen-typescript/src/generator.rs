//! TypeScript backend.

use vmbridge_codegen::Backend;
use vmbridge_core::GeneratedFile;
use vmbridge_ir::ModelIR;

use crate::files::ClientTs;

/// Generator for the grpc-web proxy used by browser clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generator;

impl Backend for Generator {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn files<'a>(&self, ir: &'a ModelIR) -> Vec<Box<dyn GeneratedFile + 'a>> {
        vec![Box::new(ClientTs::new(ir))]
    }
}
