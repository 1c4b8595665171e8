//! C# backends.

use vmbridge_codegen::Backend;
use vmbridge_core::GeneratedFile;
use vmbridge_ir::ModelIR;

use crate::files::{ClientCs, ServerCs};

/// Generator for the gRPC service adapter hosted next to the view model.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerGenerator;

impl Backend for ServerGenerator {
    fn name(&self) -> &'static str {
        "server"
    }

    fn files<'a>(&self, ir: &'a ModelIR) -> Vec<Box<dyn GeneratedFile + 'a>> {
        vec![Box::new(ServerCs::new(ir))]
    }
}

/// Generator for the observable remote client.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientGenerator;

impl Backend for ClientGenerator {
    fn name(&self) -> &'static str {
        "client"
    }

    fn files<'a>(&self, ir: &'a ModelIR) -> Vec<Box<dyn GeneratedFile + 'a>> {
        vec![Box::new(ClientCs::new(ir))]
    }
}
