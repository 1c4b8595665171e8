//! Test utilities for backends.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::path::Path;

use vmbridge_ir::{
    CommandDescriptor, ModelIR, ModelMeta, PropertyDescriptor, ScalarKind, TypeRef,
    ViewModelDescriptor, WireType,
};
use vmbridge_source::{MemoryLocator, parse_source};

use crate::pipeline::{CompilationContext, GeneratorOptions, Pipeline, phases::package_name};

/// Run the full pipeline over in-memory sources.
///
/// `sources` are `(file name, text)` pairs loaded up front; `locator`
/// serves dependent types on demand.
pub fn run_pipeline(
    namespace: &str,
    sources: &[(&str, &str)],
    locator: MemoryLocator,
) -> CompilationContext {
    let mut ctx = CompilationContext::new(GeneratorOptions::new(namespace), locator);
    for (name, src) in sources {
        let file = parse_source(src, Path::new(name))
            .unwrap_or_else(|e| panic!("failed to parse '{}': {:?}", name, e));
        ctx.add_source(file);
    }
    Pipeline::new().run(ctx).expect("pipeline failed")
}

/// Build the model for a single view-model source.
pub fn model_from_source(namespace: &str, src: &str) -> ModelIR {
    let mut ctx = run_pipeline(namespace, &[("ViewModel.cs", src)], MemoryLocator::new());
    ctx.take_ir().expect("model not frozen")
}

/// A hand-built model: `Name: string`, `Count: int`, `Active: bool` and a
/// parameterless `Reset` command.
pub fn sample_model() -> ModelIR {
    let property = |name: &str, ty: &str, kind: ScalarKind| PropertyDescriptor {
        name: name.to_string(),
        ty: TypeRef::primitive(ty),
        wire: WireType::Scalar(kind),
        writable: true,
    };

    ModelIR {
        meta: ModelMeta {
            namespace: "Demo".to_string(),
            package: package_name("Demo"),
        },
        view_model: ViewModelDescriptor {
            name: "MainViewModel".to_string(),
            namespace: "Demo".to_string(),
            properties: vec![
                property("Name", "string", ScalarKind::String),
                property("Count", "int", ScalarKind::Int32),
                property("Active", "bool", ScalarKind::Bool),
            ],
            commands: vec![CommandDescriptor {
                method_name: "Reset".to_string(),
                command_property: "ResetCommand".to_string(),
                parameters: Vec::new(),
                is_async: false,
            }],
        },
        messages: Vec::new(),
    }
}
