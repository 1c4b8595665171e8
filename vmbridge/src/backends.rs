//! Backend selection.
//!
//! Maps the `[generate]` switches to backend instances.

use vmbridge_codegen::Backend;
use vmbridge_codegen_csharp::{ClientGenerator, ServerGenerator};
use vmbridge_codegen_proto::Generator as SchemaGenerator;
use vmbridge_codegen_typescript::Generator as TypeScriptGenerator;
use vmbridge_source::GenerateConfig;

/// The enabled backends, in output order.
pub fn selected(config: &GenerateConfig) -> Vec<Box<dyn Backend>> {
    let mut backends: Vec<Box<dyn Backend>> = Vec::new();
    if config.schema {
        backends.push(Box::new(SchemaGenerator));
    }
    if config.server {
        backends.push(Box::new(ServerGenerator));
    }
    if config.client {
        backends.push(Box::new(ClientGenerator));
    }
    if config.typescript {
        backends.push(Box::new(TypeScriptGenerator));
    }
    backends
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(config: &GenerateConfig) -> Vec<&'static str> {
        selected(config).iter().map(|b| b.name()).collect()
    }

    #[test]
    fn test_all_backends_by_default() {
        assert_eq!(
            names(&GenerateConfig::default()),
            ["schema", "server", "client", "typescript"]
        );
    }

    #[test]
    fn test_disabled_backends_are_skipped() {
        let config = GenerateConfig {
            server: false,
            typescript: false,
            ..GenerateConfig::default()
        };
        assert_eq!(names(&config), ["schema", "client"]);
    }
}
