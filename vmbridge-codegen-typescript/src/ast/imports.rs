//! TypeScript import builder.

use vmbridge_codegen::CodeBuilder;

/// Builder for TypeScript import statements.
#[derive(Debug, Clone)]
pub struct Import {
    from: String,
    namespace: Option<String>,
    named: Vec<String>,
    type_only: bool,
}

impl Import {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            namespace: None,
            named: Vec::new(),
            type_only: false,
        }
    }

    /// Import the whole module under a name (`import * as pb from ...`).
    pub fn namespace(mut self, name: impl Into<String>) -> Self {
        self.namespace = Some(name.into());
        self
    }

    /// Import a named export.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.named.push(name.into());
        self
    }

    /// Make this a type-only import (`import type { ... }`).
    pub fn type_only(mut self) -> Self {
        self.type_only = true;
        self
    }

    /// Whether the import binds nothing.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.named.is_empty()
    }

    /// Render the import into a builder.
    pub fn render(&self, builder: &mut CodeBuilder) {
        let type_kw = if self.type_only { "type " } else { "" };

        let line = match &self.namespace {
            Some(name) => format!("import {}* as {} from '{}';", type_kw, name, self.from),
            None if self.named.is_empty() => format!("import '{}';", self.from),
            None => format!(
                "import {}{{ {} }} from '{}';",
                type_kw,
                self.named.join(", "),
                self.from
            ),
        };
        builder.push_line(&line);
    }

    /// Build the import as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typescript();
        self.render(&mut builder);
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_import() {
        let i = Import::new("grpc-web")
            .named("ClientReadableStream")
            .named("RpcError")
            .build();
        assert_eq!(i, "import { ClientReadableStream, RpcError } from 'grpc-web';\n");
    }

    #[test]
    fn test_namespace_import() {
        let i = Import::new("./main_view_model_pb").namespace("pb").build();
        assert_eq!(i, "import * as pb from './main_view_model_pb';\n");
    }

    #[test]
    fn test_type_only_import() {
        let i = Import::new("grpc-web")
            .named("ClientReadableStream")
            .type_only()
            .build();
        assert_eq!(i, "import type { ClientReadableStream } from 'grpc-web';\n");
    }

    #[test]
    fn test_side_effect_import() {
        let i = Import::new("./polyfill");
        assert!(i.is_empty());
        assert_eq!(i.build(), "import './polyfill';\n");
    }
}
