//! TypeScript naming conventions.

use vmbridge_core::{strip_async_suffix, to_camel_case, to_pascal_case, to_snake_case};

/// Words that cannot name a parameter or local in strict-mode modules.
const RESERVED_WORDS: &[&str] = &[
    // JavaScript reserved words
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
    // Strict mode
    "arguments",
    "await",
    "eval",
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    // Locals used by generated methods
    "request",
    "value",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// A camelCase identifier, prefixed with `_` when it is reserved.
pub fn safe_name(name: &str) -> String {
    let name = to_camel_case(name);
    if is_reserved(&name) {
        format!("_{}", name)
    } else {
        name
    }
}

/// The key of a property in the generated state interface.
pub fn state_key(property: &str) -> String {
    to_camel_case(property)
}

/// The accessor stem protoc-gen-js derives from a field (`placed_at` -> `PlacedAt`).
pub fn accessor(field: &str) -> String {
    to_pascal_case(&to_snake_case(field))
}

/// The promise-client method grpc-web generates for an RPC.
pub fn rpc_method(rpc: &str) -> String {
    to_camel_case(rpc)
}

/// The proxy method wrapping a command (`SubmitAsync` -> `executeSubmit`).
pub fn command_method(method_name: &str) -> String {
    format!("execute{}", to_pascal_case(strip_async_suffix(method_name)))
}

/// The module grpc-web generates for a schema file
/// (`main_view_model.proto` -> `Main_view_modelServiceClientPb`).
pub fn service_client_module(schema_stem: &str) -> String {
    let mut chars = schema_stem.chars();
    match chars.next() {
        Some(first) => format!(
            "{}{}ServiceClientPb",
            first.to_ascii_uppercase(),
            chars.as_str()
        ),
        None => "ServiceClientPb".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved("class"));
        assert!(is_reserved("await"));
        assert!(!is_reserved("order"));
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("Default"), "_default");
        assert_eq!(safe_name("userId"), "userId");
        assert_eq!(safe_name("value"), "_value");
    }

    #[test]
    fn test_accessor() {
        assert_eq!(accessor("PlacedAt"), "PlacedAt");
        assert_eq!(accessor("userName"), "UserName");
        assert_eq!(accessor("UserID"), "UserId");
    }

    #[test]
    fn test_command_method() {
        assert_eq!(command_method("Reset"), "executeReset");
        assert_eq!(command_method("SubmitAsync"), "executeSubmit");
    }

    #[test]
    fn test_service_client_module() {
        assert_eq!(
            service_client_module("main_view_model"),
            "Main_view_modelServiceClientPb"
        );
    }
}
