//! Built-in and framework type tables.
//!
//! Names are normalized so that `System.Int32`, `Int32` and `int` bind to the
//! same reference, and framework collections lose their namespace
//! (`System.Collections.Generic.List<T>` binds as `List<T>`).

/// Namespaces whose types are recognized without being declared in sources.
const FRAMEWORK_NAMESPACES: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Collections.ObjectModel",
    "System.Collections.Concurrent",
    "System.Collections.Immutable",
    "System.Numerics",
    "System.Threading",
    "System.Threading.Tasks",
];

const KEYWORDS: &[&str] = &[
    "bool", "byte", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "nint", "nuint",
    "float", "double", "decimal", "char", "string", "object", "dynamic", "void",
];

const CLR_ALIASES: &[(&str, &str)] = &[
    ("Boolean", "bool"),
    ("Byte", "byte"),
    ("SByte", "sbyte"),
    ("Int16", "short"),
    ("UInt16", "ushort"),
    ("Int32", "int"),
    ("UInt32", "uint"),
    ("Int64", "long"),
    ("UInt64", "ulong"),
    ("IntPtr", "nint"),
    ("UIntPtr", "nuint"),
    ("Single", "float"),
    ("Double", "double"),
    ("Decimal", "decimal"),
    ("Char", "char"),
    ("String", "string"),
    ("Object", "object"),
];

const FRAMEWORK_TYPES: &[&str] = &[
    "DateTime",
    "DateTimeOffset",
    "DateOnly",
    "TimeOnly",
    "TimeSpan",
    "Guid",
    "Uri",
    "Version",
    "BigInteger",
    "CancellationToken",
    "Task",
    "ValueTask",
    "ValueTuple",
];

/// Ordered collections; these map to repeated fields.
pub const SEQUENCE_TYPES: &[&str] = &[
    "List",
    "IList",
    "ICollection",
    "IEnumerable",
    "IReadOnlyList",
    "IReadOnlyCollection",
    "ObservableCollection",
    "Collection",
    "ReadOnlyCollection",
    "HashSet",
    "ISet",
    "Queue",
    "Stack",
    "LinkedList",
    "ImmutableArray",
    "ImmutableList",
];

/// Associative collections; these map to map fields.
pub const DICTIONARY_TYPES: &[&str] = &[
    "Dictionary",
    "IDictionary",
    "IReadOnlyDictionary",
    "ConcurrentDictionary",
    "SortedDictionary",
    "ImmutableDictionary",
];

/// Awaitable result wrappers; only their type argument is ever expanded.
pub const DEFERRED_TYPES: &[&str] = &["Task", "ValueTask"];

/// The type of parameters that are supplied by the host rather than transmitted.
pub const CANCELLATION_TOKEN: &str = "CancellationToken";

fn strip_framework_namespace(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((namespace, simple)) if FRAMEWORK_NAMESPACES.contains(&namespace) => simple,
        _ => name,
    }
}

/// Normalize a keyword or CLR alias (`System.Int32` -> `int`).
pub fn keyword(name: &str) -> Option<&'static str> {
    if let Some(keyword) = KEYWORDS.iter().copied().find(|k| *k == name) {
        return Some(keyword);
    }
    let simple = strip_framework_namespace(name);
    if simple.contains('.') {
        return None;
    }
    CLR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == simple)
        .map(|(_, keyword)| *keyword)
}

/// Normalize a non-generic framework type (`System.Guid` -> `Guid`).
pub fn framework_type(name: &str) -> Option<&'static str> {
    let simple = strip_framework_namespace(name);
    FRAMEWORK_TYPES.iter().copied().find(|t| *t == simple)
}

/// Normalize a generic framework type (`System.Collections.Generic.List` -> `List`).
pub fn framework_generic(name: &str) -> Option<&'static str> {
    let simple = strip_framework_namespace(name);
    SEQUENCE_TYPES
        .iter()
        .chain(DICTIONARY_TYPES)
        .chain(DEFERRED_TYPES)
        .chain(&["Nullable"])
        .copied()
        .find(|t| *t == simple)
}

/// Namespace declaring a framework type (`List` -> `System.Collections.Generic`).
pub fn framework_namespace(simple: &str) -> Option<&'static str> {
    let namespace = match simple {
        "DateTime" | "DateTimeOffset" | "DateOnly" | "TimeOnly" | "TimeSpan" | "Guid" | "Uri"
        | "Version" | "ValueTuple" | "Nullable" => "System",
        "BigInteger" => "System.Numerics",
        "CancellationToken" => "System.Threading",
        "Task" | "ValueTask" => "System.Threading.Tasks",
        "ObservableCollection" | "Collection" | "ReadOnlyCollection" => {
            "System.Collections.ObjectModel"
        }
        "ConcurrentDictionary" => "System.Collections.Concurrent",
        "ImmutableArray" | "ImmutableList" | "ImmutableDictionary" => "System.Collections.Immutable",
        _ if is_sequence(simple) || is_dictionary(simple) => "System.Collections.Generic",
        _ => return None,
    };
    Some(namespace)
}

pub fn is_sequence(name: &str) -> bool {
    SEQUENCE_TYPES.contains(&name)
}

pub fn is_dictionary(name: &str) -> bool {
    DICTIONARY_TYPES.contains(&name)
}

pub fn is_deferred(name: &str) -> bool {
    DEFERRED_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_namespace() {
        assert_eq!(framework_namespace("List"), Some("System.Collections.Generic"));
        assert_eq!(framework_namespace("SortedDictionary"), Some("System.Collections.Generic"));
        assert_eq!(
            framework_namespace("ObservableCollection"),
            Some("System.Collections.ObjectModel")
        );
        assert_eq!(framework_namespace("Guid"), Some("System"));
        assert_eq!(framework_namespace("Item"), None);
    }

    #[test]
    fn test_keyword_aliases() {
        assert_eq!(keyword("int"), Some("int"));
        assert_eq!(keyword("Int32"), Some("int"));
        assert_eq!(keyword("System.String"), Some("string"));
        assert_eq!(keyword("Demo.Int32"), None);
        assert_eq!(keyword("Item"), None);
    }

    #[test]
    fn test_framework_types() {
        assert_eq!(framework_type("System.DateTimeOffset"), Some("DateTimeOffset"));
        assert_eq!(framework_type("System.Numerics.BigInteger"), Some("BigInteger"));
        assert_eq!(framework_type("Guid"), Some("Guid"));
        assert_eq!(framework_type("Demo.Guid"), None);
    }

    #[test]
    fn test_framework_generics() {
        assert_eq!(framework_generic("System.Collections.Generic.List"), Some("List"));
        assert_eq!(framework_generic("ObservableCollection"), Some("ObservableCollection"));
        assert_eq!(framework_generic("System.Threading.Tasks.Task"), Some("Task"));
        assert_eq!(framework_generic("System.Nullable"), Some("Nullable"));
        assert_eq!(framework_generic("Page"), None);
    }
}
