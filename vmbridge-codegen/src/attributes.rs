//! Attribute matching against configured marker names.
//!
//! A marker matches an attribute usage either by exact fully-qualified name
//! or by short name. The short-name path exists because attribute classes
//! usually live in libraries whose sources are not part of the session, so
//! their namespace can only be inferred from the `using` directives in scope.
//! Two unrelated attributes that share a short name and whose namespaces are
//! both imported are indistinguishable on that path.

use vmbridge_source::{Scope, SymbolTable, syntax::Attribute};

const SUFFIX: &str = "Attribute";

/// A configured marker name (`CommunityToolkit.Mvvm.Input.RelayCommandAttribute`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    configured: String,
    namespace: Option<String>,
    short: String,
}

impl Marker {
    pub fn new(configured: &str) -> Self {
        let (namespace, simple) = split_qualified(configured);
        Self {
            configured: configured.to_string(),
            namespace: namespace.map(str::to_string),
            short: strip_suffix(simple).to_string(),
        }
    }

    /// The marker name as configured.
    pub fn configured(&self) -> &str {
        &self.configured
    }

    /// The short name without namespace and `Attribute` suffix.
    pub fn short_name(&self) -> &str {
        &self.short
    }

    /// Returns true if any attribute in `attributes` carries this marker.
    pub fn matches_any(&self, attributes: &[Attribute], scope: &Scope, table: &SymbolTable) -> bool {
        attributes
            .iter()
            .any(|attribute| self.matches(attribute, scope, table))
    }

    /// Returns true if `attribute`, used inside `scope`, carries this marker.
    pub fn matches(&self, attribute: &Attribute, scope: &Scope, table: &SymbolTable) -> bool {
        let usage = resolve_usage(attribute, scope, table);

        if let Some(full) = &usage.full_name
            && with_suffix(full) == with_suffix(&self.configured)
        {
            return true;
        }

        if strip_suffix(&usage.simple) != self.short {
            return false;
        }
        match &self.namespace {
            None => true,
            Some(namespace) => match &usage.namespace {
                Namespace::Resolved(resolved) => resolved == namespace,
                Namespace::Candidates(candidates) => candidates.iter().any(|c| c == namespace),
            },
        }
    }
}

/// What is known about the namespace of an attribute usage.
#[derive(Debug)]
enum Namespace {
    /// Written qualified, or declared in the session.
    Resolved(String),
    /// Any namespace visible from the usage site.
    Candidates(Vec<String>),
}

#[derive(Debug)]
struct Usage {
    simple: String,
    full_name: Option<String>,
    namespace: Namespace,
}

fn resolve_usage(attribute: &Attribute, scope: &Scope, table: &SymbolTable) -> Usage {
    let written = attribute.name.trim_start_matches("global::");
    let (qualifier, simple) = split_qualified(written);

    if let Some(qualifier) = qualifier {
        return Usage {
            simple: simple.to_string(),
            full_name: Some(written.to_string()),
            namespace: Namespace::Resolved(qualifier.to_string()),
        };
    }

    let declared = table
        .resolve(&with_suffix(simple), scope)
        .or_else(|| table.resolve(simple, scope))
        .map(|id| table.get(id))
        .filter(|decl| decl.kind.is_data_type());
    if let Some(decl) = declared {
        return Usage {
            simple: decl.name.clone(),
            full_name: Some(decl.full_name()),
            namespace: Namespace::Resolved(decl.namespace.clone()),
        };
    }

    let mut candidates: Vec<String> = scope.usings.clone();
    candidates.extend(table.global_usings().iter().cloned());
    let mut namespace = scope.namespace.as_str();
    while !namespace.is_empty() {
        candidates.push(namespace.to_string());
        namespace = namespace.rsplit_once('.').map_or("", |(outer, _)| outer);
    }

    Usage {
        simple: simple.to_string(),
        full_name: None,
        namespace: Namespace::Candidates(candidates),
    }
}

fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((namespace, simple)) => (Some(namespace), simple),
        None => (None, name),
    }
}

fn strip_suffix(name: &str) -> &str {
    match name.strip_suffix(SUFFIX) {
        Some(short) if !short.is_empty() => short,
        _ => name,
    }
}

fn with_suffix(name: &str) -> String {
    if name.ends_with(SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use vmbridge_source::parse_source;

    use super::*;

    const OBSERVABLE: &str = "CommunityToolkit.Mvvm.ComponentModel.ObservablePropertyAttribute";

    fn attribute(name: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            args: None,
            target: None,
        }
    }

    fn scope(namespace: &str, usings: &[&str]) -> Scope {
        Scope {
            namespace: namespace.to_string(),
            usings: usings.iter().map(|u| u.to_string()).collect(),
            type_params: Vec::new(),
        }
    }

    #[test]
    fn test_marker_short_name() {
        let marker = Marker::new(OBSERVABLE);
        assert_eq!(marker.short_name(), "ObservableProperty");
        assert_eq!(Marker::new("ObservableObject").short_name(), "ObservableObject");
    }

    #[test]
    fn test_exact_qualified_name() {
        let marker = Marker::new(OBSERVABLE);
        let table = SymbolTable::new();
        let scope = scope("Demo", &[]);

        assert!(marker.matches(
            &attribute("CommunityToolkit.Mvvm.ComponentModel.ObservableProperty"),
            &scope,
            &table
        ));
        assert!(marker.matches(&attribute(&format!("global::{}", OBSERVABLE)), &scope, &table));
    }

    #[test]
    fn test_short_name_requires_imported_namespace() {
        let marker = Marker::new(OBSERVABLE);
        let table = SymbolTable::new();

        let imported = scope("Demo", &["CommunityToolkit.Mvvm.ComponentModel"]);
        assert!(marker.matches(&attribute("ObservableProperty"), &imported, &table));
        assert!(marker.matches(&attribute("ObservablePropertyAttribute"), &imported, &table));

        let missing = scope("Demo", &["System"]);
        assert!(!marker.matches(&attribute("ObservableProperty"), &missing, &table));
    }

    #[test]
    fn test_short_name_without_configured_namespace() {
        let marker = Marker::new("RelayCommand");
        let table = SymbolTable::new();
        let scope = scope("Demo", &[]);

        assert!(marker.matches(&attribute("RelayCommand"), &scope, &table));
        assert!(marker.matches(&attribute("Other.RelayCommand"), &scope, &table));
        assert!(!marker.matches(&attribute("Command"), &scope, &table));
    }

    #[test]
    fn test_declared_attribute_uses_its_namespace() {
        let mut table = SymbolTable::new();
        table.merge(
            parse_source(
                "namespace Demo.Markers; public class ObservablePropertyAttribute : Attribute { }",
                Path::new("Markers.cs"),
            )
            .unwrap(),
        );
        let usage_scope = scope("Demo", &["Demo.Markers", "CommunityToolkit.Mvvm.ComponentModel"]);

        // Resolves to Demo.Markers, not the configured namespace.
        let marker = Marker::new(OBSERVABLE);
        assert!(!marker.matches(&attribute("ObservableProperty"), &usage_scope, &table));

        let local = Marker::new("Demo.Markers.ObservableProperty");
        assert!(local.matches(&attribute("ObservableProperty"), &usage_scope, &table));
    }

    #[test]
    fn test_qualified_usage_in_wrong_namespace() {
        let marker = Marker::new(OBSERVABLE);
        let table = SymbolTable::new();
        assert!(!marker.matches(
            &attribute("Other.ObservableProperty"),
            &scope("Demo", &["CommunityToolkit.Mvvm.ComponentModel"]),
            &table
        ));
    }
}
