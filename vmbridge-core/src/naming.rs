//! Shared naming helpers.
//!
//! All backends derive identifiers through these functions so that a property
//! is spelled identically in the schema, the server and both clients.

/// Split an identifier into words on separators and case boundaries.
///
/// `HTTPServer` -> `["HTTP", "Server"]`, `user_id` -> `["user", "id"]`.
fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

/// Convert a string to PascalCase (e.g., "user_name" -> "UserName").
pub fn to_pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert a string to camelCase (e.g., "UserName" -> "userName").
pub fn to_camel_case(s: &str) -> String {
    words(s)
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if i == 0 {
                w.to_lowercase()
            } else {
                capitalize(w)
            }
        })
        .collect()
}

/// Convert a string to snake_case (e.g., "UserName" -> "user_name").
pub fn to_snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Strip a trailing `Async` marker from a method name (`SaveAsync` -> `Save`).
///
/// A name that is exactly `Async` is returned unchanged.
pub fn strip_async_suffix(name: &str) -> &str {
    match name.strip_suffix("Async") {
        Some(base) if !base.is_empty() => base,
        _ => name,
    }
}

/// Derive the generated property name from a backing field name.
///
/// `_userName` -> `UserName`, `m_count` -> `Count`, `title` -> `Title`.
pub fn field_to_property_name(field: &str) -> String {
    let trimmed = field
        .strip_prefix("m_")
        .unwrap_or(field)
        .trim_start_matches('_');
    let trimmed = if trimmed.is_empty() { field } else { trimmed };

    let mut chars = trimmed.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}
