//! Common utility functions shared across the codebase.

/// Uppercase the first character of `s`.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a schema variable name as a model label.
///
/// A trailing `Schema` suffix is stripped (unless it is the whole name) and the
/// first character is capitalized.
///
/// # Examples
///
/// ```
/// use mongoose_docgen::utils::format_schema_name;
///
/// assert_eq!(format_schema_name("UserSchema"), "User");
/// assert_eq!(format_schema_name("addressSchema"), "Address");
/// assert_eq!(format_schema_name("Schema"), "Schema");
/// assert_eq!(format_schema_name("Point"), "Point");
/// ```
pub fn format_schema_name(name: &str) -> String {
    let stripped = match name.strip_suffix("Schema") {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    };
    upper_first(stripped)
}

/// Whether `name` can be written as a bare JavaScript property key.
pub fn is_plain_key(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
