//! Field option formatting.
//!
//! `true` flags render as the bare option name, `enum` as a `'a|b|c'` alternation
//! and `validate` not at all. Every other option renders as `name: <value>` with the
//! value in its printed literal form. Each option is fenced on its own.

use crate::core::resolve::Value;

const ENUM: &str = "enum";
const VALIDATE: &str = "validate";

/// Render one option, `None` when it is not shown.
pub fn render_option(name: &str, value: &Value<'_>) -> Option<String> {
    if value.is_unknown() || name == VALIDATE {
        return None;
    }
    if matches!(value, Value::Bool(true)) || matches!(value, Value::Str(s) if s == "true") {
        return Some(name.to_string());
    }
    if name == ENUM
        && let Some(alternation) = enum_alternation(value)
    {
        return Some(alternation);
    }
    Some(format!("{}: {}", name, value))
}

/// `['a', 'b']` or `{ values: ['a', 'b'], message: ... }` as `'a|b'`.
fn enum_alternation(value: &Value<'_>) -> Option<String> {
    let items = match value {
        Value::List(items) => items,
        Value::Map(map) => match map.get("values") {
            Some(Value::List(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    let choices = items
        .iter()
        .map(|item| item.to_js_string().unwrap_or_else(|| item.to_string()))
        .collect::<Vec<_>>();
    Some(format!("'{}'", choices.join("|")))
}

/// Fence each option in double backticks and join them with spaces.
pub fn fence(options: &[String]) -> String {
    options
        .iter()
        .map(|option| format!("``{}``", option))
        .collect::<Vec<_>>()
        .join(" ")
}
