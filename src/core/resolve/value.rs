use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::modules::ModuleId;
use crate::core::syntax::FunctionLit;
use crate::utils::is_plain_key;

/// Result of statically evaluating an expression.
///
/// `'p` is the lifetime of the parsed programs; functions keep a reference to their
/// literal instead of copying it.
#[derive(Debug, Clone)]
pub enum Value<'p> {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    BigInt(String),
    /// A global type such as `String` or `Date`. Prints as its bare name.
    TypeLabel(String),
    Map(IndexMap<String, Value<'p>>),
    List(Vec<Value<'p>>),
    Pattern { source: String, flags: String },
    Function(Rc<Closure<'p>>),
    /// A function reached through a global type, e.g. `Date.now`.
    Native(String),
    /// Could not be determined statically. Also stands in for `undefined`.
    Unknown,
}

/// A function value together with the scope it was created in.
#[derive(Debug)]
pub struct Closure<'p> {
    pub function: &'p FunctionLit,
    /// Module whose top-level names the body sees.
    pub module: ModuleId,
    pub scope: Scope<'p>,
}

/// Chain of local binding frames created while evaluating helper functions.
#[derive(Debug, Clone, Default)]
pub struct Scope<'p>(Option<Rc<Frame<'p>>>);

#[derive(Debug)]
struct Frame<'p> {
    bindings: RefCell<HashMap<String, Value<'p>>>,
    parent: Scope<'p>,
}

impl<'p> Scope<'p> {
    /// New innermost frame on top of this one.
    pub fn child(&self, bindings: HashMap<String, Value<'p>>) -> Self {
        Self(Some(Rc::new(Frame {
            bindings: RefCell::new(bindings),
            parent: self.clone(),
        })))
    }

    /// Add or overwrite a binding in the innermost frame.
    pub fn bind(&self, name: &str, value: Value<'p>) {
        if let Some(frame) = &self.0 {
            frame.bindings.borrow_mut().insert(name.to_string(), value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value<'p>> {
        let mut current = &self.0;
        while let Some(frame) = current {
            if let Some(value) = frame.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            current = &frame.parent.0;
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl<'p> Value<'p> {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// JavaScript truthiness, `None` when unknown.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Null => Some(false),
            Value::Bool(b) => Some(*b),
            Value::Num(n) => Some(*n != 0.0 && !n.is_nan()),
            Value::Str(s) => Some(!s.is_empty()),
            Value::BigInt(digits) => Some(digits.trim_start_matches('-') != "0"),
            Value::TypeLabel(_)
            | Value::Map(_)
            | Value::List(_)
            | Value::Pattern { .. }
            | Value::Function(_)
            | Value::Native(_) => Some(true),
            Value::Unknown => None,
        }
    }

    /// Result of `typeof`.
    pub fn type_of(&self) -> Option<&'static str> {
        Some(match self {
            Value::Null | Value::Map(_) | Value::List(_) | Value::Pattern { .. } => "object",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::TypeLabel(_) | Value::Function(_) | Value::Native(_) => "function",
            Value::Unknown => return None,
        })
    }

    /// String conversion used by `+` and template literals. `None` when the result
    /// would depend on something unknown or on function source text.
    pub fn to_js_string(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Num(n) => Some(format_number(*n)),
            Value::Str(s) => Some(s.clone()),
            Value::BigInt(digits) => Some(digits.clone()),
            Value::Pattern { source, flags } => Some(format!("/{}/{}", source, flags)),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => Some(String::new()),
                    other => other.to_js_string(),
                })
                .collect::<Option<Vec<_>>>()
                .map(|parts| parts.join(",")),
            Value::Map(_) => Some("[object Object]".to_string()),
            Value::TypeLabel(_) | Value::Function(_) | Value::Native(_) | Value::Unknown => None,
        }
    }

    /// A name usable as a field type: type labels and strings.
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Value::TypeLabel(label) | Value::Str(label) | Value::Native(label) => Some(label),
            _ => None,
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Unknown, Value::Num),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Format a number the way JavaScript prints it: integral values without a
/// fractional part, `-0`, `NaN` and `Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_string()
    } else if n != 0.0 && !(1e-6..1e21).contains(&n.abs()) {
        // Exponent form with an explicit sign: `1e+21`, `1.5e-7`.
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}

/// Quote a string with single quotes, switching to double quotes or backticks when
/// the text contains single quotes.
fn quote(s: &str) -> String {
    let quote = if !s.contains('\'') {
        '\''
    } else if !s.contains('"') {
        '"'
    } else if !s.contains('`') {
        '`'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if is_plain_key(key) {
        f.write_str(key)
    } else {
        f.write_str(&quote(key))
    }
}

/// Printed literal form, following Node's `util.inspect` conventions.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Num(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(&quote(s)),
            Value::BigInt(digits) => write!(f, "{}n", digits),
            Value::TypeLabel(label) => f.write_str(label),
            Value::Pattern { source, flags } => write!(f, "/{}/{}", source, flags),
            Value::Function(closure) => match &closure.function.name {
                Some(name) => write!(f, "[Function: {}]", name),
                None => f.write_str("[Function (anonymous)]"),
            },
            Value::Native(name) => write!(f, "[Function: {}]", name),
            Value::Unknown => f.write_str("undefined"),
            Value::List(items) if items.is_empty() => f.write_str("[]"),
            Value::List(items) => {
                f.write_str("[ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(" ]")
            }
            Value::Map(map) if map.is_empty() => f.write_str("{}"),
            Value::Map(map) => {
                f.write_str("{ ")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_key(f, key)?;
                    write!(f, ": {}", value)?;
                }
                f.write_str(" }")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Value<'static>)]) -> Value<'static> {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(18.0), "18");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-0.0), "-0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e21), "-1.5e+21");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-8), "2.5e-8");
    }

    #[test]
    fn test_display_primitives() {
        assert_eq!(Value::Str("guest".into()).to_string(), "'guest'");
        assert_eq!(Value::Str("it's".into()).to_string(), "\"it's\"");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::BigInt("10".into()).to_string(), "10n");
        assert_eq!(Value::TypeLabel("Date".into()).to_string(), "Date");
        assert_eq!(Value::Unknown.to_string(), "undefined");
        assert_eq!(
            Value::Pattern {
                source: "^a+$".into(),
                flags: "i".into()
            }
            .to_string(),
            "/^a+$/i"
        );
    }

    #[test]
    fn test_display_collections() {
        assert_eq!(Value::List(vec![]).to_string(), "[]");
        assert_eq!(map(&[]).to_string(), "{}");
        assert_eq!(
            Value::List(vec![Value::Num(1.0), Value::Str("a".into())]).to_string(),
            "[ 1, 'a' ]"
        );
        assert_eq!(
            map(&[("a", Value::Num(1.0)), ("b-c", Value::Bool(true))]).to_string(),
            "{ a: 1, 'b-c': true }"
        );
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(Value::Str(String::new()).truthy(), Some(false));
        assert_eq!(Value::Num(f64::NAN).truthy(), Some(false));
        assert_eq!(map(&[]).truthy(), Some(true));
        assert_eq!(Value::Unknown.truthy(), None);
    }

    #[test]
    fn test_scope_shadowing() {
        let outer = Scope::default().child(HashMap::from([("a".to_string(), Value::Num(1.0))]));
        let inner = outer.child(HashMap::from([("a".to_string(), Value::Num(2.0))]));
        assert!(matches!(inner.lookup("a"), Some(Value::Num(n)) if n == 2.0));
        assert!(matches!(outer.lookup("a"), Some(Value::Num(n)) if n == 1.0));
        assert!(inner.lookup("b").is_none());
    }
}
