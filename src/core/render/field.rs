//! Field rendering.
//!
//! A field value is first unwrapped through at most two array literals. The
//! innermost node then decides the field's type:
//!
//! - a literal is its own type (`status: 'active'`)
//! - a name bound to a definition is rendered as that definition; any other name
//!   is a type or schema reference (`owner: UserSchema` reads as `User`)
//! - a member expression documents its trailing name (`Schema.Types.ObjectId`)
//! - an object literal is either a definition with a type marker and options, an
//!   inline sub-document, or a plain `Object` carrying options only
//! - anything else is resolved to a value and classified the same way
//!
//! Each field becomes one Markdown bullet, followed by its description and the
//! bullets of its nested fields.

use std::cell::RefCell;

use indexmap::IndexMap;

use super::description::{attach, from_comments};
use super::options::{fence, render_option};
use super::schema_fields;
use crate::config::Config;
use crate::core::resolve::{Resolver, Value, format_number};
use crate::core::syntax::{
    CollectionLit, Comment, CommentKind, Entry, EntryKind, Expr, ExprKind, Literal, Program,
};
use crate::error::Result;
use crate::utils::format_schema_name;

/// Array nesting deeper than this is not detected.
const MAX_ARRAY_DEPTH: usize = 2;

const OBJECT: &str = "Object";
/// Type of an empty array literal.
const MIXED: &str = "Mixed";
/// Type of arrays nested deeper than [`MAX_ARRAY_DEPTH`].
const ARRAY: &str = "Array";

/// Entry of a field definition object: a syntax node, or a value merged in from a
/// spread.
#[derive(Debug, Clone)]
enum Slot<'p> {
    Node(&'p Expr),
    Value(Value<'p>),
}

#[derive(Debug)]
enum Children<'p> {
    None,
    /// Fields written as an object literal. Comments on `claimed_line` (the opening
    /// brace line) describe the parent field, not the first child.
    Entries {
        entries: &'p [Entry],
        claimed_line: Option<usize>,
    },
    /// Fields computed by the resolver.
    Values(IndexMap<String, Value<'p>>),
}

/// What a field value turned out to be.
#[derive(Debug)]
struct Shape<'p> {
    arrays: usize,
    type_name: String,
    options: IndexMap<String, Slot<'p>>,
    children: Children<'p>,
    /// Innermost object literal of the value, if any.
    object: Option<&'p Expr>,
}

impl<'p> Shape<'p> {
    fn scalar(arrays: usize, type_name: impl Into<String>) -> Self {
        Self {
            arrays,
            type_name: type_name.into(),
            options: IndexMap::new(),
            children: Children::None,
            object: None,
        }
    }

    fn inline(arrays: usize, children: Children<'p>) -> Self {
        Self {
            children,
            ..Self::scalar(arrays, OBJECT)
        }
    }

    fn with_options(mut self, options: IndexMap<String, Slot<'p>>) -> Self {
        self.options = options;
        self
    }

    fn with_object(mut self, object: &'p Expr) -> Self {
        self.object = Some(object);
        self
    }
}

/// Unwrap up to [`MAX_ARRAY_DEPTH`] array literals. The node is `None` for an
/// empty array.
fn unwrap_arrays(value: &Expr) -> (usize, Option<&Expr>) {
    let mut arrays = 0;
    let mut node = value;
    while arrays < MAX_ARRAY_DEPTH
        && let Some(lit) = node.as_array()
    {
        arrays += 1;
        match lit.entries.first() {
            Some(first) => node = &first.value,
            None => return (arrays, None),
        }
    }
    (arrays, Some(node))
}

fn literal_text(lit: &Literal) -> String {
    match lit {
        Literal::Str(s) => s.clone(),
        Literal::Num(n) => format_number(*n),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
        Literal::BigInt(digits) => digits.clone(),
    }
}

fn value_shape_name(value: &Value<'_>) -> &'static str {
    match value {
        Value::Function(_) | Value::Native(_) => "function value",
        Value::Pattern { .. } => "regular expression value",
        Value::Unknown => "unresolved value",
        _ => "value",
    }
}

fn article(shape: &str) -> String {
    match shape.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {}", shape),
        _ => format!("a {}", shape),
    }
}

pub struct FieldRenderer<'r, 'p> {
    resolver: &'r Resolver<'p>,
    program: &'p Program,
    config: &'p Config,
    /// Names whose object literal is currently being spliced into a body.
    splicing: RefCell<Vec<&'p str>>,
}

impl<'r, 'p> FieldRenderer<'r, 'p> {
    pub fn new(resolver: &'r Resolver<'p>, program: &'p Program) -> Self {
        Self {
            resolver,
            program,
            config: resolver.config(),
            splicing: RefCell::new(Vec::new()),
        }
    }

    /// Render the entries of a schema definition or an inline sub-document, one
    /// bullet (with its nested bullets) per field.
    pub fn render_entries(
        &self,
        entries: &'p [Entry],
        depth: usize,
        claimed_line: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut rendered = Vec::with_capacity(entries.len());
        for entry in entries {
            match &entry.kind {
                EntryKind::Keyed(key) => {
                    rendered.push(self.render_field(key, entry, depth, claimed_line)?)
                }
                EntryKind::Spread => rendered.extend(self.render_spread(&entry.value, depth)?),
                EntryKind::Element => {}
            }
        }
        Ok(rendered)
    }

    /// `...common` splices the fields of the object literal `common` is bound to,
    /// comments included. Other spreads are resolved and their entries rendered.
    fn render_spread(&self, expr: &'p Expr, depth: usize) -> Result<Vec<String>> {
        if let Some(name) = expr.as_ident()
            && let Some(lit) = self.program.declared_init(name).and_then(Expr::as_object)
            && !self.is_splicing(name)
        {
            self.splicing.borrow_mut().push(name);
            let rendered = self.render_entries(&lit.entries, depth, None);
            self.splicing.borrow_mut().pop();
            return rendered;
        }

        match self.resolver.resolve(expr)? {
            Value::Map(map) => map
                .into_iter()
                .map(|(key, value)| self.render_value_field(&key, value, depth))
                .collect(),
            other => {
                self.resolver.diagnostics().warn(format!(
                    "line {}: fields spread from {} are skipped",
                    expr.loc.start_line,
                    article(value_shape_name(&other))
                ));
                Ok(Vec::new())
            }
        }
    }

    fn is_splicing(&self, name: &str) -> bool {
        self.splicing.borrow().iter().any(|n| *n == name)
    }

    fn render_field(
        &self,
        key: &str,
        entry: &'p Entry,
        depth: usize,
        claimed_line: Option<usize>,
    ) -> Result<String> {
        let shape = self.classify(key, &entry.value)?;

        let mut comments: Vec<&Comment> = entry
            .comments
            .leading
            .iter()
            .filter(|c| Some(c.line) != claimed_line)
            .collect();
        if let Some(object) = shape.object
            && let Some(first) = object.as_object().and_then(|lit| lit.entries.first())
        {
            comments.extend(
                first
                    .comments
                    .leading
                    .iter()
                    .filter(|c| c.kind == CommentKind::Line && c.line == object.loc.start_line),
            );
        }
        comments.extend(
            entry
                .comments
                .trailing
                .iter()
                .filter(|c| c.kind == CommentKind::Line),
        );

        let description = from_comments(comments, depth);
        self.emit(key, shape, depth, &description)
    }

    /// Render a field known only by its resolved value.
    fn render_value_field(&self, key: &str, value: Value<'p>, depth: usize) -> Result<String> {
        let shape = self.classify_value(key, 0, value)?;
        self.emit(key, shape, depth, "")
    }

    fn emit(&self, key: &str, shape: Shape<'p>, depth: usize, description: &str) -> Result<String> {
        let options = self.render_options(&shape.options)?;
        let mut bullet = format!(
            "{}- **{}** `{}{}{}`",
            "  ".repeat(depth),
            key,
            "[".repeat(shape.arrays),
            shape.type_name,
            "]".repeat(shape.arrays)
        );
        if !options.is_empty() {
            bullet.push(' ');
            bullet.push_str(&fence(&options));
        }

        let children = match shape.children {
            Children::None => Vec::new(),
            Children::Entries {
                entries,
                claimed_line,
            } => self.render_entries(entries, depth + 1, claimed_line)?,
            Children::Values(values) => values
                .into_iter()
                .map(|(key, value)| self.render_value_field(&key, value, depth + 1))
                .collect::<Result<Vec<_>>>()?,
        };

        let mut rendered = attach(bullet, description);
        for child in children {
            rendered.push('\n');
            rendered.push_str(&child);
        }
        Ok(rendered)
    }

    /// Recognized options in configured order.
    fn render_options(&self, options: &IndexMap<String, Slot<'p>>) -> Result<Vec<String>> {
        let mut rendered = Vec::new();
        for name in &self.config.options {
            let Some(slot) = options.get(name) else {
                continue;
            };
            let value = match slot {
                Slot::Node(expr) => self.resolver.resolve(expr)?,
                Slot::Value(value) => value.clone(),
            };
            rendered.extend(render_option(name, &value));
        }
        Ok(rendered)
    }

    fn classify(&self, key: &str, value: &'p Expr) -> Result<Shape<'p>> {
        match unwrap_arrays(value) {
            (arrays, None) => Ok(Shape::scalar(arrays, MIXED)),
            (arrays, Some(node)) => self.classify_node(key, arrays, node),
        }
    }

    fn classify_node(&self, key: &str, arrays: usize, node: &'p Expr) -> Result<Shape<'p>> {
        match &node.kind {
            ExprKind::Lit(lit) => Ok(Shape::scalar(arrays, literal_text(lit))),
            ExprKind::Ident(name) => match self.resolver.resolve(node)? {
                value @ (Value::Map(_) | Value::List(_)) => self.classify_value(key, arrays, value),
                Value::TypeLabel(label) => Ok(Shape::scalar(arrays, label)),
                _ => Ok(Shape::scalar(arrays, format_schema_name(name))),
            },
            ExprKind::Member { property, .. } => Ok(Shape::scalar(arrays, property.clone())),
            ExprKind::Array(_) => Ok(Shape::scalar(arrays, ARRAY)),
            ExprKind::Object(lit) => self.classify_object(key, arrays, node, lit),
            _ => {
                if let Some(entries) = schema_fields(self.program, self.config, node, key)? {
                    return Ok(Shape::inline(
                        arrays,
                        Children::Entries {
                            entries,
                            claimed_line: None,
                        },
                    ));
                }
                let value = self.resolver.resolve(node)?;
                self.classify_value(key, arrays, value)
            }
        }
    }

    fn classify_object(
        &self,
        key: &str,
        arrays: usize,
        node: &'p Expr,
        lit: &'p CollectionLit,
    ) -> Result<Shape<'p>> {
        let mut slots: IndexMap<String, Slot<'p>> = IndexMap::new();
        for entry in &lit.entries {
            match &entry.kind {
                EntryKind::Keyed(name) => {
                    slots.insert(name.clone(), Slot::Node(&entry.value));
                }
                EntryKind::Spread => match self.resolver.resolve(&entry.value)? {
                    Value::Map(map) => {
                        slots.extend(map.into_iter().map(|(k, v)| (k, Slot::Value(v))))
                    }
                    Value::Unknown => self.resolver.diagnostics().warn(format!(
                        "line {}: options spread from an unresolved value in field '{}' are skipped",
                        entry.loc.start_line, key
                    )),
                    _ => {}
                },
                EntryKind::Element => {}
            }
        }

        let marker = slots.shift_remove(&self.config.type_marker);
        let only_options = slots.keys().all(|name| self.config.is_option(name));
        let own_entries = Children::Entries {
            entries: &lit.entries,
            claimed_line: Some(node.loc.start_line),
        };

        let shape = match marker {
            None if only_options => Shape::scalar(arrays, OBJECT).with_options(slots),
            None => Shape::inline(arrays, own_entries),
            Some(Slot::Node(marker)) => match &marker.kind {
                ExprKind::Object(inner) if only_options => Shape::inline(
                    arrays,
                    Children::Entries {
                        entries: &inner.entries,
                        claimed_line: None,
                    },
                )
                .with_options(slots),
                ExprKind::Object(_) => Shape::inline(arrays, own_entries),
                ExprKind::Array(_) => {
                    let (extra, element) = unwrap_arrays(marker);
                    let arrays = arrays + extra;
                    match element {
                        None => Shape::scalar(arrays, MIXED),
                        Some(element) => match element.as_object() {
                            Some(inner) => Shape::inline(
                                arrays,
                                Children::Entries {
                                    entries: &inner.entries,
                                    claimed_line: None,
                                },
                            ),
                            None => Shape::scalar(arrays, self.marker_label(key, element)?),
                        },
                    }
                    .with_options(slots)
                }
                _ => match schema_fields(self.program, self.config, marker, key)? {
                    Some(entries) => Shape::inline(
                        arrays,
                        Children::Entries {
                            entries,
                            claimed_line: None,
                        },
                    ),
                    None => Shape::scalar(arrays, self.marker_label(key, marker)?),
                }
                .with_options(slots),
            },
            Some(Slot::Value(marker)) => self.classify_value(key, arrays, marker)?.with_options(slots),
        };
        Ok(shape.with_object(node))
    }

    /// Type name written as a type marker.
    fn marker_label(&self, key: &str, marker: &'p Expr) -> Result<String> {
        match &marker.kind {
            ExprKind::Ident(name) => match self.resolver.resolve(marker)? {
                Value::TypeLabel(label) => Ok(label),
                _ => Ok(format_schema_name(name)),
            },
            ExprKind::Member { property, .. } => Ok(property.clone()),
            ExprKind::Lit(Literal::Str(s)) => Ok(s.clone()),
            _ => {
                let value = self.resolver.resolve(marker)?;
                Ok(match value.as_label() {
                    Some(label) => label.to_string(),
                    None => self.unknown_type(key, value_shape_name(&value)),
                })
            }
        }
    }

    /// Classify a resolved value the way its literal would have been.
    fn classify_value(&self, key: &str, arrays: usize, value: Value<'p>) -> Result<Shape<'p>> {
        match value {
            Value::List(items) if arrays < MAX_ARRAY_DEPTH => match items.into_iter().next() {
                Some(first) => self.classify_value(key, arrays + 1, first),
                None => Ok(Shape::scalar(arrays + 1, MIXED)),
            },
            Value::List(_) => Ok(Shape::scalar(arrays, ARRAY)),
            Value::Map(mut map) => {
                let marker = map.shift_remove(&self.config.type_marker);
                let only_options = map.keys().all(|name| self.config.is_option(name));
                if marker.is_none() && !only_options {
                    return Ok(Shape::inline(arrays, Children::Values(map)));
                }
                let options = map.into_iter().map(|(k, v)| (k, Slot::Value(v))).collect();
                let shape = match marker {
                    Some(marker) => self.classify_value(key, arrays, marker)?,
                    None => Shape::scalar(arrays, OBJECT),
                };
                Ok(shape.with_options(options))
            }
            Value::Num(n) => Ok(Shape::scalar(arrays, format_number(n))),
            Value::Bool(b) => Ok(Shape::scalar(arrays, b.to_string())),
            Value::Null => Ok(Shape::scalar(arrays, "null")),
            Value::BigInt(digits) => Ok(Shape::scalar(arrays, digits)),
            Value::TypeLabel(label) | Value::Str(label) => Ok(Shape::scalar(arrays, label)),
            other => Ok(Shape::scalar(
                arrays,
                self.unknown_type(key, value_shape_name(&other)),
            )),
        }
    }

    /// Type name for a field whose type resolves to nothing representable.
    fn unknown_type(&self, key: &str, shape: &str) -> String {
        self.resolver.diagnostics().warn(format!(
            "field '{}': type is {}; documented as {}",
            key,
            article(shape),
            OBJECT
        ));
        OBJECT.to_string()
    }
}
