//! One schema's block: its fields followed by its virtuals, methods and statics.

use super::description::{attach, clean};
use super::field::FieldRenderer;
use crate::core::resolve::Resolver;
use crate::core::syntax::{Entry, EntryKind, Expr, ExprKind, Program, StatementKind};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Method,
    Static,
}

impl Operation {
    /// Object the operation is assigned into (`schema.methods.x = ...`).
    fn collection(self) -> &'static str {
        match self {
            Operation::Method => "methods",
            Operation::Static => "statics",
        }
    }

    /// Registration call (`schema.method('x', ...)`), also the rendered tag.
    fn tag(self) -> &'static str {
        match self {
            Operation::Method => "method",
            Operation::Static => "static",
        }
    }
}

/// Name of a `schema.virtual('name')` chain that defines a getter.
fn virtual_name<'p>(expr: &'p Expr, schema: &str) -> Option<&'p str> {
    let mut has_getter = false;
    let mut node = expr;
    loop {
        let ExprKind::Call { callee, args, .. } = &node.kind else {
            return None;
        };
        let (object, property) = callee.as_member()?;
        if property == "virtual" && object.as_ident() == Some(schema) {
            return if has_getter {
                args.first()?.as_str_lit()
            } else {
                None
            };
        }
        has_getter |= property == "get";
        node = object;
    }
}

/// Operations of kind `operation` declared on `schema` by one statement.
fn operation_names<'p>(expr: &'p Expr, schema: &str, operation: Operation) -> Vec<&'p str> {
    match &expr.kind {
        ExprKind::Assign { target, .. } => target
            .as_member()
            .and_then(|(object, name)| {
                let (owner, collection) = object.as_member()?;
                (collection == operation.collection() && owner.as_ident() == Some(schema))
                    .then_some(name)
            })
            .into_iter()
            .collect(),
        ExprKind::Call { callee, args, .. } => {
            let Some((owner, property)) = callee.as_member() else {
                return Vec::new();
            };
            if property != operation.tag() || owner.as_ident() != Some(schema) {
                return Vec::new();
            }
            let Some(first) = args.first() else {
                return Vec::new();
            };
            match (first.as_str_lit(), first.as_object()) {
                (Some(name), _) => vec![name],
                (None, Some(lit)) => lit
                    .entries
                    .iter()
                    .filter_map(|entry| match &entry.kind {
                        EntryKind::Keyed(key) => Some(key.as_str()),
                        _ => None,
                    })
                    .collect(),
                (None, None) => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn member_bullet(name: &str, tag: &str, description: &str) -> String {
    attach(format!("- **{}** `{}`", name, tag), description)
}

pub struct SchemaRenderer<'r, 'p> {
    fields: FieldRenderer<'r, 'p>,
    program: &'p Program,
}

impl<'r, 'p> SchemaRenderer<'r, 'p> {
    pub fn new(resolver: &'r Resolver<'p>, program: &'p Program) -> Self {
        Self {
            fields: FieldRenderer::new(resolver, program),
            program,
        }
    }

    /// Render the block of the schema bound to `name`.
    pub fn render(&self, name: &str, entries: &'p [Entry]) -> Result<String> {
        let mut lines = self.fields.render_entries(entries, 0, None)?;
        lines.extend(self.members(name));
        Ok(lines.join("\n"))
    }

    /// Virtuals, then methods, then statics, each in source order.
    fn members(&self, schema: &str) -> Vec<String> {
        let mut virtuals = Vec::new();
        let mut methods = Vec::new();
        let mut statics = Vec::new();

        for statement in &self.program.body {
            let StatementKind::Expression(expr) = &statement.kind else {
                continue;
            };
            let description = statement
                .comments
                .leading
                .last()
                .map(|comment| clean(&comment.text))
                .unwrap_or_default();

            if let Some(name) = virtual_name(expr, schema) {
                virtuals.push(member_bullet(name, "virtual", &description));
            }
            for (operation, out) in [
                (Operation::Method, &mut methods),
                (Operation::Static, &mut statics),
            ] {
                out.extend(
                    operation_names(expr, schema, operation)
                        .into_iter()
                        .map(|name| member_bullet(name, operation.tag(), &description)),
                );
            }
        }

        virtuals.extend(methods);
        virtuals.extend(statics);
        virtuals
    }
}
