//! Markdown rendering of the schemas declared in the entry module.

mod description;
mod document;
mod field;
mod options;
mod schema;

pub use document::render_document;

use crate::config::Config;
use crate::core::syntax::{Entry, Expr, ExprKind, Program};
use crate::error::{DocgenError, Result};

/// Field entries of a schema constructor call such as `new Schema({ ... })` or
/// `new mongoose.Schema(definition)`.
///
/// Returns `None` when `expr` is not a schema constructor call. A call without
/// arguments declares no fields. The definition must be an object literal or a
/// name bound to one at the top level of `program`.
pub(crate) fn schema_fields<'p>(
    program: &'p Program,
    config: &Config,
    expr: &'p Expr,
    context: &str,
) -> Result<Option<&'p [Entry]>> {
    let ExprKind::Call { callee, args, .. } = &expr.kind else {
        return Ok(None);
    };
    let is_schema = match &callee.kind {
        ExprKind::Ident(name) => config.is_schema_constructor(name),
        ExprKind::Member { object, property } => {
            config.is_schema_constructor(property)
                && object
                    .as_ident()
                    .is_some_and(|namespace| config.is_schema_namespace(namespace))
        }
        _ => false,
    };
    if !is_schema {
        return Ok(None);
    }

    let Some(definition) = args.first() else {
        return Ok(Some(&[]));
    };
    let lit = match &definition.kind {
        ExprKind::Object(lit) => Some(lit),
        ExprKind::Ident(name) => program.declared_init(name).and_then(Expr::as_object),
        _ => None,
    };
    match lit {
        Some(lit) => Ok(Some(&lit.entries)),
        None => Err(DocgenError::UnsupportedShape {
            shape: definition.shape_name(),
            context: format!("schema definition of '{}'", context),
        }),
    }
}
