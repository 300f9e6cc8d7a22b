use super::schema::SchemaRenderer;
use super::schema_fields;
use crate::core::resolve::Resolver;
use crate::core::syntax::{Binding, Entry, ExprKind, Program, StatementKind};
use crate::error::{DocgenError, Result};
use crate::utils::format_schema_name;

/// A top-level `const <name> = new Schema(...)` declaration.
#[derive(Debug)]
struct SchemaDecl<'p> {
    name: &'p str,
    entries: &'p [Entry],
}

/// Schema declarations in source order. Exported declarations count too.
fn find_schemas<'p>(resolver: &Resolver<'p>, program: &'p Program) -> Result<Vec<SchemaDecl<'p>>> {
    let mut schemas = Vec::new();
    for statement in &program.body {
        let StatementKind::Declare { declarators, .. } = &statement.kind else {
            continue;
        };
        for declarator in declarators {
            let (Binding::Ident(name), Some(init)) = (&declarator.binding, &declarator.init) else {
                continue;
            };
            if let Some(entries) = schema_fields(program, resolver.config(), init, name)? {
                schemas.push(SchemaDecl {
                    name: name.as_str(),
                    entries,
                });
            }
        }
    }
    Ok(schemas)
}

/// Index declarations (`schema.index(...)`), each argument in its source form.
fn find_indexes(program: &Program) -> Vec<String> {
    program
        .body
        .iter()
        .filter_map(|statement| match &statement.kind {
            StatementKind::Expression(expr) => match &expr.kind {
                ExprKind::Call {
                    callee,
                    args,
                    constructs: false,
                } if callee.as_member().is_some_and(|(_, p)| p == "index") => Some(args),
                _ => None,
            },
            _ => None,
        })
        .map(|args| {
            let fenced = args
                .iter()
                .map(|arg| format!("`{}`", program.text(&arg.loc)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("- {}", fenced)
        })
        .collect()
}

fn section(heading: String, block: String) -> String {
    if block.is_empty() {
        heading
    } else {
        format!("{}\n{}", heading, block)
    }
}

/// Render the Markdown document for the entry module.
///
/// The last schema declared is the main one and titles the document; earlier ones
/// are listed as sub-documents, followed by the indexes.
pub fn render_document(resolver: &Resolver<'_>) -> Result<String> {
    let program = resolver.entry_program().ok_or(DocgenError::NoSchema)?;
    let schemas = find_schemas(resolver, program)?;
    let Some((main, subs)) = schemas.split_last() else {
        return Err(DocgenError::NoSchema);
    };
    resolver.diagnostics().info(format!(
        "main schema: {} ({} sub-schema(s))",
        main.name,
        subs.len()
    ));

    let renderer = SchemaRenderer::new(resolver, program);
    let mut sections = vec![section(
        format!("# {}", format_schema_name(main.name)),
        renderer.render(main.name, main.entries)?,
    )];
    for sub in subs {
        sections.push(section(
            format!(
                "**`{}`** is a sub-document with fields:",
                format_schema_name(sub.name)
            ),
            renderer.render(sub.name, sub.entries)?,
        ));
    }

    let indexes = find_indexes(program);
    if !indexes.is_empty() {
        sections.push(section("## Indexes".to_string(), indexes.join("\n")));
    }

    let mut document = sections.join("\n\n");
    document.push('\n');
    Ok(document)
}
