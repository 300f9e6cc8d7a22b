//! Comment reattachment.
//!
//! Position-based association (see [`crate::core::parsers`]) hands every comment in
//! the gap between two literal children to the *following* child. A same-line
//! comment written after child `i`:
//!
//! ```js
//! const fields = {
//!   age: Number, // years
//!   name: String,
//! };
//! ```
//!
//! therefore shows up as a leading comment of `name`. This pass moves such line comments
//! to the trailing list of the child whose start line they share.
//!
//! The pass must run once over a program before anything reads comments. Running it
//! again is a no-op: after the first pass no leading comment of child `i + 1` is on
//! child `i`'s start line.

use crate::core::syntax::{
    BodyStatement, Comment, CommentKind, Entry, Expr, ExprKind, FunctionBody, Program, StatementKind,
};

/// Reattach same-line trailing comments in every literal reachable from the program.
pub fn reattach_program(program: &mut Program) {
    for statement in &mut program.body {
        match &mut statement.kind {
            StatementKind::Declare { declarators, .. } => {
                for declarator in declarators {
                    if let Some(init) = &mut declarator.init {
                        reattach(init);
                    }
                }
            }
            StatementKind::Expression(expr) | StatementKind::ExportDefault(expr) => reattach(expr),
            StatementKind::Import { .. } | StatementKind::ExportNames(_) | StatementKind::Other => {}
        }
    }
}

/// Reattach comments of an object/array literal's children, then recurse into every
/// sub-expression so nested literals are repaired too.
pub fn reattach(expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Object(lit) | ExprKind::Array(lit) => {
            reattach_siblings(&mut lit.entries);
            for entry in &mut lit.entries {
                reattach(&mut entry.value);
            }
        }
        ExprKind::Template { exprs, .. } => exprs.iter_mut().for_each(reattach),
        ExprKind::Call { callee, args, .. } => {
            reattach(callee);
            args.iter_mut().for_each(reattach);
        }
        ExprKind::Member { object, .. } => reattach(object),
        ExprKind::Function(function) => {
            for param in &mut function.params {
                if let Some(default) = &mut param.default {
                    reattach(default);
                }
            }
            match &mut function.body {
                FunctionBody::Expr(body) => reattach(body),
                FunctionBody::Block(statements) => {
                    for statement in statements {
                        match statement {
                            BodyStatement::Declare(declarators) => declarators
                                .iter_mut()
                                .filter_map(|(_, init)| init.as_mut())
                                .for_each(reattach),
                            BodyStatement::Return(Some(arg)) => reattach(arg),
                            BodyStatement::Return(None) | BodyStatement::Other => {}
                        }
                    }
                }
            }
        }
        ExprKind::Assign { target, value } => {
            reattach(target);
            reattach(value);
        }
        ExprKind::Unary { arg, .. } => reattach(arg),
        ExprKind::Binary { left, right, .. } => {
            reattach(left);
            reattach(right);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            reattach(test);
            reattach(consequent);
            reattach(alternate);
        }
        ExprKind::Lit(_) | ExprKind::Regex { .. } | ExprKind::Ident(_) | ExprKind::Opaque(_) => {}
    }
}

/// For each adjacent pair, move leading line comments of the second child that sit on
/// the first child's start line into the first child's trailing comments. Block
/// comments stay leading.
fn reattach_siblings(entries: &mut [Entry]) {
    for i in 1..entries.len() {
        let (before, after) = entries.split_at_mut(i);
        let prev = &mut before[i - 1];
        let next = &mut after[0];
        let line = prev.loc.start_line;

        let belongs_to_prev = |c: &Comment| c.kind == CommentKind::Line && c.line == line;
        if !next.comments.leading.iter().any(belongs_to_prev) {
            continue;
        }
        let (moved, kept): (Vec<_>, Vec<_>) = next
            .comments
            .leading
            .drain(..)
            .partition(belongs_to_prev);
        next.comments.leading = kept;
        prev.comments.trailing.extend(moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::parse_source;
    use crate::core::syntax::{Comments, EntryKind, Loc};
    use pretty_assertions::assert_eq;

    fn comment(text: &str, line: usize) -> Comment {
        Comment {
            kind: CommentKind::Line,
            text: text.to_string(),
            pos: 0,
            line,
        }
    }

    fn entry(key: &str, line: usize, leading: Vec<Comment>) -> Entry {
        Entry {
            kind: EntryKind::Keyed(key.to_string()),
            value: Expr::new(ExprKind::Ident("String".into()), Loc::default()),
            loc: Loc {
                start_line: line,
                end_line: line,
                ..Loc::default()
            },
            comments: Comments {
                leading,
                trailing: Vec::new(),
            },
        }
    }

    fn texts(comments: &[Comment]) -> Vec<&str> {
        comments.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_moves_same_line_comment_to_previous() {
        let mut entries = vec![
            entry("a", 1, vec![]),
            entry("b", 2, vec![comment("about a", 1), comment("about b", 2)]),
        ];
        reattach_siblings(&mut entries);

        assert_eq!(texts(&entries[0].comments.trailing), vec!["about a"]);
        assert_eq!(texts(&entries[1].comments.leading), vec!["about b"]);
    }

    #[test]
    fn test_same_line_block_comment_stays_leading() {
        let block = Comment {
            kind: CommentKind::Block,
            ..comment("about b", 1)
        };
        let mut entries = vec![entry("a", 1, vec![]), entry("b", 1, vec![block])];
        reattach_siblings(&mut entries);

        assert!(entries[0].comments.trailing.is_empty());
        assert_eq!(texts(&entries[1].comments.leading), vec!["about b"]);
    }

    #[test]
    fn test_own_line_comment_stays_leading() {
        let mut entries = vec![
            entry("a", 1, vec![]),
            entry("b", 3, vec![comment("about b", 2)]),
        ];
        reattach_siblings(&mut entries);

        assert!(entries[0].comments.trailing.is_empty());
        assert_eq!(texts(&entries[1].comments.leading), vec!["about b"]);
    }

    #[test]
    fn test_reattach_is_idempotent() {
        let source = "const s = {\n  a: String, // first\n  // second\n  b: { c: Number, // third\n  d: Date },\n  e: [1, // one\n 2]\n};";
        let mut once = parse_source(source.to_string(), "x.js").unwrap().program;
        reattach_program(&mut once);
        let mut twice = once.clone();
        reattach_program(&mut twice);

        let comments = |program: &Program| -> Vec<Comments> {
            let StatementKind::Declare { declarators, .. } = &program.body[0].kind else {
                panic!("expected declaration");
            };
            let obj = declarators[0].init.as_ref().unwrap().as_object().unwrap();
            let mut all: Vec<Comments> = obj.entries.iter().map(|e| e.comments.clone()).collect();
            let nested = obj.entries[1].value.as_object().unwrap();
            all.extend(nested.entries.iter().map(|e| e.comments.clone()));
            let array = obj.entries[2].value.as_array().unwrap();
            all.extend(array.entries.iter().map(|e| e.comments.clone()));
            all
        };
        assert_eq!(comments(&once), comments(&twice));
    }

    #[test]
    fn test_reattach_nested_literals() {
        let source = "const s = {\n  b: {\n    c: Number, // third\n    d: Date\n  }\n};";
        let mut program = parse_source(source.to_string(), "x.js").unwrap().program;
        reattach_program(&mut program);

        let StatementKind::Declare { declarators, .. } = &program.body[0].kind else {
            panic!("expected declaration");
        };
        let outer = declarators[0].init.as_ref().unwrap().as_object().unwrap();
        let nested = outer.entries[0].value.as_object().unwrap();
        assert_eq!(texts(&nested.entries[0].comments.trailing), vec![" third"]);
        assert!(nested.entries[1].comments.leading.is_empty());
    }
}
