use std::path::Path;
use std::sync::Arc;

use swc_common::{
    BytePos, FileName, Globals, SourceMap, Spanned,
    comments::{Comment as SwcComment, SingleThreadedComments},
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::VisitWith;

use super::lower::Lowerer;
use super::requires::RequireCollector;
use crate::core::syntax::Program;
use crate::error::DocgenError;

/// Result of parsing one source file.
#[derive(Debug)]
pub struct ParsedSource {
    pub program: Program,
    /// Every module specifier referenced through `require(...)` or `import`.
    pub requires: Vec<String>,
}

/// Pick the swc syntax from the file extension.
///
/// TypeScript files get TS syntax; everything else (including stdin) is parsed as
/// JavaScript with JSX enabled.
fn syntax_for(file_path: &str) -> Syntax {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax::default()),
        "tsx" => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

/// Flatten swc's leading/trailing comment maps into one list ordered by position.
///
/// swc's own attachment is discarded; comments are re-associated with nodes by
/// position during lowering.
fn extract_comments(comments: &SingleThreadedComments) -> Vec<SwcComment> {
    let (leading, trailing) = comments.borrow_all();
    let mut all: Vec<SwcComment> = leading
        .values()
        .chain(trailing.values())
        .flat_map(|cmts| cmts.iter().cloned())
        .collect();
    all.sort_by_key(|cmt| cmt.span.lo);
    all.dedup_by_key(|cmt| cmt.span.lo);
    all
}

/// Parse JavaScript/TypeScript source into the engine's syntax model.
///
/// Accepts both scripts (CommonJS) and ES modules.
pub fn parse_source(code: String, file_path: &str) -> Result<ParsedSource, DocgenError> {
    use swc_common::GLOBALS;

    let source_map: Arc<SourceMap> = Default::default();

    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.clone());

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(
            syntax_for(file_path),
            StringInput::from(&*source_file),
            Some(&comments),
        );

        let program = parser.parse_program().map_err(|e| DocgenError::Parse {
            path: file_path.to_string(),
            line: source_map.lookup_char_pos(e.span().lo).line,
            message: format!("{:?}", e.kind()),
        })?;

        let mut collector = RequireCollector::default();
        program.visit_with(&mut collector);

        let lowerer = Lowerer::new(
            &source_map,
            source_file.start_pos,
            extract_comments(&comments),
        );

        Ok(ParsedSource {
            program: lowerer.lower_program(&program, code),
            requires: collector.specifiers,
        })
    })
}

/// Byte offset of `pos` relative to the file starting at `start`.
pub(super) fn offset(pos: BytePos, start: BytePos) -> usize {
    pos.0.saturating_sub(start.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::syntax::{CommentKind, StatementKind};

    #[test]
    fn test_parse_script_with_require() {
        let parsed = parse_source(
            "const { Schema } = require('mongoose');\nconst h = require('./helpers');".to_string(),
            "model.js",
        )
        .unwrap();
        assert_eq!(parsed.program.body.len(), 2);
        assert_eq!(parsed.requires, vec!["mongoose", "./helpers"]);
    }

    #[test]
    fn test_parse_es_module_imports() {
        let parsed = parse_source(
            "import { Schema } from 'mongoose';\nimport opts from './opts.js';\nexport const A = 1;"
                .to_string(),
            "model.mjs",
        )
        .unwrap();
        assert_eq!(parsed.requires, vec!["mongoose", "./opts.js"]);
        assert!(matches!(
            parsed.program.body[2].kind,
            StatementKind::Declare { exported: true, .. }
        ));
    }

    #[test]
    fn test_parse_typescript() {
        let parsed = parse_source(
            "const opts = { min: 0 } as const;\nconst n: number = 1;".to_string(),
            "model.ts",
        )
        .unwrap();
        assert_eq!(parsed.program.body.len(), 2);
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = parse_source("const = ;".to_string(), "broken.js").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken.js"), "{message}");
    }

    #[test]
    fn test_statement_leading_comments() {
        let parsed = parse_source(
            "const a = 1;\n// about b\n/** more */\nconst b = 2;".to_string(),
            "x.js",
        )
        .unwrap();
        let leading = &parsed.program.body[1].comments.leading;
        assert_eq!(leading.len(), 2);
        assert_eq!(leading[0].text, " about b");
        assert_eq!(leading[0].kind, CommentKind::Line);
        assert_eq!(leading[0].line, 2);
        assert_eq!(leading[1].kind, CommentKind::Block);
        assert!(parsed.program.body[0].comments.leading.is_empty());
    }
}
