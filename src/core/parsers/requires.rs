//! Collects module specifiers referenced by a file.
//!
//! Runs over the swc AST right after parsing so the module index can load every
//! reachable file before any value is resolved.

use swc_ecma_ast::{CallExpr, Callee, Expr, ImportDecl, Lit};
use swc_ecma_visit::{Visit, VisitWith};

/// Gathers `require('<specifier>')` and `import ... from '<specifier>'` targets,
/// in source order.
#[derive(Debug, Default)]
pub struct RequireCollector {
    pub specifiers: Vec<String>,
}

impl RequireCollector {
    fn push(&mut self, specifier: &str) {
        if !self.specifiers.iter().any(|s| s == specifier) {
            self.specifiers.push(specifier.to_string());
        }
    }
}

impl Visit for RequireCollector {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee
            && let Expr::Ident(ident) = &**callee
            && ident.sym.as_str() == "require"
            && let Some(arg) = node.args.first()
            && let Expr::Lit(Lit::Str(s)) = &*arg.expr
            && let Some(specifier) = s.value.as_str()
        {
            self.push(specifier);
        }

        node.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, node: &ImportDecl) {
        if let Some(specifier) = node.src.value.as_str() {
            self.push(specifier);
        }
    }
}
