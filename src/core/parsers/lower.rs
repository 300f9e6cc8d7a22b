//! Lowering from the swc AST into [`crate::core::syntax`].
//!
//! Besides translating node shapes, lowering associates comments with nodes purely
//! by position:
//!
//! - comments between two top-level statements lead the following statement;
//! - inside an object/array literal, comments in the gap before a child (starting at
//!   the previous child's end, or the opening bracket) lead that child;
//! - comments after the last child that sit on its end line trail it.
//!
//! The first rule means a same-line comment written after child `i` ends up leading
//! child `i + 1`. [`crate::core::comments::reattach_program`] repairs that afterwards.

use swc_common::{
    BytePos, SourceMap, SourceMapper, Span, Spanned, comments::Comment as SwcComment,
};
use swc_ecma_ast as ast;

use super::js::offset;
use crate::core::syntax::{
    BinaryOp, Binding, BodyStatement, CollectionLit, Comment, CommentKind, Comments, Declarator,
    Entry, EntryKind, Expr, ExprKind, FunctionBody, FunctionLit, ImportBinding, Literal, Loc,
    Param, PatternProp, Program, Statement, StatementKind, UnaryOp,
};

pub struct Lowerer<'a> {
    source_map: &'a SourceMap,
    start: BytePos,
    /// All comments of the file, ordered by position.
    comments: Vec<Comment>,
}

impl<'a> Lowerer<'a> {
    pub fn new(source_map: &'a SourceMap, start: BytePos, comments: Vec<SwcComment>) -> Self {
        let comments = comments
            .into_iter()
            .map(|cmt| Comment {
                kind: match cmt.kind {
                    swc_common::comments::CommentKind::Line => CommentKind::Line,
                    swc_common::comments::CommentKind::Block => CommentKind::Block,
                },
                text: cmt.text.to_string(),
                pos: offset(cmt.span.lo, start),
                line: source_map.lookup_char_pos(cmt.span.lo).line,
            })
            .collect();
        Self {
            source_map,
            start,
            comments,
        }
    }

    pub fn lower_program(&self, program: &ast::Program, source: String) -> Program {
        let mut body = Vec::new();
        let mut prev_hi = 0;

        let mut push = |kind: StatementKind, span: Span| {
            let loc = self.loc(span);
            let leading = self.between(prev_hi, loc.lo);
            prev_hi = loc.hi;
            body.push(Statement {
                kind,
                loc,
                comments: Comments {
                    leading,
                    trailing: Vec::new(),
                },
            });
        };

        match program {
            ast::Program::Module(module) => {
                for item in &module.body {
                    let kind = match item {
                        ast::ModuleItem::Stmt(stmt) => self.lower_stmt(stmt),
                        ast::ModuleItem::ModuleDecl(decl) => self.lower_module_decl(decl),
                    };
                    push(kind, item.span());
                }
            }
            ast::Program::Script(script) => {
                for stmt in &script.body {
                    push(self.lower_stmt(stmt), stmt.span());
                }
            }
        }

        Program { source, body }
    }

    fn loc(&self, span: Span) -> Loc {
        let last = BytePos(span.hi.0.saturating_sub(1).max(span.lo.0));
        Loc {
            lo: offset(span.lo, self.start),
            hi: offset(span.hi, self.start),
            start_line: self.source_map.lookup_char_pos(span.lo).line,
            end_line: self.source_map.lookup_char_pos(last).line,
        }
    }

    /// Comments starting in `[lo, hi)`.
    fn between(&self, lo: usize, hi: usize) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|cmt| cmt.pos >= lo && cmt.pos < hi)
            .cloned()
            .collect()
    }

    fn lower_stmt(&self, stmt: &ast::Stmt) -> StatementKind {
        match stmt {
            ast::Stmt::Decl(decl) => self.lower_decl(decl, false),
            ast::Stmt::Expr(expr_stmt) => StatementKind::Expression(self.lower_expr(&expr_stmt.expr)),
            _ => StatementKind::Other,
        }
    }

    fn lower_decl(&self, decl: &ast::Decl, exported: bool) -> StatementKind {
        match decl {
            ast::Decl::Var(var) => StatementKind::Declare {
                declarators: var
                    .decls
                    .iter()
                    .map(|d| Declarator {
                        binding: self.lower_binding(&d.name),
                        init: d.init.as_deref().map(|init| self.lower_expr(init)),
                    })
                    .collect(),
                exported,
            },
            ast::Decl::Fn(fn_decl) => {
                let name = fn_decl.ident.sym.to_string();
                let function = self.lower_function(Some(name.clone()), &fn_decl.function);
                StatementKind::Declare {
                    declarators: vec![Declarator {
                        binding: Binding::Ident(name),
                        init: Some(Expr::new(
                            ExprKind::Function(function),
                            self.loc(fn_decl.function.span),
                        )),
                    }],
                    exported,
                }
            }
            _ => StatementKind::Other,
        }
    }

    fn lower_module_decl(&self, decl: &ast::ModuleDecl) -> StatementKind {
        match decl {
            ast::ModuleDecl::Import(import) => StatementKind::Import {
                source: import.src.value.as_str().unwrap_or_default().to_string(),
                bindings: import
                    .specifiers
                    .iter()
                    .map(|spec| match spec {
                        ast::ImportSpecifier::Named(named) => ImportBinding::Named {
                            imported: named
                                .imported
                                .as_ref()
                                .map_or_else(|| named.local.sym.to_string(), export_name),
                            local: named.local.sym.to_string(),
                        },
                        ast::ImportSpecifier::Default(default) => ImportBinding::Default {
                            local: default.local.sym.to_string(),
                        },
                        ast::ImportSpecifier::Namespace(namespace) => ImportBinding::Namespace {
                            local: namespace.local.sym.to_string(),
                        },
                    })
                    .collect(),
            },
            ast::ModuleDecl::ExportDecl(export) => self.lower_decl(&export.decl, true),
            ast::ModuleDecl::ExportDefaultExpr(export) => {
                StatementKind::ExportDefault(self.lower_expr(&export.expr))
            }
            ast::ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                ast::DefaultDecl::Fn(fn_expr) => {
                    let name = fn_expr.ident.as_ref().map(|i| i.sym.to_string());
                    StatementKind::ExportDefault(Expr::new(
                        ExprKind::Function(self.lower_function(name, &fn_expr.function)),
                        self.loc(fn_expr.function.span),
                    ))
                }
                _ => StatementKind::Other,
            },
            ast::ModuleDecl::ExportNamed(export) if export.src.is_none() => StatementKind::ExportNames(
                export
                    .specifiers
                    .iter()
                    .filter_map(|spec| match spec {
                        ast::ExportSpecifier::Named(named) => {
                            let local = export_name(&named.orig);
                            let exported = named
                                .exported
                                .as_ref()
                                .map_or_else(|| local.clone(), export_name);
                            Some((local, exported))
                        }
                        _ => None,
                    })
                    .collect(),
            ),
            _ => StatementKind::Other,
        }
    }

    fn lower_binding(&self, pat: &ast::Pat) -> Binding {
        match pat {
            ast::Pat::Ident(ident) => Binding::Ident(ident.id.sym.to_string()),
            ast::Pat::Object(obj) => Binding::Object(
                obj.props
                    .iter()
                    .filter_map(|prop| match prop {
                        ast::ObjectPatProp::KeyValue(kv) => {
                            let key = self.prop_name(&kv.key);
                            match &*kv.value {
                                ast::Pat::Ident(local) => Some(PatternProp {
                                    key,
                                    local: local.id.sym.to_string(),
                                    default: None,
                                }),
                                ast::Pat::Assign(assign) => match &*assign.left {
                                    ast::Pat::Ident(local) => Some(PatternProp {
                                        key,
                                        local: local.id.sym.to_string(),
                                        default: Some(self.lower_expr(&assign.right)),
                                    }),
                                    _ => None,
                                },
                                _ => None,
                            }
                        }
                        ast::ObjectPatProp::Assign(assign) => Some(PatternProp {
                            key: assign.key.sym.to_string(),
                            local: assign.key.sym.to_string(),
                            default: assign.value.as_deref().map(|v| self.lower_expr(v)),
                        }),
                        ast::ObjectPatProp::Rest(_) => None,
                    })
                    .collect(),
            ),
            _ => Binding::Unsupported,
        }
    }

    fn lower_param(&self, pat: &ast::Pat) -> Param {
        match pat {
            ast::Pat::Assign(assign) => Param {
                binding: self.lower_binding(&assign.left),
                default: Some(self.lower_expr(&assign.right)),
                rest: false,
            },
            ast::Pat::Rest(rest) => Param {
                binding: self.lower_binding(&rest.arg),
                default: None,
                rest: true,
            },
            _ => Param {
                binding: self.lower_binding(pat),
                default: None,
                rest: false,
            },
        }
    }

    fn lower_function(&self, name: Option<String>, function: &ast::Function) -> FunctionLit {
        FunctionLit {
            name,
            params: function
                .params
                .iter()
                .map(|p| self.lower_param(&p.pat))
                .collect(),
            body: FunctionBody::Block(
                function
                    .body
                    .as_ref()
                    .map(|block| self.lower_block(block))
                    .unwrap_or_default(),
            ),
        }
    }

    fn lower_block(&self, block: &ast::BlockStmt) -> Vec<BodyStatement> {
        block
            .stmts
            .iter()
            .map(|stmt| match stmt {
                ast::Stmt::Return(ret) => {
                    BodyStatement::Return(ret.arg.as_deref().map(|arg| self.lower_expr(arg)))
                }
                ast::Stmt::Decl(decl) => match self.lower_decl(decl, false) {
                    StatementKind::Declare { declarators, .. } => BodyStatement::Declare(
                        declarators.into_iter().map(|d| (d.binding, d.init)).collect(),
                    ),
                    _ => BodyStatement::Other,
                },
                _ => BodyStatement::Other,
            })
            .collect()
    }

    fn prop_name(&self, key: &ast::PropName) -> String {
        match key {
            ast::PropName::Ident(ident) => ident.sym.to_string(),
            ast::PropName::Str(s) => s.value.as_str().unwrap_or_default().to_string(),
            ast::PropName::Num(n) => crate::core::resolve::format_number(n.value),
            ast::PropName::BigInt(b) => b.value.to_string(),
            ast::PropName::Computed(computed) => format!(
                "[{}]",
                self.source_map
                    .span_to_snippet(computed.expr.span())
                    .unwrap_or_default()
            ),
        }
    }

    /// Lower an object or array literal, attaching gap comments to its children.
    fn lower_collection(&self, loc: Loc, mut entries: Vec<Entry>) -> CollectionLit {
        let mut prev_hi = loc.lo;
        for entry in &mut entries {
            entry.comments.leading = self.between(prev_hi, entry.loc.lo);
            prev_hi = entry.loc.hi;
        }
        if let Some(last) = entries.last_mut() {
            let end_line = last.loc.end_line;
            last.comments.trailing = self
                .between(last.loc.hi, loc.hi)
                .into_iter()
                .filter(|cmt| cmt.line == end_line)
                .collect();
        }
        CollectionLit { entries }
    }

    fn lower_object(&self, obj: &ast::ObjectLit, loc: Loc) -> CollectionLit {
        let entries = obj
            .props
            .iter()
            .map(|prop| match prop {
                ast::PropOrSpread::Spread(spread) => Entry {
                    kind: EntryKind::Spread,
                    value: self.lower_expr(&spread.expr),
                    loc: self.loc(Span::new(spread.dot3_token.lo, spread.expr.span().hi)),
                    comments: Comments::default(),
                },
                ast::PropOrSpread::Prop(prop) => {
                    let prop_loc = self.loc(prop.span());
                    let (key, value) = match &**prop {
                        ast::Prop::KeyValue(kv) => (self.prop_name(&kv.key), self.lower_expr(&kv.value)),
                        ast::Prop::Shorthand(ident) => (
                            ident.sym.to_string(),
                            Expr::new(ExprKind::Ident(ident.sym.to_string()), prop_loc),
                        ),
                        ast::Prop::Method(method) => {
                            let key = self.prop_name(&method.key);
                            let function = self.lower_function(Some(key.clone()), &method.function);
                            (key, Expr::new(ExprKind::Function(function), prop_loc))
                        }
                        ast::Prop::Getter(getter) => (
                            self.prop_name(&getter.key),
                            Expr::new(ExprKind::Opaque("getter"), prop_loc),
                        ),
                        ast::Prop::Setter(setter) => (
                            self.prop_name(&setter.key),
                            Expr::new(ExprKind::Opaque("setter"), prop_loc),
                        ),
                        ast::Prop::Assign(assign) => (
                            assign.key.sym.to_string(),
                            Expr::new(ExprKind::Opaque("assignment property"), prop_loc),
                        ),
                    };
                    Entry {
                        kind: EntryKind::Keyed(key),
                        value,
                        loc: prop_loc,
                        comments: Comments::default(),
                    }
                }
            })
            .collect();
        self.lower_collection(loc, entries)
    }

    fn lower_array(&self, arr: &ast::ArrayLit, loc: Loc) -> CollectionLit {
        let entries = arr
            .elems
            .iter()
            .flatten()
            .map(|elem| {
                let expr_span = elem.expr.span();
                let lo = elem.spread.map_or(expr_span.lo, |s| s.lo);
                Entry {
                    kind: if elem.spread.is_some() {
                        EntryKind::Spread
                    } else {
                        EntryKind::Element
                    },
                    value: self.lower_expr(&elem.expr),
                    loc: self.loc(Span::new(lo, expr_span.hi)),
                    comments: Comments::default(),
                }
            })
            .collect();
        self.lower_collection(loc, entries)
    }

    fn lower_args(&self, args: &[ast::ExprOrSpread]) -> Vec<Expr> {
        args.iter()
            .map(|arg| match arg.spread {
                Some(spread) => Expr::new(
                    ExprKind::Opaque("spread argument"),
                    self.loc(Span::new(spread.lo, arg.expr.span().hi)),
                ),
                None => self.lower_expr(&arg.expr),
            })
            .collect()
    }

    pub fn lower_expr(&self, expr: &ast::Expr) -> Expr {
        let loc = self.loc(expr.span());
        let kind = match unwrap_ts_expr(expr) {
            ast::Expr::Lit(lit) => match lit {
                ast::Lit::Str(s) => {
                    ExprKind::Lit(Literal::Str(s.value.as_str().unwrap_or_default().to_string()))
                }
                ast::Lit::Num(n) => ExprKind::Lit(Literal::Num(n.value)),
                ast::Lit::Bool(b) => ExprKind::Lit(Literal::Bool(b.value)),
                ast::Lit::Null(_) => ExprKind::Lit(Literal::Null),
                ast::Lit::BigInt(b) => ExprKind::Lit(Literal::BigInt(b.value.to_string())),
                ast::Lit::Regex(re) => ExprKind::Regex {
                    pattern: re.exp.to_string(),
                    flags: re.flags.to_string(),
                },
                ast::Lit::JSXText(_) => ExprKind::Opaque("JSX text"),
            },
            ast::Expr::Tpl(tpl) => ExprKind::Template {
                quasis: tpl
                    .quasis
                    .iter()
                    .map(|q| {
                        q.cooked
                            .as_ref()
                            .and_then(|s| s.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| q.raw.to_string())
                    })
                    .collect(),
                exprs: tpl.exprs.iter().map(|e| self.lower_expr(e)).collect(),
            },
            ast::Expr::Ident(ident) => ExprKind::Ident(ident.sym.to_string()),
            ast::Expr::Object(obj) => ExprKind::Object(self.lower_object(obj, loc)),
            ast::Expr::Array(arr) => ExprKind::Array(self.lower_array(arr, loc)),
            ast::Expr::Call(call) => match &call.callee {
                ast::Callee::Expr(callee) => ExprKind::Call {
                    callee: Box::new(self.lower_expr(callee)),
                    args: self.lower_args(&call.args),
                    constructs: false,
                },
                ast::Callee::Super(_) | ast::Callee::Import(_) => ExprKind::Opaque("special call"),
            },
            ast::Expr::New(new) => ExprKind::Call {
                callee: Box::new(self.lower_expr(&new.callee)),
                args: new
                    .args
                    .as_deref()
                    .map(|args| self.lower_args(args))
                    .unwrap_or_default(),
                constructs: true,
            },
            ast::Expr::Member(member) => self.lower_member(member),
            ast::Expr::Arrow(arrow) => ExprKind::Function(FunctionLit {
                name: None,
                params: arrow.params.iter().map(|p| self.lower_param(p)).collect(),
                body: match &*arrow.body {
                    ast::BlockStmtOrExpr::Expr(body) => FunctionBody::Expr(Box::new(self.lower_expr(body))),
                    ast::BlockStmtOrExpr::BlockStmt(block) => FunctionBody::Block(self.lower_block(block)),
                },
            }),
            ast::Expr::Fn(fn_expr) => ExprKind::Function(
                self.lower_function(fn_expr.ident.as_ref().map(|i| i.sym.to_string()), &fn_expr.function),
            ),
            ast::Expr::Assign(assign) => self.lower_assign(assign),
            ast::Expr::Unary(unary) => {
                let op = match unary.op {
                    ast::UnaryOp::Minus => Some(UnaryOp::Minus),
                    ast::UnaryOp::Plus => Some(UnaryOp::Plus),
                    ast::UnaryOp::Bang => Some(UnaryOp::Not),
                    ast::UnaryOp::TypeOf => Some(UnaryOp::TypeOf),
                    _ => None,
                };
                match op {
                    Some(op) => ExprKind::Unary {
                        op,
                        arg: Box::new(self.lower_expr(&unary.arg)),
                    },
                    None => ExprKind::Opaque("unary expression"),
                }
            }
            ast::Expr::Bin(bin) => match lower_binary_op(bin.op) {
                Some(op) => ExprKind::Binary {
                    op,
                    left: Box::new(self.lower_expr(&bin.left)),
                    right: Box::new(self.lower_expr(&bin.right)),
                },
                None => ExprKind::Opaque("binary expression"),
            },
            ast::Expr::Cond(cond) => ExprKind::Conditional {
                test: Box::new(self.lower_expr(&cond.test)),
                consequent: Box::new(self.lower_expr(&cond.cons)),
                alternate: Box::new(self.lower_expr(&cond.alt)),
            },
            ast::Expr::This(_) => ExprKind::Opaque("this"),
            ast::Expr::OptChain(_) => ExprKind::Opaque("optional chain"),
            ast::Expr::Class(_) => ExprKind::Opaque("class expression"),
            ast::Expr::TaggedTpl(_) => ExprKind::Opaque("tagged template"),
            ast::Expr::Await(_) => ExprKind::Opaque("await expression"),
            ast::Expr::Seq(_) => ExprKind::Opaque("sequence expression"),
            _ => ExprKind::Opaque("expression"),
        };
        Expr::new(kind, loc)
    }

    fn lower_member(&self, member: &ast::MemberExpr) -> ExprKind {
        let property = match &member.prop {
            ast::MemberProp::Ident(ident) => Some(ident.sym.to_string()),
            ast::MemberProp::Computed(computed) => match unwrap_ts_expr(&computed.expr) {
                ast::Expr::Lit(ast::Lit::Str(s)) => s.value.as_str().map(str::to_string),
                ast::Expr::Lit(ast::Lit::Num(n)) => {
                    Some(crate::core::resolve::format_number(n.value))
                }
                _ => None,
            },
            ast::MemberProp::PrivateName(_) => None,
        };
        match property {
            Some(property) => ExprKind::Member {
                object: Box::new(self.lower_expr(&member.obj)),
                property,
            },
            None => ExprKind::Opaque("computed member"),
        }
    }

    fn lower_assign(&self, assign: &ast::AssignExpr) -> ExprKind {
        if assign.op != ast::AssignOp::Assign {
            return ExprKind::Opaque("compound assignment");
        }
        let target = match &assign.left {
            ast::AssignTarget::Simple(ast::SimpleAssignTarget::Member(member)) => {
                Expr::new(self.lower_member(member), self.loc(member.span))
            }
            ast::AssignTarget::Simple(ast::SimpleAssignTarget::Ident(ident)) => Expr::new(
                ExprKind::Ident(ident.id.sym.to_string()),
                self.loc(ident.id.span),
            ),
            _ => return ExprKind::Opaque("destructuring assignment"),
        };
        ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(self.lower_expr(&assign.right)),
        }
    }
}

fn export_name(name: &ast::ModuleExportName) -> String {
    match name {
        ast::ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ast::ModuleExportName::Str(s) => s.value.as_str().unwrap_or_default().to_string(),
    }
}

fn lower_binary_op(op: ast::BinaryOp) -> Option<BinaryOp> {
    Some(match op {
        ast::BinaryOp::Add => BinaryOp::Add,
        ast::BinaryOp::Sub => BinaryOp::Sub,
        ast::BinaryOp::Mul => BinaryOp::Mul,
        ast::BinaryOp::Div => BinaryOp::Div,
        ast::BinaryOp::Mod => BinaryOp::Rem,
        ast::BinaryOp::EqEqEq => BinaryOp::StrictEq,
        ast::BinaryOp::NotEqEq => BinaryOp::StrictNotEq,
        ast::BinaryOp::EqEq => BinaryOp::Eq,
        ast::BinaryOp::NotEq => BinaryOp::NotEq,
        ast::BinaryOp::Lt => BinaryOp::Lt,
        ast::BinaryOp::LtEq => BinaryOp::LtEq,
        ast::BinaryOp::Gt => BinaryOp::Gt,
        ast::BinaryOp::GtEq => BinaryOp::GtEq,
        ast::BinaryOp::LogicalAnd => BinaryOp::And,
        ast::BinaryOp::LogicalOr => BinaryOp::Or,
        ast::BinaryOp::NullishCoalescing => BinaryOp::Nullish,
        _ => return None,
    })
}

/// Unwrap TypeScript-specific expression wrappers and parentheses.
fn unwrap_ts_expr(expr: &ast::Expr) -> &ast::Expr {
    match expr {
        ast::Expr::TsAs(ts_as) => unwrap_ts_expr(&ts_as.expr),
        ast::Expr::TsConstAssertion(ts_const) => unwrap_ts_expr(&ts_const.expr),
        ast::Expr::TsSatisfies(ts_sat) => unwrap_ts_expr(&ts_sat.expr),
        ast::Expr::TsNonNull(non_null) => unwrap_ts_expr(&non_null.expr),
        ast::Expr::Paren(paren) => unwrap_ts_expr(&paren.expr),
        _ => expr,
    }
}
