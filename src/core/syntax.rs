//! Syntax model consumed by the analysis engine.
//!
//! The swc AST is lowered into this small, closed set of shapes right after parsing
//! (see [`crate::core::parsers`]). Everything downstream (comment reattachment,
//! value resolution, rendering) matches on these types exhaustively, so supporting a
//! new expression shape means adding a variant here and handling it everywhere.
//!
//! Every node carries a [`Loc`] with byte offsets relative to the start of its file
//! and 1-based line numbers. Literal children ([`Entry`]) and top-level statements
//! carry their attached [`Comments`].

/// Source location of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loc {
    /// Byte offset of the first character.
    pub lo: usize,
    /// Byte offset one past the last character.
    pub hi: usize,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A source comment. `text` excludes the comment delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    /// Byte offset of the comment start.
    pub pos: usize,
    pub line: usize,
}

/// Comments attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    pub leading: Vec<Comment>,
    pub trailing: Vec<Comment>,
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct Program {
    pub source: String,
    pub body: Vec<Statement>,
}

impl Program {
    /// Raw source text covered by `loc`.
    pub fn text(&self, loc: &Loc) -> &str {
        self.source.get(loc.lo..loc.hi).unwrap_or_default()
    }

    /// Initializer of the first top-level `name = ...` declaration.
    pub fn declared_init(&self, name: &str) -> Option<&Expr> {
        self.body.iter().find_map(|statement| match &statement.kind {
            StatementKind::Declare { declarators, .. } => declarators.iter().find_map(|d| {
                match &d.binding {
                    Binding::Ident(ident) if ident == name => d.init.as_ref(),
                    _ => None,
                }
            }),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub loc: Loc,
    pub comments: Comments,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    /// `const`/`let`/`var` declarations and function declarations.
    Declare {
        declarators: Vec<Declarator>,
        exported: bool,
    },
    Expression(Expr),
    Import {
        source: String,
        bindings: Vec<ImportBinding>,
    },
    ExportDefault(Expr),
    /// `export { local as exported }` without a source module.
    ExportNames(Vec<(String, String)>),
    /// Anything the engine never looks into (classes, loops, ...).
    Other,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub binding: Binding,
    pub init: Option<Expr>,
}

/// Left-hand side of a declaration or a function parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Ident(String),
    /// `{ a, b: c, d = 1 }`
    Object(Vec<PatternProp>),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternProp {
    /// Property read from the source value.
    pub key: String,
    /// Local name it is bound to.
    pub local: String,
    pub default: Option<Expr>,
}

impl Binding {
    /// Whether this binding introduces `name`.
    pub fn binds(&self, name: &str) -> bool {
        match self {
            Binding::Ident(ident) => ident == name,
            Binding::Object(props) => props.iter().any(|p| p.local == name),
            Binding::Unsupported => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { imported as local } from '...'`
    Named { imported: String, local: String },
    /// `import local from '...'`
    Default { local: String },
    /// `import * as local from '...'`
    Namespace { local: String },
}

impl ImportBinding {
    pub fn local(&self) -> &str {
        match self {
            ImportBinding::Named { local, .. }
            | ImportBinding::Default { local }
            | ImportBinding::Namespace { local } => local,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    BigInt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    StrictEq,
    StrictNotEq,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Nullish,
}

/// The finite set of expression shapes the engine understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Lit(Literal),
    /// `/pattern/flags`
    Regex { pattern: String, flags: String },
    /// Template literal; `quasis.len() == exprs.len() + 1`.
    Template { quasis: Vec<String>, exprs: Vec<Expr> },
    Ident(String),
    Object(CollectionLit),
    Array(CollectionLit),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// `new Callee(...)`
        constructs: bool,
    },
    Member { object: Box<Expr>, property: String },
    Function(FunctionLit),
    Assign { target: Box<Expr>, value: Box<Expr> },
    Unary { op: UnaryOp, arg: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// Any other expression; the name is used in diagnostics.
    Opaque(&'static str),
}

/// An object or array literal with its children in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionLit {
    pub entries: Vec<Entry>,
}

impl CollectionLit {
    /// Keyed entry with the given name (the last one wins, as in JavaScript).
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.entries.iter().rev().find_map(|entry| match &entry.kind {
            EntryKind::Keyed(k) if k == key => Some(&entry.value),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub kind: EntryKind,
    pub value: Expr,
    pub loc: Loc,
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// `key: value` in an object literal.
    Keyed(String),
    /// `...value` in either literal kind.
    Spread,
    /// Plain array element.
    Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    /// Arrow function with an expression body.
    Expr(Box<Expr>),
    Block(Vec<BodyStatement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyStatement {
    Declare(Vec<(Binding, Option<Expr>)>),
    Return(Option<Expr>),
    Other,
}

impl Expr {
    pub fn new(kind: ExprKind, loc: Loc) -> Self {
        Self { kind, loc }
    }

    /// Name of an identifier expression.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// `(object, property)` of a member expression.
    pub fn as_member(&self) -> Option<(&Expr, &str)> {
        match &self.kind {
            ExprKind::Member { object, property } => Some((object, property)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&CollectionLit> {
        match &self.kind {
            ExprKind::Object(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&CollectionLit> {
        match &self.kind {
            ExprKind::Array(lit) => Some(lit),
            _ => None,
        }
    }

    /// String value of a string literal.
    pub fn as_str_lit(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Lit(Literal::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Short name of the shape, used in diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Lit(_) => "literal",
            ExprKind::Regex { .. } => "regular expression",
            ExprKind::Template { .. } => "template literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Object(_) => "object literal",
            ExprKind::Array(_) => "array literal",
            ExprKind::Call { .. } => "call expression",
            ExprKind::Member { .. } => "member expression",
            ExprKind::Function(_) => "function",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Conditional { .. } => "conditional expression",
            ExprKind::Opaque(name) => name,
        }
    }
}
