//! Static value resolution.
//!
//! Field options, spread sources and helper results are computed without running any
//! code: expressions are evaluated over the [`ModuleIndex`] by a small interpreter
//! that understands literals, name lookup, member access, `require`/`import`, and
//! calls to helper functions whose bodies are a single expression or a sequence of
//! declarations followed by `return`.
//!
//! Anything outside that subset resolves to [`Value::Unknown`]. The only fatal
//! condition is a `require` of a local file that could not be loaded.

mod value;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::Config;
use crate::core::diagnostics::Diagnostics;
use crate::core::modules::{ENTRY, Link, ModuleId, ModuleIndex, ModuleSource};
use crate::core::syntax::{
    BinaryOp, Binding, BodyStatement, CollectionLit, Declarator, EntryKind, Expr, ExprKind,
    FunctionBody, ImportBinding, Literal, PatternProp, Program, StatementKind, UnaryOp,
};
use crate::error::{DocgenError, Result};

pub use value::{Closure, Scope, Value, format_number};

/// Maximum nesting of helper calls before giving up with an unknown result.
const MAX_CALL_DEPTH: usize = 64;

/// Maximum number of helper calls in one run before results become unknown.
const MAX_CALLS: usize = 10_000;

/// Decrements the call depth when a helper call returns.
struct CallGuard<'a>(&'a Cell<usize>);

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// Where an assignment stores into the module's exports.
enum ExportTarget<'a> {
    /// `module.exports = ...`
    Whole,
    /// `exports.name = ...` or `module.exports.name = ...`
    Named(&'a str),
}

fn is_module_exports(expr: &Expr) -> bool {
    matches!(expr.as_member(), Some((object, "exports")) if object.as_ident() == Some("module"))
}

fn export_target(target: &Expr) -> Option<ExportTarget<'_>> {
    if is_module_exports(target) {
        return Some(ExportTarget::Whole);
    }
    let (object, property) = target.as_member()?;
    (object.as_ident() == Some("exports") || is_module_exports(object))
        .then_some(ExportTarget::Named(property))
}

/// Number conversion for arithmetic and loose comparison.
fn to_number(value: &Value<'_>) -> Option<f64> {
    match value {
        Value::Num(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Str(s) => Some(parse_js_number(s)),
        _ => None,
    }
}

fn parse_js_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
        {
            trimmed.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

fn strict_equals(left: &Value<'_>, right: &Value<'_>) -> Option<bool> {
    match (left, right) {
        (Value::Unknown, _) | (_, Value::Unknown) => None,
        (Value::Null, Value::Null) => Some(true),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Num(a), Value::Num(b)) => Some(a == b),
        (Value::Str(a), Value::Str(b)) => Some(a == b),
        (Value::BigInt(a), Value::BigInt(b)) => Some(a == b),
        (
            Value::Null | Value::Bool(_) | Value::Num(_) | Value::Str(_) | Value::BigInt(_),
            Value::Null | Value::Bool(_) | Value::Num(_) | Value::Str(_) | Value::BigInt(_),
        ) => Some(false),
        _ => None,
    }
}

fn loose_equals(left: &Value<'_>, right: &Value<'_>) -> Option<bool> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(true),
        (Value::Null, Value::Bool(_) | Value::Num(_) | Value::Str(_))
        | (Value::Bool(_) | Value::Num(_) | Value::Str(_), Value::Null) => Some(false),
        (Value::Str(a), Value::Str(b)) => Some(a == b),
        (
            Value::Bool(_) | Value::Num(_) | Value::Str(_),
            Value::Bool(_) | Value::Num(_) | Value::Str(_),
        ) => Some(to_number(left)? == to_number(right)?),
        _ => strict_equals(left, right),
    }
}

fn compare(op: BinaryOp, left: &Value<'_>, right: &Value<'_>) -> Option<bool> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => to_number(left)?.partial_cmp(&to_number(right)?),
    };
    // Comparisons involving NaN are always false.
    let Some(ordering) = ordering else {
        return Some(false);
    };
    Some(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => return None,
    })
}

fn arithmetic<'p>(op: BinaryOp, left: &Value<'p>, right: &Value<'p>) -> Value<'p> {
    if op == BinaryOp::Add
        && [left, right]
            .iter()
            .any(|v| matches!(v, Value::Str(_) | Value::Map(_) | Value::List(_) | Value::Pattern { .. }))
    {
        return match (left.to_js_string(), right.to_js_string()) {
            (Some(a), Some(b)) => Value::Str(a + b.as_str()),
            _ => Value::Unknown,
        };
    }
    let (Some(a), Some(b)) = (to_number(left), to_number(right)) else {
        return Value::Unknown;
    };
    Value::Num(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => return Value::Unknown,
    })
}

fn binary<'p>(op: BinaryOp, left: &Value<'p>, right: &Value<'p>) -> Value<'p> {
    let truth = match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            return arithmetic(op, left, right);
        }
        BinaryOp::StrictEq => strict_equals(left, right),
        BinaryOp::StrictNotEq => strict_equals(left, right).map(|eq| !eq),
        BinaryOp::Eq => loose_equals(left, right),
        BinaryOp::NotEq => loose_equals(left, right).map(|eq| !eq),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => compare(op, left, right),
        // Short-circuit operators are evaluated lazily by the resolver.
        BinaryOp::And | BinaryOp::Or | BinaryOp::Nullish => None,
    };
    truth.map_or(Value::Unknown, Value::Bool)
}

fn unary<'p>(op: UnaryOp, value: Value<'p>) -> Value<'p> {
    match op {
        UnaryOp::Minus => to_number(&value).map_or(Value::Unknown, |n| Value::Num(-n)),
        UnaryOp::Plus => to_number(&value).map_or(Value::Unknown, Value::Num),
        UnaryOp::Not => value.truthy().map_or(Value::Unknown, |t| Value::Bool(!t)),
        UnaryOp::TypeOf => value
            .type_of()
            .map_or(Value::Unknown, |t| Value::Str(t.to_string())),
    }
}

/// Calling a global type as a function, e.g. `String(5)` or `new RegExp('a', 'i')`.
fn call_builtin<'p>(label: &str, args: &[Value<'p>]) -> Value<'p> {
    let unknown = Value::Unknown;
    let first = args.first().unwrap_or(&unknown);
    match label {
        "String" => first.to_js_string().map_or(Value::Unknown, Value::Str),
        "Number" => to_number(first).map_or(Value::Unknown, Value::Num),
        "Boolean" => first.truthy().map_or(Value::Unknown, Value::Bool),
        "RegExp" => match (first, args.get(1)) {
            (Value::Str(source), None) => Value::Pattern {
                source: source.clone(),
                flags: String::new(),
            },
            (Value::Str(source), Some(Value::Str(flags))) => Value::Pattern {
                source: source.clone(),
                flags: flags.clone(),
            },
            _ => Value::Unknown,
        },
        _ => Value::Unknown,
    }
}

/// Evaluates expressions of the indexed modules.
///
/// Module exports are evaluated once and cached. Resolution state is kept in cells so
/// the resolver can be shared immutably by the renderers.
pub struct Resolver<'p> {
    index: &'p ModuleIndex,
    config: &'p Config,
    diagnostics: &'p Diagnostics,
    exports: RefCell<HashMap<ModuleId, Value<'p>>>,
    exporting: RefCell<HashSet<ModuleId>>,
    resolving: RefCell<Vec<(ModuleId, String)>>,
    call_depth: Cell<usize>,
    calls: Cell<usize>,
}

impl<'p> Resolver<'p> {
    pub fn new(index: &'p ModuleIndex, config: &'p Config, diagnostics: &'p Diagnostics) -> Self {
        Self {
            index,
            config,
            diagnostics,
            exports: RefCell::new(HashMap::new()),
            exporting: RefCell::new(HashSet::new()),
            resolving: RefCell::new(Vec::new()),
            call_depth: Cell::new(0),
            calls: Cell::new(0),
        }
    }

    pub fn config(&self) -> &'p Config {
        self.config
    }

    pub fn diagnostics(&self) -> &'p Diagnostics {
        self.diagnostics
    }

    /// The entry file's program.
    pub fn entry_program(&self) -> Option<&'p Program> {
        self.index.entry().program()
    }

    /// Evaluate an expression of the entry file at top level.
    pub fn resolve(&self, expr: &'p Expr) -> Result<Value<'p>> {
        self.eval(ENTRY, expr, &Scope::default())
    }

    /// Evaluate an expression of `module` in `scope`.
    pub fn eval(&self, module: ModuleId, expr: &'p Expr, scope: &Scope<'p>) -> Result<Value<'p>> {
        Ok(match &expr.kind {
            ExprKind::Lit(lit) => match lit {
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Num(n) => Value::Num(*n),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
                Literal::BigInt(digits) => Value::BigInt(digits.clone()),
            },
            ExprKind::Regex { pattern, flags } => Value::Pattern {
                source: pattern.clone(),
                flags: flags.clone(),
            },
            ExprKind::Template { quasis, exprs } => {
                let mut out = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(expr) = exprs.get(i) {
                        match self.eval(module, expr, scope)?.to_js_string() {
                            Some(s) => out.push_str(&s),
                            None => return Ok(Value::Unknown),
                        }
                    }
                }
                Value::Str(out)
            }
            ExprKind::Ident(name) => self.lookup(module, name, scope)?,
            ExprKind::Object(lit) => self.eval_object(module, lit, scope)?,
            ExprKind::Array(lit) => self.eval_array(module, lit, scope)?,
            ExprKind::Call {
                callee,
                args,
                constructs,
            } => self.eval_call(module, callee, args, *constructs, scope)?,
            ExprKind::Member { object, property } => {
                let object = self.eval(module, object, scope)?;
                member(object, property)
            }
            ExprKind::Function(function) => Value::Function(Rc::new(Closure {
                function,
                module,
                scope: scope.clone(),
            })),
            ExprKind::Unary { op, arg } => unary(*op, self.eval(module, arg, scope)?),
            ExprKind::Binary { op, left, right } => {
                let left_value = self.eval(module, left, scope)?;
                match op {
                    BinaryOp::And => match left_value.truthy() {
                        Some(true) => self.eval(module, right, scope)?,
                        Some(false) => left_value,
                        None => Value::Unknown,
                    },
                    BinaryOp::Or => match left_value.truthy() {
                        Some(true) => left_value,
                        Some(false) => self.eval(module, right, scope)?,
                        None => Value::Unknown,
                    },
                    BinaryOp::Nullish => match left_value {
                        Value::Null | Value::Unknown => self.eval(module, right, scope)?,
                        other => other,
                    },
                    _ => binary(*op, &left_value, &self.eval(module, right, scope)?),
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => match self.eval(module, test, scope)?.truthy() {
                Some(true) => self.eval(module, consequent, scope)?,
                Some(false) => self.eval(module, alternate, scope)?,
                None => Value::Unknown,
            },
            ExprKind::Assign { .. } | ExprKind::Opaque(_) => Value::Unknown,
        })
    }

    fn eval_object(
        &self,
        module: ModuleId,
        lit: &'p CollectionLit,
        scope: &Scope<'p>,
    ) -> Result<Value<'p>> {
        let mut map = IndexMap::new();
        for entry in &lit.entries {
            match &entry.kind {
                EntryKind::Keyed(key) => {
                    let value = self.eval(module, &entry.value, scope)?;
                    map.insert(key.clone(), value);
                }
                EntryKind::Spread => match self.eval(module, &entry.value, scope)? {
                    Value::Map(spread) => map.extend(spread),
                    Value::List(items) => map.extend(
                        items
                            .into_iter()
                            .enumerate()
                            .map(|(i, item)| (i.to_string(), item)),
                    ),
                    Value::Unknown => self.diagnostics.warn(format!(
                        "{}:{}: spread of an unresolved value is ignored",
                        self.index.module(module).path.display(),
                        entry.loc.start_line
                    )),
                    _ => {}
                },
                EntryKind::Element => {}
            }
        }
        Ok(Value::Map(map))
    }

    fn eval_array(
        &self,
        module: ModuleId,
        lit: &'p CollectionLit,
        scope: &Scope<'p>,
    ) -> Result<Value<'p>> {
        let mut items = Vec::with_capacity(lit.entries.len());
        for entry in &lit.entries {
            let value = self.eval(module, &entry.value, scope)?;
            match (&entry.kind, value) {
                (EntryKind::Spread, Value::List(spread)) => items.extend(spread),
                (EntryKind::Spread, _) => self.diagnostics.warn(format!(
                    "{}:{}: spread of a non-array value is ignored",
                    self.index.module(module).path.display(),
                    entry.loc.start_line
                )),
                (_, value) => items.push(value),
            }
        }
        Ok(Value::List(items))
    }

    fn eval_call(
        &self,
        module: ModuleId,
        callee: &'p Expr,
        args: &'p [Expr],
        constructs: bool,
        scope: &Scope<'p>,
    ) -> Result<Value<'p>> {
        if !constructs && callee.as_ident() == Some("require") && !scope.contains("require") {
            return match args.first().and_then(Expr::as_str_lit) {
                Some(specifier) => self.require(module, specifier),
                None => Ok(Value::Unknown),
            };
        }

        let callee_value = self.eval(module, callee, scope)?;
        let args = args
            .iter()
            .map(|arg| self.eval(module, arg, scope))
            .collect::<Result<Vec<_>>>()?;
        match callee_value {
            Value::Function(closure) => self.invoke(&closure, args),
            Value::TypeLabel(label) => Ok(call_builtin(&label, &args)),
            _ => Ok(Value::Unknown),
        }
    }

    /// Call a helper function with already evaluated arguments.
    pub fn invoke(&self, closure: &Closure<'p>, args: Vec<Value<'p>>) -> Result<Value<'p>> {
        let calls = self.calls.get();
        if calls >= MAX_CALLS {
            self.diagnostics
                .warn("helper call budget exhausted; result treated as unknown");
            return Ok(Value::Unknown);
        }
        self.calls.set(calls + 1);
        let depth = self.call_depth.get();
        if depth >= MAX_CALL_DEPTH {
            self.diagnostics
                .warn("helper calls nested too deeply; result treated as unknown");
            return Ok(Value::Unknown);
        }
        self.call_depth.set(depth + 1);
        let _guard = CallGuard(&self.call_depth);

        let function = closure.function;
        let module = closure.module;
        let scope = closure.scope.child(HashMap::new());

        let mut args = args.into_iter();
        for param in &function.params {
            let arg = if param.rest {
                Value::List(args.by_ref().collect())
            } else {
                args.next().unwrap_or(Value::Unknown)
            };
            let arg = match (&arg, &param.default) {
                (Value::Unknown, Some(default)) => self.eval(module, default, &scope)?,
                _ => arg,
            };
            self.bind(module, &param.binding, arg, &scope)?;
        }

        match &function.body {
            FunctionBody::Expr(body) => self.eval(module, body, &scope),
            FunctionBody::Block(statements) => {
                for statement in statements {
                    match statement {
                        BodyStatement::Declare(declarators) => {
                            for (binding, init) in declarators {
                                let value = match init {
                                    Some(init) => self.eval(module, init, &scope)?,
                                    None => Value::Unknown,
                                };
                                self.bind(module, binding, value, &scope)?;
                            }
                        }
                        BodyStatement::Return(Some(arg)) => return self.eval(module, arg, &scope),
                        // Control flow is not followed.
                        BodyStatement::Return(None) | BodyStatement::Other => {
                            return Ok(Value::Unknown);
                        }
                    }
                }
                Ok(Value::Unknown)
            }
        }
    }

    fn bind(
        &self,
        module: ModuleId,
        binding: &'p Binding,
        value: Value<'p>,
        scope: &Scope<'p>,
    ) -> Result<()> {
        match binding {
            Binding::Ident(name) => scope.bind(name, value),
            Binding::Object(props) => {
                for prop in props {
                    let read = self.read_property(module, &value, prop, scope)?;
                    scope.bind(&prop.local, read);
                }
            }
            Binding::Unsupported => {}
        }
        Ok(())
    }

    /// Value of one destructured property, falling back to its default.
    fn read_property(
        &self,
        module: ModuleId,
        source: &Value<'p>,
        prop: &'p PatternProp,
        scope: &Scope<'p>,
    ) -> Result<Value<'p>> {
        let value = match source {
            Value::Map(map) => map.get(&prop.key).cloned().unwrap_or(Value::Unknown),
            _ => Value::Unknown,
        };
        match (&value, &prop.default) {
            (Value::Unknown, Some(default)) => self.eval(module, default, scope),
            _ => Ok(value),
        }
    }

    /// Resolve a name: local scope, then top-level bindings of the module, then the
    /// builtin type table.
    pub fn lookup(&self, module: ModuleId, name: &str, scope: &Scope<'p>) -> Result<Value<'p>> {
        if let Some(value) = scope.lookup(name) {
            return Ok(value);
        }
        match name {
            "undefined" => return Ok(Value::Unknown),
            "NaN" => return Ok(Value::Num(f64::NAN)),
            "Infinity" => return Ok(Value::Num(f64::INFINITY)),
            _ => {}
        }

        let key = (module, name.to_string());
        if self.resolving.borrow().contains(&key) {
            self.diagnostics
                .warn(format!("'{}' refers to itself; treated as unknown", name));
            return Ok(Value::Unknown);
        }
        let Some(program) = self.index.module(module).program() else {
            return Ok(Value::Unknown);
        };

        self.resolving.borrow_mut().push(key);
        let found = self.top_level(module, program, name);
        self.resolving.borrow_mut().pop();

        match found? {
            Some(value) => Ok(value),
            None if self.config.is_builtin_type(name) => Ok(Value::TypeLabel(name.to_string())),
            None => {
                self.diagnostics.warn(format!(
                    "{}: cannot resolve '{}'",
                    self.index.module(module).path.display(),
                    name
                ));
                Ok(Value::Unknown)
            }
        }
    }

    fn top_level(
        &self,
        module: ModuleId,
        program: &'p Program,
        name: &str,
    ) -> Result<Option<Value<'p>>> {
        for statement in &program.body {
            match &statement.kind {
                StatementKind::Declare { declarators, .. } => {
                    if let Some(declarator) = declarators.iter().find(|d| d.binding.binds(name)) {
                        return self.declared(module, declarator, name).map(Some);
                    }
                }
                StatementKind::Import { source, bindings } => {
                    if let Some(binding) = bindings.iter().find(|b| b.local() == name) {
                        return self.imported(module, source, binding).map(Some);
                    }
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn declared(
        &self,
        module: ModuleId,
        declarator: &'p Declarator,
        name: &str,
    ) -> Result<Value<'p>> {
        let scope = Scope::default();
        let init = match &declarator.init {
            Some(init) => self.eval(module, init, &scope)?,
            None => Value::Unknown,
        };
        match &declarator.binding {
            Binding::Ident(_) => Ok(init),
            Binding::Object(props) => match props.iter().find(|p| p.local == name) {
                Some(prop) => self.read_property(module, &init, prop, &scope),
                None => Ok(Value::Unknown),
            },
            Binding::Unsupported => Ok(Value::Unknown),
        }
    }

    fn imported(
        &self,
        module: ModuleId,
        source: &str,
        binding: &ImportBinding,
    ) -> Result<Value<'p>> {
        let exports = self.require(module, source)?;
        Ok(match binding {
            ImportBinding::Named { imported, .. } => match &exports {
                Value::Map(map) => map.get(imported).cloned().unwrap_or(Value::Unknown),
                _ => Value::Unknown,
            },
            ImportBinding::Default { .. } => match &exports {
                Value::Map(map) if map.contains_key("default") => {
                    map.get("default").cloned().unwrap_or(Value::Unknown)
                }
                _ => exports,
            },
            ImportBinding::Namespace { .. } => exports,
        })
    }

    /// Exports of the module `specifier` refers to from `module`.
    pub fn require(&self, module: ModuleId, specifier: &str) -> Result<Value<'p>> {
        match self.index.link(module, specifier) {
            None => {
                self.diagnostics.warn(format!(
                    "package '{}' is not analyzed; its exports are unknown",
                    specifier
                ));
                Ok(Value::Unknown)
            }
            Some(Link::Failed(reason)) => Err(DocgenError::ModuleLoad {
                specifier: specifier.to_string(),
                importer: self.index.module(module).path.clone(),
                reason: reason.clone(),
            }),
            Some(Link::Loaded(id)) => self.exports_of(*id),
        }
    }

    fn exports_of(&self, id: ModuleId) -> Result<Value<'p>> {
        if let Some(value) = self.exports.borrow().get(&id) {
            return Ok(value.clone());
        }
        if !self.exporting.borrow_mut().insert(id) {
            self.diagnostics.warn(format!(
                "circular require of {}; treated as unknown",
                self.index.module(id).path.display()
            ));
            return Ok(Value::Unknown);
        }
        let result = self.evaluate_exports(id);
        self.exporting.borrow_mut().remove(&id);

        let value = result?;
        self.exports.borrow_mut().insert(id, value.clone());
        Ok(value)
    }

    fn evaluate_exports(&self, id: ModuleId) -> Result<Value<'p>> {
        let index = self.index;
        let program = match &index.module(id).source {
            ModuleSource::Json(json) => return Ok(Value::from_json(json)),
            ModuleSource::Script(program) => program,
        };

        let scope = Scope::default();
        let mut exports = Value::Map(IndexMap::new());

        for statement in &program.body {
            match &statement.kind {
                StatementKind::Expression(expr) => {
                    // `a = b = value` assigns `value` to every target in the chain.
                    let mut targets = Vec::new();
                    let mut value = expr;
                    while let ExprKind::Assign { target, value: rhs } = &value.kind {
                        targets.push(&**target);
                        value = &**rhs;
                    }
                    let targets: Vec<_> = targets.into_iter().filter_map(export_target).collect();
                    if targets.is_empty() {
                        continue;
                    }
                    let value = self.eval(id, value, &scope)?;
                    for target in targets.into_iter().rev() {
                        match target {
                            ExportTarget::Whole => exports = value.clone(),
                            ExportTarget::Named(name) => {
                                export_named(&mut exports, name, value.clone())
                            }
                        }
                    }
                }
                StatementKind::Declare {
                    declarators,
                    exported: true,
                } => {
                    for declarator in declarators {
                        if let Binding::Ident(name) = &declarator.binding {
                            let value = self.declared(id, declarator, name)?;
                            export_named(&mut exports, name, value);
                        }
                    }
                }
                StatementKind::ExportDefault(expr) => {
                    let value = self.eval(id, expr, &scope)?;
                    export_named(&mut exports, "default", value);
                }
                StatementKind::ExportNames(names) => {
                    for (local, exported) in names {
                        let value = self.lookup(id, local, &scope)?;
                        export_named(&mut exports, exported, value);
                    }
                }
                _ => {}
            }
        }
        Ok(exports)
    }
}

/// Add `name` to exports that are still a mapping.
fn export_named<'p>(exports: &mut Value<'p>, name: &str, value: Value<'p>) {
    if let Value::Map(map) = exports {
        map.insert(name.to_string(), value);
    }
}

/// Member access. A mapping that has the property yields its entry; anything else
/// yields the property name itself, so type paths such as `Schema.Types.ObjectId`
/// still produce a usable label when their root cannot be resolved.
fn member<'p>(object: Value<'p>, property: &str) -> Value<'p> {
    match object {
        Value::Map(mut map) if map.contains_key(property) => {
            map.swap_remove(property).unwrap_or(Value::Unknown)
        }
        Value::TypeLabel(_) => Value::Native(property.to_string()),
        _ => Value::Str(property.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// Resolve the initializer of `name` in `source` (an entry file in `dir`).
    fn resolve_in(dir: &Path, source: &str, name: &str) -> Result<String> {
        let diagnostics = Diagnostics::new(false);
        let config = Config::default();
        let index = ModuleIndex::from_source(source.to_string(), &dir.join("model.js"), &diagnostics)?;
        let resolver = Resolver::new(&index, &config, &diagnostics);
        let value = resolver.lookup(ENTRY, name, &Scope::default())?;
        Ok(value.to_string())
    }

    fn resolve(source: &str, name: &str) -> String {
        let dir = tempdir().unwrap();
        resolve_in(dir.path(), source, name).unwrap()
    }

    #[test]
    fn test_literals_and_collections() {
        assert_eq!(resolve("const x = 'guest';", "x"), "'guest'");
        assert_eq!(resolve("const x = -5;", "x"), "-5");
        assert_eq!(resolve("const x = [1, 'a', null];", "x"), "[ 1, 'a', null ]");
        assert_eq!(resolve("const x = { a: 1, 'b-c': true };", "x"), "{ a: 1, 'b-c': true }");
        assert_eq!(resolve("const x = /^[a-z]+$/i;", "x"), "/^[a-z]+$/i");
        assert_eq!(resolve("const x = 10n;", "x"), "10n");
    }

    #[test]
    fn test_builtin_and_unknown_names() {
        assert_eq!(resolve("const x = Date;", "x"), "Date");
        assert_eq!(resolve("const x = Date.now;", "x"), "[Function: now]");
        assert_eq!(resolve("const x = somethingElse;", "x"), "undefined");
        assert_eq!(resolve("const x = undefined;", "x"), "undefined");
    }

    #[test]
    fn test_member_placeholder() {
        assert_eq!(
            resolve("const { Schema } = require('mongoose');\nconst x = Schema.Types.ObjectId;", "x"),
            "'ObjectId'"
        );
        assert_eq!(resolve("const o = { a: 1 };\nconst x = o.a;", "x"), "1");
        assert_eq!(resolve("const o = { a: 1 };\nconst x = o.b;", "x"), "'b'");
    }

    #[test]
    fn test_spread_and_override_order() {
        assert_eq!(
            resolve("const base = { a: 1, b: 2 };\nconst x = { ...base, a: 3, c: 4 };", "x"),
            "{ a: 3, b: 2, c: 4 }"
        );
        assert_eq!(resolve("const a = [1];\nconst x = [...a, 2];", "x"), "[ 1, 2 ]");
    }

    #[test]
    fn test_operators() {
        assert_eq!(resolve("const x = 2 * 3 + 1;", "x"), "7");
        assert_eq!(resolve("const x = 'a' + 1;", "x"), "'a1'");
        assert_eq!(resolve("const n = 3;\nconst x = `n=${n}`;", "x"), "'n=3'");
        assert_eq!(resolve("const x = 1 < 2 ? 'yes' : 'no';", "x"), "'yes'");
        assert_eq!(resolve("const x = null ?? 5;", "x"), "5");
        assert_eq!(resolve("const x = '' || 'fallback';", "x"), "'fallback'");
        assert_eq!(resolve("const x = typeof 'a';", "x"), "'string'");
        assert_eq!(resolve("const x = !0;", "x"), "true");
    }

    #[test]
    fn test_helper_functions() {
        let source = "\
const positive = (max = 100) => ({ min: 0, max });
function label({ name, suffix = '!' }) {
  const full = name + suffix;
  return full;
}
const x = positive();
const y = positive(5);
const z = label({ name: 'hi' });";
        assert_eq!(resolve(source, "x"), "{ min: 0, max: 100 }");
        assert_eq!(resolve(source, "y"), "{ min: 0, max: 5 }");
        assert_eq!(resolve(source, "z"), "'hi!'");
    }

    #[test]
    fn test_function_values_print_with_name() {
        assert_eq!(resolve("function check(v) { return v; }\nconst x = check;", "x"), "[Function: check]");
        assert_eq!(resolve("const x = () => 1;", "x"), "[Function (anonymous)]");
    }

    #[test]
    fn test_recursive_helper_is_bounded() {
        assert_eq!(resolve("const f = n => f(n + 1);\nconst x = f(0);", "x"), "undefined");
    }

    #[test]
    fn test_branching_recursion_is_bounded() {
        let source = "const f = n => f(n + 1) + f(n + 1);\nconst x = f(0);\nconst y = 2;";
        assert_eq!(resolve(source, "x"), "undefined");
        assert_eq!(resolve(source, "y"), "2");
    }

    #[test]
    fn test_self_reference_is_unknown() {
        assert_eq!(resolve("const a = b;\nconst b = a;", "a"), "undefined");
    }

    #[test]
    fn test_require_commonjs_module() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("helpers.js"),
            "const opts = { min: 0 };\nmodule.exports = { opts };\nmodule.exports.extra = 'x';",
        )
        .unwrap();
        let source = "const { opts, extra } = require('./helpers');\nconst x = opts;\nconst y = extra;";
        assert_eq!(resolve_in(dir.path(), source, "x").unwrap(), "{ min: 0 }");
        assert_eq!(resolve_in(dir.path(), source, "y").unwrap(), "'x'");
    }

    #[test]
    fn test_import_es_module_and_json() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("roles.mjs"),
            "export const roles = ['user', 'admin'];\nexport default 'user';",
        )
        .unwrap();
        fs::write(dir.path().join("limits.json"), r#"{ "max": 99 }"#).unwrap();
        let source = "\
import fallback, { roles } from './roles.mjs';
import * as all from './roles.mjs';
const limits = require('./limits.json');
const x = roles;
const y = fallback;
const z = limits.max;
const w = all.default;";
        assert_eq!(resolve_in(dir.path(), source, "x").unwrap(), "[ 'user', 'admin' ]");
        assert_eq!(resolve_in(dir.path(), source, "y").unwrap(), "'user'");
        assert_eq!(resolve_in(dir.path(), source, "z").unwrap(), "99");
        assert_eq!(resolve_in(dir.path(), source, "w").unwrap(), "'user'");
    }

    #[test]
    fn test_export_names_list() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("shared.js"),
            "const min = 1;\nconst max = 9;\nexport { min, max as upper };",
        )
        .unwrap();
        let source = "import { min, upper } from './shared.js';\nconst x = [min, upper];";
        assert_eq!(resolve_in(dir.path(), source, "x").unwrap(), "[ 1, 9 ]");
    }

    #[test]
    fn test_missing_local_module_is_fatal_only_when_used() {
        let dir = tempdir().unwrap();
        let source = "const h = require('./missing');\nconst x = 1;\nconst y = h;";
        assert_eq!(resolve_in(dir.path(), source, "x").unwrap(), "1");
        let err = resolve_in(dir.path(), source, "y").unwrap_err();
        assert!(matches!(err, DocgenError::ModuleLoad { .. }));
    }

    #[test]
    fn test_circular_modules_resolve() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.js"),
            "const b = require('./b');\nmodule.exports = { fromB: b.value, value: 1 };",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.js"),
            "const a = require('./a');\nmodule.exports = { value: 2, fromA: a };",
        )
        .unwrap();
        let source = "const a = require('./a');\nconst x = a.fromB;";
        assert_eq!(resolve_in(dir.path(), source, "x").unwrap(), "2");
    }
}
