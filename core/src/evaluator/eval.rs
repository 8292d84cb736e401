use std::sync::Arc;

use ecow::EcoString;
use smallvec::SmallVec;

use crate::evaluator::error::{Exception, ExceptionKind};
use crate::evaluator::operators::{eval_binary, eval_unary, to_number};
use crate::evaluator::Scope;
use crate::logging::{LogLevel, LogMessage};
use crate::parser::ast::{Expr, ExprKind, Literal, LogicalOp, Stmt, StmtKind};
use crate::runtime::heap::{BoundFunction, ObjectAddr};
use crate::runtime::state::{Callable, State};
use crate::values::{Variant, codec};

type EvalResult<T> = Result<T, Exception>;

/// Arguments of a single call; most calls pass only a few.
pub(crate) type Args = SmallVec<[Variant; 4]>;

/// Globals available to every document unless shadowed.
const BUILTINS: &[&str] = &["console", "Math"];

/// Local variables and receiver of one running function or binding.
struct Frame<'f> {
    scope: &'f Scope,
    this: ObjectAddr,
    locals: Vec<(EcoString, Variant)>,
}

impl Frame<'_> {
    fn local(&self, name: &str) -> Option<&Variant> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn local_mut(&mut self, name: &str) -> Option<&mut Variant> {
        self.locals
            .iter_mut()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

enum Flow {
    Normal,
    Return(Variant),
}

/// Tree-walking evaluator for document code.
///
/// Runs on the engine thread with exclusive access to the engine state.
pub(crate) struct Evaluator<'s> {
    state: &'s mut State,
    depth: usize,
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(state: &'s mut State) -> Self {
        Evaluator { state, depth: 0 }
    }

    /// Evaluate a binding expression with `this` as the receiver.
    pub(crate) fn eval_expr(
        &mut self,
        scope: &Scope,
        this: ObjectAddr,
        expr: &Expr,
    ) -> EvalResult<Variant> {
        let mut frame = Frame {
            scope,
            this,
            locals: Vec::new(),
        };
        self.eval(&mut frame, expr)
    }

    /// Run a statement block; the result is its `return` value or null.
    pub(crate) fn run_block(
        &mut self,
        scope: &Scope,
        this: ObjectAddr,
        body: &[Stmt],
    ) -> EvalResult<Variant> {
        let mut frame = Frame {
            scope,
            this,
            locals: Vec::new(),
        };
        self.exec_all(&mut frame, body)
    }

    pub(crate) fn call_function(
        &mut self,
        function: &BoundFunction,
        this: ObjectAddr,
        args: &[Variant],
        line: usize,
    ) -> EvalResult<Variant> {
        let max_depth = self.state.options.max_call_depth;
        if self.depth >= max_depth {
            return Err(self.exception(
                &function.scope,
                ExceptionKind::RangeError,
                "Maximum call stack size exceeded".to_string(),
                line,
            ));
        }

        let decl = function.decl.clone();
        let mut frame = Frame {
            scope: &function.scope,
            this,
            locals: decl
                .params
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), args.get(i).cloned().unwrap_or(Variant::Null)))
                .collect(),
        };

        self.depth += 1;
        let result = self.exec_all(&mut frame, &decl.body);
        self.depth -= 1;
        result
    }

    fn exec_all(&mut self, frame: &mut Frame<'_>, body: &[Stmt]) -> EvalResult<Variant> {
        for stmt in body {
            if let Flow::Return(value) = self.exec(frame, stmt)? {
                return Ok(value);
            }
        }
        Ok(Variant::Null)
    }

    fn exec(&mut self, frame: &mut Frame<'_>, stmt: &Stmt) -> EvalResult<Flow> {
        match &stmt.kind {
            StmtKind::Var { name, init } => {
                let value = match init {
                    Some(expr) => self.eval(frame, expr)?,
                    None => Variant::Null,
                };
                // `var` is function scoped, so a redeclaration just rebinds.
                match frame.local_mut(name) {
                    Some(slot) => *slot = value,
                    None => frame.locals.push((name.clone(), value)),
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(frame, expr)?,
                    None => Variant::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(frame, cond)?.truthy() {
                    self.exec(frame, then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec(frame, else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::Assign { target, op, value } => {
                let mut value = self.eval(frame, value)?;
                if let Some(op) = op {
                    let current = self.eval(frame, target)?;
                    value = eval_binary(*op, &current, &value);
                }
                self.assign(frame, target, value)?;
                Ok(Flow::Normal)
            }
            StmtKind::Expr(expr) => {
                self.eval(frame, expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Block(body) => {
                for stmt in body {
                    if let Flow::Return(value) = self.exec(frame, stmt)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Empty => Ok(Flow::Normal),
        }
    }

    fn eval(&mut self, frame: &mut Frame<'_>, expr: &Expr) -> EvalResult<Variant> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Variant::Float64(*n),
                Literal::String(s) => Variant::String(s.clone()),
                Literal::Bool(b) => Variant::Bool(*b),
                Literal::Null => Variant::Null,
            }),

            ExprKind::Ident(name) => self.resolve(frame, name).ok_or_else(|| {
                self.exception(
                    frame.scope,
                    ExceptionKind::ReferenceError,
                    format!("{} is not defined", name),
                    expr.line,
                )
            }),

            ExprKind::Member { object, name } => {
                if let ExprKind::Ident(global) = &object.kind {
                    if global == "Math" && self.is_builtin(frame, global) {
                        return match name.as_str() {
                            "PI" => Ok(Variant::Float64(core::f64::consts::PI)),
                            "E" => Ok(Variant::Float64(core::f64::consts::E)),
                            _ => Ok(Variant::Null),
                        };
                    }
                }
                let target = self.eval(frame, object)?;
                self.member(frame, target, name, expr.line)
            }

            ExprKind::Call { callee, args } => self.eval_call(frame, callee, args, expr.line),

            ExprKind::Unary { op, operand } => {
                let operand = self.eval(frame, operand)?;
                Ok(eval_unary(*op, &operand))
            }

            ExprKind::Binary { op, left, right } => {
                let left = self.eval(frame, left)?;
                let right = self.eval(frame, right)?;
                Ok(eval_binary(*op, &left, &right))
            }

            ExprKind::Logical { op, left, right } => {
                let left = self.eval(frame, left)?;
                match (op, left.truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => self.eval(frame, right),
                }
            }

            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(frame, cond)?.truthy() {
                    self.eval(frame, then_branch)
                } else {
                    self.eval(frame, else_branch)
                }
            }
        }
    }

    /// Name lookup: locals, document ids, `parent`, the receiver's properties,
    /// the document root's properties, then the enclosing contexts.
    fn resolve(&self, frame: &Frame<'_>, name: &str) -> Option<Variant> {
        if let Some(value) = frame.local(name) {
            return Some(value.clone());
        }
        if name == "undefined" {
            return Some(Variant::Null);
        }
        let namespaces = &self.state.namespaces;
        if let Some(value) = namespaces.get_local(frame.scope.context, name) {
            return Some(value.clone());
        }
        if name == "parent" {
            return Some(self.parent_of(frame.this));
        }
        for addr in [frame.this, frame.scope.root] {
            if let Some(slot) = self.state.heap.get(addr).ok().and_then(|o| o.slot(name)) {
                return Some(slot.value.clone());
            }
        }
        namespaces
            .lookup_inherited(frame.scope.context, name)
            .cloned()
    }

    fn is_builtin(&self, frame: &Frame<'_>, name: &str) -> bool {
        BUILTINS.contains(&name) && self.resolve(frame, name).is_none()
    }

    fn parent_of(&self, addr: ObjectAddr) -> Variant {
        match self.state.heap.get(addr).ok().and_then(|o| o.parent) {
            Some(parent) => Variant::Object(parent),
            None => Variant::Null,
        }
    }

    fn member(
        &mut self,
        frame: &Frame<'_>,
        target: Variant,
        name: &str,
        line: usize,
    ) -> EvalResult<Variant> {
        match target {
            Variant::Object(addr) => {
                let object = self
                    .state
                    .heap
                    .get(addr)
                    .map_err(|e| Exception::from_error(e, &frame.scope.identifier, line))?;
                if let Some(slot) = object.slot(name) {
                    Ok(slot.value.clone())
                } else if name == "parent" {
                    Ok(self.parent_of(addr))
                } else {
                    Ok(Variant::Null)
                }
            }
            Variant::Host(id) => {
                let field = self.state.hosts.get(id).and_then(|host| host.field(name));
                match field {
                    Some(value) => codec::encode(&mut *self.state, value)
                        .map_err(|e| Exception::from_error(e, &frame.scope.identifier, line)),
                    None => Ok(Variant::Null),
                }
            }
            Variant::String(s) if name == "length" => {
                Ok(Variant::Float64(s.chars().count() as f64))
            }
            Variant::Null => Err(self.exception(
                frame.scope,
                ExceptionKind::TypeError,
                format!("Cannot read property '{}' of null", name),
                line,
            )),
            _ => Ok(Variant::Null),
        }
    }

    fn eval_call(
        &mut self,
        frame: &mut Frame<'_>,
        callee: &Expr,
        args: &[Expr],
        line: usize,
    ) -> EvalResult<Variant> {
        match &callee.kind {
            ExprKind::Member { object, name } => {
                if let ExprKind::Ident(global) = &object.kind {
                    if self.is_builtin(frame, global) {
                        let args = self.eval_args(frame, args)?;
                        return self.call_builtin(frame, global, name, &args, line);
                    }
                }
                let target = self.eval(frame, object)?;
                let args = self.eval_args(frame, args)?;
                self.call_method(frame, target, name, &args, line)
            }
            ExprKind::Ident(name) => {
                let args = self.eval_args(frame, args)?;
                for receiver in [frame.this, frame.scope.root] {
                    if self.state.method(receiver, name).is_ok() {
                        return self.call_method(frame, Variant::Object(receiver), name, &args, line);
                    }
                }
                let (kind, message) = match self.resolve(frame, name) {
                    Some(_) => (ExceptionKind::TypeError, format!("{} is not a function", name)),
                    None => (ExceptionKind::ReferenceError, format!("{} is not defined", name)),
                };
                Err(self.exception(frame.scope, kind, message, line))
            }
            _ => Err(self.exception(
                frame.scope,
                ExceptionKind::TypeError,
                "expression is not a function".to_string(),
                line,
            )),
        }
    }

    fn eval_args(&mut self, frame: &mut Frame<'_>, args: &[Expr]) -> EvalResult<Args> {
        let mut values = Args::new();
        for arg in args {
            values.push(self.eval(frame, arg)?);
        }
        Ok(values)
    }

    fn call_method(
        &mut self,
        frame: &Frame<'_>,
        target: Variant,
        name: &str,
        args: &[Variant],
        line: usize,
    ) -> EvalResult<Variant> {
        let identifier = frame.scope.identifier.clone();
        let addr = match target {
            Variant::Object(addr) => addr,
            Variant::Null => {
                return Err(self.exception(
                    frame.scope,
                    ExceptionKind::TypeError,
                    format!("Cannot call method '{}' of null", name),
                    line,
                ));
            }
            _ => {
                return Err(self.exception(
                    frame.scope,
                    ExceptionKind::TypeError,
                    format!("{} is not a function", name),
                    line,
                ));
            }
        };

        match self.state.method(addr, name) {
            Ok(Callable::Native(method)) => {
                if args.len() != method.arity {
                    return Err(Exception::from_error(
                        crate::api::Error::Arity {
                            method: name.to_string(),
                            expected: method.arity,
                            found: args.len(),
                        },
                        &identifier,
                        line,
                    ));
                }
                (method.call)(&mut *self.state, addr, args)
                    .map_err(|e| Exception::from_error(e, &identifier, line))
            }
            Ok(Callable::Function(function)) => self.call_function(&function, addr, args, line),
            Err(e) => Err(Exception::from_error(e, &identifier, line)),
        }
    }

    fn call_builtin(
        &mut self,
        frame: &Frame<'_>,
        global: &str,
        name: &str,
        args: &[Variant],
        line: usize,
    ) -> EvalResult<Variant> {
        if global == "console" {
            let level = match name {
                "log" | "debug" => LogLevel::Debug,
                "info" => LogLevel::Info,
                "warn" => LogLevel::Warning,
                "error" => LogLevel::Error,
                _ => {
                    return Err(self.exception(
                        frame.scope,
                        ExceptionKind::TypeError,
                        format!("console.{} is not a function", name),
                        line,
                    ));
                }
            };
            let text = args
                .iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            self.state.log(LogMessage {
                level,
                identifier: frame.scope.identifier.to_string(),
                line,
                text,
            });
            return Ok(Variant::Null);
        }

        let arg = |i: usize| args.get(i).map(to_number).unwrap_or(f64::NAN);
        let result = match name {
            "abs" => arg(0).abs(),
            "floor" => arg(0).floor(),
            "ceil" => arg(0).ceil(),
            "round" => (arg(0) + 0.5).floor(),
            "sqrt" => arg(0).sqrt(),
            "pow" => arg(0).powf(arg(1)),
            "min" => args.iter().map(to_number).fold(f64::INFINITY, f64::min),
            "max" => args.iter().map(to_number).fold(f64::NEG_INFINITY, f64::max),
            _ => {
                return Err(self.exception(
                    frame.scope,
                    ExceptionKind::TypeError,
                    format!("Math.{} is not a function", name),
                    line,
                ));
            }
        };
        Ok(Variant::Float64(result))
    }

    fn assign(&mut self, frame: &mut Frame<'_>, target: &Expr, value: Variant) -> EvalResult<()> {
        let identifier = frame.scope.identifier.clone();
        let line = target.line;
        match &target.kind {
            ExprKind::Ident(name) => {
                if let Some(local) = frame.local_mut(name) {
                    *local = value;
                    return Ok(());
                }
                for receiver in [frame.this, frame.scope.root] {
                    let has_slot = self
                        .state
                        .heap
                        .get(receiver)
                        .is_ok_and(|o| o.slot(name).is_some());
                    if has_slot {
                        return self
                            .state
                            .write_property(receiver, name, value)
                            .map_err(|e| Exception::from_error(e, &identifier, line));
                    }
                }
                Err(self.exception(
                    frame.scope,
                    ExceptionKind::ReferenceError,
                    format!("{} is not defined", name),
                    line,
                ))
            }
            ExprKind::Member { object, name } => match self.eval(frame, object)? {
                Variant::Object(addr) => self
                    .state
                    .write_property(addr, name, value)
                    .map_err(|e| Exception::from_error(e, &identifier, line)),
                _ => Err(self.exception(
                    frame.scope,
                    ExceptionKind::TypeError,
                    format!("Cannot set property '{}'", name),
                    line,
                )),
            },
            _ => Err(self.exception(
                frame.scope,
                ExceptionKind::ReferenceError,
                "Invalid left-hand side in assignment".to_string(),
                line,
            )),
        }
    }

    fn exception(
        &self,
        scope: &Scope,
        kind: ExceptionKind,
        message: String,
        line: usize,
    ) -> Exception {
        Exception {
            kind,
            message,
            identifier: Arc::clone(&scope.identifier),
            line,
        }
    }
}
