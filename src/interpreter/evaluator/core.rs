use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use tracing::debug;

use crate::{
    ast::{LiteralValue, Node, NodeKind},
    config::Options,
    error::{Diagnostic, RuntimeError, diagnostic::SourceFile},
    interpreter::{
        evaluator::scope::Scope,
        parser::core::parse_source,
        prelude,
        value::{
            core::Value,
            function::{Function, Parameter},
            object::{CellRef, Object},
            pointer::Pointer,
        },
    },
    util::stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Execution continues with the next statement; holds the statement's
    /// value.
    Next(Value),
    /// A `return` was executed; the enclosing function (or the program)
    /// ends with this value.
    Return(Value),
}

impl Flow {
    /// The value carried by the flow, whichever way the statement finished.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Next(value) | Self::Return(value) => value,
        }
    }
}

/// Maximum number of calls that may be running at once.
pub const MAX_CALL_DEPTH: usize = 5_000;

/// Stores the runtime evaluation context.
///
/// A context owns the globals Object shared by every scope it runs, and the
/// options that control evaluation. Cloning a context is cheap and yields a
/// handle to the same state.
///
/// Function values and the `ctx` record only keep a [`WeakContext`]. When
/// the last `Context` handle is dropped the globals are cleared, so cycles
/// running through them (a global holding a function, `ctx.globals`) are
/// released with it.
///
/// ## Usage
///
/// Create one context per program with [`Context::new`], which installs the
/// prelude, then run source against a root scope:
///
/// ```
/// use kll::{config::Options, interpreter::evaluator::core::Context};
///
/// let context = Context::new(Options::default());
/// let scope = context.root_scope("__main__");
/// let value = context.eval("local x = 2\nx * 21", &scope).unwrap();
/// assert_eq!(value.to_string(), "42");
/// ```
#[derive(Debug, Clone)]
pub struct Context(Rc<State>);

#[derive(Debug)]
struct State {
    globals: Object,
    options: Options,
    calls:   Cell<usize>,
}

impl Drop for State {
    fn drop(&mut self) {
        let released = self.globals.clear();
        debug!(released, "released globals");
    }
}

/// A handle to a [`Context`] that does not keep it alive.
#[derive(Debug, Clone)]
pub struct WeakContext(Weak<State>);

impl WeakContext {
    /// Returns the context if it still exists.
    ///
    /// # Errors
    /// `RuntimeError::ContextDropped` once every [`Context`] handle is gone.
    pub fn upgrade(&self) -> EvalResult<Context> {
        self.0.upgrade().map(Context).ok_or(RuntimeError::ContextDropped)
    }
}

impl Context {
    /// Creates a context whose globals hold the prelude.
    #[must_use]
    pub fn new(options: Options) -> Self {
        let context = Self::bare(options);
        prelude::install(&context);
        context
    }

    /// Creates a context with empty globals.
    #[must_use]
    pub fn bare(options: Options) -> Self {
        Self(Rc::new(State { globals: Object::new(),
                             options,
                             calls: Cell::new(0) }))
    }

    /// Variables visible from every scope: the prelude and everything
    /// declared with `global`.
    #[must_use]
    pub fn globals(&self) -> &Object {
        &self.0.globals
    }

    /// Evaluation options.
    #[must_use]
    pub fn options(&self) -> Options {
        self.0.options
    }

    /// Creates a handle that does not keep the context alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    /// Counts a call for as long as the returned guard lives.
    ///
    /// # Errors
    /// `RuntimeError::RecursionLimit` when [`MAX_CALL_DEPTH`] calls are
    /// already running.
    pub(crate) fn enter_call(&self) -> EvalResult<CallGuard<'_>> {
        let calls = &self.0.calls;
        if calls.get() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::RecursionLimit { limit: MAX_CALL_DEPTH });
        }
        calls.set(calls.get() + 1);
        Ok(CallGuard(calls))
    }

    /// Creates the root scope of a program or module.
    ///
    /// The scope holds the constant `__name__`, set to `name`.
    #[must_use]
    pub fn root_scope(&self, name: &str) -> Scope {
        let locals = Object::new();
        locals.declare("__name__", Value::from(name), 0, true);
        Scope::root(locals)
    }

    /// Creates the root scope of an imported file; `__name__` is the
    /// file's name.
    #[must_use]
    pub fn file_scope(&self, file: &Rc<SourceFile>) -> Scope {
        let locals = Object::new();
        locals.declare("__name__", Value::from(file.name.as_str()), 0, true);
        Scope::for_file(locals, Rc::clone(file))
    }

    /// Parses and runs `source`, returning the value of its last statement.
    ///
    /// A top-level `return` ends the program early with its value.
    ///
    /// # Errors
    /// The first syntax or runtime error.
    pub fn eval(&self, source: &str, scope: &Scope) -> Result<Value, Diagnostic> {
        let nodes = self.parse(source)?;
        Ok(self.eval_program(&nodes, scope)?)
    }

    /// Parses and runs `source`, discarding the results.
    ///
    /// # Errors
    /// The first syntax or runtime error.
    pub fn exec(&self, source: &str, scope: &Scope) -> Result<(), Diagnostic> {
        let nodes = self.parse(source)?;
        Ok(self.exec_program(&nodes, scope)?)
    }

    fn parse(&self, source: &str) -> Result<Vec<Node>, Diagnostic> {
        let nodes = parse_source(source)?;
        if self.options().debug {
            println!("{{");
            for (i, node) in nodes.iter().enumerate() {
                println!("{i}:{node}");
            }
            println!("}}");
        }
        Ok(nodes)
    }

    /// Runs parsed statements at depth 0 and returns the last value.
    ///
    /// # Errors
    /// The first runtime error; later statements are not run.
    pub fn eval_program(&self, nodes: &[Node], scope: &Scope) -> EvalResult<Value> {
        let mut last = Value::Null;
        for node in nodes {
            match self.evaluate(node, scope, 0)? {
                Flow::Next(value) => last = value,
                Flow::Return(value) => return Ok(value),
            }
        }
        Ok(last)
    }

    /// Runs parsed statements at depth 0.
    ///
    /// # Errors
    /// The first runtime error; later statements are not run.
    pub fn exec_program(&self, nodes: &[Node], scope: &Scope) -> EvalResult<()> {
        self.eval_program(nodes, scope).map(drop)
    }

    /// Runs the statements of a block or function body.
    ///
    /// Stops early and passes the flow on when a statement returns.
    pub(crate) fn run_block(&self, body: &[Node], scope: &Scope, depth: usize) -> EvalResult<Flow> {
        for node in body {
            if let Flow::Return(value) = self.evaluate(node, scope, depth)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next(Value::Null))
    }

    /// Evaluates a node in expression position.
    ///
    /// A `return` nested inside the expression just yields its value.
    pub fn eval_value(&self, node: &Node, scope: &Scope, depth: usize) -> EvalResult<Value> {
        Ok(self.evaluate(node, scope, depth)?.into_value())
    }

    /// Evaluates a node.
    ///
    /// This is the dispatcher for every node kind. Expressions finish with
    /// [`Flow::Next`]; `return`, and any `if` whose body returned, finish
    /// with [`Flow::Return`].
    ///
    /// # Parameters
    /// - `node`: Node to evaluate.
    /// - `scope`: Scope that variables are resolved in.
    /// - `depth`: Current nesting depth; blocks and calls run one deeper.
    pub fn evaluate(&self, node: &Node, scope: &Scope, depth: usize) -> EvalResult<Flow> {
        stack::grow(|| self.evaluate_node(node, scope, depth))
    }

    fn evaluate_node(&self, node: &Node, scope: &Scope, depth: usize) -> EvalResult<Flow> {
        let value = match &node.kind {
            NodeKind::Literal(literal) => Self::eval_literal(literal),
            NodeKind::Group(inner) => return self.evaluate(inner, scope, depth),
            NodeKind::Variable(name) => self.eval_variable(name, node, scope)?,
            NodeKind::GetAttr { base, attribute } => {
                let base = self.eval_value(base, scope, depth)?;
                Self::read_attribute_chain(&base, attribute)?
            },
            NodeKind::Assign { target, value } => self.eval_assign(target, value, scope, depth)?,
            NodeKind::CreateLocal(declared) => {
                self.eval_declaration(declared, scope.locals(), scope, depth, depth)?
            },
            NodeKind::CreateGlobal(declared) => {
                self.eval_declaration(declared, self.globals(), scope, depth, 0)?
            },
            NodeKind::Binary { op, left, right } => {
                self.eval_binary_op(*op, left, right, node, scope, depth)?
            },
            NodeKind::Negate(operand) => {
                let operand = self.eval_value(operand, scope, depth)?;
                Value::Number(-operand.to_number().map_err(|_| dangling(node))?)
            },
            NodeKind::If { condition, body } => {
                return self.eval_if(condition, body, node, scope, depth);
            },
            NodeKind::Function { name,
                                 parameters,
                                 body, } => {
                self.eval_function(name.as_deref(), parameters, body, scope, depth)?
            },
            NodeKind::Call { callee, arguments } => {
                self.eval_call(callee, arguments, scope, depth)?
            },
            NodeKind::Exist(target) => {
                let needle = Value::Node(Rc::clone(target));
                Value::Bool(scope.contains(&needle) || self.globals_contain(&needle))
            },
            NodeKind::Pointer(target) => self.eval_pointer(target, scope)?,
            NodeKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval_value(value, scope, depth)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            },
        };
        Ok(Flow::Next(value))
    }

    fn eval_literal(literal: &LiteralValue) -> Value {
        Value::from(literal)
    }

    /// Reads a variable: scope chain first, then globals.
    fn eval_variable(&self, name: &str, node: &Node, scope: &Scope) -> EvalResult<Value> {
        self.resolve(name, scope)
            .map(|cell| cell.borrow().value.clone())
            .ok_or_else(|| variable_not_found(name, node))
    }

    fn globals_contain(&self, needle: &Value) -> bool {
        Value::Object(self.globals().clone()).contains(needle).unwrap_or(false)
    }

    /// Declares a variable in `target` at `cell_depth`.
    ///
    /// `declared` is either a bare `Variable` (initialised to null) or an
    /// `Assign` whose right side is evaluated first, at `depth`.
    fn eval_declaration(&self,
                        declared: &Node,
                        target: &Object,
                        scope: &Scope,
                        depth: usize,
                        cell_depth: usize)
                        -> EvalResult<Value> {
        let (name, value) = match &declared.kind {
            NodeKind::Assign { target, value } => {
                let value = self.eval_value(value, scope, depth)?;
                (target.variable_name(), value)
            },
            _ => (declared.variable_name(), Value::Null),
        };
        if let Some(name) = name {
            debug!(name, depth = cell_depth, "declared variable");
            target.declare(name, value.clone(), cell_depth, false);
        }
        Ok(value)
    }

    /// Runs an `if`. The body runs one level deeper and its cells are
    /// purged afterwards. There is no `else`.
    fn eval_if(&self,
               condition: &Node,
               body: &[Node],
               node: &Node,
               scope: &Scope,
               depth: usize)
               -> EvalResult<Flow> {
        let condition = self.eval_value(condition, scope, depth)?;
        if !condition.to_bool().map_err(|_| dangling(node))? {
            return Ok(Flow::Next(Value::Null));
        }
        let _guard = scope.enter(depth + 1);
        self.run_block(body, scope, depth + 1)
    }

    /// Creates a function value.
    ///
    /// Parameter defaults are evaluated now. The function captures `scope`;
    /// when it has a name it is also declared there at the current depth.
    fn eval_function(&self,
                     name: Option<&str>,
                     parameters: &[Node],
                     body: &Rc<[Node]>,
                     scope: &Scope,
                     depth: usize)
                     -> EvalResult<Value> {
        let mut declared = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let (name, default) = match &parameter.kind {
                NodeKind::Assign { target, value } => {
                    (target.variable_name(), self.eval_value(value, scope, depth)?)
                },
                _ => (parameter.variable_name(), Value::Null),
            };
            if let Some(name) = name {
                declared.push(Parameter { name: name.to_string(),
                                          default });
            }
        }

        let function = Value::Function(Rc::new(Function { name:       name.map(str::to_string),
                                                          parameters: declared,
                                                          body:       Rc::clone(body),
                                                          scope:      scope.clone(),
                                                          context:    self.downgrade(), }));
        if let Some(name) = name {
            debug!(name, depth, "declared function");
            scope.locals().declare(name, function.clone(), depth, false);
        }
        Ok(function)
    }

    /// Creates a pointer to the cell of a variable.
    fn eval_pointer(&self, target: &Node, scope: &Scope) -> EvalResult<Value> {
        let Some(name) = target.variable_name() else {
            return Err(RuntimeError::UnsupportedPointerTarget { line:   target.line,
                                                                column: target.column, });
        };
        let cell = self.resolve(name, scope).ok_or_else(|| variable_not_found(name, target))?;
        Ok(Value::Pointer(Pointer::to(&cell)))
    }

    /// Finds the cell of `name` in the scope chain, then in the globals.
    pub(crate) fn resolve(&self, name: &str, scope: &Scope) -> Option<CellRef> {
        scope.lookup(name).or_else(|| self.globals().cell(name))
    }

    /// Reads `a.b.c` style chains. The attribute side only holds variables
    /// and nested chains.
    pub(crate) fn read_attribute_chain(base: &Value, attribute: &Node) -> EvalResult<Value> {
        let mut current = base.clone();
        for name in attribute_path(attribute) {
            current = current.get_attribute(name).map_err(|_| dangling(attribute))?;
        }
        Ok(current)
    }
}

/// Releases a call counted by [`Context::enter_call`].
#[must_use]
pub(crate) struct CallGuard<'a>(&'a Cell<usize>);

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// Flattens the attribute side of a `GetAttr` into its names.
pub(crate) fn attribute_path(attribute: &Node) -> Vec<&str> {
    let mut path = Vec::new();
    let mut current = attribute;
    loop {
        match &current.kind {
            NodeKind::Variable(name) => {
                path.push(name.as_str());
                return path;
            },
            NodeKind::GetAttr { base, attribute } => {
                path.extend(base.variable_name());
                current = attribute;
            },
            _ => return path,
        }
    }
}

/// Builds a `VariableNotFound` error at `node`.
pub(crate) fn variable_not_found(name: &str, node: &Node) -> RuntimeError {
    RuntimeError::VariableNotFound { name:   name.to_string(),
                                     line:   node.line,
                                     column: node.column, }
}

/// Builds a `DanglingPointer` error at `node`.
pub(crate) const fn dangling(node: &Node) -> RuntimeError {
    RuntimeError::DanglingPointer { line:   node.line,
                                    column: node.column, }
}
