use tracing::debug;

use crate::{
    ast::{Node, NodeKind},
    config::CallScope,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, dangling},
            scope::Scope,
        },
        value::{
            core::Value,
            function::{Function, KeywordArg, Kwargs},
        },
    },
};

impl Context {
    /// Evaluates a call.
    ///
    /// Arguments are evaluated first, in source order: `name = value`
    /// becomes a named argument, anything else a positional one. Then the
    /// callee is evaluated and invoked. Values that are not callable return
    /// null.
    ///
    /// # Errors
    /// - Errors raised while evaluating the arguments or the callee are
    ///   returned unchanged.
    /// - `RuntimeError::RecursionLimit` when
    ///   [`MAX_CALL_DEPTH`](super::core::MAX_CALL_DEPTH) calls are
    ///   already running. It passes through every enclosing call unwrapped.
    /// - Other errors raised by the call itself are wrapped in
    ///   `RuntimeError::CallFailed` at the callee's position. When the
    ///   callee was defined in another source text, the error is first
    ///   wrapped in `RuntimeError::InFile` naming that text.
    pub(crate) fn eval_call(&self,
                            callee: &Node,
                            arguments: &[Node],
                            scope: &Scope,
                            depth: usize)
                            -> EvalResult<Value> {
        let mut args = Vec::with_capacity(arguments.len());
        let mut kwargs = Kwargs::new();
        for argument in arguments {
            if let NodeKind::Assign { target, value } = &argument.kind
               && let Some(name) = target.variable_name()
            {
                let value = self.eval_value(value, scope, depth)?;
                kwargs.insert(name.to_string(),
                              KeywordArg { name: name.to_string(),
                                           value });
            } else {
                args.push(self.eval_value(argument, scope, depth)?);
            }
        }

        let function = self.eval_value(callee, scope, depth)?
                           .deref()
                           .map_err(|_| dangling(callee))?;
        let _call = self.enter_call()?;
        function.call(&args, &kwargs, depth).map_err(|cause| {
            let cause = match &function {
                Value::Function(function) if !function.scope.same_file(scope) => {
                    cause.in_file(function.scope.file().cloned())
                },
                _ => cause,
            };
            match cause {
                RuntimeError::RecursionLimit { .. } => cause,
                cause => RuntimeError::CallFailed { cause:  Box::new(cause),
                                                    line:   callee.line,
                                                    column: callee.column, },
            }
        })
    }

    /// Runs a user-defined function.
    ///
    /// Each parameter is bound one level below `depth`: a named argument
    /// wins over a positional one, and the declared default fills in when
    /// neither was passed. Where the bindings live depends on
    /// [`CallScope`]: in the function's captured scope (`Shared`) or in a
    /// fresh frame chained to it (`Isolated`).
    ///
    /// The body runs at `depth + 1`. Every cell created at that depth or
    /// deeper is removed afterwards, also when the body fails.
    ///
    /// # Returns
    /// The value of the first `return` executed, or null.
    ///
    /// # Example
    /// ```
    /// use kll::{config::Options, interpreter::evaluator::core::Context};
    ///
    /// let context = Context::new(Options::default());
    /// let scope = context.root_scope("__main__");
    /// let source = "function add(a, b = 10) { return a + b }\nadd(1) + add(b = 2, 1)";
    /// assert_eq!(context.eval(source, &scope).unwrap().to_string(), "14");
    /// ```
    pub fn call_function(&self,
                         function: &Function,
                         args: &[Value],
                         kwargs: &Kwargs,
                         depth: usize)
                         -> EvalResult<Value> {
        let inner = depth + 1;
        let scope = match self.options().call_scope {
            CallScope::Shared => function.scope.clone(),
            CallScope::Isolated => function.scope.child(),
        };
        let _guard = scope.enter(inner);

        for (i, parameter) in function.parameters.iter().enumerate() {
            let value = kwargs.get(&parameter.name)
                              .map(|arg| arg.value.clone())
                              .or_else(|| args.get(i).cloned())
                              .unwrap_or_else(|| parameter.default.clone());
            scope.locals().declare(parameter.name.clone(), value, inner, false);
        }

        debug!(name = function.name.as_deref().unwrap_or("<anonymous>"),
               depth = inner,
               "calling function");
        Ok(self.run_block(&function.body, &scope, inner)?.into_value())
    }
}
