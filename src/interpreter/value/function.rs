use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    ast::Node,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, WeakContext},
            scope::Scope,
        },
        value::{core::Value, pointer::DanglingPointer},
    },
};

/// A named argument passed as `name = value`.
#[derive(Debug, Clone)]
pub struct KeywordArg {
    /// The parameter name the argument targets.
    pub name:  String,
    /// The evaluated argument.
    pub value: Value,
}

/// Named arguments of a call, keyed by parameter name.
pub type Kwargs = HashMap<String, KeywordArg>;

/// A declared parameter of a user-defined function.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Parameter name.
    pub name:    String,
    /// Value used when the caller passes nothing for this parameter.
    /// Defaults are evaluated once, when the function value is created.
    pub default: Value,
}

/// A user-defined function.
///
/// The function keeps the scope that was active where it was defined and a
/// weak handle to the context that created it, so it can be called from
/// anywhere, including from host code, for as long as that context exists.
pub struct Function {
    /// Name given in the definition, if any.
    pub name:       Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Statements of the body.
    pub body:       Rc<[Node]>,
    /// Scope captured at definition time.
    pub scope:      Scope,
    /// Context the function runs in.
    pub context:    WeakContext,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
         .field("name", &self.name)
         .field("parameters", &self.parameters)
         .field("body", &self.body.len())
         .finish_non_exhaustive()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self.parameters
                             .iter()
                             .map(|parameter| parameter.name.as_str())
                             .collect::<Vec<_>>()
                             .join(", ");
        match &self.name {
            Some(name) => write!(f, "<function {name}({parameters})>"),
            None => write!(f, "<function ({parameters})>"),
        }
    }
}

/// Signature of host callbacks: positional arguments, named arguments and
/// the depth of the calling code.
pub type NativeCallback = dyn Fn(&[Value], &Kwargs, usize) -> EvalResult<Value>;

/// A callable implemented by the host.
///
/// # Example
/// ```
/// use kll::interpreter::value::{
///     core::Value,
///     function::{Kwargs, NativeFunction},
/// };
///
/// let count = NativeFunction::new(|args, _, _| Ok(Value::Number(args.len() as f64)));
/// let result = count.call(&[Value::Null, Value::Null], &Kwargs::new(), 0);
/// assert_eq!(result, Ok(Value::Number(2.0)));
/// ```
#[derive(Clone)]
pub struct NativeFunction(Rc<NativeCallback>);

impl NativeFunction {
    /// Wraps a host closure.
    pub fn new<F>(callback: F) -> Self
        where F: Fn(&[Value], &Kwargs, usize) -> EvalResult<Value> + 'static
    {
        Self(Rc::new(callback))
    }

    /// Invokes the callback.
    ///
    /// # Errors
    /// Whatever the callback returns.
    pub fn call(&self, args: &[Value], kwargs: &Kwargs, depth: usize) -> EvalResult<Value> {
        (self.0)(args, kwargs, depth)
    }

    /// Returns `true` if both handles wrap the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction")
    }
}

/// Looks up an argument of a host callable.
///
/// The positional argument at `index` wins; otherwise the named argument
/// `name` is used.
///
/// # Example
/// ```
/// use kll::interpreter::value::{
///     core::Value,
///     function::{KeywordArg, Kwargs, argument},
/// };
///
/// let mut kwargs = Kwargs::new();
/// kwargs.insert("x".to_string(),
///               KeywordArg { name:  "x".to_string(),
///                            value: Value::Number(2.0), });
///
/// assert_eq!(argument(&[], &kwargs, 0, "x"), Some(&Value::Number(2.0)));
/// assert_eq!(argument(&[Value::Null], &kwargs, 0, "x"), Some(&Value::Null));
/// assert_eq!(argument(&[], &kwargs, 1, "y"), None);
/// ```
#[must_use]
pub fn argument<'a>(args: &'a [Value],
                    kwargs: &'a Kwargs,
                    index: usize,
                    name: &str)
                    -> Option<&'a Value> {
    args.get(index).or_else(|| kwargs.get(name).map(|arg| &arg.value))
}

/// Reads an argument as text; missing arguments are the empty string.
#[must_use]
pub fn text_argument(args: &[Value], kwargs: &Kwargs, index: usize, name: &str) -> String {
    argument(args, kwargs, index, name).map(ToString::to_string).unwrap_or_default()
}

/// Reads an argument as a number; missing arguments are `0`.
///
/// # Errors
/// `RuntimeError::Native` when the argument is a dangling pointer.
pub fn number_argument(args: &[Value],
                       kwargs: &Kwargs,
                       index: usize,
                       name: &str)
                       -> EvalResult<f64> {
    argument(args, kwargs, index, name).map_or(Ok(0.0), |value| {
                                           value.to_number().map_err(native_error)
                                       })
}

/// Converts a dangling-pointer failure inside host code into an error the
/// evaluator can chain.
#[must_use]
pub fn native_error(error: DanglingPointer) -> RuntimeError {
    RuntimeError::Native { message: error.to_string() }
}
