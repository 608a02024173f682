use crate::{
    ast::{BinaryOperator, Node},
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, dangling},
            scope::Scope,
        },
        value::core::{Value, ValueResult},
    },
};

impl Context {
    /// Evaluates a binary operation.
    ///
    /// Both operands are always evaluated, left first; `&&` and `||` do not
    /// short-circuit.
    ///
    /// # Parameters
    /// - `op`: The operator.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `node`: The operation itself, used for error positions.
    /// - `scope`: Current scope.
    /// - `depth`: Current depth.
    ///
    /// # Errors
    /// Errors raised by either operand, or `RuntimeError::DanglingPointer`
    /// when an operand is a pointer to a purged variable.
    pub(crate) fn eval_binary_op(&self,
                                 op: BinaryOperator,
                                 left: &Node,
                                 right: &Node,
                                 node: &Node,
                                 scope: &Scope,
                                 depth: usize)
                                 -> EvalResult<Value> {
        let left = self.eval_value(left, scope, depth)?;
        let right = self.eval_value(right, scope, depth)?;
        eval_binary(op, &left, &right).map_err(|_| dangling(node))
    }
}

/// Applies a binary operator to two evaluated operands.
///
/// Arithmetic dispatches on the left operand, `==` compares identity and
/// the logical operators compare the operands' truth values.
///
/// # Example
/// ```
/// use kll::{
///     ast::BinaryOperator,
///     interpreter::{evaluator::binary::eval_binary, value::core::Value},
/// };
///
/// let one = Value::from(1.0);
/// let text = Value::from("a");
///
/// assert_eq!(eval_binary(BinaryOperator::Sub, &one, &one), Ok(Value::from(0.0)));
/// assert_eq!(eval_binary(BinaryOperator::Add, &text, &one), Ok(Value::from("a1")));
/// assert_eq!(eval_binary(BinaryOperator::Equal, &one, &text), Ok(Value::Bool(false)));
/// assert_eq!(eval_binary(BinaryOperator::And, &one, &text), Ok(Value::Bool(true)));
/// ```
pub fn eval_binary(op: BinaryOperator, left: &Value, right: &Value) -> ValueResult<Value> {
    use BinaryOperator::{Add, And, Div, Equal, Mul, Or, Sub};

    match op {
        Add => left.sum(right),
        Sub => left.sub(right),
        Mul => left.mul(right),
        Div => left.div(right),
        Equal => Ok(Value::Bool(left == right)),
        And => {
            let (left, right) = (left.to_bool()?, right.to_bool()?);
            Ok(Value::Bool(left && right))
        },
        Or => {
            let (left, right) = (left.to_bool()?, right.to_bool()?);
            Ok(Value::Bool(left || right))
        },
    }
}
