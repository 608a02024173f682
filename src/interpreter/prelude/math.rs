use crate::interpreter::{
    evaluator::core::EvalResult,
    value::{
        core::Value,
        function::{Kwargs, number_argument},
        object::Object,
    },
};

/// The value bound to `Math.pi`.
pub const PI: f64 = 3.1415;

/// Builds the `Math` record.
///
/// One-argument functions take `x`; `atan` takes `x1, x2` and `atan2` takes
/// `x1, x2, y1, y2`. Every argument can be passed positionally or by name,
/// and missing arguments are `0`.
#[must_use]
pub fn object() -> Object {
    let mut entries = native_functions! {
        "cos"   => |args, kwargs, _| unary(args, kwargs, f64::cos),
        "sin"   => |args, kwargs, _| unary(args, kwargs, f64::sin),
        "floor" => |args, kwargs, _| unary(args, kwargs, f64::floor),
        "ceil"  => |args, kwargs, _| unary(args, kwargs, f64::ceil),
        "abs"   => |args, kwargs, _| unary(args, kwargs, f64::abs),
        "atan"  => atan,
        "atan2" => atan2,
    };
    entries.push(("pi", Value::Number(PI)));
    Object::constant(entries)
}

fn unary(args: &[Value], kwargs: &Kwargs, op: fn(f64) -> f64) -> EvalResult<Value> {
    Ok(Value::Number(op(number_argument(args, kwargs, 0, "x")?)))
}

/// `Math.atan(x1, x2)`: the arc tangent of `x1 - x2`.
pub fn atan(args: &[Value], kwargs: &Kwargs, _: usize) -> EvalResult<Value> {
    let x1 = number_argument(args, kwargs, 0, "x1")?;
    let x2 = number_argument(args, kwargs, 1, "x2")?;
    Ok(Value::Number((x1 - x2).atan()))
}

/// `Math.atan2(x1, x2, y1, y2)`: the angle of the vector from `(x2, y2)` to
/// `(x1, y1)`.
///
/// # Example
/// ```
/// use kll::interpreter::{
///     prelude::math::atan2,
///     value::{core::Value, function::Kwargs},
/// };
///
/// let args = [Value::from(1.0), Value::from(0.0), Value::from(1.0), Value::from(0.0)];
/// let Value::Number(angle) = atan2(&args, &Kwargs::new(), 0).unwrap() else {
///     panic!("expected a number");
/// };
/// assert!((angle - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
/// ```
pub fn atan2(args: &[Value], kwargs: &Kwargs, _: usize) -> EvalResult<Value> {
    let x1 = number_argument(args, kwargs, 0, "x1")?;
    let x2 = number_argument(args, kwargs, 1, "x2")?;
    let y1 = number_argument(args, kwargs, 2, "y1")?;
    let y2 = number_argument(args, kwargs, 3, "y2")?;
    Ok(Value::Number((y1 - y2).atan2(x1 - x2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::function::KeywordArg;

    fn call(name: &str, args: &[Value], kwargs: &Kwargs) -> Value {
        let Some(Value::Native(native)) = object().get(name) else {
            panic!("Math.{name} is not a native function");
        };
        native.call(args, kwargs, 0).unwrap()
    }

    #[test]
    fn rounding() {
        let kwargs = Kwargs::new();
        assert_eq!(call("floor", &[Value::from(2.7)], &kwargs), Value::from(2.0));
        assert_eq!(call("ceil", &[Value::from(2.1)], &kwargs), Value::from(3.0));
        assert_eq!(call("abs", &[Value::from(-4.0)], &kwargs), Value::from(4.0));
    }

    #[test]
    fn named_arguments() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("x".to_string(),
                      KeywordArg { name:  "x".to_string(),
                                   value: Value::from(0.0), });
        assert_eq!(call("cos", &[], &kwargs), Value::from(1.0));
        assert_eq!(call("sin", &[], &Kwargs::new()), Value::from(0.0));
    }

    #[test]
    fn atan_of_a_difference() {
        let args = [Value::from(3.0), Value::from(3.0)];
        assert_eq!(call("atan", &args, &Kwargs::new()), Value::from(0.0));
    }

    #[test]
    fn pi_is_constant() {
        let math = object();
        assert!(!math.set("pi", Value::from(3.0)));
        assert_eq!(math.get("pi"), Some(Value::Number(PI)));
    }
}
