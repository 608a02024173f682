use crate::interpreter::{evaluator::core::Context, value::core::Value};

/// Builds the `(name, value)` entries of a host record from native
/// functions.
///
/// Each entry maps a name to anything callable as
/// `Fn(&[Value], &Kwargs, usize) -> EvalResult<Value>`. The result is meant
/// to be passed to [`Object::constant`](crate::interpreter::value::object::Object::constant).
macro_rules! native_functions {
    (
        $(
            $name:literal => $func:expr
        ),* $(,)?
    ) => {
        vec![
            $(
                ($name, $crate::interpreter::value::core::Value::Native(
                    $crate::interpreter::value::function::NativeFunction::new($func),
                )),
            )*
        ]
    };
}

/// `console`: printing and reading lines.
pub mod console;

/// `Math`: trigonometry, rounding and `pi`.
pub mod math;

/// `ctx`: running source text, importing modules and reaching the globals.
pub mod ctx;

/// Registers the prelude in the globals of `context`.
///
/// Every entry is a constant: assignments to `true`, `console` or
/// `Math.pi` are silently ignored.
///
/// | Name      | Value |
/// |-----------|-------|
/// | `true`    | `Bool(true)` |
/// | `false`   | `Bool(false)` |
/// | `console` | `log`, `write`, `read` |
/// | `Math`    | `pi`, `cos`, `sin`, `atan`, `atan2`, `floor`, `ceil`, `abs` |
/// | `ctx`     | `exec`, `import.module`, `import.func`, `globals` |
pub fn install(context: &Context) {
    let globals = context.globals();
    globals.declare("true", Value::Bool(true), 0, true);
    globals.declare("false", Value::Bool(false), 0, true);
    globals.declare("console", Value::Object(console::object()), 0, true);
    globals.declare("Math", Value::Object(math::object()), 0, true);
    globals.declare("ctx", Value::Object(ctx::object(context)), 0, true);
}
