use std::io::{self, BufRead, Write};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{core::Value, function::Kwargs, object::Object},
    },
};

/// Builds the `console` record.
#[must_use]
pub fn object() -> Object {
    Object::constant(native_functions! {
        "log"   => log,
        "write" => write,
        "read"  => read,
    })
}

/// Joins the display strings of `args` with single spaces.
///
/// # Example
/// ```
/// use kll::interpreter::{prelude::console::join, value::core::Value};
///
/// let args = [Value::from("x ="), Value::from(1.5), Value::Null];
/// assert_eq!(join(&args), "x = 1.5 null");
/// ```
#[must_use]
pub fn join(args: &[Value]) -> String {
    args.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

/// `console.log(...)`: prints the arguments followed by a newline.
pub fn log(args: &[Value], _: &Kwargs, _: usize) -> EvalResult<Value> {
    println!("{}", join(args));
    Ok(Value::Null)
}

/// `console.write(...)`: prints the arguments without a newline.
pub fn write(args: &[Value], _: &Kwargs, _: usize) -> EvalResult<Value> {
    print!("{}", join(args));
    io::stdout().flush().map_err(io_error)?;
    Ok(Value::Null)
}

/// `console.read(...)`: prints the arguments as a prompt and returns one
/// line from standard input, without its line ending.
pub fn read(args: &[Value], kwargs: &Kwargs, depth: usize) -> EvalResult<Value> {
    write(args, kwargs, depth)?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(io_error)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Value::Str(line))
}

fn io_error(error: io::Error) -> RuntimeError {
    RuntimeError::Io { message: error.to_string() }
}
