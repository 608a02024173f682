/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code: malformed literals, unknown symbols, unbalanced brackets and
/// misplaced tokens. Every variant carries a line and column.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation, including
/// the chained `CallFailed` wrapper the evaluator puts around any error that
/// escapes a call.
pub mod runtime_error;
/// Rendering of error chains against the source text.
pub mod diagnostic;

pub use diagnostic::Diagnostic;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
