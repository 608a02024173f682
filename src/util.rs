/// Numeric conversion helpers.
///
/// Safe conversions between `f64`, `i64` and `usize` used by number display,
/// string lengths and replacement limits. Conversions that could lose data
/// either saturate or return `None`; nothing here casts silently.
pub mod num;
/// Stack growth for the recursive parts of the interpreter.
///
/// Deeply nested expressions and deep call chains recurse once per level;
/// `grow` moves that recursion onto a fresh heap-allocated stack segment
/// when the current one runs low.
pub mod stack;
