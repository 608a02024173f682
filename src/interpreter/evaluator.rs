/// Core evaluation logic and context management.
///
/// Contains the `Context`, the node dispatcher, declarations, `if`,
/// function values, pointers and whole-program evaluation.
pub mod core;

/// Scope frames and the guard that sweeps them.
///
/// Implements the depth-tagged purge that runs whenever a block or a call
/// is left.
pub mod scope;

/// Assignment evaluation.
///
/// Handles plain variables, variables holding pointers and attribute
/// chains, including the silent no-op on constants.
pub mod assign;

/// Call evaluation.
///
/// Splits arguments into positional and named ones, invokes the callee and
/// chains failures. Also runs user-defined function bodies.
pub mod call;

/// Binary operator evaluation logic.
///
/// Handles arithmetic, identity comparison and the logical operators.
pub mod binary;
