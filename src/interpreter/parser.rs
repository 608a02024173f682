/// Parser entry points, the token cursor and shared helpers.
///
/// Contains `parse`, the `ParseResult` alias and the cursor every grammar
/// rule reads from.
pub mod core;

/// Segment splitting.
///
/// Cuts token ranges into statements at top-level `;` and newlines, into
/// arguments at top-level commas, and finds matching brackets.
pub mod segment;

/// Binary operator parsing.
///
/// Implements the assignment/logic, equality and arithmetic levels, all
/// right-associative.
pub mod binary;

/// Unary, postfix and primary parsing.
///
/// Handles negation, calls, attribute chains, literals, variables and
/// groups.
pub mod unary;

/// Block parsing.
///
/// Parses `{...}` bodies together with the `if` and `function` forms that own
/// them.
pub mod block;

/// Keyword statement parsing.
///
/// Parses `local`/`global` declarations, `return`, `exist` and `pointer`.
pub mod statement;
