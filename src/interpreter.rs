/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST with a scope and a nesting depth, reads and
/// writes variables through shared cells, calls user-defined and native
/// functions, and sweeps the locals of every block it leaves.
///
/// # Responsibilities
/// - Evaluates every node kind, including `return` propagation out of
///   nested blocks.
/// - Implements the depth-tagged scope shared by blocks and calls.
/// - Wraps errors escaping a call so that diagnostics show the whole chain.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a sequence of tokens,
/// each tagged with the line and column it starts on. Whitespace other than
/// newlines is skipped.
///
/// # Responsibilities
/// - Recognizes numbers, strings, identifiers, keywords and symbols.
/// - Reports malformed numbers, unterminated strings and unknown symbols.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser first splits the token stream into statement segments at
/// top-level newlines and semicolons, then parses each segment on its own
/// with a small recursive-descent grammar.
///
/// # Responsibilities
/// - Balances brackets before any statement is parsed.
/// - Builds declarations, assignments, calls, attribute chains, blocks and
///   function literals.
/// - Reports syntax errors with the position of the offending token.
pub mod parser;
/// The host records available to every program.
///
/// Installs `true`, `false`, `console`, `Math` and `ctx` as constant globals
/// of a fresh context.
pub mod prelude;
/// The value module defines the runtime data types for evaluation.
///
/// Values are numbers, strings, booleans, `null`, arrays, objects, functions,
/// native functions, pointers and quoted AST nodes. Objects and functions
/// are shared by reference; everything else is copied on assignment.
///
/// # Responsibilities
/// - Defines the `Value` enum and its conversions and display.
/// - Implements the arithmetic, attribute and membership rules of the
///   language.
/// - Provides the variable cells, objects and pointers the evaluator builds
///   scopes from.
pub mod value;
