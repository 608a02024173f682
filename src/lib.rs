//! # kll
//!
//! kll is a small embeddable scripting language written in Rust.
//! Source text is tokenized, split into statement segments, parsed into an
//! AST and run by a tree-walking evaluator with a flat, depth-tagged scope.
//! Programs reach the host through a prelude of constant globals.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::{fs, io, path::Path};

use tracing::info;

use crate::{
    config::Options,
    error::Diagnostic,
    interpreter::{evaluator::core::Context, value::core::Value},
};

/// Defines the structure of parsed code.
///
/// This module declares the `Node` type and the `NodeKind` enum that
/// represent the syntactic structure of a program as a tree. The AST is built
/// by the parser and walked by the evaluator; it can also travel inside a
/// runtime value.
///
/// # Responsibilities
/// - Defines a node kind for every language construct.
/// - Attaches the line and column of each node for error reporting.
pub mod ast;
/// Runtime options.
///
/// Holds the call-scope strategy, the diagnostic language and the debug
/// switch, all selectable from the command line.
pub mod config;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing,
/// or evaluating code, and the `Diagnostic` that renders them against the
/// source with a caret under the failing position.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line and column numbers to every positioned error.
/// - Chains the errors that escape a call to the call that raised them.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations and the prelude to provide a complete runtime for kll
/// programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for parsing and evaluating user code.
/// - Installs the host records every program can use.
pub mod interpreter;
/// General utilities for numeric conversion and formatting.
///
/// These helpers render numbers the way the language displays them and
/// convert between `f64` and integer types without silent data loss.
pub mod util;

/// Runs a whole program and returns the value of its last statement.
///
/// The program gets a fresh context with the prelude installed and a root
/// scope whose `__name__` is `"__main__"`. Both are torn down before this
/// returns, so functions in the result can no longer be called.
///
/// # Errors
/// Returns the first syntax or runtime error as a [`Diagnostic`]; render it
/// with [`Diagnostic::render`].
///
/// # Examples
/// ```
/// use kll::{config::Options, get_result};
///
/// let value = get_result("local x = 1 + 2 * 3\nx", Options::default()).unwrap();
/// assert_eq!(value.to_string(), "7");
///
/// // 'y' is not defined
/// assert!(get_result("local x = y + 1", Options::default()).is_err());
/// ```
pub fn get_result(source: &str, options: Options) -> Result<Value, Diagnostic> {
    let context = Context::new(options);
    let scope = context.root_scope("__main__");
    // top-level functions hold the root frame they are declared in
    let _sweep = scope.enter(0);
    context.eval(source, &scope)
}

/// Reads and runs the program stored at `path`.
///
/// A failing program has its diagnostic chain written to standard error;
/// this is not an error of `run_file`. With `options.debug` set, the parsed
/// program is printed before it runs and its final value afterwards.
///
/// # Errors
/// Returns the I/O error when the file cannot be read.
pub fn run_file(path: impl AsRef<Path>, options: Options) -> io::Result<()> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    info!(file = %path.display(), "running program");

    match get_result(&source, options) {
        Ok(value) => {
            if options.debug {
                println!("{value}");
            }
        },
        Err(diagnostic) => eprint!("{}", diagnostic.render(&source, options.language)),
    }
    Ok(())
}
