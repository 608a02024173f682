use clap::ValueEnum;

/// How a user-defined function binds its parameters when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CallScope {
    /// Parameters and body locals live in the Object the function captured
    /// when it was created. A re-entrant call therefore shares (and purges)
    /// the bindings of the calls still running below it.
    #[default]
    Shared,
    /// Every call gets a fresh activation Object chained to the captured
    /// scope, so recursive calls keep their own bindings.
    Isolated,
}

/// Language used when rendering diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Language {
    /// English messages.
    #[default]
    En,
    /// Brazilian Portuguese messages.
    #[value(name = "pt-br")]
    PtBr,
}

/// Runtime configuration of an evaluation context.
///
/// `Options` is stored inside the evaluator's `Context`. Function values
/// reach it through a handle to that context, so a function always runs
/// with the settings of the context that defined it.
///
/// # Example
/// ```
/// use kll::config::{CallScope, Language, Options};
///
/// let options = Options { call_scope: CallScope::Isolated,
///                         ..Options::default() };
/// assert_eq!(options.language, Language::En);
/// assert!(!options.debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Parameter binding strategy for user-defined functions.
    pub call_scope: CallScope,
    /// Language of rendered diagnostics.
    pub language:   Language,
    /// When set, the parsed program and its final value are printed.
    pub debug:      bool,
}
