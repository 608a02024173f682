use std::rc::Rc;

use thiserror::Error;

use crate::{config::Language, error::diagnostic::SourceFile};

/// Represents all errors that can occur while evaluating a program.
///
/// Errors raised by the evaluator carry the position of the node that
/// failed. Errors raised by host callables carry no position of their own;
/// the evaluator wraps them in [`RuntimeError::CallFailed`] at the callee.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A variable was read or assigned but is declared in neither the scope
    /// chain nor the globals.
    #[error("Variable error: the variable '{name}' does not exist")]
    VariableNotFound {
        /// Name of the missing variable.
        name:   String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// A call raised an error; `cause` is the error raised inside it.
    #[error("Runtime error: call failed")]
    CallFailed {
        /// The error raised by the callee.
        #[source]
        cause:  Box<RuntimeError>,
        /// Line of the callee expression.
        line:   usize,
        /// Column of the callee expression.
        column: usize,
    },
    /// A pointer was used after the variable it points to was purged.
    #[error("Runtime error: the variable behind this pointer no longer exists")]
    DanglingPointer {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// `pointer` applied to something other than a variable.
    #[error("Runtime error: pointers can only point at variables")]
    UnsupportedPointerTarget {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// A host callable failed.
    #[error("Runtime error: {message}")]
    Native {
        /// Description of the failure.
        message: String,
    },
    /// Reading input or a source file failed.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the failure.
        message: String,
    },
    /// More calls were nested than the evaluator allows.
    #[error("Runtime error: more than {limit} nested calls")]
    RecursionLimit {
        /// The maximum number of nested calls.
        limit: usize,
    },
    /// A function was called after the context that created it was dropped.
    #[error("Runtime error: the program this function belongs to has finished")]
    ContextDropped,
    /// The positions of `cause` refer to another source text: an imported
    /// file, text run by `ctx.exec`, or (`None`) the main program.
    #[error("Runtime error: inside {}", file_label(.file.as_deref()))]
    InFile {
        /// Text the positions of `cause` refer to.
        file:  Option<Rc<SourceFile>>,
        /// The error raised in that text.
        #[source]
        cause: Box<RuntimeError>,
    },
}

fn file_label(file: Option<&SourceFile>) -> String {
    file.map_or_else(|| "the main program".to_string(), |file| file.name.clone())
}

impl RuntimeError {
    /// Returns the `(line, column)` the error points at, if it has one.
    #[must_use]
    pub const fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::VariableNotFound { line, column, .. }
            | Self::CallFailed { line, column, .. }
            | Self::DanglingPointer { line, column }
            | Self::UnsupportedPointerTarget { line, column } => Some((*line, *column)),
            Self::Native { .. }
            | Self::Io { .. }
            | Self::RecursionLimit { .. }
            | Self::ContextDropped
            | Self::InFile { .. } => None,
        }
    }

    /// Returns the error this one wraps, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        match self {
            Self::CallFailed { cause, .. } | Self::InFile { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Marks `self` as raised in `file`. Recursion limits have no position
    /// and are returned unchanged.
    #[must_use]
    pub fn in_file(self, file: Option<Rc<SourceFile>>) -> Self {
        match self {
            Self::RecursionLimit { .. } => self,
            cause => Self::InFile { file,
                                    cause: Box::new(cause) },
        }
    }

    /// Returns the innermost error of a chain of call failures and file
    /// markers.
    ///
    /// # Example
    /// ```
    /// use kll::error::RuntimeError;
    ///
    /// let inner = RuntimeError::VariableNotFound { name:   "x".to_string(),
    ///                                              line:   2,
    ///                                              column: 5, };
    /// let outer = RuntimeError::CallFailed { cause:  Box::new(inner.clone()),
    ///                                        line:   1,
    ///                                        column: 1, };
    /// assert_eq!(outer.root_cause(), &inner);
    /// ```
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// Returns the error message in the requested language.
    #[must_use]
    pub fn message(&self, language: Language) -> String {
        match language {
            Language::En => self.to_string(),
            Language::PtBr => match self {
                Self::VariableNotFound { name, .. } => {
                    format!("Erro de Variavel: A variavel '{name}' não existe")
                },
                Self::CallFailed { .. } => "Erro de Execução: a chamada falhou".to_string(),
                Self::DanglingPointer { .. } => {
                    "Erro de Execução: a variavel deste ponteiro não existe mais".to_string()
                },
                Self::UnsupportedPointerTarget { .. } => {
                    "Erro de Execução: ponteiros só apontam para variaveis".to_string()
                },
                Self::Native { message } => format!("Erro de Execução: {message}"),
                Self::Io { message } => format!("Erro de Entrada/Saída: {message}"),
                Self::RecursionLimit { limit } => {
                    format!("Erro de Execução: mais de {limit} chamadas aninhadas")
                },
                Self::ContextDropped => {
                    "Erro de Execução: o programa desta função já terminou".to_string()
                },
                Self::InFile { file: Some(file), .. } => {
                    format!("Erro de Execução: dentro de {}", file.name)
                },
                Self::InFile { file: None, .. } => {
                    "Erro de Execução: dentro do programa principal".to_string()
                },
            },
        }
    }
}
