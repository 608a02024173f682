use std::fmt;

use thiserror::Error;

use crate::{
    config::Language,
    error::{ParseError, RuntimeError},
};

/// Source text other than the main program's, kept by the code loaded from
/// it so its errors can be rendered against the right lines.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// File path, or `ctx.exec` for text run from a string.
    pub name: String,
    /// The full text.
    pub text: String,
}

/// Any error a kll program can produce, from lexing to evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The source failed to lex or parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The program failed while running.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Diagnostic {
    /// Renders the diagnostic chain against the program's source.
    ///
    /// Each level of the chain contributes its message followed by
    /// ` line:L, column:C`, the source line, and a caret under the column.
    /// Levels without a position (host callable failures) print only their
    /// message. Below a [`RuntimeError::InFile`] level, positions are
    /// looked up in that level's text instead of `source`.
    ///
    /// # Parameters
    /// - `source`: The program text the positions refer to.
    /// - `language`: Language of the messages.
    ///
    /// # Example
    /// ```
    /// use kll::{config::Language, error::{Diagnostic, RuntimeError}};
    ///
    /// let error = Diagnostic::from(RuntimeError::VariableNotFound { name:   "y".to_string(),
    ///                                                               line:   1,
    ///                                                               column: 5, });
    /// let text = error.render("1 + y", Language::En);
    /// assert_eq!(text,
    ///            "Variable error: the variable 'y' does not exist line:1, column:5\n1 + y\n    ^\n");
    /// ```
    #[must_use]
    pub fn render(&self, source: &str, language: Language) -> String {
        Rendered { diagnostic: self,
                   source,
                   language }.to_string()
    }
}

struct Rendered<'a> {
    diagnostic: &'a Diagnostic,
    source:     &'a str,
    language:   Language,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<&str> = self.source.split('\n').collect();
        match self.diagnostic {
            Diagnostic::Parse(error) => {
                render_level(f, &lines, &error.message(self.language), Some(error.position()))
            },
            Diagnostic::Runtime(error) => {
                let mut current = Some(error);
                while let Some(level) = current {
                    render_level(f, &lines, &level.message(self.language), level.position())?;
                    if let RuntimeError::InFile { file, .. } = level {
                        lines = file.as_ref()
                                    .map_or(self.source, |file| file.text.as_str())
                                    .split('\n')
                                    .collect();
                    }
                    current = level.cause();
                }
                Ok(())
            },
        }
    }
}

/// Writes one level of a rendered chain.
fn render_level(f: &mut fmt::Formatter<'_>,
                lines: &[&str],
                message: &str,
                position: Option<(usize, usize)>)
                -> fmt::Result {
    let Some((line, column)) = position else {
        return writeln!(f, "{message}");
    };
    writeln!(f, "{message} line:{line}, column:{column}")?;
    match line.checked_sub(1).and_then(|index| lines.get(index)) {
        Some(text) => {
            let text = text.trim_end_matches('\r');
            writeln!(f, "{text}")?;
            writeln!(f, "{}", caret_line(text, column))
        },
        None => Ok(()),
    }
}

/// Builds a line of spaces with a `^` under `column`, keeping tabs so the
/// caret lines up with the source above it.
fn caret_line(text: &str, column: usize) -> String {
    let mut caret: String = text.chars()
                                .take(column.saturating_sub(1))
                                .map(|c| if c == '\t' { '\t' } else { ' ' })
                                .collect();
    let missing = column.saturating_sub(1).saturating_sub(caret.chars().count());
    caret.extend(std::iter::repeat_n(' ', missing));
    caret.push('^');
    caret
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn call_chain_renders_every_level() {
        let error = RuntimeError::CallFailed { cause:  Box::new(RuntimeError::VariableNotFound { name:   "r".to_string(),
                                                                                               line:   2,
                                                                                               column: 3, }),
                                               line:   1,
                                               column: 1, };
        let text = Diagnostic::from(error).render("f(1)\n  r", Language::En);
        assert_eq!(text,
                   "Runtime error: call failed line:1, column:1\nf(1)\n^\nVariable error: the \
                    variable 'r' does not exist line:2, column:3\n  r\n  ^\n");
    }

    #[test]
    fn native_failures_have_no_caret() {
        let error = RuntimeError::CallFailed { cause:  Box::new(RuntimeError::Native { message: "boom".to_string() }),
                                               line:   1,
                                               column: 3, };
        let text = Diagnostic::from(error).render("  f()", Language::En);
        assert!(text.ends_with("Runtime error: boom\n"));
    }

    #[test]
    fn file_levels_switch_the_source() {
        let file = Rc::new(SourceFile { name: "lib.kll".to_string(),
                                        text: "local a = 1\nmissing".to_string(), });
        let inner = RuntimeError::VariableNotFound { name:   "missing".to_string(),
                                                     line:   2,
                                                     column: 1, };
        let error = RuntimeError::CallFailed { cause:  Box::new(inner.in_file(Some(file))),
                                               line:   1,
                                               column: 1, };
        let text = Diagnostic::from(error).render("f()", Language::En);
        assert_eq!(text,
                   "Runtime error: call failed line:1, column:1\nf()\n^\nRuntime error: inside \
                    lib.kll\nVariable error: the variable 'missing' does not exist line:2, \
                    column:1\nmissing\n^\n");
    }

    #[test]
    fn main_program_level_switches_back() {
        let inner = RuntimeError::DanglingPointer { line: 1, column: 3 };
        let error = RuntimeError::InFile { file:  None,
                                           cause: Box::new(inner), };
        let text = Diagnostic::from(error).render("p + 1", Language::PtBr);
        assert!(text.starts_with("Erro de Execução: dentro do programa principal\n"));
        assert!(text.ends_with("p + 1\n  ^\n"));
    }

    #[test]
    fn recursion_limit_is_not_wrapped() {
        let error = RuntimeError::RecursionLimit { limit: 3 };
        assert_eq!(error.clone().in_file(None), error);
    }

    #[test]
    fn portuguese_messages() {
        let error = ParseError::UnterminatedString { line: 1, column: 1 };
        let text = Diagnostic::from(error).render("\"abc", Language::PtBr);
        assert!(text.starts_with("Erro de Sintaxe: vc esqueceu de fechar uma string line:1, column:1"));
    }

    #[test]
    fn caret_keeps_tabs() {
        assert_eq!(caret_line("\tx", 2), "\t^");
        assert_eq!(caret_line("", 3), "  ^");
    }
}
