use thiserror::Error;

use crate::config::Language;

/// Represents all errors that can occur during lexing or parsing.
///
/// Every variant records the 1-based `line` and `column` of the offending
/// character or token so the diagnostic renderer can point at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A numeric literal contained more than one `.`.
    #[error("Syntax error: number has more than one decimal point")]
    MalformedNumber {
        /// Line of the second `.`.
        line:   usize,
        /// Column of the second `.`.
        column: usize,
    },
    /// A character that is not part of the language.
    #[error("Syntax error: symbol {symbol} does not exist in this language")]
    UnknownSymbol {
        /// The offending character.
        symbol: String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// A string literal was never closed.
    #[error("Syntax error: string is never closed")]
    UnterminatedString {
        /// Line of the opening quote.
        line:   usize,
        /// Column of the opening quote.
        column: usize,
    },
    /// A `)` or `}` without a matching opener.
    #[error("Syntax error: {bracket} has no matching opening bracket")]
    UnmatchedBracket {
        /// The closing bracket.
        bracket: char,
        /// The source line where the error occurred.
        line:    usize,
        /// The source column where the error occurred.
        column:  usize,
    },
    /// A `(` without a matching `)`.
    #[error("Syntax error: parenthesis is never closed")]
    UnterminatedGroup {
        /// Line of the opening parenthesis.
        line:   usize,
        /// Column of the opening parenthesis.
        column: usize,
    },
    /// A `{` without a matching `}`.
    #[error("Syntax error: block is never closed")]
    UnterminatedBlock {
        /// Line of the opening brace.
        line:   usize,
        /// Column of the opening brace.
        column: usize,
    },
    /// An operator or keyword reached the end of its segment without the
    /// operand it needs.
    #[error("Syntax error: {operator} is missing its operand")]
    MissingOperand {
        /// The operator or keyword text.
        operator: String,
        /// The source line where the error occurred.
        line:     usize,
        /// The source column where the error occurred.
        column:   usize,
    },
    /// A binary operator found in operand position.
    #[error("Syntax error: invalid expression at {token}")]
    InvalidExpression {
        /// The offending token.
        token:  String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// `local`/`global` not followed by `name` or `name = expr`.
    #[error("Syntax error: a declaration needs a name or name = value")]
    InvalidDeclaration {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// The left side of `=` is not a variable or an attribute chain.
    #[error("Syntax error: only variables and attributes can be assigned")]
    InvalidAssignmentTarget {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// `exist` applied to something other than a plain variable.
    #[error("Syntax error: exist expects a variable name")]
    InvalidExistTarget {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// An attribute after `.` that is not an identifier.
    #[error("Syntax error: attribute names must be identifiers")]
    InvalidAttribute {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// A required token such as `(` or `{` was not found.
    #[error("Syntax error: expected {expected}")]
    ExpectedToken {
        /// Description of the expected token.
        expected: &'static str,
        /// The source line where the error occurred.
        line:     usize,
        /// The source column where the error occurred.
        column:   usize,
    },
    /// Found extra tokens after a segment's expression.
    #[error("Syntax error: unexpected token {token}")]
    UnexpectedToken {
        /// The extra/unexpected token.
        token:  String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// Expressions, groups or blocks nested deeper than the parser allows.
    #[error("Syntax error: expression nesting exceeds the maximum of {limit} levels")]
    NestingTooDeep {
        /// The maximum nesting depth.
        limit:  usize,
        /// Line of the token that opened the level past the limit.
        line:   usize,
        /// Column of the token that opened the level past the limit.
        column: usize,
    },
}

impl ParseError {
    /// Returns the `(line, column)` the error points at.
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        match self {
            Self::MalformedNumber { line, column }
            | Self::UnknownSymbol { line, column, .. }
            | Self::UnterminatedString { line, column }
            | Self::UnmatchedBracket { line, column, .. }
            | Self::UnterminatedGroup { line, column }
            | Self::UnterminatedBlock { line, column }
            | Self::MissingOperand { line, column, .. }
            | Self::InvalidExpression { line, column, .. }
            | Self::InvalidDeclaration { line, column }
            | Self::InvalidAssignmentTarget { line, column }
            | Self::InvalidExistTarget { line, column }
            | Self::InvalidAttribute { line, column }
            | Self::ExpectedToken { line, column, .. }
            | Self::UnexpectedToken { line, column, .. }
            | Self::NestingTooDeep { line, column, .. } => (*line, *column),
        }
    }

    /// Returns the error message in the requested language.
    #[must_use]
    pub fn message(&self, language: Language) -> String {
        match language {
            Language::En => self.to_string(),
            Language::PtBr => self.portuguese(),
        }
    }

    fn portuguese(&self) -> String {
        let text = match self {
            Self::MalformedNumber { .. } => "o numero possui mais de 1 ponto final".to_string(),
            Self::UnknownSymbol { symbol, .. } => {
                format!("o simbolo {symbol} não existe nessa linguagem")
            },
            Self::UnterminatedString { .. } => "vc esqueceu de fechar uma string".to_string(),
            Self::UnmatchedBracket { bracket, .. } => {
                format!("{bracket} não possui abertura correspondente")
            },
            Self::UnterminatedGroup { .. } => "vc esqueceu de fechar os parenteses".to_string(),
            Self::UnterminatedBlock { .. } => "vc esqueceu de fechar as chaves".to_string(),
            Self::MissingOperand { operator, .. } => format!("falta o operando de {operator}"),
            Self::InvalidExpression { token, .. } => format!("expressão invalida em {token}"),
            Self::InvalidDeclaration { .. } => {
                "uma declaração precisa de nome ou nome = valor".to_string()
            },
            Self::InvalidAssignmentTarget { .. } => {
                "só variaveis e atributos podem receber valores".to_string()
            },
            Self::InvalidExistTarget { .. } => "exist espera o nome de uma variavel".to_string(),
            Self::InvalidAttribute { .. } => "atributos precisam ser nomes".to_string(),
            Self::ExpectedToken { expected, .. } => format!("era esperado {expected}"),
            Self::UnexpectedToken { token, .. } => {
                format!("vc colocou {token} em uma posição errada")
            },
            Self::NestingTooDeep { limit, .. } => {
                format!("a expressão passa do limite de {limit} niveis de aninhamento")
            },
        };
        format!("Erro de Sintaxe: {text}")
    }
}
