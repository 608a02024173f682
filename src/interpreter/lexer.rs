use std::fmt;

use logos::Logos;
use tracing::trace;

use crate::{error::ParseError, interpreter::parser::core::ParseResult};

/// Represents a lexical token in the source input.
///
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// Spaces, tabs and carriage returns are discarded; newlines are kept
/// because they separate statements.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    /// Numeric literal tokens, such as `3.14`, `.5` or `42`.
    #[regex(r"[0-9]+|[0-9]*\.[0-9]+", parse_number)]
    #[regex(r"[0-9]*\.[0-9]*\.[0-9.]*", malformed_number)]
    Number(f64),
    /// String literal tokens, `"..."`, without the quotes.
    #[regex(r#""[^"]*""#, parse_string)]
    #[regex(r#""[^"]*"#, unterminated_string)]
    Str(String),
    /// `global`
    #[token("global")]
    Global,
    /// `local` or `var`
    #[token("local")]
    #[token("var")]
    Local,
    /// `return`
    #[token("return")]
    Return,
    /// `function`
    #[token("function")]
    Function,
    /// `if`
    #[token("if")]
    If,
    /// `exist`
    #[token("exist")]
    Exist,
    /// `pointer`
    #[token("pointer")]
    Pointer,
    /// `&&` or `and`
    #[regex(r"&[ \t]*&")]
    #[token("and")]
    And,
    /// `||` or `or`
    #[regex(r"\|[ \t]*\|")]
    #[token("or")]
    Or,
    /// Identifier tokens; variable names such as `x` or `console`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `==`
    #[regex(r"=[ \t]*=")]
    EqualEqual,
    /// `=`
    #[token("=")]
    Assign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// A line break.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        Token::NewLine
    })]
    NewLine,
}

impl Token {
    /// Returns `true` when the token cannot end an expression because it
    /// still needs something after it.
    ///
    /// A newline right after such a token continues the statement on the
    /// next line instead of ending it.
    #[must_use]
    pub const fn needs_operand(&self) -> bool {
        matches!(self,
                 Self::Plus
                 | Self::Minus
                 | Self::Star
                 | Self::Slash
                 | Self::Assign
                 | Self::EqualEqual
                 | Self::And
                 | Self::Or
                 | Self::Dot
                 | Self::Comma
                 | Self::LParen
                 | Self::Return
                 | Self::Local
                 | Self::Global
                 | Self::If
                 | Self::Exist
                 | Self::Pointer)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Str(text) => write!(f, "\"{text}\""),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
            Self::Return => write!(f, "return"),
            Self::Function => write!(f, "function"),
            Self::If => write!(f, "if"),
            Self::Exist => write!(f, "exist"),
            Self::Pointer => write!(f, "pointer"),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::EqualEqual => write!(f, "=="),
            Self::Assign => write!(f, "="),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Dot => write!(f, "."),
            Self::Comma => write!(f, ","),
            Self::Semicolon => write!(f, ";"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::NewLine => write!(f, "new line"),
        }
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset where it starts, so
/// columns can be computed for every token.
pub struct LexerExtras {
    /// The current line number, starting at 1.
    pub line:       usize,
    /// Byte offset of the first character of the current line.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// Failures reported by the token callbacks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    /// No token matches the input at this position.
    #[default]
    UnknownSymbol,
    /// A numeric run holds a second `.` at this byte offset into the run.
    MalformedNumber {
        /// Offset of the second `.` from the start of the run.
        offset: usize,
    },
    /// A string opened here is never closed.
    UnterminatedString,
}

/// A token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token itself.
    pub token:  Token,
    /// 1-based line of the token.
    pub line:   usize,
    /// 1-based column of the token, counted in characters.
    pub column: usize,
}

/// Splits source text into positioned tokens.
///
/// # Parameters
/// - `source`: The program text.
///
/// # Returns
/// Every token of the source in order, each with its line and column.
///
/// # Errors
/// - `ParseError::MalformedNumber` at the second `.` of a numeric run.
/// - `ParseError::UnterminatedString` at the opening quote.
/// - `ParseError::UnknownSymbol` for any other character the language does
///   not know, including a lone `&` or `|`.
///
/// # Example
/// ```
/// use kll::interpreter::lexer::{Token, tokenize};
///
/// let lexemes = tokenize("x = 12.5").unwrap();
/// let tokens: Vec<Token> = lexemes.into_iter().map(|l| l.token).collect();
/// assert_eq!(tokens,
///            vec![Token::Identifier("x".to_string()), Token::Assign, Token::Number(12.5)]);
/// ```
pub fn tokenize(source: &str) -> ParseResult<Vec<Lexeme>> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();

    loop {
        let line = lexer.extras.line;
        let line_start = lexer.extras.line_start;
        let Some(result) = lexer.next() else {
            break;
        };
        let span = lexer.span();
        let column = column_of(source, line_start, span.start);

        match result {
            Ok(token) => lexemes.push(Lexeme { token, line, column }),
            Err(LexError::MalformedNumber { offset }) => {
                return Err(ParseError::MalformedNumber { line,
                                                         column: column + offset });
            },
            Err(LexError::UnterminatedString) => {
                return Err(ParseError::UnterminatedString { line, column });
            },
            Err(LexError::UnknownSymbol) => {
                let symbol = source[span.start..].chars().next().map_or_else(String::new, String::from);
                return Err(ParseError::UnknownSymbol { symbol, line, column });
            },
        }
    }

    trace!(tokens = lexemes.len(), "tokenized source");
    Ok(lexemes)
}

/// Computes the 1-based character column of `offset` on the line starting at
/// `line_start`.
fn column_of(source: &str, line_start: usize, offset: usize) -> usize {
    source.get(line_start..offset).map_or(1, |prefix| prefix.chars().count() + 1)
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Result<f64, LexError> {
    lex.slice().parse().map_err(|_| LexError::UnknownSymbol)
}

/// Rejects a numeric run holding more than one `.`.
fn malformed_number(lex: &logos::Lexer<Token>) -> Result<f64, LexError> {
    let offset = lex.slice().match_indices('.').nth(1).map_or(0, |(index, _)| index);
    Err(LexError::MalformedNumber { offset })
}

/// Strips the quotes of a string literal and follows the newlines inside it.
fn parse_string(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let start = lex.span().start;
    if let Some(last) = slice.rfind('\n') {
        lex.extras.line += slice.matches('\n').count();
        lex.extras.line_start = start + last + 1;
    }
    slice[1..slice.len() - 1].to_string()
}

/// Rejects a string literal that runs to the end of the input.
fn unterminated_string(_lex: &logos::Lexer<Token>) -> Result<String, LexError> {
    Err(LexError::UnterminatedString)
}
