use tracing::trace;

use crate::{
    ast::Node,
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token, tokenize},
        parser::{
            binary::parse_assignment,
            segment::{find_closing, split_arguments, split_statements, unterminated},
        },
    },
    util::stack,
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest nesting of operands, groups, blocks and attribute chains the
/// parser accepts.
pub const MAX_NESTING: usize = 1_000;

/// A cursor over one segment of the token buffer.
///
/// The cursor never looks past the end of its segment; reaching that end is
/// how the parser notices that an expression is over. Newline tokens inside
/// a segment are skipped transparently.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens:   &'a [Lexeme],
    position: usize,
    depth:    usize,
}

impl<'a> TokenCursor<'a> {
    /// Creates a cursor at the start of `tokens`, at nesting depth `depth`.
    #[must_use]
    pub const fn new(tokens: &'a [Lexeme], depth: usize) -> Self {
        Self { tokens,
               position: 0,
               depth }
    }

    /// Nesting depth of the expression being parsed.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Fails if `levels` more levels below the current one would pass
    /// [`MAX_NESTING`].
    ///
    /// # Errors
    /// `ParseError::NestingTooDeep` at `at`.
    pub fn check_nesting(&self, levels: usize, at: &Lexeme) -> ParseResult<()> {
        nesting(self.depth + levels, at).map(drop)
    }

    /// Runs `parse` one nesting level deeper.
    ///
    /// # Errors
    /// `ParseError::NestingTooDeep` at `at` when the level is past
    /// [`MAX_NESTING`]; otherwise whatever `parse` returns.
    pub fn descend<T, F>(&mut self, at: &Lexeme, parse: F) -> ParseResult<T>
        where F: FnOnce(&mut Self) -> ParseResult<T>
    {
        let outer = self.depth;
        self.depth = nesting(outer + 1, at)?;
        let result = stack::grow(|| parse(self));
        self.depth = outer;
        result
    }

    fn next_index(&self) -> Option<usize> {
        self.tokens[self.position..].iter()
                                    .position(|lexeme| lexeme.token != Token::NewLine)
                                    .map(|offset| self.position + offset)
    }

    /// Returns the next significant token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a Lexeme> {
        self.next_index().map(|index| &self.tokens[index])
    }

    /// Returns the token after the next one without consuming anything.
    #[must_use]
    pub fn peek_second(&self) -> Option<&'a Lexeme> {
        let first = self.next_index()?;
        self.tokens[first + 1..].iter().find(|lexeme| lexeme.token != Token::NewLine)
    }

    /// Consumes and returns the next significant token.
    pub fn advance(&mut self) -> Option<&'a Lexeme> {
        let index = self.next_index()?;
        self.position = index + 1;
        Some(&self.tokens[index])
    }

    /// Consumes the next token if it is `token`.
    pub fn advance_if(&mut self, token: &Token) -> Option<&'a Lexeme> {
        if self.peek().is_some_and(|lexeme| &lexeme.token == token) {
            return self.advance();
        }
        None
    }

    /// Returns `true` once only newlines (or nothing) remain.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.next_index().is_none()
    }

    /// Position of the last token of the segment, used for errors raised
    /// once the segment is exhausted.
    #[must_use]
    pub fn end_position(&self) -> (usize, usize) {
        self.tokens.last().map_or((1, 1), |lexeme| (lexeme.line, lexeme.column))
    }

    /// Takes the tokens up to the closer matching `opener`, which must be
    /// the token consumed last, and moves past the closer.
    ///
    /// # Errors
    /// `ParseError::UnterminatedGroup` or `ParseError::UnterminatedBlock` at
    /// the opener when the segment ends first.
    pub fn take_group(&mut self, opener: &Lexeme) -> ParseResult<&'a [Lexeme]> {
        let rest = &self.tokens[self.position..];
        let close = find_closing(rest).ok_or_else(|| unterminated(opener))?;
        self.position += close + 1;
        Ok(&rest[..close])
    }
}

/// Parses a whole program.
///
/// This is the entry point of the parser: the token buffer is split into
/// statements and each statement is parsed on its own.
///
/// # Parameters
/// - `tokens`: Every token of the program, as produced by the lexer.
///
/// # Returns
/// The statements of the program in source order.
///
/// # Errors
/// Any syntax error found in any statement; parsing stops at the first one.
///
/// # Example
/// ```
/// use kll::interpreter::{lexer::tokenize, parser::core::parse};
///
/// let tokens = tokenize("local x = 1\nx + 2").unwrap();
/// let nodes = parse(&tokens).unwrap();
/// assert_eq!(nodes.len(), 2);
/// ```
pub fn parse(tokens: &[Lexeme]) -> ParseResult<Vec<Node>> {
    let nodes = parse_statements(tokens, 0)?;
    trace!(statements = nodes.len(), "parsed program");
    Ok(nodes)
}

/// Tokenizes and parses source text in one step.
///
/// # Example
/// ```
/// use kll::interpreter::parser::core::parse_source;
///
/// assert_eq!(parse_source("a; b\nc").unwrap().len(), 3);
/// assert!(parse_source("(a").is_err());
/// ```
pub fn parse_source(source: &str) -> ParseResult<Vec<Node>> {
    parse(&tokenize(source)?)
}

/// Parses a range of tokens as a list of statements at nesting depth
/// `depth`.
///
/// Used for the program itself and for every `{...}` block.
pub fn parse_statements(tokens: &[Lexeme], depth: usize) -> ParseResult<Vec<Node>> {
    split_statements(tokens)?.into_iter()
                             .map(|segment| parse_single(segment, depth))
                             .collect()
}

/// Parses a range of tokens that must hold exactly one expression.
///
/// # Errors
/// `ParseError::UnexpectedToken` when tokens remain after the expression.
pub fn parse_single(tokens: &[Lexeme], depth: usize) -> ParseResult<Node> {
    let mut cursor = TokenCursor::new(tokens, depth);
    let node = stack::grow(|| parse_expression(&mut cursor))?;
    expect_end(&cursor)?;
    Ok(node)
}

/// Parses the inside of an argument or parameter list.
///
/// Each comma-separated part is parsed as exactly one expression; blank
/// parts are skipped.
pub fn parse_list(tokens: &[Lexeme], depth: usize) -> ParseResult<Vec<Node>> {
    split_arguments(tokens).into_iter()
                           .map(|part| parse_single(part, depth))
                           .collect()
}

/// Parses the tokens between `opener` and its closer, taken with
/// [`TokenCursor::take_group`], one nesting level below `tokens`.
///
/// # Errors
/// `ParseError::NestingTooDeep` at `opener` when the level is past
/// [`MAX_NESTING`].
pub fn parse_inner<T, F>(tokens: &TokenCursor,
                         inner: &[Lexeme],
                         opener: &Lexeme,
                         parse: F)
                         -> ParseResult<T>
    where F: FnOnce(&[Lexeme], usize) -> ParseResult<T>
{
    let depth = nesting(tokens.depth + 1, opener)?;
    parse(inner, depth)
}

fn nesting(depth: usize, at: &Lexeme) -> ParseResult<usize> {
    if depth > MAX_NESTING {
        return Err(ParseError::NestingTooDeep { limit:  MAX_NESTING,
                                                line:   at.line,
                                                column: at.column, });
    }
    Ok(depth)
}

/// Parses a full expression.
///
/// It begins at the lowest-precedence level, assignment and logic, and
/// recursively descends through the precedence hierarchy.
///
/// Grammar: `expression := assignment`
pub fn parse_expression(tokens: &mut TokenCursor) -> ParseResult<Node> {
    parse_assignment(tokens)
}

/// Parses the operand of `operator` one nesting level deeper, failing if
/// the segment is over.
///
/// # Errors
/// - `ParseError::MissingOperand` at `operator` when nothing follows it.
/// - `ParseError::NestingTooDeep` at `operator` past [`MAX_NESTING`].
pub fn parse_operand<'a, F>(tokens: &mut TokenCursor<'a>,
                            operator: &Lexeme,
                            parse: F)
                            -> ParseResult<Node>
    where F: FnOnce(&mut TokenCursor<'a>) -> ParseResult<Node>
{
    if tokens.is_at_end() {
        return Err(ParseError::MissingOperand { operator: operator.token.to_string(),
                                                line:     operator.line,
                                                column:   operator.column, });
    }
    tokens.descend(operator, parse)
}

/// Consumes `expected`, or fails pointing at whatever is there instead.
///
/// # Parameters
/// - `tokens`: The cursor.
/// - `expected`: Token that must come next.
/// - `description`: Text used in the error message.
/// - `after`: Token the expected one should follow; used for the position
///   when the segment is over.
pub fn expect<'a>(tokens: &mut TokenCursor<'a>,
                  expected: &Token,
                  description: &'static str,
                  after: &Lexeme)
                  -> ParseResult<&'a Lexeme> {
    if let Some(lexeme) = tokens.advance_if(expected) {
        return Ok(lexeme);
    }
    let at = tokens.peek().unwrap_or(after);
    Err(ParseError::ExpectedToken { expected: description,
                                    line:     at.line,
                                    column:   at.column, })
}

/// Fails if any significant token is left in the segment.
pub fn expect_end(tokens: &TokenCursor) -> ParseResult<()> {
    match tokens.peek() {
        Some(lexeme) => Err(ParseError::UnexpectedToken { token:  lexeme.token.to_string(),
                                                          line:   lexeme.line,
                                                          column: lexeme.column, }),
        None => Ok(()),
    }
}
