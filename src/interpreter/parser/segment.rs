use crate::{
    error::ParseError,
    interpreter::{lexer::Lexeme, lexer::Token, parser::core::ParseResult},
};

/// Splits a token range into statement segments.
///
/// Statements end at a top-level `;` or newline. A newline right after a
/// token that still needs an operand (a binary operator, `=`, `.`, `,`, `(`
/// or one of the keywords `return`, `local`, `global`, `if`, `exist`,
/// `pointer`) does not end the statement, so dangling operators continue on
/// the next line. Separators nested inside `(...)` or `{...}` never split.
///
/// The bracket structure of the whole range is checked on the way.
///
/// # Parameters
/// - `tokens`: The range to split.
///
/// # Returns
/// The non-empty segments, in order. Segments may still contain newline
/// tokens from inside brackets or continued lines; the cursor skips them.
///
/// # Errors
/// - `ParseError::UnmatchedBracket` at a `)` or `}` without an opener, or one
///   that closes the wrong kind of bracket.
/// - `ParseError::UnterminatedGroup` / `ParseError::UnterminatedBlock` at an
///   opener that is never closed.
pub fn split_statements(tokens: &[Lexeme]) -> ParseResult<Vec<&[Lexeme]>> {
    let mut segments = Vec::new();
    let mut openers: Vec<&Lexeme> = Vec::new();
    let mut start = 0;
    let mut last_significant: Option<&Token> = None;

    for (index, lexeme) in tokens.iter().enumerate() {
        match &lexeme.token {
            Token::LParen | Token::LBrace => openers.push(lexeme),
            Token::RParen | Token::RBrace => close_bracket(&mut openers, lexeme)?,
            Token::Semicolon if openers.is_empty() => {
                push_segment(&mut segments, &tokens[start..index]);
                start = index + 1;
                last_significant = None;
                continue;
            },
            Token::NewLine if openers.is_empty() => {
                if !last_significant.is_some_and(Token::needs_operand) {
                    push_segment(&mut segments, &tokens[start..index]);
                    start = index + 1;
                    last_significant = None;
                }
                continue;
            },
            _ => {},
        }
        if lexeme.token != Token::NewLine {
            last_significant = Some(&lexeme.token);
        }
    }

    if let Some(opener) = openers.pop() {
        return Err(unterminated(opener));
    }
    push_segment(&mut segments, &tokens[start..]);
    Ok(segments)
}

/// Splits the inside of a `(...)` at its top-level commas.
///
/// Parts that hold nothing but newlines are dropped, so `f(1,,2)` and
/// `f(\n)` are accepted.
///
/// # Parameters
/// - `tokens`: Tokens between the parentheses, already known to be
///   balanced.
pub fn split_arguments(tokens: &[Lexeme]) -> Vec<&[Lexeme]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, lexeme) in tokens.iter().enumerate() {
        match lexeme.token {
            Token::LParen | Token::LBrace => depth += 1,
            Token::RParen | Token::RBrace => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                push_segment(&mut parts, &tokens[start..index]);
                start = index + 1;
            },
            _ => {},
        }
    }
    push_segment(&mut parts, &tokens[start..]);
    parts
}

/// Finds the closer matching an opener that has just been consumed.
///
/// # Parameters
/// - `tokens`: Tokens following the opener.
///
/// # Returns
/// The index of the matching `)` or `}` in `tokens`, or `None` when the
/// range ends first.
pub fn find_closing(tokens: &[Lexeme]) -> Option<usize> {
    let mut depth = 1usize;
    for (index, lexeme) in tokens.iter().enumerate() {
        match lexeme.token {
            Token::LParen | Token::LBrace => depth += 1,
            Token::RParen | Token::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            },
            _ => {},
        }
    }
    None
}

/// Returns the error for an opener that is never closed.
pub fn unterminated(opener: &Lexeme) -> ParseError {
    if opener.token == Token::LBrace {
        ParseError::UnterminatedBlock { line:   opener.line,
                                        column: opener.column, }
    } else {
        ParseError::UnterminatedGroup { line:   opener.line,
                                        column: opener.column, }
    }
}

/// Returns `true` when the range holds nothing but newlines.
pub fn is_blank(tokens: &[Lexeme]) -> bool {
    tokens.iter().all(|lexeme| lexeme.token == Token::NewLine)
}

fn push_segment<'a>(segments: &mut Vec<&'a [Lexeme]>, segment: &'a [Lexeme]) {
    if !is_blank(segment) {
        segments.push(segment);
    }
}

fn close_bracket(openers: &mut Vec<&Lexeme>, closer: &Lexeme) -> ParseResult<()> {
    let expected = if closer.token == Token::RParen { Token::LParen } else { Token::LBrace };
    match openers.pop() {
        Some(opener) if opener.token == expected => Ok(()),
        _ => Err(ParseError::UnmatchedBracket { bracket: if closer.token == Token::RParen {
                                                    ')'
                                                } else {
                                                    '}'
                                                },
                                                line:    closer.line,
                                                column:  closer.column, }),
    }
}
