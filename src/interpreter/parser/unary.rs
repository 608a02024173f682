use crate::{
    ast::{LiteralValue, Node, NodeKind},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            block::{parse_function, parse_if},
            core::{ParseResult, TokenCursor, parse_inner, parse_list, parse_operand, parse_single},
            segment::is_blank,
            statement::{parse_declaration, parse_exist, parse_pointer, parse_return},
        },
    },
};

/// Parses unary minus.
///
/// The rule is: `unary := "-" unary | postfix`
///
/// # Errors
/// `ParseError::MissingOperand` when nothing follows the `-`.
pub fn parse_unary(tokens: &mut TokenCursor) -> ParseResult<Node> {
    if let Some(minus) = tokens.advance_if(&Token::Minus) {
        let operand = parse_operand(tokens, minus, parse_unary)?;
        return Ok(Node::new(NodeKind::Negate(Box::new(operand)), minus.line, minus.column));
    }
    parse_postfix(tokens)
}

/// Parses a primary followed by any number of calls and attribute accesses.
///
/// `a.b.c` nests to the right (`get-attr(a, get-attr(b, c))`); a call
/// applies to everything before it, so `f(1)(2)` calls the result of `f(1)`
/// and `console.log(x)` calls the attribute `console.log`.
///
/// Every call or attribute access nests the node one level deeper.
///
/// The rule is: `postfix := primary ("(" arguments ")" | "." chain)*`
pub fn parse_postfix(tokens: &mut TokenCursor) -> ParseResult<Node> {
    let mut node = parse_primary(tokens)?;
    let mut levels = 0;

    loop {
        if let Some(open) = tokens.advance_if(&Token::LParen) {
            levels += 1;
            tokens.check_nesting(levels, open)?;
            let inner = tokens.take_group(open)?;
            let arguments = parse_inner(tokens, inner, open, parse_list)?;
            let (line, column) = (node.line, node.column);
            node = Node::new(NodeKind::Call { callee: Box::new(node),
                                              arguments },
                             line,
                             column);
            continue;
        }
        if let Some(dot) = tokens.advance_if(&Token::Dot) {
            levels += 1;
            tokens.check_nesting(levels, dot)?;
            let attribute = tokens.descend(dot, |tokens| parse_attribute_chain(tokens, dot))?;
            let (line, column) = (node.line, node.column);
            node = Node::new(NodeKind::GetAttr { base:      Box::new(node),
                                                 attribute: Box::new(attribute), },
                             line,
                             column);
            continue;
        }
        break;
    }

    Ok(node)
}

/// Parses the identifiers after a `.`, nesting further dots to the right.
///
/// # Errors
/// - `ParseError::MissingOperand` when the segment ends after `dot`.
/// - `ParseError::InvalidAttribute` when an attribute is not an identifier.
/// - `ParseError::NestingTooDeep` for chains longer than the nesting limit.
fn parse_attribute_chain(tokens: &mut TokenCursor, dot: &Lexeme) -> ParseResult<Node> {
    let Some(lexeme) = tokens.advance() else {
        return Err(ParseError::MissingOperand { operator: dot.token.to_string(),
                                                line:     dot.line,
                                                column:   dot.column, });
    };
    let Token::Identifier(name) = &lexeme.token else {
        return Err(ParseError::InvalidAttribute { line:   lexeme.line,
                                                  column: lexeme.column, });
    };
    let attribute = Node::new(NodeKind::Variable(name.clone()), lexeme.line, lexeme.column);

    if let Some(next) = tokens.peek()
       && next.token == Token::Dot
       && tokens.peek_second().is_some_and(|after| matches!(after.token, Token::Identifier(_)))
    {
        tokens.advance();
        let rest = tokens.descend(next, |tokens| parse_attribute_chain(tokens, next))?;
        return Ok(Node::new(NodeKind::GetAttr { base:      Box::new(attribute),
                                                attribute: Box::new(rest), },
                            lexeme.line,
                            lexeme.column));
    }
    Ok(attribute)
}

/// Parses a primary expression.
///
/// Primary expressions are literals, variables, parenthesized groups and the
/// keyword forms `if`, `function`, `local`, `global`, `return`, `exist` and
/// `pointer`.
///
/// # Errors
/// - `ParseError::InvalidExpression` for a binary operator in operand
///   position.
/// - `ParseError::UnexpectedToken` for any other token that cannot start an
///   expression.
pub fn parse_primary(tokens: &mut TokenCursor) -> ParseResult<Node> {
    let Some(lexeme) = tokens.advance() else {
        let (line, column) = tokens.end_position();
        return Err(ParseError::ExpectedToken { expected: "an expression",
                                               line,
                                               column });
    };
    let at = |kind| Node::new(kind, lexeme.line, lexeme.column);

    match &lexeme.token {
        Token::Number(value) => Ok(at(NodeKind::Literal(LiteralValue::Number(*value)))),
        Token::Str(text) => Ok(at(NodeKind::Literal(LiteralValue::Str(text.clone())))),
        Token::Identifier(name) => Ok(at(NodeKind::Variable(name.clone()))),
        Token::LParen => parse_group(tokens, lexeme),
        Token::If => parse_if(tokens, lexeme),
        Token::Function => parse_function(tokens, lexeme),
        Token::Local | Token::Global => parse_declaration(tokens, lexeme),
        Token::Return => parse_return(tokens, lexeme),
        Token::Exist => parse_exist(tokens, lexeme),
        Token::Pointer => parse_pointer(tokens, lexeme),
        Token::Plus
        | Token::Star
        | Token::Slash
        | Token::EqualEqual
        | Token::And
        | Token::Or
        | Token::Assign => Err(ParseError::InvalidExpression { token:  lexeme.token.to_string(),
                                                               line:   lexeme.line,
                                                               column: lexeme.column, }),
        _ => Err(ParseError::UnexpectedToken { token:  lexeme.token.to_string(),
                                               line:   lexeme.line,
                                               column: lexeme.column, }),
    }
}

/// Parses `( expr )`; the empty group `()` is the null literal.
fn parse_group(tokens: &mut TokenCursor, open: &Lexeme) -> ParseResult<Node> {
    let inner = tokens.take_group(open)?;
    let kind = if is_blank(inner) {
        NodeKind::Literal(LiteralValue::Null)
    } else {
        NodeKind::Group(Box::new(parse_inner(tokens, inner, open, parse_single)?))
    };
    Ok(Node::new(kind, open.line, open.column))
}
