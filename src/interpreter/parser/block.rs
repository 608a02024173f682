use std::rc::Rc;

use crate::{
    ast::{Node, NodeKind},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::core::{
            ParseResult, TokenCursor, expect, parse_expression, parse_inner, parse_list,
            parse_operand, parse_statements,
        },
    },
};

/// Parses a block delimited by braces.
///
/// The tokens between the `{` and its matching `}` form an independent
/// statement list, split and parsed the same way as a whole program.
///
/// Grammar: `block := "{" statements "}"`
///
/// # Parameters
/// - `tokens`: Cursor positioned on the opening brace.
/// - `after`: Token the block follows, used for error positions.
///
/// # Returns
/// The statements of the block.
pub fn parse_block(tokens: &mut TokenCursor, after: &Lexeme) -> ParseResult<Vec<Node>> {
    let open = expect(tokens, &Token::LBrace, "{", after)?;
    let inner = tokens.take_group(open)?;
    parse_inner(tokens, inner, open, parse_statements)
}

/// Parses an `if` statement; there is no `else`.
///
/// Grammar: `if := "if" expression block`
///
/// # Parameters
/// - `tokens`: Cursor positioned after the `if` keyword.
/// - `keyword`: The `if` token.
///
/// # Errors
/// - `ParseError::MissingOperand` when the segment ends after `if`.
/// - `ParseError::ExpectedToken` when the condition is not followed by `{`.
pub fn parse_if(tokens: &mut TokenCursor, keyword: &Lexeme) -> ParseResult<Node> {
    let condition = parse_operand(tokens, keyword, parse_expression)?;
    let body = parse_block(tokens, keyword)?;
    Ok(Node::new(NodeKind::If { condition: Box::new(condition),
                                body },
                 keyword.line,
                 keyword.column))
}

/// Parses a function literal.
///
/// Grammar: `function := "function" identifier? "(" parameters ")" block`
///
/// Each parameter is either `name` or `name = default`.
///
/// # Parameters
/// - `tokens`: Cursor positioned after the `function` keyword.
/// - `keyword`: The `function` token.
///
/// # Errors
/// - `ParseError::ExpectedToken` when `(` or `{` is missing.
/// - `ParseError::InvalidDeclaration` for a parameter that is neither a name
///   nor a name with a default.
pub fn parse_function(tokens: &mut TokenCursor, keyword: &Lexeme) -> ParseResult<Node> {
    let name = match tokens.peek() {
        Some(Lexeme { token: Token::Identifier(name),
                      .. }) => {
            tokens.advance();
            Some(name.clone())
        },
        _ => None,
    };

    let open = expect(tokens, &Token::LParen, "(", keyword)?;
    let inner = tokens.take_group(open)?;
    let parameters = parse_inner(tokens, inner, open, parse_list)?;
    for parameter in &parameters {
        if !is_declaration(parameter) {
            return Err(ParseError::InvalidDeclaration { line:   parameter.line,
                                                        column: parameter.column, });
        }
    }

    let body = parse_block(tokens, keyword)?;
    Ok(Node::new(NodeKind::Function { name,
                                      parameters,
                                      body: Rc::from(body) },
                 keyword.line,
                 keyword.column))
}

/// Returns `true` for `name` and `name = value`.
pub fn is_declaration(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Variable(_) => true,
        NodeKind::Assign { target, .. } => target.variable_name().is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{
        lexer::tokenize,
        parser::core::{MAX_NESTING, parse},
    };

    fn parse_source(source: &str) -> ParseResult<Vec<Node>> {
        parse(&tokenize(source).unwrap())
    }

    #[test]
    fn function_with_defaults() {
        let nodes = parse_source("function add(a, b = 2) {\n  return a + b\n}").unwrap();
        let NodeKind::Function { name,
                                 parameters,
                                 body, } = &nodes[0].kind
        else {
            panic!("expected a function");
        };
        assert_eq!(name.as_deref(), Some("add"));
        assert_eq!(parameters.len(), 2);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn anonymous_function() {
        let nodes = parse_source("local f = function (x) { x }").unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn if_needs_a_block() {
        assert_eq!(parse_source("if a b"),
                   Err(ParseError::ExpectedToken { expected: "{",
                                                   line:     1,
                                                   column:   6, }));
        assert_eq!(parse_source("if"),
                   Err(ParseError::MissingOperand { operator: "if".to_string(),
                                                    line:     1,
                                                    column:   1, }));
    }

    #[test]
    fn bad_parameters() {
        assert_eq!(parse_source("function (1) {}"),
                   Err(ParseError::InvalidDeclaration { line: 1, column: 11 }));
    }

    #[test]
    fn blocks_count_towards_nesting() {
        let deep = format!("{}x{}", "if a {".repeat(MAX_NESTING + 1), "}".repeat(MAX_NESTING + 1));
        assert!(matches!(parse_source(&deep), Err(ParseError::NestingTooDeep { .. })));

        let shallow = format!("{}x{}", "if a {".repeat(100), "}".repeat(100));
        assert!(parse_source(&shallow).is_ok());
    }

    #[test]
    fn nested_blocks_parse_independently() {
        let nodes = parse_source("if a {\n if b {\n c\n }\n d\n}").unwrap();
        let NodeKind::If { body, .. } = &nodes[0].kind else {
            panic!("expected if");
        };
        assert_eq!(body.len(), 2);
    }
}
