use std::rc::Rc;

use crate::{
    ast::{Node, NodeKind},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            block::is_declaration,
            core::{ParseResult, TokenCursor, parse_expression, parse_operand},
            unary::parse_postfix,
        },
    },
};

/// Parses a variable declaration.
///
/// Handles both `local` (also spelled `var`) and `global`:
///
/// ```text
///     local name
///     local name = expression
///     global name = expression
/// ```
///
/// # Parameters
/// - `tokens`: Cursor positioned after the keyword.
/// - `keyword`: The `local` or `global` token.
///
/// # Errors
/// - `ParseError::MissingOperand` when nothing follows the keyword.
/// - `ParseError::InvalidDeclaration` when the operand is neither `name` nor
///   `name = expression`.
pub fn parse_declaration(tokens: &mut TokenCursor, keyword: &Lexeme) -> ParseResult<Node> {
    let declared = parse_operand(tokens, keyword, parse_expression)?;
    if !is_declaration(&declared) {
        return Err(ParseError::InvalidDeclaration { line:   keyword.line,
                                                    column: keyword.column, });
    }
    let kind = if keyword.token == Token::Global {
        NodeKind::CreateGlobal(Box::new(declared))
    } else {
        NodeKind::CreateLocal(Box::new(declared))
    };
    Ok(Node::new(kind, keyword.line, keyword.column))
}

/// Parses `return` with an optional value.
pub fn parse_return(tokens: &mut TokenCursor, keyword: &Lexeme) -> ParseResult<Node> {
    let value = if tokens.is_at_end() {
        None
    } else {
        Some(Box::new(parse_operand(tokens, keyword, parse_expression)?))
    };
    Ok(Node::new(NodeKind::Return(value), keyword.line, keyword.column))
}

/// Parses `exist name`.
///
/// # Errors
/// `ParseError::InvalidExistTarget` unless the operand is a plain variable.
pub fn parse_exist(tokens: &mut TokenCursor, keyword: &Lexeme) -> ParseResult<Node> {
    let operand = parse_operand(tokens, keyword, parse_postfix)?;
    if operand.variable_name().is_none() {
        return Err(ParseError::InvalidExistTarget { line:   operand.line,
                                                    column: operand.column, });
    }
    Ok(Node::new(NodeKind::Exist(Rc::new(operand)), keyword.line, keyword.column))
}

/// Parses `pointer target`.
///
/// Whether the target can be pointed at is decided when the pointer is
/// created at runtime.
pub fn parse_pointer(tokens: &mut TokenCursor, keyword: &Lexeme) -> ParseResult<Node> {
    let target = parse_operand(tokens, keyword, parse_postfix)?;
    Ok(Node::new(NodeKind::Pointer(Box::new(target)), keyword.line, keyword.column))
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
    fn declarations() {
        let nodes = parse_source("local x\nvar y = 1\nglobal z = y").unwrap();
        assert!(matches!(nodes[0].kind, NodeKind::CreateLocal(_)));
        assert!(matches!(nodes[1].kind, NodeKind::CreateLocal(_)));
        assert!(matches!(nodes[2].kind, NodeKind::CreateGlobal(_)));
    }

    #[test]
    fn invalid_declarations() {
        assert_eq!(parse_source("local 5"),
                   Err(ParseError::InvalidDeclaration { line: 1, column: 1 }));
        assert_eq!(parse_source("global a.b = 1"),
                   Err(ParseError::InvalidDeclaration { line: 1, column: 1 }));
    }

    #[test]
    fn exist_needs_a_variable() {
        assert!(parse_source("exist x").is_ok());
        assert_eq!(parse_source("exist x.y"),
                   Err(ParseError::InvalidExistTarget { line: 1, column: 7 }));
    }

    #[test]
    fn bare_return() {
        let nodes = parse_source("return").unwrap();
        assert_eq!(nodes[0].kind, NodeKind::Return(None));
    }

    #[test]
    fn repeated_keywords_are_nesting() {
        let deep = format!("{}1", "return ".repeat(MAX_NESTING + 1));
        assert!(matches!(parse_source(&deep), Err(ParseError::NestingTooDeep { .. })));
        assert!(parse_source("return return 1").is_ok());
    }
}
