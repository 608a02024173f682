use crate::{
    ast::{BinaryOperator, Node, NodeKind},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            core::{ParseResult, TokenCursor, parse_operand},
            unary::parse_unary,
        },
    },
};

/// Parses assignment and logical expressions.
///
/// `=`, `&&` and `||` share the lowest precedence level and are
/// right-associative, so `a = b && c` assigns `b && c` to `a`.
///
/// The rule is: `assignment := equality (("=" | "&&" | "||") assignment)?`
///
/// # Parameters
/// - `tokens`: Cursor over the current segment.
///
/// # Errors
/// - `ParseError::InvalidAssignmentTarget` when the left side of `=` is not a
///   variable or an attribute chain.
/// - `ParseError::MissingOperand` when the segment ends after the operator.
pub fn parse_assignment(tokens: &mut TokenCursor) -> ParseResult<Node> {
    let left = parse_equality(tokens)?;
    let Some(operator) = tokens.peek() else {
        return Ok(left);
    };

    match operator.token {
        Token::Assign => {
            tokens.advance();
            check_assignment_target(&left)?;
            let value = parse_operand(tokens, operator, parse_assignment)?;
            Ok(Node::new(NodeKind::Assign { target: Box::new(left),
                                            value:  Box::new(value), },
                         operator.line,
                         operator.column))
        },
        Token::And => {
            tokens.advance();
            let right = parse_operand(tokens, operator, parse_assignment)?;
            Ok(binary(BinaryOperator::And, operator, left, right))
        },
        Token::Or => {
            tokens.advance();
            let right = parse_operand(tokens, operator, parse_assignment)?;
            Ok(binary(BinaryOperator::Or, operator, left, right))
        },
        _ => Ok(left),
    }
}

/// Parses identity comparisons.
///
/// The rule is: `equality := arithmetic ("==" equality)?`
pub fn parse_equality(tokens: &mut TokenCursor) -> ParseResult<Node> {
    let left = parse_arithmetic(tokens)?;
    if let Some(operator) = tokens.advance_if(&Token::EqualEqual) {
        let right = parse_operand(tokens, operator, parse_equality)?;
        return Ok(binary(BinaryOperator::Equal, operator, left, right));
    }
    Ok(left)
}

/// Parses arithmetic expressions.
///
/// All four arithmetic operators share one precedence level and associate to
/// the right: `1 + 2 * 3` is `1 + (2 * 3)` and `2 * 3 + 1` is `2 * (3 + 1)`.
///
/// The rule is: `arithmetic := unary (("+" | "-" | "*" | "/") arithmetic)?`
pub fn parse_arithmetic(tokens: &mut TokenCursor) -> ParseResult<Node> {
    let left = parse_unary(tokens)?;
    if let Some(operator) = tokens.peek()
       && let Some(op) = token_to_binary_operator(&operator.token)
       && matches!(op,
                   BinaryOperator::Add
                   | BinaryOperator::Sub
                   | BinaryOperator::Mul
                   | BinaryOperator::Div)
    {
        tokens.advance();
        let right = parse_operand(tokens, operator, parse_arithmetic)?;
        return Ok(binary(op, operator, left, right));
    }
    Ok(left)
}

/// Maps an operator token to its [`BinaryOperator`].
///
/// # Returns
/// `None` for tokens that are not binary operators (including `=`).
#[must_use]
pub const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Sub),
        Token::Star => Some(BinaryOperator::Mul),
        Token::Slash => Some(BinaryOperator::Div),
        Token::EqualEqual => Some(BinaryOperator::Equal),
        Token::And => Some(BinaryOperator::And),
        Token::Or => Some(BinaryOperator::Or),
        _ => None,
    }
}

fn binary(op: BinaryOperator, operator: &Lexeme, left: Node, right: Node) -> Node {
    Node::new(NodeKind::Binary { op,
                                 left: Box::new(left),
                                 right: Box::new(right) },
              operator.line,
              operator.column)
}

/// Only variables and attribute chains can be assigned to.
fn check_assignment_target(target: &Node) -> ParseResult<()> {
    match target.kind {
        NodeKind::Variable(_) | NodeKind::GetAttr { .. } => Ok(()),
        _ => Err(ParseError::InvalidAssignmentTarget { line:   target.line,
                                                       column: target.column, }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{
        lexer::tokenize,
        parser::core::{MAX_NESTING, parse_single},
    };

    fn parse(source: &str) -> ParseResult<Node> {
        let tokens = tokenize(source).unwrap();
        parse_single(&tokens, 0)
    }

    fn shape(node: &Node) -> String {
        match &node.kind {
            NodeKind::Binary { op, left, right } => {
                format!("({} {op} {})", shape(left), shape(right))
            },
            NodeKind::Assign { target, value } => format!("({} = {})", shape(target), shape(value)),
            NodeKind::Literal(value) => value.to_string(),
            NodeKind::Variable(name) => name.clone(),
            _ => node.label().to_string(),
        }
    }

    #[test]
    fn arithmetic_is_one_right_associative_level() {
        assert_eq!(shape(&parse("1 + 2 * 3").unwrap()), "(1 + (2 * 3))");
        assert_eq!(shape(&parse("2 * 3 + 1").unwrap()), "(2 * (3 + 1))");
        assert_eq!(shape(&parse("10 - 2 - 3").unwrap()), "(10 - (2 - 3))");
    }

    #[test]
    fn equality_binds_tighter_than_logic() {
        assert_eq!(shape(&parse("a == 1 && b").unwrap()), "((a == 1) && b)");
        assert_eq!(shape(&parse("x = a or b").unwrap()), "(x = (a || b))");
    }

    #[test]
    fn invalid_targets_are_rejected() {
        assert_eq!(parse("1 = 2"),
                   Err(ParseError::InvalidAssignmentTarget { line: 1, column: 1 }));
        assert_eq!(parse("x = "),
                   Err(ParseError::MissingOperand { operator: "=".to_string(),
                                                    line:     1,
                                                    column:   3, }));
        assert!(parse("a.b = 2").is_ok());
    }

    #[test]
    fn long_operator_chains_hit_the_nesting_limit() {
        let chain = vec!["1"; MAX_NESTING + 2].join(" + ");
        assert!(matches!(parse(&chain),
                         Err(ParseError::NestingTooDeep { limit: MAX_NESTING, .. })));
        assert!(parse(&vec!["1"; 200].join(" + ")).is_ok());
        assert!(parse(&format!("{}1", "-".repeat(MAX_NESTING + 1))).is_err());
    }
}
