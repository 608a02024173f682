use std::{fmt, rc::Rc};

use crate::util::num::format_number;

/// Represents a literal value in the language.
///
/// `LiteralValue` covers the constants that can appear directly in source
/// code. `()` parses to [`LiteralValue::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A number literal such as `12.5`.
    Number(f64),
    /// A string literal, without its quotes.
    Str(String),
    /// The empty group `()`.
    Null,
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", format_number(*value)),
            Self::Str(text) => write!(f, "\"{text}\""),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A node of the syntax tree together with the position of the token that
/// introduced it.
///
/// Nodes are immutable once the parser has built them. Function bodies are
/// shared through `Rc` so function values can hold on to them cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What the node is.
    pub kind:   NodeKind,
    /// 1-based line of the node's first token.
    pub line:   usize,
    /// 1-based column of the node's first token.
    pub column: usize,
}

/// The kinds of node the parser produces.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A constant.
    Literal(LiteralValue),
    /// Reference to a variable by name.
    Variable(String),
    /// A call such as `f(1, x = 2)`. Named arguments are `Assign` nodes
    /// whose target is a `Variable`.
    Call {
        /// The expression producing the callee.
        callee:    Box<Node>,
        /// Positional and named arguments in source order.
        arguments: Vec<Node>,
    },
    /// Attribute access `base.attribute`.
    ///
    /// `a.b.c` nests to the right: the base is `a` and the attribute is
    /// `GetAttr(b, c)`. The attribute side only ever holds `Variable` or
    /// `GetAttr` nodes.
    GetAttr {
        /// The object the chain starts from.
        base:      Box<Node>,
        /// The rest of the chain.
        attribute: Box<Node>,
    },
    /// `function [name] (parameters) { body }`.
    Function {
        /// Name the function is bound to, if any.
        name:       Option<String>,
        /// Each parameter is a `Variable` or an `Assign` of a `Variable` to
        /// its default expression.
        parameters: Vec<Node>,
        /// Statements of the function body.
        body:       Rc<[Node]>,
    },
    /// `if condition { body }`.
    If {
        /// The condition.
        condition: Box<Node>,
        /// Statements run when the condition holds.
        body:      Vec<Node>,
    },
    /// `target = value`.
    Assign {
        /// A `Variable` or a `GetAttr` chain.
        target: Box<Node>,
        /// The assigned expression.
        value:  Box<Node>,
    },
    /// `local name` or `local name = value`; the child is the `Variable` or
    /// the `Assign`.
    CreateLocal(Box<Node>),
    /// `global name` or `global name = value`; the child is the `Variable` or
    /// the `Assign`.
    CreateGlobal(Box<Node>),
    /// `return [value]`.
    Return(Option<Box<Node>>),
    /// `exist name`.
    Exist(Rc<Node>),
    /// `pointer target`.
    Pointer(Box<Node>),
    /// A binary operation.
    Binary {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<Node>,
        /// Right operand.
        right: Box<Node>,
    },
    /// Unary minus.
    Negate(Box<Node>),
    /// A parenthesized expression.
    Group(Box<Node>),
}

/// Represents a binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Identity comparison (`==`)
    Equal,
    /// Logical and (`&&` or `and`)
    And,
    /// Logical or (`||` or `or`)
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Equal => "==",
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(f, "{operator}")
    }
}

impl Node {
    /// Creates a node at the given position.
    #[must_use]
    pub const fn new(kind: NodeKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    /// Returns the variable name if the node is a plain `Variable`.
    ///
    /// ## Example
    /// ```
    /// use kll::ast::{Node, NodeKind};
    ///
    /// let node = Node::new(NodeKind::Variable("x".to_string()), 1, 1);
    /// assert_eq!(node.variable_name(), Some("x"));
    /// ```
    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Short label of the node kind, as printed in the tree view.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match &self.kind {
            NodeKind::Literal(_) => "value",
            NodeKind::Variable(_) => "var",
            NodeKind::Call { .. } => "call",
            NodeKind::GetAttr { .. } => "get attr",
            NodeKind::Function { .. } => "function",
            NodeKind::If { .. } => "if",
            NodeKind::Assign { .. } => "=",
            NodeKind::CreateLocal(_) => "create local",
            NodeKind::CreateGlobal(_) => "create global",
            NodeKind::Return(_) => "return",
            NodeKind::Exist(_) => "exist",
            NodeKind::Pointer(_) => "pointer",
            NodeKind::Binary { op, .. } => match op {
                BinaryOperator::Add => "+",
                BinaryOperator::Sub => "-",
                BinaryOperator::Mul => "*",
                BinaryOperator::Div => "/",
                BinaryOperator::Equal => "==",
                BinaryOperator::And => "&&",
                BinaryOperator::Or => "||",
            },
            NodeKind::Negate(_) => "negate",
            NodeKind::Group(_) => "()",
        }
    }

    fn write_tree(&self, out: &mut Vec<String>, depth: usize) {
        let indent = " ".repeat(depth);
        out.push(format!("{indent}Node {}", self.label()));
        let child = depth + 1;
        let leaf = |out: &mut Vec<String>, text: String| {
            out.push(format!("{}{text}", " ".repeat(child)));
        };
        match &self.kind {
            NodeKind::Literal(value) => leaf(out, value.to_string()),
            NodeKind::Variable(name) => leaf(out, name.clone()),
            NodeKind::Call { callee, arguments } => {
                callee.write_tree(out, child);
                write_group(out, "Parameters", arguments, child);
            },
            NodeKind::GetAttr { base, attribute } => {
                base.write_tree(out, child);
                attribute.write_tree(out, child);
            },
            NodeKind::Function { name,
                                 parameters,
                                 body, } => {
                leaf(out, name.clone().unwrap_or_default());
                write_group(out, "Parameters", parameters, child);
                write_group(out, "{}", body, child);
            },
            NodeKind::If { condition, body } => {
                condition.write_tree(out, child);
                write_group(out, "{}", body, child);
            },
            NodeKind::Assign { target, value } => {
                target.write_tree(out, child);
                value.write_tree(out, child);
            },
            NodeKind::Binary { left, right, .. } => {
                left.write_tree(out, child);
                right.write_tree(out, child);
            },
            NodeKind::Return(value) => {
                if let Some(value) = value {
                    value.write_tree(out, child);
                }
            },
            NodeKind::Exist(inner) => inner.write_tree(out, child),
            NodeKind::CreateLocal(inner)
            | NodeKind::CreateGlobal(inner)
            | NodeKind::Pointer(inner)
            | NodeKind::Negate(inner)
            | NodeKind::Group(inner) => inner.write_tree(out, child),
        }
    }
}

/// Writes a synthetic `Parameters` or `{}` header followed by its members.
fn write_group(out: &mut Vec<String>, label: &str, nodes: &[Node], depth: usize) {
    out.push(format!("{}Node {label}", " ".repeat(depth)));
    for node in nodes {
        node.write_tree(out, depth + 1);
    }
}

/// Renders the node as an indented tree, one node per line.
///
/// ## Example
/// ```
/// use kll::ast::{BinaryOperator, LiteralValue, Node, NodeKind};
///
/// let one = Node::new(NodeKind::Literal(LiteralValue::Number(1.0)), 1, 1);
/// let x = Node::new(NodeKind::Variable("x".to_string()), 1, 5);
/// let sum = Node::new(NodeKind::Binary { op:    BinaryOperator::Add,
///                                        left:  Box::new(one),
///                                        right: Box::new(x), },
///                     1,
///                     3);
/// assert_eq!(sum.to_string(), "Node +\n Node value\n  1\n Node var\n  x");
/// ```
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.write_tree(&mut lines, 0);
        write!(f, "{}", lines.join("\n"))
    }
}
