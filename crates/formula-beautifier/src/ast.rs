//! Formula syntax tree

use std::{fmt, mem};

/// Parsed formula node
///
/// Every variant owns its children; text is kept exactly as it appeared in
/// the source so printing never alters tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Function call, name as written
    Call { name: String, args: Vec<Node> },

    /// Binary operation
    Binary {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Unary `-` or `+`
    Prefix { op: String, operand: Box<Node> },

    /// Postfix `%`
    Postfix { operand: Box<Node>, op: String },

    /// Parenthesized expression not owned by a call
    Group(Box<Node>),

    /// Array constant, rows of columns
    Array(Vec<Vec<Node>>),

    /// Number, string, boolean, error value, reference or defined name.
    /// An omitted call argument is an empty literal.
    Literal(String),
}

impl Node {
    pub fn literal(text: impl Into<String>) -> Self {
        Node::Literal(text.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            args,
        }
    }

    pub fn binary(op: impl Into<String>, left: Node, right: Node) -> Self {
        Node::Binary {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Walk down the left spine of a chain of binary operators.
    ///
    /// Returns the leftmost operand and the `(op, right)` pairs in source
    /// order, so long `A1+A2+...` chains can be printed without recursion.
    pub fn binary_chain(&self) -> (&Node, Vec<(&str, &Node)>) {
        let mut node = self;
        let mut rest = Vec::new();
        while let Node::Binary { op, left, right } = node {
            rest.push((op.as_str(), right.as_ref()));
            node = left.as_ref();
        }
        rest.reverse();
        (node, rest)
    }
}

/// Tears the tree down with an explicit stack. The parser builds
/// left-associative chains as one long left spine, and the derived drop
/// would recurse once per operator.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl Node {
    /// Move every child onto `pending`, leaving empty leaves in their place
    fn detach_children(&mut self, pending: &mut Vec<Node>) {
        match self {
            Node::Call { args, .. } => pending.append(args),
            Node::Binary { left, right, .. } => {
                pending.push(mem::replace(left.as_mut(), Node::Literal(String::new())));
                pending.push(mem::replace(right.as_mut(), Node::Literal(String::new())));
            }
            Node::Prefix { operand, .. }
            | Node::Postfix { operand, .. }
            | Node::Group(operand) => {
                pending.push(mem::replace(operand.as_mut(), Node::Literal(String::new())));
            }
            Node::Array(rows) => {
                for row in rows.iter_mut() {
                    pending.append(row);
                }
            }
            Node::Literal(_) => {}
        }
    }
}

/// Compact single-line rendering with no added whitespace
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Node::Binary { .. } => {
                let (first, rest) = self.binary_chain();
                write!(f, "{first}")?;
                for (op, right) in rest {
                    write!(f, "{op}{right}")?;
                }
                Ok(())
            }
            Node::Prefix { op, operand } => write!(f, "{op}{operand}"),
            Node::Postfix { operand, op } => write!(f, "{operand}{op}"),
            Node::Group(inner) => write!(f, "({inner})"),
            Node::Array(rows) => {
                f.write_str("{")?;
                for (r, row) in rows.iter().enumerate() {
                    if r > 0 {
                        f.write_str(";")?;
                    }
                    for (c, item) in row.iter().enumerate() {
                        if c > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{item}")?;
                    }
                }
                f.write_str("}")
            }
            Node::Literal(text) => f.write_str(text),
        }
    }
}
