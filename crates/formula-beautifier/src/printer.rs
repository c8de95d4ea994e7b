//! Tree printer
//!
//! Renders a [`Node`] tree as indented text. Calls to formatting-significant
//! functions with several arguments, and calls too wide for one line, get one
//! argument per line; everything else stays inline.

use crate::ast::Node;
use crate::options::FormatOptions;

/// Separator between arguments of a call kept on one line
const INLINE_SEPARATOR: &str = ", ";

/// Prints syntax trees according to [`FormatOptions`]
pub struct Printer<'a> {
    options: &'a FormatOptions,
}

impl<'a> Printer<'a> {
    pub fn new(options: &'a FormatOptions) -> Self {
        Self { options }
    }

    /// Render `root` starting at nesting level zero
    pub fn print(&self, root: &Node) -> String {
        let mut out = String::new();
        self.write_node(root, 0, &mut out);
        out
    }

    /// Write `node` at `depth`. The first line continues wherever `out`
    /// currently ends; continuation lines carry their own indentation.
    fn write_node(&self, node: &Node, depth: usize, out: &mut String) {
        match node {
            Node::Call { name, args } => {
                if self.breaks_lines(node, current_column(out)) {
                    self.write_multiline_call(name, args, depth, out);
                } else {
                    out.push_str(name);
                    out.push('(');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(INLINE_SEPARATOR);
                        }
                        self.write_node(arg, depth + 1, out);
                    }
                    out.push(')');
                }
            }
            Node::Binary { .. } => {
                let (first, rest) = node.binary_chain();
                self.write_node(first, depth, out);
                for (op, right) in rest {
                    out.push_str(op);
                    self.write_node(right, depth, out);
                }
            }
            Node::Prefix { op, operand } => {
                out.push_str(op);
                self.write_node(operand, depth, out);
            }
            Node::Postfix { operand, op } => {
                self.write_node(operand, depth, out);
                out.push_str(op);
            }
            Node::Group(inner) => {
                out.push('(');
                self.write_node(inner, depth, out);
                out.push(')');
            }
            Node::Array(rows) => {
                out.push('{');
                for (r, row) in rows.iter().enumerate() {
                    if r > 0 {
                        out.push(';');
                    }
                    for (c, item) in row.iter().enumerate() {
                        if c > 0 {
                            out.push(',');
                        }
                        self.write_node(item, depth, out);
                    }
                }
                out.push('}');
            }
            Node::Literal(text) => out.push_str(text),
        }
    }

    fn write_multiline_call(&self, name: &str, args: &[Node], depth: usize, out: &mut String) {
        let inner = self.options.indent_at(depth + 1);

        out.push_str(name);
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('\n');
            out.push_str(&inner);
            self.write_node(arg, depth + 1, out);
        }
        out.push('\n');
        out.push_str(&self.options.indent_at(depth));
        out.push(')');
    }

    /// Whether `call`, starting at `column` of the current line, needs one
    /// argument per line
    fn breaks_lines(&self, call: &Node, column: usize) -> bool {
        let Node::Call { name, args } = call else {
            return false;
        };
        if args.is_empty() {
            return false;
        }
        if args.len() > 1 && self.options.is_multiline_function(name) {
            return true;
        }
        column + inline_width(call) > self.options.max_line_width
    }
}

/// Characters already written on the last line of `out`
fn current_column(out: &str) -> usize {
    let line_start = out.rfind('\n').map_or(0, |i| i + 1);
    out[line_start..].chars().count()
}

/// Width in characters of `node` printed entirely on one line
fn inline_width(node: &Node) -> usize {
    match node {
        Node::Call { name, args } => {
            let separators = args.len().saturating_sub(1) * INLINE_SEPARATOR.len();
            name.chars().count() + 2 + separators + args.iter().map(inline_width).sum::<usize>()
        }
        Node::Binary { .. } => {
            let (first, rest) = node.binary_chain();
            inline_width(first)
                + rest
                    .iter()
                    .map(|(op, right)| op.chars().count() + inline_width(right))
                    .sum::<usize>()
        }
        Node::Prefix { op, operand } | Node::Postfix { operand, op } => {
            op.chars().count() + inline_width(operand)
        }
        Node::Group(inner) => 2 + inline_width(inner),
        Node::Array(rows) => {
            let items: usize = rows.iter().flatten().map(inline_width).sum();
            let item_count: usize = rows.iter().map(Vec::len).sum();
            // braces plus one ',' or ';' between consecutive items
            2 + items + item_count.saturating_sub(1)
        }
        Node::Literal(text) => text.chars().count(),
    }
}
