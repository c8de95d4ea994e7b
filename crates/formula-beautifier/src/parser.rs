//! Formula parser
//!
//! A recursive descent parser over the token stream with Excel operator
//! precedence.

use crate::ast::Node;
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse a formula string into a syntax tree
///
/// # Example
/// ```rust
/// use formula_beautifier::{parse_formula, Node};
///
/// let ast = parse_formula("=SUM(A1:A10)", 64).unwrap();
/// assert_eq!(ast, Node::call("SUM", vec![Node::literal("A1:A10")]));
/// ```
pub fn parse_formula(formula: &str, max_depth: usize) -> FormulaResult<Node> {
    let tokens = tokenize(formula)?;
    parse_tokens(&tokens, max_depth)
}

/// Parse an already tokenized formula
pub fn parse_tokens(tokens: &[Token], max_depth: usize) -> FormulaResult<Node> {
    let mut parser = FormulaParser::new(tokens, max_depth);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if let Some(token) = parser.current() {
        let message = match token.kind {
            TokenKind::Comma => "Comma outside of a function argument list".to_string(),
            TokenKind::RightParen => "Unbalanced parentheses: unmatched ')'".to_string(),
            _ => format!("Unexpected '{}' after expression", token.text),
        };
        return Err(FormulaError::syntax(token.offset, message));
    }

    Ok(expr)
}

struct FormulaParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
    /// Offset reported for errors at end of input
    end: usize,
}

impl<'t> FormulaParser<'t> {
    fn new(tokens: &'t [Token], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
            end: tokens.last().map_or(0, Token::end),
        }
    }

    // === Token access ===

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn at_operator(&self, ops: &[&str]) -> Option<&'t Token> {
        self.current()
            .filter(|t| ops.iter().any(|op| t.is_operator(op)))
    }

    fn consume(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_closing(&mut self, kind: TokenKind, open: &Token) -> FormulaResult<()> {
        match self.current() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(FormulaError::syntax(
                token.offset,
                format!("Expected closing for '{}', got '{}'", open.text, token.text),
            )),
            None => Err(FormulaError::syntax(
                open.offset,
                format!("Unbalanced parentheses: '{}' is never closed", open.text),
            )),
        }
    }

    /// Run `f` one nesting level deeper, failing past the depth limit
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> FormulaResult<T>) -> FormulaResult<T> {
        if self.depth >= self.max_depth {
            return Err(FormulaError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Comparison: =, <>, <, <=, >, >=
    // 2. Concatenation: &
    // 3. Addition/Subtraction: +, -
    // 4. Multiplication/Division: *, /
    // 5. Exponentiation: ^ (right associative)
    // 6. Prefix: -, +
    // 7. Postfix: %
    // 8. Primary: literals, references, calls, groups, arrays

    fn parse_expression(&mut self) -> FormulaResult<Node> {
        self.nested(Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> FormulaResult<Node> {
        self.parse_left_assoc(&["=", "<>", "<", "<=", ">", ">="], Self::parse_concatenation)
    }

    fn parse_concatenation(&mut self) -> FormulaResult<Node> {
        self.parse_left_assoc(&["&"], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> FormulaResult<Node> {
        self.parse_left_assoc(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Node> {
        self.parse_left_assoc(&["*", "/"], Self::parse_exponent)
    }

    fn parse_left_assoc(
        &mut self,
        ops: &[&str],
        operand: fn(&mut Self) -> FormulaResult<Node>,
    ) -> FormulaResult<Node> {
        let mut left = operand(self)?;

        while let Some(token) = self.at_operator(ops) {
            self.consume();
            let right = operand(self)?;
            left = Node::binary(token.text.as_str(), left, right);
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<Node> {
        let left = self.parse_prefix()?;

        if let Some(token) = self.at_operator(&["^"]) {
            self.consume();
            let right = self.nested(Self::parse_exponent)?; // Right associative
            return Ok(Node::binary(token.text.as_str(), left, right));
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> FormulaResult<Node> {
        if let Some(token) = self.at_operator(&["-", "+"]) {
            self.consume();
            let operand = self.nested(Self::parse_prefix)?;
            return Ok(Node::Prefix {
                op: token.text.clone(),
                operand: Box::new(operand),
            });
        }

        let mut expr = self.parse_primary()?;

        // Each `%` wraps the operand once more, so it counts as a level
        let mut levels = 0;
        while let Some(token) = self.at_operator(&["%"]) {
            levels += 1;
            if self.depth + levels > self.max_depth {
                return Err(FormulaError::DepthExceeded {
                    limit: self.max_depth,
                });
            }
            self.consume();
            expr = Node::Postfix {
                operand: Box::new(expr),
                op: token.text.clone(),
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> FormulaResult<Node> {
        let Some(token) = self.consume() else {
            return Err(FormulaError::syntax(self.end, "Unexpected end of formula"));
        };

        match token.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Reference => {
                Ok(Node::literal(token.text.as_str()))
            }

            TokenKind::Identifier => {
                if self.current_kind() == Some(TokenKind::LeftParen) {
                    self.parse_function_call(token)
                } else {
                    // Defined name or boolean
                    Ok(Node::literal(token.text.as_str()))
                }
            }

            TokenKind::SheetPrefix => match self.consume() {
                Some(target)
                    if matches!(target.kind, TokenKind::Reference | TokenKind::Identifier) =>
                {
                    Ok(Node::literal(format!("{}{}", token.text, target.text)))
                }
                _ => Err(FormulaError::syntax(
                    token.end(),
                    "Expected a reference after sheet name",
                )),
            },

            TokenKind::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect_closing(TokenKind::RightParen, token)?;
                Ok(Node::Group(Box::new(inner)))
            }

            TokenKind::LeftBrace => self.parse_array(token),

            TokenKind::Comma => Err(FormulaError::syntax(
                token.offset,
                "Comma outside of a function argument list",
            )),

            TokenKind::RightParen => Err(FormulaError::syntax(
                token.offset,
                "Unbalanced parentheses: unmatched ')'",
            )),

            TokenKind::Operator | TokenKind::RightBrace | TokenKind::Semicolon => Err(
                FormulaError::syntax(token.offset, format!("Unexpected '{}'", token.text)),
            ),
        }
    }

    fn parse_function_call(&mut self, name: &Token) -> FormulaResult<Node> {
        let open = self
            .consume()
            .ok_or_else(|| FormulaError::syntax(name.end(), "Expected '('"))?;

        let mut args = Vec::new();

        if self.current_kind() == Some(TokenKind::RightParen) {
            self.consume();
            return Ok(Node::call(name.text.as_str(), args));
        }

        loop {
            args.push(self.parse_argument()?);

            match self.current_kind() {
                Some(TokenKind::Comma) => {
                    self.consume();
                }
                _ => break,
            }
        }

        self.expect_closing(TokenKind::RightParen, open)?;
        Ok(Node::call(name.text.as_str(), args))
    }

    /// A call argument; an omitted one (`IF(A1,,0)`) is an empty literal
    fn parse_argument(&mut self) -> FormulaResult<Node> {
        match self.current_kind() {
            Some(TokenKind::Comma) | Some(TokenKind::RightParen) => Ok(Node::literal("")),
            _ => self.parse_expression(),
        }
    }

    fn parse_array(&mut self, open: &Token) -> FormulaResult<Node> {
        let mut rows = Vec::new();
        let mut current_row = Vec::new();

        if self.current_kind() != Some(TokenKind::RightBrace) {
            current_row.push(self.parse_expression()?);

            loop {
                match self.current_kind() {
                    Some(TokenKind::Comma) => {
                        self.consume();
                        current_row.push(self.parse_expression()?);
                    }
                    Some(TokenKind::Semicolon) => {
                        self.consume();
                        rows.push(std::mem::take(&mut current_row));
                        current_row.push(self.parse_expression()?);
                    }
                    _ => break,
                }
            }
        }

        if !current_row.is_empty() {
            rows.push(current_row);
        }

        self.expect_closing(TokenKind::RightBrace, open)?;
        Ok(Node::Array(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(formula: &str) -> Node {
        parse_formula(formula, 64).unwrap()
    }

    fn lit(text: &str) -> Node {
        Node::literal(text)
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("=42"), lit("42"));
        assert_eq!(parse("=\"He said \"\"hi\"\"\""), lit("\"He said \"\"hi\"\"\""));
        assert_eq!(parse("=TRUE"), lit("TRUE"));
        assert_eq!(parse("=#N/A"), lit("#N/A"));
        assert_eq!(parse("=Sheet2!A:B"), lit("Sheet2!A:B"));
        assert_eq!(parse("='My Sheet'!A1:B2"), lit("'My Sheet'!A1:B2"));
    }

    #[test]
    fn test_parse_precedence() {
        // 1+(2*3)
        assert_eq!(
            parse("=1+2*3"),
            Node::binary("+", lit("1"), Node::binary("*", lit("2"), lit("3")))
        );

        // A1&(B1+1) and the comparison binds loosest
        assert_eq!(
            parse("=A1&B1+1=\"x\""),
            Node::binary(
                "=",
                Node::binary("&", lit("A1"), Node::binary("+", lit("B1"), lit("1"))),
                lit("\"x\"")
            )
        );
    }

    #[test]
    fn test_parse_associativity() {
        // Left associative: (1-2)-3
        assert_eq!(
            parse("=1-2-3"),
            Node::binary("-", Node::binary("-", lit("1"), lit("2")), lit("3"))
        );

        // Right associative: 2^(3^2)
        assert_eq!(
            parse("=2^3^2"),
            Node::binary("^", lit("2"), Node::binary("^", lit("3"), lit("2")))
        );
    }

    #[test]
    fn test_parse_unary() {
        // Negation binds tighter than ^: (-2)^2
        assert_eq!(
            parse("=-2^2"),
            Node::binary(
                "^",
                Node::Prefix {
                    op: "-".into(),
                    operand: Box::new(lit("2")),
                },
                lit("2")
            )
        );

        assert_eq!(
            parse("=50%"),
            Node::Postfix {
                operand: Box::new(lit("50")),
                op: "%".into(),
            }
        );
    }

    #[test]
    fn test_parse_function() {
        assert_eq!(
            parse("=IF(A1>0,\"Yes\",\"No\")"),
            Node::call(
                "IF",
                vec![
                    Node::binary(">", lit("A1"), lit("0")),
                    lit("\"Yes\""),
                    lit("\"No\""),
                ]
            )
        );

        assert_eq!(parse("=NOW()"), Node::call("NOW", vec![]));
        assert_eq!(
            parse("=IF(A1,,0)"),
            Node::call("IF", vec![lit("A1"), lit(""), lit("0")])
        );

        // Whitespace between name and '(' is insignificant
        assert_eq!(parse("=sum (A1)"), Node::call("sum", vec![lit("A1")]));
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(
            parse("=(1+2)*3"),
            Node::binary(
                "*",
                Node::Group(Box::new(Node::binary("+", lit("1"), lit("2")))),
                lit("3")
            )
        );
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            parse("={1,2;3,4}"),
            Node::Array(vec![vec![lit("1"), lit("2")], vec![lit("3"), lit("4")]])
        );
        assert_eq!(parse("={}"), Node::Array(vec![]));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            parse_formula("=SUM(A1", 64).unwrap_err(),
            FormulaError::syntax(4, "Unbalanced parentheses: '(' is never closed")
        );
        assert_eq!(
            parse_formula("=A1)", 64).unwrap_err(),
            FormulaError::syntax(3, "Unbalanced parentheses: unmatched ')'")
        );
        assert!(parse_formula("=((A1)", 64).is_err());
    }

    #[test]
    fn test_comma_outside_call() {
        assert_eq!(
            parse_formula("=A1,B1", 64).unwrap_err(),
            FormulaError::syntax(3, "Comma outside of a function argument list")
        );
        assert!(parse_formula("=(A1,B1)", 64).is_err());
    }

    #[test]
    fn test_trailing_tokens() {
        assert!(parse_formula("=A1 B1", 64).is_err());
        assert!(parse_formula("=1+", 64).is_err());
        assert!(parse_formula("=", 64).is_err());
        assert!(parse_formula("", 64).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("={}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_formula(&deep, 64).is_ok());
        assert_eq!(
            parse_formula(&deep, 5).unwrap_err(),
            FormulaError::DepthExceeded { limit: 5 }
        );

        let negations = format!("={}1", "-".repeat(100));
        assert_eq!(
            parse_formula(&negations, 64).unwrap_err(),
            FormulaError::DepthExceeded { limit: 64 }
        );
    }

    #[test]
    fn test_percent_chain_counts_against_depth() {
        let percents = format!("=1{}", "%".repeat(10));
        assert!(parse_formula(&percents, 64).is_ok());

        let percents = format!("=1{}", "%".repeat(100));
        assert_eq!(
            parse_formula(&percents, 64).unwrap_err(),
            FormulaError::DepthExceeded { limit: 64 }
        );
    }

    #[test]
    fn test_long_chains_are_not_nesting() {
        let terms: Vec<String> = (1..=500).map(|i| format!("A{i}")).collect();
        let formula = format!("={}", terms.join("+"));
        assert!(parse_formula(&formula, 64).is_ok());
    }
}
