//! Formula tokenizer
//!
//! Splits a formula into [`Token`]s. Whitespace outside string literals is
//! dropped; every other token keeps its exact source text so the printer can
//! reproduce it character for character.

use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex_is_match;

/// Token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Function name, defined name or boolean
    Identifier,
    /// Numeric literal
    Number,
    /// String literal, delimiters included
    String,
    /// Cell, range, sheet-qualified reference or error literal
    Reference,
    /// Arithmetic, concatenation, comparison or percent operator
    Operator,
    LeftParen,
    RightParen,
    Comma,
    /// Quoted sheet name marker such as `'My Sheet'!`
    SheetPrefix,
    LeftBrace,
    RightBrace,
    Semicolon,
}

/// A token with its raw text and starting byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}

/// Tokenize a formula, with or without its leading `=`
///
/// # Example
/// ```rust
/// use formula_beautifier::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("=SUM(Sheet2!A:B)").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Identifier);
/// assert_eq!(tokens[2].text, "Sheet2!A:B");
/// ```
pub fn tokenize(formula: &str) -> FormulaResult<Vec<Token>> {
    let tokens = Lexer::new(formula).run()?;
    tracing::trace!(count = tokens.len(), "tokenized formula");
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let body = input.trim_start();
        let pos = if body.starts_with('=') {
            input.len() - body.len() + 1
        } else {
            0
        };
        Self {
            input,
            pos,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek_char() else {
                break;
            };
            let start = self.pos;

            match c {
                '(' => self.single(TokenKind::LeftParen),
                ')' => self.single(TokenKind::RightParen),
                ',' => self.single(TokenKind::Comma),
                '{' => self.single(TokenKind::LeftBrace),
                '}' => self.single(TokenKind::RightBrace),
                ';' => self.single(TokenKind::Semicolon),
                '+' | '-' | '*' | '/' | '^' | '&' | '=' | '%' => self.single(TokenKind::Operator),
                '<' => {
                    self.advance();
                    if matches!(self.peek_char(), Some('=') | Some('>')) {
                        self.advance();
                    }
                    self.push(TokenKind::Operator, start);
                }
                '>' => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                    }
                    self.push(TokenKind::Operator, start);
                }
                '"' => self.scan_string()?,
                '\'' => self.scan_sheet_prefix()?,
                '#' => self.scan_error_literal(),
                c if c.is_ascii_digit()
                    || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())) =>
                {
                    self.scan_number()
                }
                c if c.is_alphabetic() || c == '_' || c == '$' => self.scan_word(),
                other => {
                    return Err(FormulaError::syntax(
                        start,
                        format!("Unexpected character '{other}'"),
                    ))
                }
            }
        }

        Ok(self.tokens)
    }

    // === Scanners ===

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.advance();
        self.push(kind, start);
    }

    fn scan_string(&mut self) -> FormulaResult<()> {
        let start = self.pos;
        self.advance(); // opening quote

        loop {
            match self.peek_char() {
                None => {
                    return Err(FormulaError::syntax(start, "Unterminated string literal"));
                }
                Some('"') => {
                    self.advance();
                    // "" is an escaped quote, not the end of the literal
                    if self.peek_char() == Some('"') {
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => self.advance(),
            }
        }

        self.push(TokenKind::String, start);
        Ok(())
    }

    fn scan_sheet_prefix(&mut self) -> FormulaResult<()> {
        let start = self.pos;
        self.advance(); // opening quote

        loop {
            match self.peek_char() {
                None => return Err(FormulaError::syntax(start, "Unterminated sheet name")),
                Some('\'') => {
                    self.advance();
                    if self.peek_char() == Some('\'') {
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => self.advance(),
            }
        }

        if self.peek_char() != Some('!') {
            return Err(FormulaError::syntax(
                self.pos,
                "Expected '!' after quoted sheet name",
            ));
        }
        self.advance();
        self.push(TokenKind::SheetPrefix, start);
        Ok(())
    }

    fn scan_error_literal(&mut self) {
        let start = self.pos;
        self.advance(); // '#'
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '!' | '?' | '_'))
        {
            self.advance();
        }
        self.push(TokenKind::Reference, start);
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        self.skip_digits();

        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent, only when digits actually follow
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let exponent_digits = match self.peek_char_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self
                .peek_char_at(exponent_digits)
                .is_some_and(|c| c.is_ascii_digit())
            {
                for _ in 0..exponent_digits {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        // Whole-row ranges such as 1:3 or 2:$5
        if self.peek_char() == Some(':') {
            self.skip_word_chars();
            self.push(TokenKind::Reference, start);
            return;
        }

        self.push(TokenKind::Number, start);
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        self.skip_word_chars();

        if self.peek_char() == Some('(') {
            self.push(TokenKind::Identifier, start);
            return;
        }

        let text = &self.input[start..self.pos];
        if text.contains(|c: char| matches!(c, '!' | ':' | '$')) || is_cell_reference(text) {
            // Spilled-range operator, e.g. A1#
            if self.peek_char() == Some('#') {
                self.advance();
            }
            self.push(TokenKind::Reference, start);
        } else {
            self.push(TokenKind::Identifier, start);
        }
    }

    // === Helper methods ===

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text = &self.input[start..self.pos];
        self.tokens.push(Token::new(kind, text, start));
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_word_chars(&mut self) {
        while self.peek_char().is_some_and(is_word_char) {
            self.advance();
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '!' | ':' | '$')
}

/// A1-style cell address: `[$]COL[$]ROW`
fn is_cell_reference(text: &str) -> bool {
    regex_is_match!(r"^\$?[A-Za-z]{1,3}\$?[0-9]+$", text)
}
