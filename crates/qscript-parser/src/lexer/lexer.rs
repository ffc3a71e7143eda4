//! Tokenizer.
//!
//! The [`Lexer`] turns source text into [`Token`]s, copying lexemes into the
//! arena. A `/` is ambiguous between division and a regular expression
//! literal; the lexer decides from the previous token (see
//! [`TokenKind::ends_operand`]).

use bumpalo::Bump;
use qscript_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start, is_line_terminator};
use super::token::{Token, TokenKind, lookup_keyword};

pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
    /// Kind of the last token produced, for the regexp/division decision.
    previous: Option<TokenKind>,
    /// Whether a line terminator was skipped before the current token.
    newline_before: bool,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
            previous: None,
            newline_before: false,
        }
    }

    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Scan and return the next token. Returns `Eof` forever once exhausted.
    pub fn next_token(&mut self) -> Token<'ast> {
        let token = self.scan_token();
        self.previous = Some(token.kind);
        token
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        self.newline_before = false;
        if let Err(err) = self.skip_trivia() {
            return self.make_error(err);
        }

        if self.cursor.is_eof() {
            let span = Span::point(self.cursor.line(), self.cursor.column());
            return Token::new(TokenKind::Eof, "", span, self.newline_before);
        }

        let start = (self.cursor.line(), self.cursor.column(), self.cursor.offset());
        let Some(c) = self.cursor.peek() else {
            return self.make_token(TokenKind::Eof, start);
        };

        match c {
            '"' | '\'' => self.scan_string(c, start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.cursor.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.scan_number(start)
            }
            '/' if !self.previous.is_some_and(TokenKind::ends_operand) => self.scan_regexp(start),
            c if is_ident_start(c) || c == '\\' => self.scan_identifier(start),
            _ => self.scan_operator(start),
        }
    }

    /// Skip whitespace and comments, noting any line terminator crossed.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                Some(c) if is_line_terminator(c) => {
                    self.newline_before = true;
                    self.cursor.advance();
                }
                Some(c) if c.is_whitespace() || c == '\u{FEFF}' => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_nth(1) == Some('/') => {
                    self.cursor.eat_while(|c| !is_line_terminator(c));
                }
                Some('/') if self.cursor.peek_nth(1) == Some('*') => {
                    let span = Span::new(self.cursor.line(), self.cursor.column(), 2);
                    self.cursor.advance();
                    self.cursor.advance();
                    loop {
                        match self.cursor.advance() {
                            None => return Err(LexError::UnterminatedComment { span }),
                            Some('*') if self.cursor.eat('/') => break,
                            Some(c) if is_line_terminator(c) => self.newline_before = true,
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn make_token(&self, kind: TokenKind, start: (u32, u32, u32)) -> Token<'ast> {
        let (line, col, offset) = start;
        let text = self.cursor.slice_from(offset);
        let span = Span::new(line, col, text.len() as u32);
        Token::new(kind, self.arena.alloc_str(text), span, self.newline_before)
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span, self.newline_before)
    }

    fn span_from(&self, start: (u32, u32, u32)) -> Span {
        Span::new(start.0, start.1, self.cursor.offset() - start.2)
    }

    // =========================================
    // Scanning: Strings and regular expressions
    // =========================================

    fn scan_string(&mut self, quote: char, start: (u32, u32, u32)) -> Token<'ast> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None => {
                    let span = self.span_from(start);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some(c) if is_line_terminator(c) => {
                    let span = self.span_from(start);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('\\') => {
                    self.cursor.advance();
                    // Escaped line terminator is a line continuation.
                    if self.cursor.eat('\r') {
                        self.cursor.eat('\n');
                    } else {
                        self.cursor.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::String, start);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_regexp(&mut self, start: (u32, u32, u32)) -> Token<'ast> {
        self.cursor.advance();
        let mut in_class = false;
        loop {
            match self.cursor.advance() {
                None => {
                    let span = self.span_from(start);
                    return self.make_error(LexError::UnterminatedRegExp { span });
                }
                Some(c) if is_line_terminator(c) => {
                    let span = self.span_from(start);
                    return self.make_error(LexError::UnterminatedRegExp { span });
                }
                Some('\\') => {
                    if self.cursor.check(is_line_terminator) || self.cursor.is_eof() {
                        let span = self.span_from(start);
                        return self.make_error(LexError::UnterminatedRegExp { span });
                    }
                    self.cursor.advance();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        self.cursor.eat_while(is_ident_continue);
        self.make_token(TokenKind::RegExp, start)
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(&mut self, start: (u32, u32, u32)) -> Token<'ast> {
        if self.cursor.peek() == Some('0') && matches!(self.cursor.peek_nth(1), Some('x' | 'X')) {
            self.cursor.advance();
            self.cursor.advance();
            let digits = self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                let span = self.span_from(start);
                return self.make_error(LexError::InvalidNumber {
                    span,
                    detail: "expected hexadecimal digits".into(),
                });
            }
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit());
            if self.cursor.peek() == Some('.') {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
            if matches!(self.cursor.peek(), Some('e' | 'E')) {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                    let span = self.span_from(start);
                    return self.make_error(LexError::InvalidNumber {
                        span,
                        detail: "missing exponent digits".into(),
                    });
                }
            }
        }

        // `3in x` is not `3 in x`
        if self.cursor.check(is_ident_start) {
            self.cursor.eat_while(is_ident_continue);
            let span = self.span_from(start);
            return self.make_error(LexError::InvalidNumber {
                span,
                detail: "identifier starts immediately after numeric literal".into(),
            });
        }
        self.make_token(TokenKind::Number, start)
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start: (u32, u32, u32)) -> Token<'ast> {
        let mut escaped = false;
        loop {
            if self.cursor.check(is_ident_continue) {
                self.cursor.advance();
            } else if self.cursor.check_str("\\u") {
                escaped = true;
                self.cursor.advance();
                self.cursor.advance();
                for _ in 0..4 {
                    if !self.cursor.check(|c| c.is_ascii_hexdigit()) {
                        let span = self.span_from(start);
                        return self.make_error(LexError::InvalidEscape { span });
                    }
                    self.cursor.advance();
                }
            } else if self.cursor.peek() == Some('\\') {
                self.cursor.advance();
                let span = self.span_from(start);
                return self.make_error(LexError::InvalidEscape { span });
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(start.2);
        if escaped {
            // Escaped words never act as keywords.
            return match super::literal::cook_identifier(text) {
                Some(cooked) => {
                    let span = self.span_from(start);
                    let lexeme = self.arena.alloc_str(&cooked);
                    Token::new(TokenKind::Identifier, lexeme, span, self.newline_before)
                }
                None => {
                    let span = self.span_from(start);
                    self.make_error(LexError::InvalidEscape { span })
                }
            };
        }
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    fn scan_operator(&mut self, start: (u32, u32, u32)) -> Token<'ast> {
        use TokenKind::*;

        let Some(c) = self.cursor.advance() else {
            return self.make_token(Eof, start);
        };
        let kind = match c {
            '{' => LeftBrace,
            '}' => RightBrace,
            '(' => LeftParen,
            ')' => RightParen,
            '[' => LeftBracket,
            ']' => RightBracket,
            ';' => Semicolon,
            ',' => Comma,
            '.' => Dot,
            '?' => Question,
            ':' => Colon,
            '~' => Tilde,
            '+' if self.cursor.eat('+') => PlusPlus,
            '+' if self.cursor.eat('=') => PlusEqual,
            '+' => Plus,
            '-' if self.cursor.eat('-') => MinusMinus,
            '-' if self.cursor.eat('=') => MinusEqual,
            '-' => Minus,
            '*' if self.cursor.eat('=') => StarEqual,
            '*' => Star,
            '/' if self.cursor.eat('=') => SlashEqual,
            '/' => Slash,
            '%' if self.cursor.eat('=') => PercentEqual,
            '%' => Percent,
            '&' if self.cursor.eat('&') => AmpAmp,
            '&' if self.cursor.eat('=') => AmpEqual,
            '&' => Amp,
            '|' if self.cursor.eat('|') => PipePipe,
            '|' if self.cursor.eat('=') => PipeEqual,
            '|' => Pipe,
            '^' if self.cursor.eat('=') => CaretEqual,
            '^' => Caret,
            '=' if self.cursor.eat('=') => {
                if self.cursor.eat('=') { EqualEqualEqual } else { EqualEqual }
            }
            '=' => Equal,
            '!' if self.cursor.eat('=') => {
                if self.cursor.eat('=') { BangEqualEqual } else { BangEqual }
            }
            '!' => Bang,
            '<' if self.cursor.eat('<') => {
                if self.cursor.eat('=') { LessLessEqual } else { LessLess }
            }
            '<' if self.cursor.eat('=') => LessEqual,
            '<' => Less,
            '>' if self.cursor.eat('>') => {
                if self.cursor.eat('>') {
                    if self.cursor.eat('=') { GreaterGreaterGreaterEqual } else { GreaterGreaterGreater }
                } else if self.cursor.eat('=') {
                    GreaterGreaterEqual
                } else {
                    GreaterGreater
                }
            }
            '>' if self.cursor.eat('=') => GreaterEqual,
            '>' => Greater,
            other => {
                let span = self.span_from(start);
                return self.make_error(LexError::UnexpectedChar { ch: other, span });
            }
        };
        self.make_token(kind, start)
    }
}
