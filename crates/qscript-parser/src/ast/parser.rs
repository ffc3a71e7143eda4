//! Parser infrastructure: token navigation, error recording, recovery.

use bumpalo::Bump;
use qscript_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use crate::ast::Program;
use crate::lexer::{Lexer, Token, TokenKind};

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Deepest allowed nesting. Every statement, every nested expression and
    /// every unary operand counts one level, so `[[x]]` is five levels deep
    /// as a statement.
    pub max_depth: usize,
}

impl ParserConfig {
    /// Fits an unoptimized build on a 2 MiB thread stack.
    pub const DEFAULT_MAX_DEPTH: usize = 64;
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Recursive-descent parser producing an arena-allocated [`Program`].
///
/// The source is tokenized eagerly in [`Parser::new`]; lexemes are copied
/// into the arena, so the source string may be dropped afterwards.
pub struct Parser<'ast> {
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
    pub(super) errors: ParseErrors,
    pub(super) arena: &'ast Bump,
    pub(super) config: ParserConfig,
    pub(super) depth: usize,
}

impl<'ast> Parser<'ast> {
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        Self::with_config(source, arena, ParserConfig::default())
    }

    pub fn with_config(source: &str, arena: &'ast Bump, config: ParserConfig) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::with_capacity((source.len() / 6).max(16));
        let mut errors = ParseErrors::new();

        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Error {
                for err in lexer.take_errors() {
                    errors.push(err.into());
                }
                continue;
            }
            let at_end = token.kind == TokenKind::Eof;
            buffer.push(token);
            if at_end {
                break;
            }
        }

        Self {
            buffer,
            position: 0,
            errors,
            arena,
            config,
            depth: 0,
        }
    }

    /// Parse a complete program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_program(source: &str, arena: &'ast Bump) -> Result<Program<'ast>, ParseErrors> {
        Parser::new(source, arena).program()
    }

    /// Parse statements until end of input, recovering at statement
    /// boundaries so several errors can be reported at once.
    pub fn program(mut self) -> Result<Program<'ast>, ParseErrors> {
        let start = self.peek().span;
        let mut body = bumpalo::collections::Vec::new_in(self.arena);

        while !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "parse failed");
            return Err(self.errors);
        }
        let span = start.to(self.peek().span);
        Ok(Program::new(body.into_bump_slice(), span))
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    #[inline]
    pub(super) fn peek(&self) -> Token<'ast> {
        self.buffer[self.position.min(self.buffer.len() - 1)]
    }

    #[inline]
    pub(super) fn peek_nth(&self, n: usize) -> Token<'ast> {
        self.buffer[(self.position + n).min(self.buffer.len() - 1)]
    }

    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    #[inline]
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    #[inline]
    pub(super) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = self.peek();
        if found.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_eof(found.span));
        }
        Err(ParseError::expected_token(
            found.span,
            kind.as_str(),
            found.kind.as_str(),
        ))
    }

    /// An identifier whose text is `word`, e.g. the `each` in `for each`.
    pub(super) fn check_contextual(&self, word: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.lexeme == word
    }

    pub(super) fn expect_identifier(&mut self) -> Result<Token<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier {
            return Ok(self.advance());
        }
        Err(ParseError::expected_identifier(token.span, token.kind.as_str()))
    }

    /// Terminate a statement, inserting a semicolon where the grammar allows.
    pub(super) fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(());
        }
        let next = self.peek();
        if next.newline_before || matches!(next.kind, TokenKind::RightBrace | TokenKind::Eof) {
            return Ok(());
        }
        Err(ParseError::new(
            ParseErrorKind::MissingSemicolon,
            next.span,
            format!("expected ';', found {}", next.kind),
        ))
    }

    /// Span from `start` through the last consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        let end = self.buffer[self.position.saturating_sub(1)].span;
        start.to(end)
    }

    // ========================================================================
    // Depth limit
    // ========================================================================

    pub(super) fn enter(&mut self, span: Span) -> Result<(), ParseError> {
        if self.depth >= self.config.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep,
                span,
                format!("nesting exceeds {} levels", self.config.max_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub(super) fn leave(&mut self) {
        self.depth -= 1;
    }

    // ========================================================================
    // Error Recovery
    // ========================================================================

    /// Skip to a likely statement boundary after an error.
    ///
    /// Always consumes at least one token so recovery makes progress.
    fn synchronize(&mut self) {
        self.depth = 0;
        let mut first = true;
        while !self.is_eof() {
            let token = self.peek();
            if !first {
                use TokenKind::*;
                if matches!(
                    token.kind,
                    Var | Function | If | For | While | Do | Return | Switch | Try | Throw | With
                        | Break | Continue
                ) {
                    return;
                }
            }
            first = false;
            self.advance();
            if token.kind == TokenKind::Semicolon {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;

    #[test]
    fn empty_source_is_empty_program() {
        let arena = Bump::new();
        let program = Parser::parse_program("", &arena).unwrap();
        assert!(program.body.is_empty());
    }

    #[test]
    fn automatic_semicolon_at_newline() {
        let arena = Bump::new();
        let program = Parser::parse_program("a = 1\nb = 2", &arena).unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn missing_semicolon_on_same_line() {
        let arena = Bump::new();
        let errors = Parser::parse_program("a = 1 b = 2", &arena).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::MissingSemicolon);
    }

    #[test]
    fn recovery_reports_several_errors() {
        let arena = Bump::new();
        let errors = Parser::parse_program("var = 1;\nvar x = ;\nvar y = 3;", &arena).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn lexer_errors_surface_as_parse_errors() {
        let arena = Bump::new();
        let errors = Parser::parse_program("var s = 'oops\n;", &arena).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::Lexical);
    }

    #[test]
    fn nesting_limit() {
        let arena = Bump::new();
        let source = format!("{}x{}", "(".repeat(25), ")".repeat(25));
        let config = ParserConfig { max_depth: 16 };
        let errors = Parser::with_config(&source, &arena, config)
            .program()
            .unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::NestingTooDeep);

        let ok = Parser::with_config(&source, &arena, ParserConfig::default()).program();
        assert!(matches!(ok.unwrap().body[0], Stmt::Expr(_)));
    }

    fn nesting_error(source: &str) -> ParseErrorKind {
        let arena = Bump::new();
        let errors = Parser::parse_program(source, &arena).unwrap_err();
        errors.first().unwrap().kind
    }

    #[test]
    fn assignment_chains_count_towards_the_limit() {
        let source = format!("{}1;", "a = ".repeat(100));
        assert_eq!(nesting_error(&source), ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn conditional_chains_count_towards_the_limit() {
        let source = format!("{}1;", "c ? 1 : ".repeat(100));
        assert_eq!(nesting_error(&source), ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn array_levels_cost_two() {
        // One level for the statement, then two per bracket and two for the
        // innermost element.
        let fits = (ParserConfig::DEFAULT_MAX_DEPTH - 3) / 2;
        let arena = Bump::new();
        let source = format!("{}1{};", "[".repeat(fits), "]".repeat(fits));
        assert!(Parser::parse_program(&source, &arena).is_ok());

        let source = format!("{}1{};", "[".repeat(fits + 1), "]".repeat(fits + 1));
        assert_eq!(nesting_error(&source), ParseErrorKind::NestingTooDeep);
    }
}
