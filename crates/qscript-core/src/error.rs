//! Error types for every QScript phase.
//!
//! ```text
//! QScriptError (front-end wrapper)
//! ├── LexError          - tokenization errors
//! ├── ParseErrors       - one or more ParseError (with ParseErrorKind)
//! └── CompilationError  - structural errors found while generating code
//! ```
//!
//! Compilation errors never describe compiler bugs; those are assertions.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("unterminated regular expression at {span}")]
    UnterminatedRegExp { span: Span },

    #[error("invalid escape sequence at {span}")]
    InvalidEscape { span: Span },

    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::UnterminatedRegExp { span }
            | LexError::InvalidEscape { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    // Token-level errors
    ExpectedToken,
    UnexpectedToken,
    UnexpectedEof,

    // Expressions
    ExpectedExpression,
    /// Left-hand side of an assignment, update or for-in is not assignable.
    InvalidAssignmentTarget,
    ExpectedPropertyName,

    // Statements
    ExpectedStatement,
    ExpectedIdentifier,
    MissingSemicolon,
    /// `try` with neither `catch` nor `finally`.
    MissingCatchOrFinally,
    /// More than one `default` clause in a `switch`.
    DuplicateDefault,

    // Limits
    /// Nesting exceeded the parser's recursion ceiling.
    NestingTooDeep,

    /// Error reported by the lexer.
    Lexical,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::InvalidAssignmentTarget => "invalid assignment target",
            ParseErrorKind::ExpectedPropertyName => "expected property name",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::MissingSemicolon => "missing semicolon",
            ParseErrorKind::MissingCatchOrFinally => "missing catch or finally",
            ParseErrorKind::DuplicateDefault => "duplicate default clause",
            ParseErrorKind::NestingTooDeep => "nesting too deep",
            ParseErrorKind::Lexical => "lexical error",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    /// Render the error with the offending source line and a caret under it.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut out = format!("error at {}: {}\n", self.span, self.kind);
        if !self.message.is_empty() {
            out.push_str(&format!("  {}\n", self.message));
        }

        let line_text = (self.span.line as usize)
            .checked_sub(1)
            .and_then(|index| source.lines().nth(index));
        if let Some(text) = line_text {
            let indent = " ".repeat(self.span.col.saturating_sub(1) as usize);
            let underline = "^".repeat(self.span.len.max(1) as usize);
            out.push_str("  |\n");
            out.push_str(&format!("{:>3} | {}\n", self.span.line, text));
            out.push_str(&format!("  | {indent}{underline}\n"));
        }
        out
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, err.span(), err.to_string())
    }
}

/// Every error a parse produced, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Structural errors found while lowering an AST to bytecode.
///
/// Any of these makes the resulting compilation unit invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// `break label` or `continue label` names no enclosing statement.
    #[error("at {span}: undefined label '{label}'")]
    UndefinedLabel { label: String, span: Span },

    /// A label is already in use by an enclosing statement.
    #[error("at {span}: duplicate label '{label}'")]
    DuplicateLabel { label: String, span: Span },

    /// `break` with no label outside any loop or switch.
    #[error("at {span}: 'break' outside of a loop or switch")]
    BreakOutsideBreakable { span: Span },

    /// `continue` with no label outside any loop.
    #[error("at {span}: 'continue' outside of a loop")]
    ContinueOutsideLoop { span: Span },

    /// `continue label` where the label belongs to something that is not a loop.
    #[error("at {span}: label '{label}' does not denote a loop")]
    ContinueTargetNotLoop { label: String, span: Span },

    #[error("at {span}: 'return' outside of a function")]
    ReturnOutsideFunction { span: Span },

    /// Source nesting exceeded the configured ceiling.
    #[error("at {span}: nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize, span: Span },
}

impl CompilationError {
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UndefinedLabel { span, .. }
            | CompilationError::DuplicateLabel { span, .. }
            | CompilationError::BreakOutsideBreakable { span }
            | CompilationError::ContinueOutsideLoop { span }
            | CompilationError::ContinueTargetNotLoop { span, .. }
            | CompilationError::ReturnOutsideFunction { span }
            | CompilationError::NestingTooDeep { span, .. } => *span,
        }
    }
}

// ============================================================================
// Unified Error
// ============================================================================

/// Any error the front end can report for a piece of source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QScriptError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseErrors),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl QScriptError {
    pub fn is_parse(&self) -> bool {
        matches!(self, QScriptError::Lex(_) | QScriptError::Parse(_))
    }

    pub fn is_compilation(&self) -> bool {
        matches!(self, QScriptError::Compilation(_))
    }

    /// Location of the first reported problem.
    pub fn span(&self) -> Span {
        match self {
            QScriptError::Lex(err) => err.span(),
            QScriptError::Parse(errs) => errs.first().map(|e| e.span).unwrap_or_default(),
            QScriptError::Compilation(err) => err.span(),
        }
    }
}

impl From<ParseError> for QScriptError {
    fn from(err: ParseError) -> Self {
        QScriptError::Parse(err.into())
    }
}
