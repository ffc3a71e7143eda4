//! Abstract syntax tree.
//!
//! All nodes live in a `bumpalo::Bump` arena and are `Copy`; a [`Program`]
//! stays valid for as long as the arena does.

pub mod expr;
mod expr_parser;
pub mod ops;
mod parser;
pub mod stmt;
mod stmt_parser;
pub mod visitor;

pub use qscript_core::{ParseError, ParseErrorKind, ParseErrors};

pub use expr::*;
pub use ops::*;
pub use parser::{Parser, ParserConfig};
pub use stmt::*;

/// A parsed script: a statement list plus the span it covers.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    pub body: &'ast [Stmt<'ast>],
    pub span: qscript_core::Span,
}

impl<'ast> Program<'ast> {
    pub fn new(body: &'ast [Stmt<'ast>], span: qscript_core::Span) -> Self {
        Self { body, span }
    }
}
