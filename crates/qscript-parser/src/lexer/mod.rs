//! Lexical analysis.

mod cursor;
#[allow(clippy::module_inception)]
mod lexer;
pub mod literal;
mod token;

pub use lexer::Lexer;
pub use qscript_core::Span;
pub use token::{Token, TokenKind, lookup_keyword};
