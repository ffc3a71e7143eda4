//! Shared types for the QScript toolchain.
//!
//! This crate holds the pieces every phase needs:
//!
//! - [`span`] - source locations attached to tokens, AST nodes and errors
//! - [`name`] - the identifier/string interner ([`NameTable`]) and its handles
//! - [`error`] - lexer, parser and compiler error types
//!
//! The parser and the compiler both depend on it; neither depends on the other
//! through this crate.

pub mod error;
pub mod name;
pub mod span;

pub use error::{CompilationError, LexError, ParseError, ParseErrorKind, ParseErrors, QScriptError};
pub use name::{Name, NameTable};
pub use span::Span;
