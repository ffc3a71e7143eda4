//! QScript parser.
//!
//! Turns source text into an arena-allocated AST:
//!
//! - [`lexer`] - tokenization, including the regexp/division decision and
//!   line-break tracking for automatic semicolon insertion
//! - [`ast`] - node definitions, the [`Parser`] and a [`Visitor`](ast::visitor::Visitor)
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use qscript_parser::Parser;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     function fib(n) {
//!         return n < 2 ? n : fib(n - 1) + fib(n - 2);
//!     }
//!     var result = fib(10);
//! "#;
//!
//! match Parser::parse_program(source, &arena) {
//!     Ok(program) => assert_eq!(program.body.len(), 2),
//!     Err(errors) => panic!("{errors}"),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{Parser, ParserConfig, Program};
pub use lexer::{Lexer, Span, Token, TokenKind};
