//! QScript
//!
//! Compiles a JavaScript-like scripting language into stack-machine bytecode.
//!
//! The workspace is split into:
//!
//! - [`qscript_core`]: spans, interned names and error types
//! - [`qscript_parser`]: lexer, arena AST and recursive-descent parser
//! - [`qscript_compiler`]: the bytecode compiler
//!
//! This crate ties them together behind [`Engine`].
//!
//! # Example
//!
//! ```
//! use qscript::{Engine, OpCode};
//!
//! let mut engine = Engine::new();
//! let unit = engine.compile("var x = 1 + 2;").unwrap();
//! assert_eq!(unit.instructions().last().map(|i| i.op), Some(OpCode::Halt));
//! ```

mod engine;

pub use engine::Engine;

pub use qscript_compiler::bytecode;
pub use qscript_compiler::{
    CompilationUnit, Compiler, CompilerConfig, FunctionFlags, FunctionId, FunctionTemplate,
    OpCode,
};
pub use qscript_core::{
    CompilationError, Name, NameTable, ParseError, ParseErrorKind, ParseErrors, QScriptError, Span,
};
pub use qscript_parser::{Parser, ParserConfig};
