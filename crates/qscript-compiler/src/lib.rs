//! QScript Compiler
//!
//! Lowers a parsed program or function body into stack-machine bytecode.
//!
//! ## Modules
//!
//! - [`bytecode`]: Opcodes, instructions, exception tables and compilation units
//! - [`config`]: Compiler limits
//! - [`emit`]: Instruction emitter with branch patching and break/continue frames
//! - [`expr`]: Expression lowering in value or reference mode
//!
//! Statement lowering and declaration hoisting are internal; the entry point
//! is [`Compiler`].

pub mod bytecode;
pub mod config;
pub mod emit;
pub mod expr;
mod function_compiler;
mod hoist;
mod stmt;

pub use bytecode::{CompilationUnit, FunctionFlags, FunctionId, FunctionTemplate, OpCode};
pub use config::CompilerConfig;
pub use expr::ExprMode;
pub use function_compiler::{Compiler, UnitKind};

// Re-export CompilationError from core for convenience
pub use qscript_core::CompilationError;
