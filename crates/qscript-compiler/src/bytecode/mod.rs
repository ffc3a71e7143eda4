//! Bytecode types.
//!
//! - [`OpCode`] - the interpreter's instruction set
//! - [`Instruction`] / [`Operand`] - one decoded instruction
//! - [`CompilationUnit`] - code, line table, handler table and nested functions
//! - [`ExceptionTable`] - protected ranges and their handlers

mod disasm;
mod handler;
mod instruction;
mod opcode;
mod unit;

pub use disasm::disassemble;
pub use handler::{ExceptionHandler, ExceptionTable, HandlerKind};
pub use instruction::{FunctionId, Instruction, Operand};
pub use opcode::OpCode;
pub use unit::{CompilationUnit, FunctionFlags, FunctionTemplate};
