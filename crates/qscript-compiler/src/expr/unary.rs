//! Unary operators and increments.

use qscript_parser::ast::{UnaryExpr, UnaryOp, UpdateExpr, UpdateOp};

use super::ExprMode;
use crate::bytecode::OpCode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// `typeof` and `delete` work on a reference so that unresolvable names
    /// and properties can be handled by the interpreter. `void e` evaluates
    /// `e` and replaces it with `undefined`.
    pub(super) fn compile_unary(&mut self, unary: &'ast UnaryExpr<'ast>) -> Result<()> {
        let op = match unary.op {
            UnaryOp::TypeOf | UnaryOp::Delete => {
                self.compile_expr(unary.operand, ExprMode::Reference)?;
                let op = if unary.op == UnaryOp::TypeOf { OpCode::TypeOf } else { OpCode::Delete };
                self.emitter.emit(op);
                return Ok(());
            }
            UnaryOp::Void => {
                self.compile_expr(unary.operand, ExprMode::Value)?;
                self.emitter.emit(OpCode::Pop);
                self.emitter.emit(OpCode::LoadUndefined);
                return Ok(());
            }
            UnaryOp::Plus => OpCode::UnaryPlus,
            UnaryOp::Minus => OpCode::UnaryMinus,
            UnaryOp::BitNot => OpCode::BitNot,
            UnaryOp::Not => OpCode::Not,
        };

        self.compile_expr(unary.operand, ExprMode::Value)?;
        self.emitter.emit(op);
        Ok(())
    }

    pub(super) fn compile_update(&mut self, update: &'ast UpdateExpr<'ast>) -> Result<()> {
        self.compile_expr(update.operand, ExprMode::Reference)?;
        let op = match (update.op, update.prefix) {
            (UpdateOp::Increment, true) => OpCode::PreIncrement,
            (UpdateOp::Decrement, true) => OpCode::PreDecrement,
            (UpdateOp::Increment, false) => OpCode::PostIncrement,
            (UpdateOp::Decrement, false) => OpCode::PostDecrement,
        };
        self.emitter.emit(op);
        Ok(())
    }
}
