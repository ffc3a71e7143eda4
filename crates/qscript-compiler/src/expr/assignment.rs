//! Plain and compound assignment.

use qscript_parser::ast::{AssignExpr, AssignOp};

use super::ExprMode;
use crate::bytecode::OpCode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [target]                ; reference
    /// [value]
    /// Assign | Inplace*
    /// ```
    ///
    /// Both forms leave the assigned value on the stack.
    pub(super) fn compile_assign(&mut self, assign: &'ast AssignExpr<'ast>) -> Result<()> {
        self.compile_expr(assign.target, ExprMode::Reference)?;
        self.compile_expr(assign.value, ExprMode::Value)?;
        self.emitter.emit(assign_opcode(assign.op));
        Ok(())
    }
}

fn assign_opcode(op: AssignOp) -> OpCode {
    match op {
        AssignOp::Assign => OpCode::Assign,
        AssignOp::Add => OpCode::InplaceAdd,
        AssignOp::Sub => OpCode::InplaceSubtract,
        AssignOp::Mul => OpCode::InplaceMultiply,
        AssignOp::Div => OpCode::InplaceDivide,
        AssignOp::Mod => OpCode::InplaceModulo,
        AssignOp::LeftShift => OpCode::InplaceLeftShift,
        AssignOp::RightShift => OpCode::InplaceRightShift,
        AssignOp::URightShift => OpCode::InplaceURightShift,
        AssignOp::BitAnd => OpCode::InplaceBitAnd,
        AssignOp::BitOr => OpCode::InplaceBitOr,
        AssignOp::BitXor => OpCode::InplaceBitXor,
    }
}
