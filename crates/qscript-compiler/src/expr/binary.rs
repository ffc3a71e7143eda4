//! Binary operators.

use qscript_parser::ast::{BinaryExpr, BinaryOp, Expr};

use super::ExprMode;
use crate::bytecode::OpCode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout for `||` (`&&` uses `BranchFalse`):
    /// ```text
    /// [left]
    /// Duplicate
    /// BranchTrue -> end       ; left decides, and stays as the result
    /// Pop
    /// [right]
    /// end:
    /// ```
    ///
    /// Every other operator evaluates both operands, left first, then emits
    /// its opcode. A left-nested chain such as `a + b + c` is lowered as a loop
    /// over its left spine and counts as one level of nesting.
    pub(super) fn compile_binary(&mut self, binary: &'ast BinaryExpr<'ast>) -> Result<()> {
        let mut spine = vec![binary];
        let mut leftmost = binary.left;
        while let Expr::Binary(inner) = leftmost {
            spine.push(*inner);
            leftmost = inner.left;
        }

        self.compile_expr(leftmost, ExprMode::Value)?;
        for binary in spine.into_iter().rev() {
            self.compile_operator(binary)?;
        }
        Ok(())
    }

    /// Left operand is already on the stack.
    fn compile_operator(&mut self, binary: &'ast BinaryExpr<'ast>) -> Result<()> {
        let op = match binary.op {
            BinaryOp::LogicalOr => return self.compile_short_circuit(OpCode::BranchTrue, binary),
            BinaryOp::LogicalAnd => return self.compile_short_circuit(OpCode::BranchFalse, binary),
            BinaryOp::BitOr => OpCode::BitOr,
            BinaryOp::BitXor => OpCode::BitXor,
            BinaryOp::BitAnd => OpCode::BitAnd,
            BinaryOp::Equal => OpCode::Equal,
            BinaryOp::NotEqual => OpCode::NotEqual,
            BinaryOp::StrictEqual => OpCode::StrictEqual,
            BinaryOp::StrictNotEqual => OpCode::StrictNotEqual,
            BinaryOp::Less => OpCode::LessThan,
            BinaryOp::LessEqual => OpCode::LessOrEqual,
            BinaryOp::Greater => OpCode::GreaterThan,
            BinaryOp::GreaterEqual => OpCode::GreaterOrEqual,
            BinaryOp::InstanceOf => OpCode::InstanceOf,
            BinaryOp::In => OpCode::In,
            BinaryOp::LeftShift => OpCode::LeftShift,
            BinaryOp::RightShift => OpCode::RightShift,
            BinaryOp::URightShift => OpCode::URightShift,
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Subtract,
            BinaryOp::Mul => OpCode::Multiply,
            BinaryOp::Div => OpCode::Divide,
            BinaryOp::Mod => OpCode::Modulo,
        };

        self.compile_expr(binary.right, ExprMode::Value)?;
        self.emitter.emit(op);
        Ok(())
    }

    /// Left operand is already on the stack.
    fn compile_short_circuit(&mut self, branch: OpCode, binary: &'ast BinaryExpr<'ast>) -> Result<()> {
        self.emitter.emit(OpCode::Duplicate);
        let end = self.emitter.emit_branch(branch);
        self.emitter.emit(OpCode::Pop);
        self.compile_expr(binary.right, ExprMode::Value)?;
        self.emitter.patch_here(end);
        Ok(())
    }
}
