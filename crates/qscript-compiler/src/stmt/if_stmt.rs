//! If/else compilation.

use qscript_parser::ast::IfStmt;

use crate::bytecode::OpCode;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [condition]
    /// BranchFalse -> else
    /// [then]
    /// Branch -> end          ; only with an else branch
    /// else:
    /// [else]
    /// end:
    /// ```
    pub(crate) fn compile_if(&mut self, stmt: &'ast IfStmt<'ast>) -> Result<()> {
        self.compile_expr(&stmt.condition, ExprMode::Value)?;
        let else_jump = self.emitter.emit_branch(OpCode::BranchFalse);

        self.compile_stmt(&stmt.then_stmt)?;

        match &stmt.else_stmt {
            Some(else_stmt) => {
                let end_jump = self.emitter.emit_branch(OpCode::Branch);
                self.emitter.patch_here(else_jump);
                self.compile_stmt(else_stmt)?;
                self.emitter.patch_here(end_jump);
            }
            None => self.emitter.patch_here(else_jump),
        }

        Ok(())
    }
}
