//! With statement compilation.

use qscript_parser::ast::WithStmt;

use crate::bytecode::OpCode;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result, Unwind};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [object]
    /// EnterWith
    /// [body]                  ; abrupt exits emit LeaveWith first
    /// LeaveWith
    /// ```
    pub(crate) fn compile_with(&mut self, stmt: &'ast WithStmt<'ast>) -> Result<()> {
        self.compile_expr(&stmt.object, ExprMode::Value)?;
        self.emitter.emit(OpCode::EnterWith);

        self.unwind.push(Unwind::With);
        self.compile_stmt(&stmt.body)?;
        self.unwind.pop();

        self.emitter.emit(OpCode::LeaveWith);
        Ok(())
    }
}
