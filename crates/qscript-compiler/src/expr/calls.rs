//! Calls and construction.

use qscript_parser::ast::{CallExpr, Expr, NewExpr};

use super::ExprMode;
use crate::bytecode::OpCode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [callee]                ; reference, carries the `this` base
    /// [arg 1] ... [arg n]
    /// Call n
    /// ```
    pub(super) fn compile_call(&mut self, call: &'ast CallExpr<'ast>) -> Result<()> {
        self.compile_expr(call.callee, ExprMode::Reference)?;
        self.compile_arguments(call.args)?;
        self.emitter.emit_count(OpCode::Call, call.args.len());
        Ok(())
    }

    /// Same as a call, but the constructor is a plain value.
    pub(super) fn compile_new(&mut self, new: &'ast NewExpr<'ast>) -> Result<()> {
        self.compile_expr(new.callee, ExprMode::Value)?;
        self.compile_arguments(new.args)?;
        self.emitter.emit_count(OpCode::New, new.args.len());
        Ok(())
    }

    fn compile_arguments(&mut self, args: &'ast [Expr<'ast>]) -> Result<()> {
        for arg in args {
            self.compile_expr(arg, ExprMode::Value)?;
        }
        Ok(())
    }
}
