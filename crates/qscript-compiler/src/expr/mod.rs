//! Expression lowering.
//!
//! Every expression compiles in one of two modes. In [`ExprMode::Value`] it
//! leaves its value on the stack. In [`ExprMode::Reference`] identifiers,
//! member accesses and index accesses leave an assignable reference instead;
//! other expressions ignore the mode and produce a value. The mode is a
//! parameter, so sub-expressions such as the index in `a[f()] = v` are always
//! compiled in the mode their own position requires.

mod assignment;
mod binary;
mod calls;
mod closure;
mod literals;
mod member;
mod unary;

use qscript_core::Name;
use qscript_parser::ast::{ConditionalExpr, Expr, Ident};

use crate::bytecode::{FunctionFlags, OpCode};
use crate::function_compiler::{FunctionCompiler, Result};

/// What an expression must leave on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprMode {
    Value,
    Reference,
}

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    pub(crate) fn compile_expr(&mut self, expr: &'ast Expr<'ast>, mode: ExprMode) -> Result<()> {
        self.enter(expr.span())?;

        match expr {
            Expr::Literal(lit) => self.compile_literal(lit),
            Expr::RegExp(re) => self.compile_regexp(re),
            Expr::Ident(ident) => self.compile_ident(ident, mode),
            Expr::This(_) => {
                self.emitter.emit(OpCode::LoadThis);
            }
            Expr::Array(array) => self.compile_array(array)?,
            Expr::Object(object) => self.compile_object(object)?,
            Expr::Function(func) => self.compile_function_expr(func)?,
            Expr::Unary(unary) => self.compile_unary(unary)?,
            Expr::Update(update) => self.compile_update(update)?,
            Expr::Binary(binary) => self.compile_binary(binary)?,
            Expr::Assign(assign) => self.compile_assign(assign)?,
            Expr::Conditional(cond) => self.compile_conditional(cond)?,
            Expr::Member(member) => self.compile_member(member, mode)?,
            Expr::Index(index) => self.compile_index(index, mode)?,
            Expr::Call(call) => self.compile_call(call)?,
            Expr::New(new) => self.compile_new(new)?,
            Expr::Comma(comma) => {
                self.compile_expr(comma.left, ExprMode::Value)?;
                self.emitter.emit(OpCode::Pop);
                self.compile_expr(comma.right, ExprMode::Value)?;
            }
        }

        self.leave();
        Ok(())
    }

    /// `Fetch name` for a value, `Resolve name` for a reference.
    fn compile_ident(&mut self, ident: &Ident<'ast>, mode: ExprMode) {
        let name = self.intern(ident.name);
        if name == Name::ARGUMENTS {
            self.flags |= FunctionFlags::USES_ARGUMENTS;
        }
        let op = match mode {
            ExprMode::Value => OpCode::Fetch,
            ExprMode::Reference => OpCode::Resolve,
        };
        self.emitter.emit_name(op, name);
    }

    /// Bytecode layout:
    /// ```text
    /// [condition]
    /// BranchFalse -> else
    /// [then]
    /// Branch -> end
    /// else:
    /// [else]
    /// end:
    /// ```
    fn compile_conditional(&mut self, cond: &'ast ConditionalExpr<'ast>) -> Result<()> {
        self.compile_expr(cond.condition, ExprMode::Value)?;
        let else_jump = self.emitter.emit_branch(OpCode::BranchFalse);
        self.compile_expr(cond.then_expr, ExprMode::Value)?;
        let end_jump = self.emitter.emit_branch(OpCode::Branch);
        self.emitter.patch_here(else_jump);
        self.compile_expr(cond.else_expr, ExprMode::Value)?;
        self.emitter.patch_here(end_jump);
        Ok(())
    }
}
