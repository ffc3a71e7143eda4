//! Statement lowering.
//!
//! Each statement kind has its own file with an `impl FunctionCompiler`
//! block. Loops, switches and labelled statements take the labels attached to
//! them so `break label`/`continue label` resolve to the right frame.

mod do_while_stmt;
mod for_in_stmt;
mod for_stmt;
mod if_stmt;
mod jump;
mod labelled;
mod switch_stmt;
mod try_catch;
mod while_stmt;
mod with_stmt;

use qscript_parser::ast::{ExprStmt, Stmt, VarDeclarator, VarStmt};

use crate::bytecode::OpCode;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result, UnitKind};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Compile a statement.
    pub(crate) fn compile_stmt(&mut self, stmt: &'ast Stmt<'ast>) -> Result<()> {
        let span = stmt.span();
        self.enter(span)?;
        self.emitter.set_line(span.line);

        match stmt {
            Stmt::Expr(s) => self.compile_expr_stmt(s)?,
            Stmt::Var(s) => self.compile_var(s)?,
            // Hoisted into the prologue.
            Stmt::Function(_) => {}
            Stmt::Empty(_) => {}
            Stmt::Block(block) => self.compile_stmts(block.stmts)?,
            Stmt::If(s) => self.compile_if(s)?,
            Stmt::While(s) => self.compile_while(s, &[])?,
            Stmt::DoWhile(s) => self.compile_do_while(s, &[])?,
            Stmt::For(s) => self.compile_for(s, &[])?,
            Stmt::ForIn(s) => self.compile_for_in(s, &[])?,
            Stmt::Continue(s) => self.compile_continue(s)?,
            Stmt::Break(s) => self.compile_break(s)?,
            Stmt::Return(s) => self.compile_return(s)?,
            Stmt::With(s) => self.compile_with(s)?,
            Stmt::Switch(s) => self.compile_switch(s, &[])?,
            Stmt::Labelled(s) => self.compile_labelled(s)?,
            Stmt::Throw(s) => {
                self.compile_expr(&s.value, ExprMode::Value)?;
                self.emitter.emit(OpCode::Throw);
            }
            Stmt::Try(s) => self.compile_try(s)?,
        }

        self.leave();
        Ok(())
    }

    pub(crate) fn compile_stmts(&mut self, stmts: &'ast [Stmt<'ast>]) -> Result<()> {
        for stmt in stmts {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    /// Programs keep the value as their completion value; functions drop it.
    fn compile_expr_stmt(&mut self, stmt: &'ast ExprStmt<'ast>) -> Result<()> {
        self.compile_expr(&stmt.expr, ExprMode::Value)?;
        match self.kind {
            UnitKind::Program => self.emitter.emit(OpCode::StoreResult),
            UnitKind::Function => self.emitter.emit(OpCode::Pop),
        };
        Ok(())
    }

    /// Names are declared by the prologue; only initializers produce code.
    pub(crate) fn compile_var(&mut self, stmt: &'ast VarStmt<'ast>) -> Result<()> {
        for decl in stmt.declarators {
            self.compile_var_declarator(decl)?;
        }
        Ok(())
    }

    /// ```text
    /// Resolve x
    /// [init]
    /// Assign
    /// Pop
    /// ```
    pub(crate) fn compile_var_declarator(&mut self, decl: &'ast VarDeclarator<'ast>) -> Result<()> {
        let Some(init) = &decl.init else {
            return Ok(());
        };
        self.emitter.set_line(decl.span.line);
        let name = self.intern(decl.name.name);
        self.emitter.emit_name(OpCode::Resolve, name);
        self.compile_expr(init, ExprMode::Value)?;
        self.emitter.emit(OpCode::Assign);
        self.emitter.emit(OpCode::Pop);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{OpCode, Operand};
    use crate::test_support::{compile, compile_body};

    #[test]
    fn expression_statement_in_program_stores_result() {
        let (unit, _) = compile("1;");
        unit.assert_opcodes(&[OpCode::LoadNumber, OpCode::StoreResult, OpCode::Halt]);
    }

    #[test]
    fn expression_statement_in_function_pops() {
        let (unit, _) = compile_body("1;", &[]);
        unit.assert_opcodes(&[OpCode::LoadNumber, OpCode::Pop, OpCode::LoadUndefined, OpCode::Ret]);
    }

    #[test]
    fn var_with_and_without_initializer() {
        let (unit, names) = compile("var x = 1, y;");
        unit.assert_opcodes(&[
            OpCode::DeclareLocal,
            OpCode::DeclareLocal,
            OpCode::Resolve,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Halt,
        ]);
        let x = names.get("x").unwrap();
        assert_eq!(unit.instructions()[2].operand(), Operand::Name(x));
    }

    #[test]
    fn throw_evaluates_then_throws() {
        let (unit, _) = compile("throw e;");
        unit.assert_opcodes(&[OpCode::Fetch, OpCode::Throw, OpCode::Halt]);
    }

    #[test]
    fn empty_and_block_statements() {
        let (unit, _) = compile(";{ ; { } }");
        unit.assert_opcodes(&[OpCode::Halt]);
    }

    #[test]
    fn function_declaration_is_hoisted() {
        let (unit, names) = compile("f(); function f() { return 1; }");
        unit.assert_opcodes(&[
            OpCode::DeclareLocal,
            OpCode::Resolve,
            OpCode::NewClosure,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Resolve,
            OpCode::Call,
            OpCode::StoreResult,
            OpCode::Halt,
        ]);
        let f = names.get("f").unwrap();
        assert_eq!(unit.instructions()[0].operand(), Operand::Name(f));
        assert_eq!(unit.functions().len(), 1);
    }

    #[test]
    fn formals_are_not_redeclared() {
        let mut names = qscript_core::NameTable::new();
        let a = names.intern("a");
        let (unit, names) = crate::test_support::compile_body_with("var a, b;", &[a], names);
        unit.assert_opcodes(&[OpCode::DeclareLocal, OpCode::LoadUndefined, OpCode::Ret]);
        let b = names.get("b").unwrap();
        assert_eq!(unit.instructions()[0].operand(), Operand::Name(b));
        assert_eq!(unit.formals(), &[a]);
    }

    #[test]
    fn lines_are_recorded() {
        let (unit, _) = compile("a;\n\nb;");
        assert_eq!(unit.lines(), &[1, 1, 3, 3, 3]);
    }
}
