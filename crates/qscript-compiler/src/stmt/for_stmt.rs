//! C-style for loop compilation.

use qscript_core::Name;
use qscript_parser::ast::{ForInit, ForStmt};

use crate::bytecode::OpCode;
use crate::emit::FrameKind;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [init]                  ; expression init is popped
    /// top:
    /// [condition]             ; omitted when absent
    /// BranchFalse -> end
    /// [body]
    /// update:                 ; continue target
    /// [update]
    /// Pop
    /// Branch -> top
    /// end:                    ; break target
    /// ```
    pub(crate) fn compile_for(&mut self, stmt: &'ast ForStmt<'ast>, labels: &[Name]) -> Result<()> {
        match &stmt.init {
            Some(ForInit::Var(var)) => self.compile_var(var)?,
            Some(ForInit::Expr(expr)) => {
                self.compile_expr(expr, ExprMode::Value)?;
                self.emitter.emit(OpCode::Pop);
            }
            None => {}
        }

        let top = self.emitter.next_instruction_offset();
        self.push_frame(FrameKind::Loop, labels, None);

        let exit = match &stmt.condition {
            Some(condition) => {
                self.compile_expr(condition, ExprMode::Value)?;
                Some(self.emitter.emit_branch(OpCode::BranchFalse))
            }
            None => None,
        };

        self.compile_stmt(&stmt.body)?;

        self.set_continue_target_here();
        if let Some(update) = &stmt.update {
            self.emitter.set_line(update.span().line);
            self.compile_expr(update, ExprMode::Value)?;
            self.emitter.emit(OpCode::Pop);
        }
        self.emitter.emit_branch_to(OpCode::Branch, top);

        if let Some(exit) = exit {
            self.emitter.patch_here(exit);
        }
        self.pop_frame();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::test_support::{branch_targets, compile};

    #[test]
    fn full_for_loop() {
        let (unit, _) = compile("for (var i = 0; i < n; i++) f(i);");
        unit.assert_opcodes(&[
            OpCode::DeclareLocal,
            // init
            OpCode::Resolve,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::Pop,
            // top: condition
            OpCode::Fetch,
            OpCode::Fetch,
            OpCode::LessThan,
            OpCode::BranchFalse,
            // body
            OpCode::Resolve,
            OpCode::Fetch,
            OpCode::Call,
            OpCode::StoreResult,
            // update
            OpCode::Resolve,
            OpCode::PostIncrement,
            OpCode::Pop,
            OpCode::Branch,
            OpCode::Halt,
        ]);
        assert_eq!(branch_targets(&unit), vec![(8, 17), (16, 5)]);
    }

    #[test]
    fn infinite_for_loop_with_break() {
        let (unit, _) = compile("for (;;) { break; }");
        unit.assert_opcodes(&[OpCode::Branch, OpCode::Branch, OpCode::Halt]);
        assert_eq!(branch_targets(&unit), vec![(0, 2), (1, 0)]);
    }

    #[test]
    fn continue_goes_to_update() {
        let (unit, _) = compile("for (x = 0; ; x++) continue;");
        // 0 Resolve x, 1 LoadNumber, 2 Assign, 3 Pop, 4 Branch(continue),
        // 5 Resolve x, 6 PostIncrement, 7 Pop, 8 Branch(top), 9 Halt
        assert_eq!(branch_targets(&unit), vec![(4, 5), (8, 4)]);
    }
}
