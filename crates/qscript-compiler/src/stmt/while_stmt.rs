//! While loop compilation.

use qscript_core::Name;
use qscript_parser::ast::WhileStmt;

use crate::bytecode::OpCode;
use crate::emit::FrameKind;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// top:                    ; continue target
    /// [condition]
    /// BranchFalse -> end
    /// [body]
    /// Branch -> top
    /// end:                    ; break target
    /// ```
    pub(crate) fn compile_while(&mut self, stmt: &'ast WhileStmt<'ast>, labels: &[Name]) -> Result<()> {
        let top = self.emitter.next_instruction_offset();
        self.push_frame(FrameKind::Loop, labels, Some(top));

        self.compile_expr(&stmt.condition, ExprMode::Value)?;
        let exit = self.emitter.emit_branch(OpCode::BranchFalse);

        self.compile_stmt(&stmt.body)?;
        self.emitter.emit_branch_to(OpCode::Branch, top);

        self.emitter.patch_here(exit);
        self.pop_frame();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::test_support::{branch_targets, compile};

    #[test]
    fn while_loop_basic() {
        let (unit, _) = compile("while (a) b;");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            OpCode::BranchFalse,
            OpCode::Fetch,
            OpCode::StoreResult,
            OpCode::Branch,
            OpCode::Halt,
        ]);
        assert_eq!(branch_targets(&unit), vec![(1, 5), (4, 0)]);
    }

    #[test]
    fn while_with_break_and_continue() {
        let (unit, _) = compile("while (a) { if (b) break; continue; }");
        // 0 Fetch a, 1 BranchFalse, 2 Fetch b, 3 BranchFalse, 4 Branch(break),
        // 5 Branch(continue), 6 Branch(top), 7 Halt
        assert_eq!(
            branch_targets(&unit),
            vec![(1, 7), (3, 5), (4, 7), (5, 0), (6, 0)]
        );
    }

    #[test]
    fn nested_loops_break_innermost() {
        let (unit, _) = compile("while (a) { while (b) { break; } c; }");
        // 0 Fetch a, 1 BranchFalse, 2 Fetch b, 3 BranchFalse, 4 Branch(break),
        // 5 Branch(inner top), 6 Fetch c, 7 StoreResult, 8 Branch(outer top), 9 Halt
        assert_eq!(
            branch_targets(&unit),
            vec![(1, 9), (3, 6), (4, 6), (5, 2), (8, 0)]
        );
    }
}
