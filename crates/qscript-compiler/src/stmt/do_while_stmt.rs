//! Do-while loop compilation.

use qscript_core::Name;
use qscript_parser::ast::DoWhileStmt;

use crate::bytecode::OpCode;
use crate::emit::FrameKind;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// top:
    /// [body]
    /// cond:                   ; continue target
    /// [condition]
    /// BranchTrue -> top
    /// end:                    ; break target
    /// ```
    pub(crate) fn compile_do_while(&mut self, stmt: &'ast DoWhileStmt<'ast>, labels: &[Name]) -> Result<()> {
        let top = self.emitter.next_instruction_offset();
        self.push_frame(FrameKind::Loop, labels, None);

        self.compile_stmt(&stmt.body)?;

        self.set_continue_target_here();
        self.emitter.set_line(stmt.condition.span().line);
        self.compile_expr(&stmt.condition, ExprMode::Value)?;
        self.emitter.emit_branch_to(OpCode::BranchTrue, top);

        self.pop_frame();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::test_support::{branch_targets, compile};

    #[test]
    fn do_while_basic() {
        let (unit, _) = compile("do a; while (b)");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            OpCode::StoreResult,
            OpCode::Fetch,
            OpCode::BranchTrue,
            OpCode::Halt,
        ]);
        assert_eq!(branch_targets(&unit), vec![(3, 0)]);
    }

    #[test]
    fn continue_goes_to_condition() {
        let (unit, _) = compile("do { continue; break; } while (c);");
        // 0 Branch(continue), 1 Branch(break), 2 Fetch c, 3 BranchTrue, 4 Halt
        assert_eq!(branch_targets(&unit), vec![(0, 2), (1, 4), (3, 0)]);
    }
}
