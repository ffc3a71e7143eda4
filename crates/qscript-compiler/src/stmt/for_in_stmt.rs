//! For-in and for-each loop compilation.
//!
//! The enumerator lives on the evaluation stack for the whole loop, so any
//! `break`/`continue` that leaves the loop pops it on the way out.

use qscript_core::Name;
use qscript_parser::ast::{ForInStmt, ForInTarget};

use crate::bytecode::OpCode;
use crate::emit::FrameKind;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result, Unwind};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [var initializer]       ; `for (var x = e in o)` only
    /// [object]
    /// NewEnumeration
    /// ToFirstElement
    /// top:                    ; continue target
    /// HasNextElement
    /// BranchFalse -> end
    /// [target reference]
    /// NextElement             ; NextValue for `for each`
    /// [body]
    /// Branch -> top
    /// end:                    ; break target
    /// Pop                     ; the enumerator
    /// ```
    pub(crate) fn compile_for_in(&mut self, stmt: &'ast ForInStmt<'ast>, labels: &[Name]) -> Result<()> {
        if let ForInTarget::Var(decl) = &stmt.target {
            self.compile_var_declarator(decl)?;
        }

        self.compile_expr(&stmt.object, ExprMode::Value)?;
        self.emitter.emit(OpCode::NewEnumeration);
        self.emitter.emit(OpCode::ToFirstElement);

        self.unwind.push(Unwind::Enumerator);
        let top = self.emitter.next_instruction_offset();
        self.push_frame(FrameKind::Loop, labels, Some(top));

        self.emitter.emit(OpCode::HasNextElement);
        let exit = self.emitter.emit_branch(OpCode::BranchFalse);

        match &stmt.target {
            ForInTarget::Var(decl) => {
                let name = self.intern(decl.name.name);
                self.emitter.emit_name(OpCode::Resolve, name);
            }
            ForInTarget::Expr(expr) => self.compile_expr(expr, ExprMode::Reference)?,
        }
        self.emitter.emit(if stmt.each { OpCode::NextValue } else { OpCode::NextElement });

        self.compile_stmt(&stmt.body)?;
        self.emitter.emit_branch_to(OpCode::Branch, top);

        self.emitter.patch_here(exit);
        self.pop_frame();
        self.unwind.pop();
        self.emitter.emit(OpCode::Pop);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::test_support::{branch_targets, compile};

    #[test]
    fn for_in_basic() {
        let (unit, _) = compile("for (k in o) f(k);");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            OpCode::NewEnumeration,
            OpCode::ToFirstElement,
            OpCode::HasNextElement,
            OpCode::BranchFalse,
            OpCode::Resolve,
            OpCode::NextElement,
            OpCode::Resolve,
            OpCode::Fetch,
            OpCode::Call,
            OpCode::StoreResult,
            OpCode::Branch,
            OpCode::Pop,
            OpCode::Halt,
        ]);
        assert_eq!(branch_targets(&unit), vec![(4, 12), (11, 3)]);
    }

    #[test]
    fn for_each_uses_next_value() {
        let (unit, _) = compile("for each (var v in o) ;");
        unit.assert_contains_opcodes(&[OpCode::DeclareLocal, OpCode::NextValue, OpCode::Pop]);
        assert_eq!(unit.count_opcode(OpCode::NextElement), 0);
    }

    #[test]
    fn var_initializer_runs_once_before_enumeration() {
        let (unit, _) = compile("for (var k = 1 in o) ;");
        unit.assert_contains_opcodes(&[
            OpCode::Resolve,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Fetch,
            OpCode::NewEnumeration,
        ]);
    }

    #[test]
    fn member_target_is_a_reference() {
        let (unit, _) = compile("for (a.b in o) ;");
        unit.assert_contains_opcodes(&[
            OpCode::HasNextElement,
            OpCode::BranchFalse,
            OpCode::Fetch,
            OpCode::LoadString,
            OpCode::MakeReference,
            OpCode::NextElement,
        ]);
    }

    #[test]
    fn break_leaves_through_the_enumerator_pop() {
        let (unit, _) = compile("for (k in o) break;");
        // 0 Fetch, 1 NewEnumeration, 2 ToFirstElement, 3 HasNextElement,
        // 4 BranchFalse, 5 Resolve, 6 NextElement, 7 Branch(break),
        // 8 Branch(top), 9 Pop, 10 Halt
        assert_eq!(branch_targets(&unit), vec![(4, 9), (7, 9), (8, 3)]);
        assert_eq!(unit.count_opcode(OpCode::Pop), 1);
    }

    #[test]
    fn break_out_of_outer_loop_pops_inner_enumerator() {
        let (unit, _) = compile("outer: for (a in x) { for (b in y) { break outer; } }");
        // Inner loop pop, outer loop pop, plus one for the crossing break.
        assert_eq!(unit.count_opcode(OpCode::Pop), 3);
    }
}
