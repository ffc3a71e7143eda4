//! Switch statement compilation.
//!
//! Case tests and bodies are interleaved in source order. The discriminant
//! stays on the stack through the test chain and is popped on entry to the
//! matched body, so bodies run with a clean stack.

use qscript_core::Name;
use qscript_parser::ast::{Stmt, SwitchStmt};

use crate::bytecode::OpCode;
use crate::emit::FrameKind;
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// [discriminant]
    /// test_1:
    /// Duplicate
    /// [case 1 test]
    /// StrictEqual
    /// BranchFalse -> test_2
    /// Pop
    /// body_1:
    /// [case 1 body]
    /// Branch -> body_2        ; fallthrough, skips the next test
    /// test_2:
    /// ...
    /// no_match:
    /// Pop
    /// Branch -> default body, or end
    /// end:                    ; break target
    /// ```
    ///
    /// The fallthrough branch is left out when the next clause is the
    /// default (its body follows directly) or when the body ends in a
    /// `break` for this switch.
    pub(crate) fn compile_switch(&mut self, stmt: &'ast SwitchStmt<'ast>, labels: &[Name]) -> Result<()> {
        self.compile_expr(&stmt.discriminant, ExprMode::Value)?;
        self.push_frame(FrameKind::Switch, labels, None);

        let mut next_test: Option<usize> = None;
        let mut fallthrough: Option<usize> = None;
        let mut default_body: Option<usize> = None;

        for (index, clause) in stmt.clauses.iter().enumerate() {
            self.emitter.set_line(clause.span.line);
            match &clause.test {
                Some(test) => {
                    if let Some(site) = next_test.take() {
                        self.emitter.patch_here(site);
                    }
                    self.emitter.emit(OpCode::Duplicate);
                    self.compile_expr(test, ExprMode::Value)?;
                    self.emitter.emit(OpCode::StrictEqual);
                    next_test = Some(self.emitter.emit_branch(OpCode::BranchFalse));
                    self.emitter.emit(OpCode::Pop);
                }
                None => default_body = Some(self.emitter.next_instruction_offset()),
            }
            if let Some(site) = fallthrough.take() {
                self.emitter.patch_here(site);
            }

            let breaks_before = self.current_break_count();
            self.compile_stmts(clause.body)?;
            let ends_in_break = matches!(clause.body.last(), Some(Stmt::Break(_)))
                && self.current_break_count() > breaks_before;

            match stmt.clauses.get(index + 1) {
                Some(next) if next.is_default() => {}
                Some(_) if ends_in_break => {}
                Some(_) => fallthrough = Some(self.emitter.emit_branch(OpCode::Branch)),
                // The last body must not run into the no-match code.
                None if ends_in_break => {}
                None => {
                    let site = self.emitter.emit_branch(OpCode::Branch);
                    self.add_break_site(site);
                }
            }
        }

        if let Some(site) = next_test.take() {
            self.emitter.patch_here(site);
        }
        self.emitter.emit(OpCode::Pop);
        match default_body {
            Some(target) => {
                self.emitter.emit_branch_to(OpCode::Branch, target);
            }
            None => {
                let site = self.emitter.emit_branch(OpCode::Branch);
                self.add_break_site(site);
            }
        }

        self.pop_frame();
        Ok(())
    }

    fn current_break_count(&mut self) -> usize {
        self.loops.top_mut().map_or(0, |frame| frame.break_sites.len())
    }

    fn add_break_site(&mut self, site: usize) {
        if let Some(frame) = self.loops.top_mut() {
            frame.break_sites.push(site);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::test_support::{branch_targets, compile};

    #[test]
    fn empty_switch() {
        let (unit, _) = compile("switch (x) {}");
        unit.assert_opcodes(&[OpCode::Fetch, OpCode::Pop, OpCode::Branch, OpCode::Halt]);
        assert_eq!(branch_targets(&unit), vec![(2, 3)]);
    }

    #[test]
    fn cases_with_break() {
        let (unit, _) = compile("switch (x) { case 1: a; break; case 2: b; break; }");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            // case 1
            OpCode::Duplicate,
            OpCode::LoadNumber,
            OpCode::StrictEqual,
            OpCode::BranchFalse,
            OpCode::Pop,
            OpCode::Fetch,
            OpCode::StoreResult,
            OpCode::Branch,
            // case 2
            OpCode::Duplicate,
            OpCode::LoadNumber,
            OpCode::StrictEqual,
            OpCode::BranchFalse,
            OpCode::Pop,
            OpCode::Fetch,
            OpCode::StoreResult,
            OpCode::Branch,
            // no match
            OpCode::Pop,
            OpCode::Branch,
            OpCode::Halt,
        ]);
        assert_eq!(
            branch_targets(&unit),
            vec![(4, 9), (8, 19), (12, 17), (16, 19), (18, 19)]
        );
    }

    #[test]
    fn fallthrough_skips_next_test() {
        let (unit, _) = compile("switch (x) { case 1: a; case 2: b; }");
        // 0 Fetch x
        // 1 Duplicate, 2 LoadNumber, 3 StrictEqual, 4 BranchFalse, 5 Pop,
        // 6 Fetch a, 7 StoreResult, 8 Branch(fallthrough)
        // 9 Duplicate, 10 LoadNumber, 11 StrictEqual, 12 BranchFalse, 13 Pop,
        // 14 Fetch b, 15 StoreResult, 16 Branch(end)
        // 17 Pop, 18 Branch(end), 19 Halt
        assert_eq!(
            branch_targets(&unit),
            vec![(4, 9), (8, 14), (12, 17), (16, 19), (18, 19)]
        );
    }

    #[test]
    fn default_in_the_middle() {
        let (unit, _) = compile("switch (x) { case 1: a; default: d; case 2: b; }");
        // 0 Fetch x
        // 1 Duplicate, 2 LoadNumber, 3 StrictEqual, 4 BranchFalse, 5 Pop,
        // 6 Fetch a, 7 StoreResult              ; falls into default
        // 8 Fetch d, 9 StoreResult, 10 Branch   ; fallthrough over case 2 test
        // 11 Duplicate, 12 LoadNumber, 13 StrictEqual, 14 BranchFalse, 15 Pop,
        // 16 Fetch b, 17 StoreResult, 18 Branch(end)
        // 19 Pop, 20 Branch(default), 21 Halt
        assert_eq!(
            branch_targets(&unit),
            vec![(4, 11), (10, 16), (14, 19), (18, 21), (20, 8)]
        );
    }

    #[test]
    fn default_only() {
        let (unit, _) = compile("switch (x) { default: d; }");
        // 0 Fetch x, 1 Fetch d, 2 StoreResult, 3 Branch(end), 4 Pop, 5 Branch(default), 6 Halt
        assert_eq!(branch_targets(&unit), vec![(3, 6), (5, 1)]);
    }

    #[test]
    fn conditional_break_still_falls_through() {
        let (unit, _) = compile("switch (x) { case 1: if (c) break; case 2: b; }");
        // 6 Fetch c, 7 BranchFalse, 8 Branch(break), 9 Branch(fallthrough)
        let targets = branch_targets(&unit);
        assert!(targets.contains(&(7, 9)));
        assert_eq!(unit.instructions()[9].op, OpCode::Branch);
        assert!(targets.iter().any(|&(site, _)| site == 9));
    }

    #[test]
    fn continue_inside_switch_targets_loop() {
        let (unit, _) = compile("while (a) { switch (x) { case 1: continue; } }");
        assert!(unit.is_valid());
        // The continue jumps straight back to the loop condition.
        assert!(branch_targets(&unit).iter().any(|&(site, target)| site > 2 && target == 0));
    }
}
