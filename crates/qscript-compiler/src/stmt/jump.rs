//! Break, continue and return.
//!
//! An abrupt exit undoes, innermost first, every construct between the jump
//! and its target:
//!
//! - `with` bodies: `LeaveWith`
//! - catch bodies: `EndCatch`
//! - for-in enumerators and saved exceptions: `Pop` (not for `return`, whose
//!   `Ret` discards the stack)
//! - try blocks with a finally: an inline copy of the finally body
//!
//! Each try region crossed is closed before the inline code and reopened after
//! the jump, so no handler of a try covers the copy of its own finally.

use qscript_core::{CompilationError, Name};
use qscript_parser::ast::{JumpStmt, ReturnStmt};
use tracing::trace;

use crate::bytecode::OpCode;
use crate::emit::{BreakError, FrameKind};
use crate::expr::ExprMode;
use crate::function_compiler::{FunctionCompiler, Result, UnitKind, Unwind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Jump,
    Return,
}

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    // ==========================================================================
    // Frames
    // ==========================================================================

    pub(crate) fn push_frame(&mut self, kind: FrameKind, labels: &[Name], continue_target: Option<usize>) {
        self.loops.push(kind, labels, continue_target, self.unwind.len());
    }

    /// Pop the innermost frame and point its breaks at the next instruction.
    pub(crate) fn pop_frame(&mut self) {
        if let Some(frame) = self.loops.pop() {
            debug_assert!(!frame.has_pending_continues());
            for site in frame.break_sites {
                self.emitter.patch_here(site);
            }
        }
    }

    pub(crate) fn set_continue_target_here(&mut self) {
        let target = self.emitter.next_instruction_offset();
        if let Some(frame) = self.loops.top_mut() {
            for site in frame.set_continue_target(target) {
                self.emitter.patch_to(site, target);
            }
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    pub(crate) fn compile_break(&mut self, stmt: &'ast JumpStmt<'ast>) -> Result<()> {
        let label = stmt.label.map(|l| self.intern(l.name));
        let index = self
            .loops
            .find_break(label)
            .map_err(|e| self.jump_error(e, stmt))?;

        let depth = self.loops.frame(index).unwind_depth;
        let crossed = self.unwind_to(depth, Exit::Jump)?;
        let site = self.emitter.emit_branch(OpCode::Branch);
        self.loops.frame_mut(index).break_sites.push(site);
        self.reopen_regions(&crossed);
        Ok(())
    }

    pub(crate) fn compile_continue(&mut self, stmt: &'ast JumpStmt<'ast>) -> Result<()> {
        let label = stmt.label.map(|l| self.intern(l.name));
        let index = self
            .loops
            .find_continue(label)
            .map_err(|e| self.jump_error(e, stmt))?;

        let depth = self.loops.frame(index).unwind_depth;
        let crossed = self.unwind_to(depth, Exit::Jump)?;
        match self.loops.frame(index).continue_target() {
            Some(target) => {
                self.emitter.emit_branch_to(OpCode::Branch, target);
            }
            None => {
                let site = self.emitter.emit_branch(OpCode::Branch);
                self.loops.frame_mut(index).add_continue(site);
            }
        }
        self.reopen_regions(&crossed);
        Ok(())
    }

    pub(crate) fn compile_return(&mut self, stmt: &'ast ReturnStmt<'ast>) -> Result<()> {
        if self.kind == UnitKind::Program {
            return Err(CompilationError::ReturnOutsideFunction { span: stmt.span });
        }

        match &stmt.value {
            Some(value) => self.compile_expr(value, ExprMode::Value)?,
            None => {
                self.emitter.emit(OpCode::LoadUndefined);
            }
        }

        // The return value, plus enumerators left in place, stay on the stack
        // while finally copies run.
        let saved = self.pending_stack;
        self.pending_stack += 1;
        let crossed = self.unwind_to(0, Exit::Return);
        self.pending_stack = saved;
        let crossed = crossed?;

        self.emitter.emit(OpCode::Ret);
        self.reopen_regions(&crossed);
        Ok(())
    }

    fn jump_error(&self, error: BreakError, stmt: &JumpStmt<'_>) -> CompilationError {
        let span = stmt.span;
        let label = || stmt.label.map(|l| l.name.to_string()).unwrap_or_default();
        match error {
            BreakError::UndefinedLabel => CompilationError::UndefinedLabel { label: label(), span },
            BreakError::NotBreakable => CompilationError::BreakOutsideBreakable { span },
            BreakError::NotInLoop => CompilationError::ContinueOutsideLoop { span },
            BreakError::NotALoop => CompilationError::ContinueTargetNotLoop { label: label(), span },
        }
    }

    // ==========================================================================
    // Unwinding
    // ==========================================================================

    /// Emit the cleanup for every unwind entry above `depth`, innermost
    /// first. Returns the try regions that were closed on the way.
    fn unwind_to(&mut self, depth: usize, exit: Exit) -> Result<Vec<usize>> {
        let mut crossed = Vec::new();

        for index in (depth..self.unwind.len()).rev() {
            match self.unwind[index] {
                Unwind::With => {
                    self.emitter.emit(OpCode::LeaveWith);
                }
                Unwind::CatchScope => {
                    self.emitter.emit(OpCode::EndCatch);
                }
                Unwind::Enumerator | Unwind::SavedException => match exit {
                    Exit::Jump => {
                        self.emitter.emit(OpCode::Pop);
                    }
                    Exit::Return => self.pending_stack += 1,
                },
                Unwind::CatchTry { region } => {
                    self.close_region(region);
                    crossed.push(region);
                }
                Unwind::FinallyTry { region, finalizer } => {
                    self.close_region(region);
                    crossed.push(region);
                    trace!(at = self.emitter.next_instruction_offset(), "inlining finally");
                    self.compile_hidden_above(index, |this| this.compile_stmts(finalizer.stmts))?;
                }
            }
        }

        Ok(crossed)
    }

    /// Run `f` with every unwind entry from `index` up, and every frame
    /// pushed above that height, out of sight.
    fn compile_hidden_above(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let hidden_unwind = self.unwind.split_off(index);
        let hidden_frames = self.loops.hide_above(index);
        let result = f(self);
        self.loops.restore(hidden_frames);
        self.unwind.extend(hidden_unwind);
        result
    }

    fn reopen_regions(&mut self, regions: &[usize]) {
        for &region in regions {
            self.reopen_region(region);
        }
    }
}
