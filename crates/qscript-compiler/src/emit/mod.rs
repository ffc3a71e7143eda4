//! Instruction emitter.
//!
//! The [`Emitter`] appends instructions for a single unit, records the source
//! line of each one, and tracks forward branches until they are patched.
//!
//! # Example
//!
//! ```
//! use qscript_compiler::bytecode::OpCode;
//! use qscript_compiler::emit::Emitter;
//!
//! let mut emitter = Emitter::new();
//! emitter.set_line(1);
//! emitter.emit(OpCode::LoadTrue);
//! let exit = emitter.emit_branch(OpCode::BranchFalse);
//! emitter.emit(OpCode::LoadNull);
//! emitter.emit(OpCode::Pop);
//! emitter.patch_here(exit);
//! emitter.emit(OpCode::Halt);
//!
//! let (instructions, lines) = emitter.finish();
//! assert_eq!(instructions[1].branch_target(1), Some(4));
//! assert_eq!(lines, vec![1; 5]);
//! ```

mod loops;

pub use loops::{BreakError, FrameKind, LoopFrame, LoopStack};

use qscript_core::Name;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::bytecode::{FunctionId, Instruction, OpCode, Operand};

/// Emits instructions for one compilation unit.
#[derive(Debug)]
pub struct Emitter {
    /// Emitted code, indexed by instruction offset.
    instructions: Vec<Instruction>,
    /// Source line of each instruction, parallel to `instructions`.
    lines: Vec<u32>,
    /// Branch sites still holding the placeholder offset.
    unpatched: FxHashSet<usize>,
    /// Line stamped on the next instruction.
    current_line: u32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            lines: Vec::new(),
            unpatched: FxHashSet::default(),
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    ///
    /// All subsequent instructions will be associated with this line number.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    /// Index the next emitted instruction will occupy.
    #[inline]
    pub fn next_instruction_offset(&self) -> usize {
        self.instructions.len()
    }

    /// Opcode of the most recent instruction.
    pub fn last_op(&self) -> Option<OpCode> {
        self.instructions.last().map(|inst| inst.op)
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append a built instruction; returns its offset.
    pub fn push(&mut self, instruction: Instruction) -> usize {
        let at = self.instructions.len();
        self.instructions.push(instruction);
        self.lines.push(self.current_line);
        at
    }

    /// Emit an opcode with no operands.
    pub fn emit(&mut self, op: OpCode) -> usize {
        self.push(Instruction::new(op))
    }

    /// Emit an opcode with one operand.
    pub fn emit_with(&mut self, op: OpCode, operand: Operand) -> usize {
        self.push(Instruction::with_operand(op, operand))
    }

    pub fn emit_with2(&mut self, op: OpCode, first: Operand, second: Operand) -> usize {
        self.push(Instruction::with_operands(op, first, second))
    }

    pub fn emit_name(&mut self, op: OpCode, name: Name) -> usize {
        self.emit_with(op, Operand::Name(name))
    }

    pub fn emit_number(&mut self, value: f64) -> usize {
        self.emit_with(OpCode::LoadNumber, Operand::number(value))
    }

    pub fn emit_count(&mut self, op: OpCode, count: usize) -> usize {
        self.emit_with(op, Operand::Count(count as u32))
    }

    /// `NewClosure` for template `id`.
    pub fn emit_closure(&mut self, id: FunctionId) -> usize {
        self.emit_with(OpCode::NewClosure, Operand::Function(id))
    }

    // ==========================================================================
    // Branches
    // ==========================================================================

    /// Emit a branch with a placeholder offset; returns its site for patching.
    pub fn emit_branch(&mut self, op: OpCode) -> usize {
        debug_assert!(op.is_branch(), "{op} is not a branch");
        let site = self.emit_with(op, Operand::Offset(0));
        self.unpatched.insert(site);
        site
    }

    /// Emit a branch to an already known target, usually backwards.
    pub fn emit_branch_to(&mut self, op: OpCode, target: usize) -> usize {
        let site = self.emit_branch(op);
        self.patch_to(site, target);
        site
    }

    /// Write the relative offset of a pending branch.
    ///
    /// # Panics
    ///
    /// If `site` is not an unpatched branch.
    pub fn patch_instruction(&mut self, site: usize, offset: i32) {
        assert!(
            self.unpatched.remove(&site),
            "instruction {site} is not an unpatched branch"
        );
        trace!(site, offset, "patched branch");
        self.instructions[site].operands[0] = Operand::Offset(offset);
    }

    /// Point a pending branch at absolute offset `target`.
    pub fn patch_to(&mut self, site: usize, target: usize) {
        let offset = target as i64 - site as i64;
        self.patch_instruction(site, offset as i32);
    }

    /// Point a pending branch at the next instruction to be emitted.
    pub fn patch_here(&mut self, site: usize) {
        self.patch_to(site, self.next_instruction_offset());
    }

    /// Whether some branch still waits for its target.
    pub fn has_unpatched(&self) -> bool {
        !self.unpatched.is_empty()
    }

    /// Consume the emitter.
    ///
    /// # Panics
    ///
    /// If any branch is still unpatched.
    pub fn finish(self) -> (Vec<Instruction>, Vec<u32>) {
        assert!(
            self.unpatched.is_empty(),
            "unpatched branches at {:?}",
            self.unpatched
        );
        (self.instructions, self.lines)
    }
}
