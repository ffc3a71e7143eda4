//! Compiled output of one function body or program.

use bitflags::bitflags;
use qscript_core::{CompilationError, Name, NameTable, Span};

use super::{ExceptionTable, FunctionId, Instruction, OpCode};

bitflags! {
    /// Facts about a nested function the interpreter needs at closure time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionFlags: u8 {
        /// Created by a function expression rather than a declaration.
        const EXPRESSION = 1 << 0;
        /// The body opens by binding the function's own name to itself.
        const SELF_BINDING = 1 << 1;
        /// The body mentions `arguments`.
        const USES_ARGUMENTS = 1 << 2;
    }
}

/// A nested function literal, compiled ahead of time.
///
/// `NewClosure` instructions refer to templates by their index in the
/// enclosing unit's function table.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTemplate {
    pub name: Option<Name>,
    pub flags: FunctionFlags,
    pub unit: CompilationUnit,
    pub span: Span,
}

impl FunctionTemplate {
    pub fn formals(&self) -> &[Name] {
        self.unit.formals()
    }
}

/// Linear instruction sequence plus the tables needed to run it.
///
/// A unit is either valid, holding code, or invalid, holding the first error
/// found. Invalid units carry no instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilationUnit {
    instructions: Vec<Instruction>,
    lines: Vec<u32>,
    handlers: ExceptionTable,
    functions: Vec<FunctionTemplate>,
    formals: Vec<Name>,
    error: Option<CompilationError>,
}

impl CompilationUnit {
    pub(crate) fn new(
        instructions: Vec<Instruction>,
        lines: Vec<u32>,
        handlers: ExceptionTable,
        functions: Vec<FunctionTemplate>,
        formals: Vec<Name>,
    ) -> Self {
        debug_assert_eq!(instructions.len(), lines.len());
        Self {
            instructions,
            lines,
            handlers,
            functions,
            formals,
            error: None,
        }
    }

    pub(crate) fn invalid(error: CompilationError, formals: Vec<Name>) -> Self {
        Self {
            formals,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&CompilationError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Line of the first invalidating error, if any.
    pub fn error_line(&self) -> Option<u32> {
        self.error.as_ref().map(|e| e.span().line)
    }

    pub fn into_result(self) -> Result<Self, CompilationError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Source line of each instruction, parallel to [`instructions`](Self::instructions).
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    pub fn line_at(&self, ip: usize) -> Option<u32> {
        self.lines.get(ip).copied()
    }

    pub fn handlers(&self) -> &ExceptionTable {
        &self.handlers
    }

    pub fn functions(&self) -> &[FunctionTemplate] {
        &self.functions
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionTemplate> {
        self.functions.get(id.index())
    }

    pub fn formals(&self) -> &[Name] {
        &self.formals
    }

    /// Render the unit as text; see [`disassemble`](super::disassemble).
    pub fn disassemble(&self, names: &NameTable) -> String {
        super::disassemble(self, names)
    }

    // ==========================================================================
    // Testing Helpers
    // ==========================================================================

    /// Opcode sequence, without operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions.iter().map(|inst| inst.op).collect()
    }

    /// Check if this unit contains exactly the given opcode sequence.
    ///
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this unit contains the given opcodes in order, not necessarily contiguous.
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }

    /// Count occurrences of one opcode.
    pub fn count_opcode(&self, op: OpCode) -> usize {
        self.instructions.iter().filter(|inst| inst.op == op).count()
    }
}
