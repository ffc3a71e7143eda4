//! Instructions and their operands.

use std::fmt;

use ordered_float::OrderedFloat;
use qscript_core::Name;

use super::OpCode;

/// Index into a unit's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single operand slot.
///
/// Numbers are wrapped in `OrderedFloat` so instructions compare and hash
/// bit-for-bit, which keeps generated code comparable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operand {
    #[default]
    None,
    Number(OrderedFloat<f64>),
    Name(Name),
    /// Relative branch offset: target index minus the branch's own index.
    Offset(i32),
    Count(u32),
    Function(FunctionId),
}

impl Operand {
    pub fn number(value: f64) -> Self {
        Operand::Number(OrderedFloat(value))
    }

    pub fn as_name(self) -> Option<Name> {
        match self {
            Operand::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_offset(self) -> Option<i32> {
        match self {
            Operand::Offset(offset) => Some(offset),
            _ => None,
        }
    }
}

/// An opcode plus up to two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub op: OpCode,
    pub operands: [Operand; 2],
}

impl Instruction {
    pub fn new(op: OpCode) -> Self {
        Self { op, operands: [Operand::None; 2] }
    }

    pub fn with_operand(op: OpCode, operand: Operand) -> Self {
        Self { op, operands: [operand, Operand::None] }
    }

    pub fn with_operands(op: OpCode, first: Operand, second: Operand) -> Self {
        Self { op, operands: [first, second] }
    }

    #[inline]
    pub fn operand(&self) -> Operand {
        self.operands[0]
    }

    /// Absolute target of a branch located at `at`.
    pub fn branch_target(&self, at: usize) -> Option<usize> {
        if !self.op.is_branch() {
            return None;
        }
        let offset = self.operand().as_offset()?;
        usize::try_from(at as i64 + offset as i64).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_target_is_relative() {
        let forward = Instruction::with_operand(OpCode::Branch, Operand::Offset(3));
        assert_eq!(forward.branch_target(5), Some(8));

        let backward = Instruction::with_operand(OpCode::BranchFalse, Operand::Offset(-5));
        assert_eq!(backward.branch_target(5), Some(0));
    }

    #[test]
    fn non_branch_has_no_target() {
        let inst = Instruction::with_operand(OpCode::Call, Operand::Count(2));
        assert_eq!(inst.branch_target(0), None);
    }

    #[test]
    fn numbers_compare_bitwise() {
        let a = Instruction::with_operand(OpCode::LoadNumber, Operand::number(f64::NAN));
        let b = Instruction::with_operand(OpCode::LoadNumber, Operand::number(f64::NAN));
        assert_eq!(a, b);
    }
}
