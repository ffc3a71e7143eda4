//! Instruction set.
//!
//! The interpreter is a stack machine. Stack effects are written
//! `[inputs] -> [outputs]`, top of stack last. A *reference* is an
//! assignable handle produced by `Resolve` or `MakeReference`.

/// Operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// `[] -> [undefined]`
    LoadUndefined = 0,
    /// `[] -> [null]`
    LoadNull,
    /// `[] -> [true]`
    LoadTrue,
    /// `[] -> [false]`
    LoadFalse,
    /// Operand: number. `[] -> [number]`
    LoadNumber,
    /// Operand: name. `[] -> [string]`
    LoadString,
    /// `[] -> [this]`
    LoadThis,
    /// The function object currently executing. `[] -> [callee]`
    LoadCallee,
    /// Operands: pattern, flags. `[] -> [regexp]`
    NewRegExp,

    // =========================================================================
    // Stack
    // =========================================================================
    /// `[a] -> [a, a]`
    Duplicate,
    /// `[a] -> []`
    Pop,

    // =========================================================================
    // Names and scopes
    // =========================================================================
    /// Operand: name. Look the name up through the scope chain. `[] -> [value]`
    Fetch,
    /// Operand: name. `[] -> [ref]`
    Resolve,
    /// Operand: name. Create an undefined binding in the activation if absent.
    DeclareLocal,

    // =========================================================================
    // Properties and assignment
    // =========================================================================
    /// `[base, key] -> [value]`
    FetchField,
    /// `[base, key] -> [ref]`
    MakeReference,
    /// Store through a reference. `[ref, value] -> [value]`
    Assign,

    // =========================================================================
    // Object creation
    // =========================================================================
    /// `[] -> [object]`
    NewObject,
    /// `[] -> [array]`
    NewArray,
    /// Operand: function id into the unit's function table. `[] -> [closure]`
    NewClosure,

    // =========================================================================
    // Arithmetic and logic, `[a, b] -> [a op b]` / `[a] -> [op a]`
    // =========================================================================
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    UnaryPlus,
    UnaryMinus,
    BitNot,
    Not,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    URightShift,

    // =========================================================================
    // Comparison, `[a, b] -> [bool]`
    // =========================================================================
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    InstanceOf,
    In,

    // =========================================================================
    // Compound assignment, `[ref, value] -> [result]`
    // =========================================================================
    InplaceAdd,
    InplaceSubtract,
    InplaceMultiply,
    InplaceDivide,
    InplaceModulo,
    InplaceLeftShift,
    InplaceRightShift,
    InplaceURightShift,
    InplaceBitAnd,
    InplaceBitOr,
    InplaceBitXor,

    // =========================================================================
    // Increment / decrement, `[ref] -> [value]`
    // =========================================================================
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,

    // =========================================================================
    // Operators on references (a plain value is accepted too)
    // =========================================================================
    /// `[ref] -> [bool]`
    Delete,
    /// `[ref] -> [string]`; unresolvable names yield "undefined".
    TypeOf,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Operand: argument count. `[callee, args...] -> [result]`; a reference
    /// callee supplies `this` from its base.
    Call,
    /// Operand: argument count. `[constructor, args...] -> [object]`
    New,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Operand: relative offset from this instruction.
    Branch,
    /// Operand: relative offset. `[cond] -> []`
    BranchTrue,
    /// Operand: relative offset. `[cond] -> []`
    BranchFalse,

    // =========================================================================
    // Enumeration (for-in / for-each)
    // =========================================================================
    /// `[object] -> [enumerator]`
    NewEnumeration,
    /// `[enum] -> [enum]`
    ToFirstElement,
    /// `[enum] -> [enum, bool]`
    HasNextElement,
    /// Assign the next key. `[enum, ref] -> [enum]`
    NextElement,
    /// Assign the next value. `[enum, ref] -> [enum]`
    NextValue,

    // =========================================================================
    // With scopes
    // =========================================================================
    /// `[object] -> []`, pushes a scope.
    EnterWith,
    /// Pops the innermost `with` scope.
    LeaveWith,

    // =========================================================================
    // Exceptions
    // =========================================================================
    /// Operand: name. Bind the in-flight exception in a new scope.
    BeginCatch,
    /// Pops the catch scope.
    EndCatch,
    /// `[value] -> !`
    Throw,
    /// Entered by unwinding; saves the in-flight exception. `[] -> [exception]`
    BeginFinally,
    /// `[exception] -> !`, rethrows what `BeginFinally` saved.
    EndFinally,

    // =========================================================================
    // Exit
    // =========================================================================
    /// `[value] -> !`
    Ret,
    /// End of a program.
    Halt,
    /// Record a program's completion value. `[value] -> []`
    StoreResult,
}

impl OpCode {
    /// Whether the single operand is a relative branch offset.
    pub fn is_branch(self) -> bool {
        matches!(self, OpCode::Branch | OpCode::BranchTrue | OpCode::BranchFalse)
    }

    /// Number of operands the instruction carries.
    pub fn operand_count(self) -> usize {
        use OpCode::*;
        match self {
            NewRegExp => 2,
            LoadNumber | LoadString | Fetch | Resolve | DeclareLocal | NewClosure | Call | New
            | Branch | BranchTrue | BranchFalse | BeginCatch => 1,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        use OpCode::*;
        match self {
            LoadUndefined => "LoadUndefined",
            LoadNull => "LoadNull",
            LoadTrue => "LoadTrue",
            LoadFalse => "LoadFalse",
            LoadNumber => "LoadNumber",
            LoadString => "LoadString",
            LoadThis => "LoadThis",
            LoadCallee => "LoadCallee",
            NewRegExp => "NewRegExp",
            Duplicate => "Duplicate",
            Pop => "Pop",
            Fetch => "Fetch",
            Resolve => "Resolve",
            DeclareLocal => "DeclareLocal",
            FetchField => "FetchField",
            MakeReference => "MakeReference",
            Assign => "Assign",
            NewObject => "NewObject",
            NewArray => "NewArray",
            NewClosure => "NewClosure",
            Add => "Add",
            Subtract => "Subtract",
            Multiply => "Multiply",
            Divide => "Divide",
            Modulo => "Modulo",
            UnaryPlus => "UnaryPlus",
            UnaryMinus => "UnaryMinus",
            BitNot => "BitNot",
            Not => "Not",
            BitAnd => "BitAnd",
            BitOr => "BitOr",
            BitXor => "BitXor",
            LeftShift => "LeftShift",
            RightShift => "RightShift",
            URightShift => "URightShift",
            Equal => "Equal",
            NotEqual => "NotEqual",
            StrictEqual => "StrictEqual",
            StrictNotEqual => "StrictNotEqual",
            LessThan => "LessThan",
            LessOrEqual => "LessOrEqual",
            GreaterThan => "GreaterThan",
            GreaterOrEqual => "GreaterOrEqual",
            InstanceOf => "InstanceOf",
            In => "In",
            InplaceAdd => "InplaceAdd",
            InplaceSubtract => "InplaceSubtract",
            InplaceMultiply => "InplaceMultiply",
            InplaceDivide => "InplaceDivide",
            InplaceModulo => "InplaceModulo",
            InplaceLeftShift => "InplaceLeftShift",
            InplaceRightShift => "InplaceRightShift",
            InplaceURightShift => "InplaceURightShift",
            InplaceBitAnd => "InplaceBitAnd",
            InplaceBitOr => "InplaceBitOr",
            InplaceBitXor => "InplaceBitXor",
            PreIncrement => "PreIncrement",
            PreDecrement => "PreDecrement",
            PostIncrement => "PostIncrement",
            PostDecrement => "PostDecrement",
            Delete => "Delete",
            TypeOf => "TypeOf",
            Call => "Call",
            New => "New",
            Branch => "Branch",
            BranchTrue => "BranchTrue",
            BranchFalse => "BranchFalse",
            NewEnumeration => "NewEnumeration",
            ToFirstElement => "ToFirstElement",
            HasNextElement => "HasNextElement",
            NextElement => "NextElement",
            NextValue => "NextValue",
            EnterWith => "EnterWith",
            LeaveWith => "LeaveWith",
            BeginCatch => "BeginCatch",
            EndCatch => "EndCatch",
            Throw => "Throw",
            BeginFinally => "BeginFinally",
            EndFinally => "EndFinally",
            Ret => "Ret",
            Halt => "Halt",
            StoreResult => "StoreResult",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
