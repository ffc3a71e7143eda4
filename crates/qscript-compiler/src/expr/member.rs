//! Property access.

use qscript_parser::ast::{IndexExpr, MemberExpr};

use super::ExprMode;
use crate::bytecode::OpCode;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// `o.p` is `o["p"]` with the key known up front.
    pub(super) fn compile_member(&mut self, member: &'ast MemberExpr<'ast>, mode: ExprMode) -> Result<()> {
        self.compile_expr(member.object, ExprMode::Value)?;
        let key = self.intern(member.property.name);
        self.emitter.emit_name(OpCode::LoadString, key);
        self.emit_access(mode);
        Ok(())
    }

    pub(super) fn compile_index(&mut self, index: &'ast IndexExpr<'ast>, mode: ExprMode) -> Result<()> {
        self.compile_expr(index.object, ExprMode::Value)?;
        self.compile_expr(index.index, ExprMode::Value)?;
        self.emit_access(mode);
        Ok(())
    }

    fn emit_access(&mut self, mode: ExprMode) {
        let op = match mode {
            ExprMode::Value => OpCode::FetchField,
            ExprMode::Reference => OpCode::MakeReference,
        };
        self.emitter.emit(op);
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::test_support::compile;

    #[test]
    fn member_value() {
        let (unit, names) = compile("o.p;");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            OpCode::LoadString,
            OpCode::FetchField,
            OpCode::StoreResult,
            OpCode::Halt,
        ]);
        assert_eq!(unit.instructions()[1].operand().as_name(), names.get("p"));
    }

    #[test]
    fn member_reference() {
        let (unit, _) = compile("o.p = 1;");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            OpCode::LoadString,
            OpCode::MakeReference,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::StoreResult,
            OpCode::Halt,
        ]);
    }

    #[test]
    fn nested_access_only_references_the_outermost() {
        let (unit, _) = compile("a.b[c] = 1;");
        unit.assert_opcodes(&[
            OpCode::Fetch,
            OpCode::LoadString,
            OpCode::FetchField,
            OpCode::Fetch,
            OpCode::MakeReference,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::StoreResult,
            OpCode::Halt,
        ]);
    }

    #[test]
    fn keyword_property_name() {
        let (unit, names) = compile("o.default;");
        assert_eq!(unit.instructions()[1].operand().as_name(), names.get("default"));
    }
}
