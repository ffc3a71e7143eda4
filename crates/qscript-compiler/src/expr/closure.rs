//! Function expressions.

use qscript_parser::ast::Function;

use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// The body is compiled right away into this unit's function table;
    /// the expression itself is a single `NewClosure`.
    pub(super) fn compile_function_expr(&mut self, func: &'ast Function<'ast>) -> Result<()> {
        let id = self.compile_nested(func, true)?;
        self.emitter.emit_closure(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{FunctionFlags, FunctionId, OpCode, Operand};
    use crate::test_support::compile;

    #[test]
    fn anonymous_function_expression() {
        let (unit, names) = compile("var f = function (a, b) { return a; };");
        unit.assert_opcodes(&[
            OpCode::DeclareLocal,
            OpCode::Resolve,
            OpCode::NewClosure,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Halt,
        ]);
        assert_eq!(unit.instructions()[2].operand(), Operand::Function(FunctionId(0)));

        let template = unit.function(FunctionId(0)).unwrap();
        assert_eq!(template.name, None);
        assert_eq!(template.flags, FunctionFlags::EXPRESSION);
        assert_eq!(template.formals(), &[names.get("a").unwrap(), names.get("b").unwrap()]);
        template.unit.assert_opcodes(&[OpCode::Fetch, OpCode::Ret, OpCode::LoadUndefined, OpCode::Ret]);
    }

    #[test]
    fn named_function_expression_binds_itself() {
        let (unit, names) = compile("(function fact(n) { return fact; });");
        let template = &unit.functions()[0];
        assert_eq!(template.name, names.get("fact"));
        assert!(template.flags.contains(FunctionFlags::EXPRESSION | FunctionFlags::SELF_BINDING));
        template.unit.assert_opcodes(&[
            OpCode::DeclareLocal,
            OpCode::Resolve,
            OpCode::LoadCallee,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Fetch,
            OpCode::Ret,
            OpCode::LoadUndefined,
            OpCode::Ret,
        ]);
    }

    #[test]
    fn self_binding_skipped_when_name_is_a_parameter() {
        let (unit, _) = compile("(function f(f) { return f; });");
        let template = &unit.functions()[0];
        assert!(!template.flags.contains(FunctionFlags::SELF_BINDING));
        template.unit.assert_opcodes(&[OpCode::Fetch, OpCode::Ret, OpCode::LoadUndefined, OpCode::Ret]);
    }

    #[test]
    fn function_table_in_source_order() {
        let (unit, _) = compile("a = function () {}; b = function () { return function () {}; };");
        assert_eq!(unit.functions().len(), 2);
        assert_eq!(unit.functions()[0].unit.functions().len(), 0);
        assert_eq!(unit.functions()[1].unit.functions().len(), 1);
    }

    #[test]
    fn declarations_are_not_expressions() {
        let (unit, names) = compile("function g() {}");
        unit.assert_opcodes(&[
            OpCode::DeclareLocal,
            OpCode::Resolve,
            OpCode::NewClosure,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Halt,
        ]);
        let template = &unit.functions()[0];
        assert_eq!(template.name, names.get("g"));
        assert!(template.flags.is_empty());
    }
}
