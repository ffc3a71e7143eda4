//! Literal compilation: primitives, regular expressions, arrays and objects.

use qscript_parser::ast::{ArrayExpr, LiteralExpr, LiteralKind, ObjectExpr, PropertyKey, RegExpExpr};

use super::ExprMode;
use crate::bytecode::{OpCode, Operand};
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    pub(super) fn compile_literal(&mut self, lit: &LiteralExpr<'ast>) {
        match lit.kind {
            LiteralKind::Number(value) => {
                self.emitter.emit_number(value);
            }
            LiteralKind::String(text) => {
                let name = self.intern(text);
                self.emitter.emit_name(OpCode::LoadString, name);
            }
            LiteralKind::Boolean(true) => {
                self.emitter.emit(OpCode::LoadTrue);
            }
            LiteralKind::Boolean(false) => {
                self.emitter.emit(OpCode::LoadFalse);
            }
            LiteralKind::Null => {
                self.emitter.emit(OpCode::LoadNull);
            }
        }
    }

    pub(super) fn compile_regexp(&mut self, re: &RegExpExpr<'ast>) {
        let pattern = self.intern(re.pattern);
        let flags = self.intern(re.flags);
        self.emitter.emit_with2(OpCode::NewRegExp, Operand::Name(pattern), Operand::Name(flags));
    }

    /// Bytecode layout, per element `i`:
    /// ```text
    /// NewArray
    /// Duplicate
    /// LoadNumber i
    /// MakeReference
    /// [element]               ; LoadUndefined for an elided slot
    /// Assign
    /// Pop
    /// ```
    pub(super) fn compile_array(&mut self, array: &'ast ArrayExpr<'ast>) -> Result<()> {
        self.emitter.emit(OpCode::NewArray);
        for (index, element) in array.elements.iter().enumerate() {
            self.emitter.emit(OpCode::Duplicate);
            self.emitter.emit_number(index as f64);
            self.emitter.emit(OpCode::MakeReference);
            match element {
                Some(value) => self.compile_expr(value, ExprMode::Value)?,
                None => {
                    self.emitter.emit(OpCode::LoadUndefined);
                }
            }
            self.emitter.emit(OpCode::Assign);
            self.emitter.emit(OpCode::Pop);
        }
        Ok(())
    }

    /// Same shape as arrays, keyed by the property name.
    pub(super) fn compile_object(&mut self, object: &'ast ObjectExpr<'ast>) -> Result<()> {
        self.emitter.emit(OpCode::NewObject);
        for property in object.properties {
            self.emitter.emit(OpCode::Duplicate);
            match property.key {
                PropertyKey::Ident(text) | PropertyKey::String(text) => {
                    let name = self.intern(text);
                    self.emitter.emit_name(OpCode::LoadString, name);
                }
                PropertyKey::Number(value) => {
                    self.emitter.emit_number(value);
                }
            }
            self.emitter.emit(OpCode::MakeReference);
            self.compile_expr(&property.value, ExprMode::Value)?;
            self.emitter.emit(OpCode::Assign);
            self.emitter.emit(OpCode::Pop);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{OpCode, Operand};
    use crate::test_support::compile;
    use qscript_core::Name;

    #[test]
    fn primitives() {
        let (unit, names) = compile("1.5; 'hi'; true; false; null;");
        let ops: Vec<_> = unit.opcodes().into_iter().filter(|op| *op != OpCode::StoreResult).collect();
        assert_eq!(
            ops,
            vec![
                OpCode::LoadNumber,
                OpCode::LoadString,
                OpCode::LoadTrue,
                OpCode::LoadFalse,
                OpCode::LoadNull,
                OpCode::Halt,
            ]
        );
        assert_eq!(unit.instructions()[0].operand(), Operand::number(1.5));
        assert_eq!(unit.instructions()[2].operand(), Operand::Name(names.get("hi").unwrap()));
    }

    #[test]
    fn regexp_carries_pattern_and_flags() {
        let (unit, names) = compile("/a+b/gi;");
        let inst = unit.instructions()[0];
        assert_eq!(inst.op, OpCode::NewRegExp);
        assert_eq!(inst.operands[0], Operand::Name(names.get("a+b").unwrap()));
        assert_eq!(inst.operands[1], Operand::Name(names.get("gi").unwrap()));

        let (unit, _) = compile("/x/;");
        assert_eq!(unit.instructions()[0].operands[1], Operand::Name(Name::EMPTY));
    }

    #[test]
    fn array_literal() {
        let (unit, _) = compile("[1, , 3];");
        unit.assert_opcodes(&[
            OpCode::NewArray,
            OpCode::Duplicate,
            OpCode::LoadNumber,
            OpCode::MakeReference,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Duplicate,
            OpCode::LoadNumber,
            OpCode::MakeReference,
            OpCode::LoadUndefined,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::Duplicate,
            OpCode::LoadNumber,
            OpCode::MakeReference,
            OpCode::LoadNumber,
            OpCode::Assign,
            OpCode::Pop,
            OpCode::StoreResult,
            OpCode::Halt,
        ]);
        // Slot indices.
        assert_eq!(unit.instructions()[2].operand(), Operand::number(0.0));
        assert_eq!(unit.instructions()[8].operand(), Operand::number(1.0));
        assert_eq!(unit.instructions()[14].operand(), Operand::number(2.0));
    }

    #[test]
    fn empty_array_and_object() {
        let (unit, _) = compile("[]; ({});");
        unit.assert_opcodes(&[
            OpCode::NewArray,
            OpCode::StoreResult,
            OpCode::NewObject,
            OpCode::StoreResult,
            OpCode::Halt,
        ]);
    }

    #[test]
    fn object_literal_keys() {
        let (unit, names) = compile("({ a: 1, 'b c': 2, 3: x });");
        let keys: Vec<_> = unit
            .instructions()
            .windows(2)
            .filter(|w| w[1].op == OpCode::MakeReference)
            .map(|w| w[0].operand())
            .collect();
        assert_eq!(
            keys,
            vec![
                Operand::Name(names.get("a").unwrap()),
                Operand::Name(names.get("b c").unwrap()),
                Operand::number(3.0),
            ]
        );
        assert_eq!(unit.count_opcode(OpCode::Assign), 3);
    }
}
