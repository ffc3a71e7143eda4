//! Human-readable listing of a compilation unit.

use std::fmt::Write;

use qscript_core::{Name, NameTable};

use super::{CompilationUnit, Instruction, Operand};

/// Render `unit`, its handler table and every nested function.
///
/// ```text
/// 0000    1  Fetch x
/// 0001    1  BranchFalse +3 (-> 0004)
/// ```
pub fn disassemble(unit: &CompilationUnit, names: &NameTable) -> String {
    let mut out = String::new();
    write_unit(&mut out, unit, names, 0);
    out
}

fn write_unit(out: &mut String, unit: &CompilationUnit, names: &NameTable, indent: usize) {
    let pad = "  ".repeat(indent);

    if let Some(error) = unit.error() {
        let _ = writeln!(out, "{pad}<invalid: {error}>");
        return;
    }

    for (ip, inst) in unit.instructions().iter().enumerate() {
        let line = unit.line_at(ip).unwrap_or(0);
        let _ = write!(out, "{pad}{ip:04} {line:4}  {}", inst.op.name());
        write_operands(out, inst, ip, names);
        out.push('\n');
    }

    if !unit.handlers().is_empty() {
        let _ = writeln!(out, "{pad}handlers:");
        for handler in unit.handlers().iter() {
            let _ = writeln!(out, "{pad}  {handler}");
        }
    }

    for (index, template) in unit.functions().iter().enumerate() {
        let name = template.name.map(|n| text_of(names, n)).unwrap_or("<anonymous>");
        let formals: Vec<_> = template.formals().iter().map(|&n| text_of(names, n)).collect();
        let _ = writeln!(out, "{pad}function #{index} {name}({})", formals.join(", "));
        write_unit(out, &template.unit, names, indent + 1);
    }
}

/// Names from a table other than the one the unit was compiled against
/// show as `<?>`.
fn text_of(names: &NameTable, name: Name) -> &str {
    names.try_resolve(name).unwrap_or("<?>")
}

fn write_operands(out: &mut String, inst: &Instruction, ip: usize, names: &NameTable) {
    for operand in inst.operands.iter().take(inst.op.operand_count()) {
        match *operand {
            Operand::None => {}
            Operand::Number(n) => {
                let _ = write!(out, " {}", n.into_inner());
            }
            Operand::Name(name) => {
                match names.try_resolve(name) {
                    Some(text) => {
                        let _ = write!(out, " {text:?}");
                    }
                    None => out.push_str(" <?>"),
                }
            }
            Operand::Offset(offset) => {
                let _ = write!(out, " {offset:+}");
                if let Some(target) = inst.branch_target(ip) {
                    let _ = write!(out, " (-> {target:04})");
                }
            }
            Operand::Count(count) => {
                let _ = write!(out, " {count}");
            }
            Operand::Function(id) => {
                let _ = write!(out, " {id}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{ExceptionTable, OpCode};

    #[test]
    fn lists_operands_and_targets() {
        let mut names = NameTable::new();
        let x = names.intern("x");
        let instructions = vec![
            Instruction::with_operand(OpCode::Fetch, Operand::Name(x)),
            Instruction::with_operand(OpCode::BranchFalse, Operand::Offset(2)),
            Instruction::with_operand(OpCode::LoadNumber, Operand::number(1.5)),
            Instruction::new(OpCode::Halt),
        ];
        let unit = CompilationUnit::new(instructions, vec![1, 1, 2, 2], ExceptionTable::new(), vec![], vec![]);

        let text = disassemble(&unit, &names);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Fetch \"x\""));
        assert!(lines[1].contains("BranchFalse +2 (-> 0003)"));
        assert!(lines[2].contains("LoadNumber 1.5"));
        assert!(lines[3].ends_with("Halt"));
    }

    #[test]
    fn unknown_names_render_as_placeholder() {
        let mut names = NameTable::new();
        let local = names.intern("local");
        let instructions = vec![
            Instruction::with_operand(OpCode::Fetch, Operand::Name(local)),
            Instruction::new(OpCode::Halt),
        ];
        let unit = CompilationUnit::new(instructions, vec![1, 1], ExceptionTable::new(), vec![], vec![]);

        let text = disassemble(&unit, &NameTable::new());
        assert!(text.lines().next().is_some_and(|line| line.ends_with("Fetch <?>")), "{text}");
    }

    #[test]
    fn invalid_units_show_the_error() {
        let names = NameTable::new();
        let error = qscript_core::CompilationError::ContinueOutsideLoop {
            span: qscript_core::Span::new(2, 1, 8),
        };
        let unit = CompilationUnit::invalid(error, vec![]);
        assert!(disassemble(&unit, &names).contains("<invalid: at 2:1"));
    }
}
