//! Declaration pre-pass.
//!
//! Collects every `var` name and function declaration of one function body,
//! in first-occurrence order, without looking inside nested functions.

use qscript_parser::ast::visitor::{Visitor, walk_stmt};
use qscript_parser::ast::{Expr, Function, Stmt, VarDeclarator};
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub(crate) struct Declarations<'ast> {
    /// Declared names, deduplicated, in source order.
    pub names: Vec<&'ast str>,
    /// Function declarations in source order, duplicates included.
    pub functions: Vec<&'ast Function<'ast>>,
}

pub(crate) fn collect<'ast>(body: &'ast [Stmt<'ast>]) -> Declarations<'ast> {
    let mut collector = Collector::default();
    for stmt in body {
        collector.visit_stmt(stmt);
    }
    collector.decls
}

#[derive(Default)]
struct Collector<'ast> {
    seen: FxHashSet<&'ast str>,
    decls: Declarations<'ast>,
}

impl<'ast> Collector<'ast> {
    fn declare(&mut self, name: &'ast str) {
        if self.seen.insert(name) {
            self.decls.names.push(name);
        }
    }
}

impl<'ast> Visitor<'ast> for Collector<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        match stmt {
            Stmt::Function(func) => {
                if let Some(name) = func.name {
                    self.declare(name.name);
                }
                self.decls.functions.push(func);
            }
            _ => walk_stmt(self, stmt),
        }
    }

    // Expressions declare nothing; function expressions open their own scope.
    fn visit_expr(&mut self, _expr: &'ast Expr<'ast>) {}

    fn visit_function(&mut self, _func: &'ast Function<'ast>) {}

    fn visit_var_declarator(&mut self, decl: &'ast VarDeclarator<'ast>) {
        self.declare(decl.name.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use qscript_parser::Parser;

    fn names_in(source: &str) -> (Vec<String>, Vec<String>) {
        let arena = Bump::new();
        let program = Parser::parse_program(source, &arena).unwrap();
        let decls = collect(program.body);
        (
            decls.names.iter().map(|s| s.to_string()).collect(),
            decls
                .functions
                .iter()
                .filter_map(|f| f.name.map(|n| n.name.to_string()))
                .collect(),
        )
    }

    #[test]
    fn first_occurrence_order() {
        let (names, funcs) = names_in("var b; function a() {} var c, b; for (var d in o) {}");
        assert_eq!(names, vec!["b", "a", "c", "d"]);
        assert_eq!(funcs, vec!["a"]);
    }

    #[test]
    fn nested_blocks_are_searched() {
        let (names, funcs) = names_in(
            "if (x) { var a = 1; } else { while (y) { var b; } }
             try { var c; } catch (e) { var d; } finally { function f() {} }
             switch (z) { case 1: var e; }
             lbl: for (var i = 0;;) { break lbl; }",
        );
        assert_eq!(names, vec!["a", "b", "c", "d", "f", "e", "i"]);
        assert_eq!(funcs, vec!["f"]);
    }

    #[test]
    fn nested_functions_are_opaque() {
        let (names, funcs) = names_in(
            "function outer() { var inner; function deep() {} }
             var g = function () { var hidden; };",
        );
        assert_eq!(names, vec!["outer", "g"]);
        assert_eq!(funcs, vec!["outer"]);
    }

    #[test]
    fn catch_parameter_is_not_declared() {
        let (names, _) = names_in("try {} catch (e) {}");
        assert!(names.is_empty());
    }
}
