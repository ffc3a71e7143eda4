//! Read-only AST traversal.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children. Override a method to intercept a node kind and
//! call the `walk_*` function yourself to keep descending.
//!
//! Nodes are handed out with the arena lifetime, so a visitor may keep
//! references to them after the walk.
//!
//! ```
//! use bumpalo::Bump;
//! use qscript_parser::ast::visitor::{Visitor, walk_expr};
//! use qscript_parser::ast::Expr;
//! use qscript_parser::Parser;
//!
//! struct CallCounter(usize);
//!
//! impl<'ast> Visitor<'ast> for CallCounter {
//!     fn visit_expr(&mut self, expr: &'ast Expr<'ast>) {
//!         if matches!(expr, Expr::Call(_)) {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//!
//! let arena = Bump::new();
//! let program = Parser::parse_program("f(g(1)); h();", &arena).unwrap();
//! let mut counter = CallCounter(0);
//! counter.visit_program(&program);
//! assert_eq!(counter.0, 3);
//! ```

use crate::ast::Program;
use crate::ast::expr::*;
use crate::ast::stmt::*;

pub trait Visitor<'ast>: Sized {
    fn visit_program(&mut self, program: &Program<'ast>) {
        for stmt in program.body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr<'ast>) {
        walk_expr(self, expr);
    }

    /// Called for function declarations and function expressions.
    fn visit_function(&mut self, func: &'ast Function<'ast>) {
        walk_function(self, func);
    }

    /// Called for every `var` declarator, including `for (var x in o)`.
    fn visit_var_declarator(&mut self, decl: &'ast VarDeclarator<'ast>) {
        if let Some(init) = &decl.init {
            self.visit_expr(init);
        }
    }
}

pub fn walk_function<'ast, V: Visitor<'ast>>(visitor: &mut V, func: &'ast Function<'ast>) {
    for stmt in func.body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Stmt<'ast>) {
    match stmt {
        Stmt::Expr(s) => visitor.visit_expr(&s.expr),
        Stmt::Var(s) => {
            for decl in s.declarators {
                visitor.visit_var_declarator(decl);
            }
        }
        Stmt::Function(func) => visitor.visit_function(func),
        Stmt::Empty(_) | Stmt::Continue(_) | Stmt::Break(_) => {}
        Stmt::Block(block) => {
            for stmt in block.stmts {
                visitor.visit_stmt(stmt);
            }
        }
        Stmt::If(s) => {
            visitor.visit_expr(&s.condition);
            visitor.visit_stmt(&s.then_stmt);
            if let Some(else_stmt) = &s.else_stmt {
                visitor.visit_stmt(else_stmt);
            }
        }
        Stmt::While(s) => {
            visitor.visit_expr(&s.condition);
            visitor.visit_stmt(&s.body);
        }
        Stmt::DoWhile(s) => {
            visitor.visit_stmt(&s.body);
            visitor.visit_expr(&s.condition);
        }
        Stmt::For(s) => {
            match &s.init {
                Some(ForInit::Var(var)) => {
                    for decl in var.declarators {
                        visitor.visit_var_declarator(decl);
                    }
                }
                Some(ForInit::Expr(expr)) => visitor.visit_expr(expr),
                None => {}
            }
            if let Some(condition) = &s.condition {
                visitor.visit_expr(condition);
            }
            if let Some(update) = &s.update {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(&s.body);
        }
        Stmt::ForIn(s) => {
            match &s.target {
                ForInTarget::Var(decl) => visitor.visit_var_declarator(decl),
                ForInTarget::Expr(expr) => visitor.visit_expr(expr),
            }
            visitor.visit_expr(&s.object);
            visitor.visit_stmt(&s.body);
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::With(s) => {
            visitor.visit_expr(&s.object);
            visitor.visit_stmt(&s.body);
        }
        Stmt::Switch(s) => {
            visitor.visit_expr(&s.discriminant);
            for clause in s.clauses {
                if let Some(test) = &clause.test {
                    visitor.visit_expr(test);
                }
                for stmt in clause.body {
                    visitor.visit_stmt(stmt);
                }
            }
        }
        Stmt::Labelled(s) => visitor.visit_stmt(&s.body),
        Stmt::Throw(s) => visitor.visit_expr(&s.value),
        Stmt::Try(s) => {
            for stmt in s.block.stmts {
                visitor.visit_stmt(stmt);
            }
            if let Some(handler) = &s.handler {
                for stmt in handler.body.stmts {
                    visitor.visit_stmt(stmt);
                }
            }
            if let Some(finalizer) = &s.finalizer {
                for stmt in finalizer.stmts {
                    visitor.visit_stmt(stmt);
                }
            }
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expr<'ast>) {
    match expr {
        Expr::Literal(_) | Expr::RegExp(_) | Expr::Ident(_) | Expr::This(_) => {}
        Expr::Array(array) => {
            for element in array.elements.iter().flatten() {
                visitor.visit_expr(element);
            }
        }
        Expr::Object(object) => {
            for property in object.properties {
                visitor.visit_expr(&property.value);
            }
        }
        Expr::Function(func) => visitor.visit_function(func),
        Expr::Unary(e) => visitor.visit_expr(e.operand),
        Expr::Update(e) => visitor.visit_expr(e.operand),
        Expr::Binary(e) => {
            visitor.visit_expr(e.left);
            visitor.visit_expr(e.right);
        }
        Expr::Assign(e) => {
            visitor.visit_expr(e.target);
            visitor.visit_expr(e.value);
        }
        Expr::Conditional(e) => {
            visitor.visit_expr(e.condition);
            visitor.visit_expr(e.then_expr);
            visitor.visit_expr(e.else_expr);
        }
        Expr::Member(e) => visitor.visit_expr(e.object),
        Expr::Index(e) => {
            visitor.visit_expr(e.object);
            visitor.visit_expr(e.index);
        }
        Expr::Call(e) => {
            visitor.visit_expr(e.callee);
            for arg in e.args {
                visitor.visit_expr(arg);
            }
        }
        Expr::New(e) => {
            visitor.visit_expr(e.callee);
            for arg in e.args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Comma(e) => {
            visitor.visit_expr(e.left);
            visitor.visit_expr(e.right);
        }
    }
}
