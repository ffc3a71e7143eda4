//! Statement nodes.

use crate::ast::expr::{Expr, Function, Ident};
use qscript_core::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    Expr(ExprStmt<'ast>),
    Var(VarStmt<'ast>),
    /// `function name(...) { ... }` in statement position
    Function(&'ast Function<'ast>),
    Empty(Span),
    Block(BlockStmt<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    /// `for (x in o)` and `for each (x in o)`
    ForIn(&'ast ForInStmt<'ast>),
    Continue(JumpStmt<'ast>),
    Break(JumpStmt<'ast>),
    Return(ReturnStmt<'ast>),
    With(&'ast WithStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
    Labelled(&'ast LabelledStmt<'ast>),
    Throw(ThrowStmt<'ast>),
    Try(&'ast TryStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(s) => s.span,
            Stmt::Var(s) => s.span,
            Stmt::Function(f) => f.span,
            Stmt::Empty(span) => *span,
            Stmt::Block(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForIn(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::With(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Labelled(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Try(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarStmt<'ast> {
    pub declarators: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    pub name: Ident<'ast>,
    pub init: Option<Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStmt<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: Expr<'ast>,
    pub then_stmt: Stmt<'ast>,
    pub else_stmt: Option<Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    pub body: Stmt<'ast>,
    pub condition: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    pub init: Option<ForInit<'ast>>,
    pub condition: Option<Expr<'ast>>,
    pub update: Option<Expr<'ast>>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForInit<'ast> {
    Var(VarStmt<'ast>),
    Expr(Expr<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForInStmt<'ast> {
    /// `for each`: the loop variable receives values instead of keys.
    pub each: bool,
    pub target: ForInTarget<'ast>,
    pub object: Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForInTarget<'ast> {
    /// `for (var x = init in o)`; the initializer runs once before enumeration.
    Var(VarDeclarator<'ast>),
    Expr(Expr<'ast>),
}

/// `break` / `continue` with an optional label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpStmt<'ast> {
    pub label: Option<Ident<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithStmt<'ast> {
    pub object: Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    pub discriminant: Expr<'ast>,
    /// Clauses in source order; at most one has no test (the default).
    pub clauses: &'ast [SwitchClause<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchClause<'ast> {
    /// `None` for `default:`
    pub test: Option<Expr<'ast>>,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl SwitchClause<'_> {
    pub fn is_default(&self) -> bool {
        self.test.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelledStmt<'ast> {
    pub label: Ident<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub value: Expr<'ast>,
    pub span: Span,
}

/// `try` with a `catch`, a `finally`, or both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    pub block: BlockStmt<'ast>,
    pub handler: Option<CatchClause<'ast>>,
    pub finalizer: Option<BlockStmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchClause<'ast> {
    pub param: Ident<'ast>,
    pub body: BlockStmt<'ast>,
    pub span: Span,
}
