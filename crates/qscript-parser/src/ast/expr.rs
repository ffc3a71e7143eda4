//! Expression nodes.
//!
//! Every node is `Copy` and borrows its children from the arena. Grouping
//! parentheses leave no node behind; `(a)` parses to the same tree as `a`.

use crate::ast::{AssignOp, BinaryOp, UnaryOp, UpdateOp};
use crate::ast::stmt::Stmt;
use qscript_core::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    RegExp(RegExpExpr<'ast>),
    Ident(Ident<'ast>),
    This(Span),
    Array(&'ast ArrayExpr<'ast>),
    Object(&'ast ObjectExpr<'ast>),
    Function(&'ast Function<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    /// Prefix or postfix `++`/`--`.
    Update(&'ast UpdateExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Conditional(&'ast ConditionalExpr<'ast>),
    /// `object.property`
    Member(&'ast MemberExpr<'ast>),
    /// `object[index]`
    Index(&'ast IndexExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    /// `left, right`
    Comma(&'ast CommaExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::RegExp(e) => e.span,
            Expr::Ident(e) => e.span,
            Expr::This(span) => *span,
            Expr::Array(e) => e.span,
            Expr::Object(e) => e.span,
            Expr::Function(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Update(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Comma(e) => e.span,
        }
    }

    /// Whether this expression denotes a storage location.
    pub fn is_reference(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Member(_) | Expr::Index(_))
    }
}

/// A name together with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Number(f64),
    /// Escape sequences already decoded.
    String(&'ast str),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegExpExpr<'ast> {
    pub pattern: &'ast str,
    pub flags: &'ast str,
    pub span: Span,
}

/// `[a, , b]`; elided slots are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayExpr<'ast> {
    pub elements: &'ast [Option<Expr<'ast>>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectExpr<'ast> {
    pub properties: &'ast [Property<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'ast> {
    pub key: PropertyKey<'ast>,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKey<'ast> {
    /// Bare identifier or keyword: `{ name: 1 }`
    Ident(&'ast str),
    String(&'ast str),
    Number(f64),
}

/// A function literal, used for declarations and expressions alike.
///
/// Declarations always carry a name; for expressions the name is optional
/// and, when present, is bound inside the function itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Function<'ast> {
    pub name: Option<Ident<'ast>>,
    pub params: &'ast [Ident<'ast>],
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateExpr<'ast> {
    pub op: UpdateOp,
    pub prefix: bool,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub op: AssignOp,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalExpr<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub property: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// `new F(args)`; `new F` without parentheses has no arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommaExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}
