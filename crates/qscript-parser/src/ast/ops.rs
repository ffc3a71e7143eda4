//! Operator enums and their binding powers.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, including the short-circuiting logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical
    LogicalOr,
    LogicalAnd,

    // Bitwise
    BitOr,
    BitXor,
    BitAnd,

    // Equality
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,

    // Relational
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    InstanceOf,
    In,

    // Shift
    LeftShift,
    RightShift,
    URightShift,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// `(left, right)` binding power; all binary operators associate left.
    pub fn binding_power(self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (1, 2),
            LogicalAnd => (3, 4),
            BitOr => (5, 6),
            BitXor => (7, 8),
            BitAnd => (9, 10),
            Equal | NotEqual | StrictEqual | StrictNotEqual => (11, 12),
            Less | LessEqual | Greater | GreaterEqual | InstanceOf | In => (13, 14),
            LeftShift | RightShift | URightShift => (15, 16),
            Add | Sub => (17, 18),
            Mul | Div | Mod => (19, 20),
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            Pipe => BinaryOp::BitOr,
            Caret => BinaryOp::BitXor,
            Amp => BinaryOp::BitAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            EqualEqualEqual => BinaryOp::StrictEqual,
            BangEqualEqual => BinaryOp::StrictNotEqual,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::InstanceOf => BinaryOp::InstanceOf,
            TokenKind::In => BinaryOp::In,
            LessLess => BinaryOp::LeftShift,
            GreaterGreater => BinaryOp::RightShift,
            GreaterGreaterGreater => BinaryOp::URightShift,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogicalOr | BinaryOp::LogicalAnd)
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            InstanceOf => "instanceof",
            In => "in",
            LeftShift => "<<",
            RightShift => ">>",
            URightShift => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators other than `++`/`--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::TypeOf => UnaryOp::TypeOf,
            TokenKind::Void => UnaryOp::Void,
            TokenKind::Delete => UnaryOp::Delete,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

/// `=` and the compound assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LeftShift,
    RightShift,
    URightShift,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            Equal => AssignOp::Assign,
            PlusEqual => AssignOp::Add,
            MinusEqual => AssignOp::Sub,
            StarEqual => AssignOp::Mul,
            SlashEqual => AssignOp::Div,
            PercentEqual => AssignOp::Mod,
            LessLessEqual => AssignOp::LeftShift,
            GreaterGreaterEqual => AssignOp::RightShift,
            GreaterGreaterGreaterEqual => AssignOp::URightShift,
            AmpEqual => AssignOp::BitAnd,
            PipeEqual => AssignOp::BitOr,
            CaretEqual => AssignOp::BitXor,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        use AssignOp::*;
        match self {
            Assign => "=",
            Add => "+=",
            Sub => "-=",
            Mul => "*=",
            Div => "/=",
            Mod => "%=",
            LeftShift => "<<=",
            RightShift => ">>=",
            URightShift => ">>>=",
            BitAnd => "&=",
            BitOr => "|=",
            BitXor => "^=",
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
