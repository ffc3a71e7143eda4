//! Token definitions.

use qscript_core::Span;
use std::fmt;

/// A token with its raw source text.
///
/// `lexeme` is copied into the arena, so tokens outlive the source string.
/// `newline_before` records whether a line terminator separated this token
/// from the previous one; the parser needs it for automatic semicolon
/// insertion and the restricted productions (`return`, `break`, `continue`,
/// `throw`, postfix `++`/`--`).
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
    pub newline_before: bool,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            lexeme,
            span,
            newline_before,
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`, `3.5e2`, `0xff`
    Number,
    /// `"text"` or `'text'`, escapes still in place
    String,
    /// `/pattern/flags`
    RegExp,
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Break,
    Case,
    Catch,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    False,
    Finally,
    For,
    Function,
    If,
    In,
    InstanceOf,
    New,
    Null,
    Return,
    Switch,
    This,
    Throw,
    True,
    Try,
    TypeOf,
    Var,
    Void,
    While,
    With,
    /// Words reserved for future use (`class`, `const`, `enum`, ...).
    Reserved,

    // =========================================
    // Punctuation
    // =========================================
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    Question,
    Colon,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,
    Amp,
    Pipe,
    Caret,
    Bang,
    Tilde,
    AmpAmp,
    PipePipe,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    EqualEqualEqual,
    BangEqualEqual,

    // Assignment
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,

    // =========================================
    // Special
    // =========================================
    Eof,
    /// A lexical error; the error itself is recorded by the lexer.
    Error,
}

impl TokenKind {
    /// Whether a `/` after this token starts a division rather than a
    /// regular expression literal.
    pub fn ends_operand(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Number
                | String
                | RegExp
                | Identifier
                | This
                | True
                | False
                | Null
                | RightParen
                | RightBracket
                | PlusPlus
                | MinusMinus
        )
    }

    /// Keywords that may appear as property names after `.` or in object literals.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Break
                | Case
                | Catch
                | Continue
                | Default
                | Delete
                | Do
                | Else
                | False
                | Finally
                | For
                | Function
                | If
                | In
                | InstanceOf
                | New
                | Null
                | Return
                | Switch
                | This
                | Throw
                | True
                | Try
                | TypeOf
                | Var
                | Void
                | While
                | With
                | Reserved
        )
    }

    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            String => "string",
            RegExp => "regular expression",
            Identifier => "identifier",
            Break => "'break'",
            Case => "'case'",
            Catch => "'catch'",
            Continue => "'continue'",
            Default => "'default'",
            Delete => "'delete'",
            Do => "'do'",
            Else => "'else'",
            False => "'false'",
            Finally => "'finally'",
            For => "'for'",
            Function => "'function'",
            If => "'if'",
            In => "'in'",
            InstanceOf => "'instanceof'",
            New => "'new'",
            Null => "'null'",
            Return => "'return'",
            Switch => "'switch'",
            This => "'this'",
            Throw => "'throw'",
            True => "'true'",
            Try => "'try'",
            TypeOf => "'typeof'",
            Var => "'var'",
            Void => "'void'",
            While => "'while'",
            With => "'with'",
            Reserved => "reserved word",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Semicolon => "';'",
            Comma => "','",
            Dot => "'.'",
            Question => "'?'",
            Colon => "':'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            PlusPlus => "'++'",
            MinusMinus => "'--'",
            LessLess => "'<<'",
            GreaterGreater => "'>>'",
            GreaterGreaterGreater => "'>>>'",
            Amp => "'&'",
            Pipe => "'|'",
            Caret => "'^'",
            Bang => "'!'",
            Tilde => "'~'",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            Less => "'<'",
            Greater => "'>'",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            EqualEqualEqual => "'==='",
            BangEqualEqual => "'!=='",
            Equal => "'='",
            PlusEqual => "'+='",
            MinusEqual => "'-='",
            StarEqual => "'*='",
            SlashEqual => "'/='",
            PercentEqual => "'%='",
            LessLessEqual => "'<<='",
            GreaterGreaterEqual => "'>>='",
            GreaterGreaterGreaterEqual => "'>>>='",
            AmpEqual => "'&='",
            PipeEqual => "'|='",
            CaretEqual => "'^='",
            Eof => "end of file",
            Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a word to its keyword kind, if it is one.
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "break" => Break,
        "case" => Case,
        "catch" => Catch,
        "continue" => Continue,
        "default" => Default,
        "delete" => Delete,
        "do" => Do,
        "else" => Else,
        "false" => False,
        "finally" => Finally,
        "for" => For,
        "function" => Function,
        "if" => If,
        "in" => In,
        "instanceof" => InstanceOf,
        "new" => New,
        "null" => Null,
        "return" => Return,
        "switch" => Switch,
        "this" => This,
        "throw" => Throw,
        "true" => True,
        "try" => Try,
        "typeof" => TypeOf,
        "var" => Var,
        "void" => Void,
        "while" => While,
        "with" => With,
        "class" | "const" | "debugger" | "enum" | "export" | "extends" | "import" | "super" => {
            Reserved
        }
        _ => return None,
    })
}
