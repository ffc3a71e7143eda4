/// A position-tracking view over source text.
///
/// Lines advance on `\n`; a `\r\n` pair counts once because `\r` only moves
/// the column.
pub struct Cursor<'src> {
    /// The whole input; consumed text is sliced out of it.
    source: &'src str,
    /// Unconsumed suffix of `source`.
    rest: &'src str,
    /// Byte offset of `rest` within `source`.
    offset: u32,
    /// 1-based line of the next character.
    line: u32,
    /// 1-based column of the next character, in bytes.
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peek `n` characters ahead (0 is the current character).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }

    /// Consume one character, updating line and column.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let width = ch.len_utf8();
        self.rest = &self.rest[width..];
        self.offset += width as u32;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += width as u32;
        }
        Some(ch)
    }

    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume while `f` holds and return the consumed text.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        self.slice_from(start)
    }

    /// Source text from byte offset `start` up to the cursor.
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[inline]
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 3));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn crlf_counts_one_line() {
        let mut cursor = Cursor::new("a\r\nb");
        cursor.eat_while(|_| true);
        assert_eq!(cursor.line(), 2);
    }

    #[test]
    fn eat_while_returns_slice() {
        let mut cursor = Cursor::new("$foo_1 + 2");
        assert_eq!(cursor.eat_while(is_ident_continue), "$foo_1");
        assert_eq!(cursor.peek(), Some(' '));
    }

    #[test]
    fn multibyte_characters_advance_by_width() {
        let mut cursor = Cursor::new("é1");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.peek(), Some('1'));
    }

    #[test]
    fn slice_from_covers_consumed_text() {
        let mut cursor = Cursor::new("var x");
        cursor.eat_while(|c| c != ' ');
        let start = cursor.offset();
        cursor.eat(' ');
        cursor.advance();
        assert_eq!(cursor.slice_from(0), "var x");
        assert_eq!(cursor.slice_from(start), " x");
        assert!(cursor.is_eof());
    }

    #[test]
    fn peek_nth_and_check_str() {
        let cursor = Cursor::new(">>>=");
        assert!(cursor.check_str(">>>"));
        assert_eq!(cursor.peek_nth(3), Some('='));
        assert_eq!(cursor.peek_nth(4), None);
    }
}
