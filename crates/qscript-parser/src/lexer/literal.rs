//! Decoding of literal lexemes into their values.
//!
//! The lexer only validates token boundaries; the parser calls these helpers
//! when it builds literal nodes.

/// Decode a quoted string lexeme (quotes included). `None` on a malformed escape.
pub fn cook_string(lexeme: &str) -> Option<String> {
    let inner = lexeme.get(1..lexeme.len().checked_sub(1)?)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next()?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            'x' => out.push(hex_char(&mut chars, 2)?),
            'u' => out.push(hex_char(&mut chars, 4)?),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '0'..='7' => {
                // Legacy octal escape, at most three digits and at most \377.
                let mut value = escaped.to_digit(8)?;
                let max_digits = if escaped <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn hex_char(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

/// Decode `\uXXXX` escapes inside an identifier.
pub fn cook_identifier(lexeme: &str) -> Option<String> {
    let mut out = String::with_capacity(lexeme.len());
    let mut chars = lexeme.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.next()? != 'u' {
                return None;
            }
            out.push(hex_char(&mut chars, 4)?);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Numeric value of a number lexeme.
pub fn parse_number(lexeme: &str) -> Option<f64> {
    if let Some(hex) = lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        // Hex literals can exceed u64; fold in f64 like the language does.
        return hex
            .chars()
            .try_fold(0f64, |acc, c| Some(acc * 16.0 + c.to_digit(16)? as f64));
    }
    if lexeme.len() > 1
        && lexeme.starts_with('0')
        && lexeme.bytes().all(|b| (b'0'..=b'7').contains(&b))
    {
        return lexeme[1..]
            .chars()
            .try_fold(0f64, |acc, c| Some(acc * 8.0 + c.to_digit(8)? as f64));
    }
    lexeme.parse::<f64>().ok()
}

/// Split `/pattern/flags` into its two parts.
pub fn split_regexp(lexeme: &str) -> Option<(&str, &str)> {
    let body = lexeme.strip_prefix('/')?;
    let end = body.rfind('/')?;
    Some((&body[..end], &body[end + 1..]))
}
