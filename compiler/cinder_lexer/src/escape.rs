//! Escape sequence processing for string and character literals.

/// Result of unescaping literal contents.
pub(crate) enum Unescaped {
    /// Exactly one character.
    Single(char),
    /// Zero or several characters.
    Text(String),
}

impl Unescaped {
    pub(crate) fn into_string(self) -> String {
        match self {
            Unescaped::Single(c) => c.to_string(),
            Unescaped::Text(s) => s,
        }
    }
}

/// Process C escape sequences. Unknown escapes keep the escaped character.
pub(crate) fn unescape(s: &str) -> Unescaped {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('0') => result.push('\0'),
            Some('a') => result.push('\u{7}'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('x') => {
                let mut value = 0u32;
                while let Some(digit) = chars.peek().and_then(|d| d.to_digit(16)) {
                    value = value.saturating_mul(16).saturating_add(digit);
                    chars.next();
                }
                result.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    let mut iter = result.chars();
    match (iter.next(), iter.next()) {
        (Some(c), None) => Unescaped::Single(c),
        _ => Unescaped::Text(result),
    }
}
