//! Date output patterns.
//!
//! Patterns use the letter-run convention (`yyyy-MM-dd`, `yyyyMM`, `d/M/yy`)
//! and are translated into chrono format strings. Characters other than
//! ASCII letters are copied through literally.

use crate::error::ExprError;

/// Translate a letter-run date pattern into a chrono format string.
pub(crate) fn to_strftime(pattern: &str) -> Result<String, ExprError> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_alphabetic() {
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
            continue;
        }

        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }

        let directive = match (c, run) {
            ('y' | 'u', 2) => "%y",
            ('y' | 'u', _) => "%Y",
            ('M' | 'L', 1) => "%-m",
            ('M' | 'L', 2) => "%m",
            ('M' | 'L', 3) => "%b",
            ('M' | 'L', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('D', 1) => "%-j",
            ('D', _) => "%j",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            _ => {
                return Err(ExprError::UnsupportedPattern {
                    letter: c,
                    pattern: pattern.to_string(),
                });
            }
        };
        out.push_str(directive);
    }

    Ok(out)
}
