//! Column helpers that measure display width rather than bytes or chars.

use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `s` to at most `width` display columns.
pub fn truncate(s: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// Left-align `s` in `width` display columns. Longer text is not cut.
pub fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

/// Write a `=` rule of `width` columns.
pub fn rule(f: &mut fmt::Formatter<'_>, width: usize) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(width))
}

/// Blank line, rule, title, rule.
pub fn section(f: &mut fmt::Formatter<'_>, title: &str, width: usize) -> fmt::Result {
    writeln!(f)?;
    rule(f, width)?;
    writeln!(f, "{}", title)?;
    rule(f, width)
}
