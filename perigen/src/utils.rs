//! Utilities.

/// Returns ceiling log2.
pub const fn clog2(value: usize) -> usize {
    if value == 0 {
        0
    } else {
        (::std::mem::size_of::<usize>() * 8) - (value - 1).leading_zeros() as usize
    }
}

/// Indents every line in the string.
pub fn indent(str: String, indent: usize) -> String {
    str.lines().map(|l| format!("{}{}", " ".repeat(indent), l)).collect::<Vec<_>>().join("\n")
}

/// Indents every line but the first.
pub fn indent_hanging(str: String, indent: usize) -> String {
    let mut lines = str.lines();
    let first = lines.next().unwrap_or_default().to_string();
    lines.fold(first, |acc, l| format!("{}\n{}{}", acc, " ".repeat(indent), l))
}

/// Truncates `s` to at most `max` bytes without splitting a character.
pub fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clog2_of_table_sizes() {
        assert_eq!(clog2(1), 0);
        assert_eq!(clog2(2), 1);
        assert_eq!(clog2(16), 4);
        assert_eq!(clog2(17), 5);
    }

    #[test]
    fn indent_every_line() {
        assert_eq!(indent("a\nb".to_string(), 2), "  a\n  b");
        assert_eq!(indent_hanging("a\nb\nc".to_string(), 3), "a\n   b\n   c");
    }

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate_str("serout8", 19), "serout8");
        assert_eq!(truncate_str("abcdef", 3), "abc");
        assert_eq!(truncate_str("aé", 2), "a");
    }
}
