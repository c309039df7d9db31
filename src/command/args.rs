//! Chat argument tokenizing.

use std::sync::LazyLock;

use regex::Regex;

/// A bare run of non-space, non-quote characters, or a quoted span, glued
/// together without intervening whitespace.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:[^\s"']+|['"][^'"]*["'])+"#).expect("valid regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Splits `input` on whitespace, keeping quoted spans together.
///
/// Whitespace runs collapse to a single space first, then every quote
/// character is removed from the resulting tokens. An unterminated quote
/// is simply dropped.
///
/// ```
/// use carousel::command::parse_args;
///
/// assert_eq!(parse_args(r#"timer "1:30""#), ["timer", "1:30"]);
/// assert_eq!(parse_args("  a   'b c'  "), ["a", "b c"]);
/// ```
#[must_use]
pub fn parse_args(input: &str) -> Vec<String> {
    let collapsed = WHITESPACE.replace_all(input, " ");
    TOKEN
        .find_iter(&collapsed)
        .map(|m| m.as_str().replace(['"', '\''], ""))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parses a 1-based item index the way a lenient integer reader would:
/// optional leading `+`, then decimal digits, anything after the digits is
/// ignored (`"3.7"` reads as 3).
///
/// Returns `None` when no digits lead the input or the value overflows.
#[must_use]
pub fn parse_index(input: &str) -> Option<usize> {
    let trimmed = input.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(parse_args("timer pause"), ["timer", "pause"]);
        assert_eq!(parse_args("a\t\tb\nc"), ["a", "b", "c"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(parse_args("").is_empty());
        assert!(parse_args("   ").is_empty());
    }

    #[test]
    fn quoted_span_stays_together() {
        assert_eq!(parse_args(r#"say "hello there" now"#), ["say", "hello there", "now"]);
        assert_eq!(parse_args("x 'a b'"), ["x", "a b"]);
    }

    #[test]
    fn quoted_whitespace_collapses() {
        assert_eq!(parse_args("\"a \t  b\""), ["a b"]);
    }

    #[test]
    fn adjacent_quotes_glue_to_token() {
        assert_eq!(parse_args(r#"ab"cd ef"gh"#), ["abcd efgh"]);
    }

    #[test]
    fn quoted_argument_after_keyword() {
        assert_eq!(parse_args("reset \"extra text\""), ["reset", "extra text"]);
    }

    #[test]
    fn unterminated_quote_is_dropped() {
        assert_eq!(parse_args(r#"timer "1:30"#), ["timer", "1:30"]);
    }

    #[test]
    fn index_reads_leading_digits() {
        assert_eq!(parse_index("3"), Some(3));
        assert_eq!(parse_index("3.7"), Some(3));
        assert_eq!(parse_index("12abc"), Some(12));
        assert_eq!(parse_index("+2"), Some(2));
        assert_eq!(parse_index("0"), Some(0));
    }

    #[test]
    fn index_without_leading_digits_is_rejected() {
        assert_eq!(parse_index("abc"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index(".5"), None);
    }

    #[test]
    fn index_overflow_is_rejected() {
        assert_eq!(parse_index("99999999999999999999999999"), None);
    }
}
