//! Line lexing and quote-aware splitting.
//!
//! The decoder never looks at the input as a character stream: the [`Scanner`]
//! turns the whole document into classified [`Line`]s up front (number,
//! indentation depth, trimmed content, blank flag), and the block parser walks
//! that list with a cursor. Splitting rows and locating `:` separators goes
//! through the quote-aware helpers here, so a delimiter inside a quoted span
//! never breaks a cell apart.

use crate::error::{Error, Result};
use crate::options::DecodeOptions;
use std::borrow::Cow;

/// One classified input line.
#[derive(Debug, Clone)]
pub(crate) struct Line<'a> {
    /// 1-based line number.
    pub num: usize,
    /// The raw line, exactly as read (without its newline).
    pub raw: &'a str,
    /// Indentation depth in whole levels.
    pub depth: usize,
    /// Raw minus leading spaces, trailing spaces trimmed.
    pub content: &'a str,
    /// True when `content` is empty.
    pub blank: bool,
}

impl Line<'_> {
    /// Comment lines start with `#`; they are only skipped at mapping level.
    pub(crate) fn is_comment(&self) -> bool {
        self.content.starts_with('#')
    }
}

/// Replaces `\r\n` and bare `\r` with `\n`, borrowing when nothing changes.
pub(crate) fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Cursor over the classified lines of a document.
#[derive(Debug)]
pub(crate) struct Scanner<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Lexes `input` (already newline-normalized) into lines.
    ///
    /// In strict mode the line-level rules are enforced here: no tabs in
    /// indentation, leading spaces divisible by the indent width, no trailing
    /// spaces.
    pub(crate) fn new(input: &'a str, options: &DecodeOptions) -> Result<Self> {
        let indent = options.indent.max(1);
        let mut lines = Vec::new();
        for (i, raw) in input.split('\n').enumerate() {
            let num = i + 1;
            let spaces = raw.bytes().take_while(|&b| b == b' ').count();
            let content = raw[spaces..].trim_end_matches(' ');
            let blank = content.is_empty();

            if options.strict {
                if raw.as_bytes().get(spaces) == Some(&b'\t') {
                    return Err(Error::parse(num, "Tabs are not allowed in indentation", raw));
                }
                if raw.ends_with(' ') {
                    return Err(Error::parse(num, "Trailing spaces are not allowed", raw));
                }
                if !blank && spaces % indent != 0 {
                    return Err(Error::parse(
                        num,
                        format!("Indentation must be a multiple of {indent}"),
                        raw,
                    ));
                }
            }

            lines.push(Line {
                num,
                raw,
                depth: spaces / indent,
                content,
                blank,
            });
        }
        Ok(Scanner { lines, pos: 0 })
    }

    /// The next line, without consuming it.
    pub(crate) fn peek(&self) -> Option<&Line<'a>> {
        self.lines.get(self.pos)
    }

    /// The line `offset` positions past the cursor.
    pub(crate) fn peek_at(&self, offset: usize) -> Option<&Line<'a>> {
        self.lines.get(self.pos + offset)
    }

    /// Moves past the current line.
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }
}

/// Splits `s` by `delim`, treating double-quoted spans as atomic.
///
/// Inside quotes a backslash and the character after it are carried verbatim
/// (unescaping happens later, in the primitive parser). Consecutive
/// delimiters produce empty parts; parts are not trimmed.
pub(crate) fn split_quote_aware(s: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut start = 0usize;

    for (i, ch) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => escape = true,
            c if c == delim && !in_quotes => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Byte index of the first `ch` outside double quotes, if any.
pub(crate) fn first_unquoted(s: &str, ch: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escape = false;

    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => escape = true,
            c if c == ch && !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str, options: &DecodeOptions) -> Result<Vec<(usize, String, bool)>> {
        let scanner = Scanner::new(input, options)?;
        Ok(scanner
            .lines
            .iter()
            .map(|l| (l.depth, l.content.to_string(), l.blank))
            .collect())
    }

    #[test]
    fn depth_and_content() {
        let lines = lex("a: 1\n  b: 2\n\n    c: 3", &DecodeOptions::new()).unwrap();
        assert_eq!(
            lines,
            vec![
                (0, "a: 1".to_string(), false),
                (1, "b: 2".to_string(), false),
                (0, String::new(), true),
                (2, "c: 3".to_string(), false),
            ]
        );
    }

    #[test]
    fn strict_rejects_tabs_in_indentation() {
        let err = Scanner::new("\tkey: 1", &DecodeOptions::new()).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("tab"));
    }

    #[test]
    fn strict_rejects_odd_indentation() {
        let err = Scanner::new("a:\n   b: 1", &DecodeOptions::new()).unwrap_err();
        assert!(err.to_string().contains("multiple of 2"));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn strict_rejects_trailing_spaces() {
        let err = Scanner::new("a: 1 ", &DecodeOptions::new()).unwrap_err();
        assert!(err.to_string().contains("Trailing spaces"));
    }

    #[test]
    fn lenient_floors_depth() {
        let lines = lex("a:\n   b: 1", &DecodeOptions::lenient()).unwrap();
        assert_eq!(lines[1].0, 1);
    }

    #[test]
    fn newline_normalization() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn split_respects_quotes() {
        assert_eq!(split_quote_aware("a,b,c", ','), vec!["a", "b", "c"]);
        assert_eq!(split_quote_aware("\"a,b\",c", ','), vec!["\"a,b\"", "c"]);
        assert_eq!(split_quote_aware("a,,c", ','), vec!["a", "", "c"]);
        assert_eq!(split_quote_aware("", ','), vec![""]);
    }

    #[test]
    fn split_carries_escapes_verbatim() {
        assert_eq!(
            split_quote_aware(r#""say \"hi\", ok",done"#, ','),
            vec![r#""say \"hi\", ok""#, "done"]
        );
    }

    #[test]
    fn first_unquoted_skips_quoted_spans() {
        assert_eq!(first_unquoted("key: value", ':'), Some(3));
        assert_eq!(first_unquoted("\"a:b\": c", ':'), Some(5));
        assert_eq!(first_unquoted("\"a:b\"", ':'), None);
        assert_eq!(first_unquoted(r#""\":" x"#, ':'), None);
    }
}
