//! Byte-level scanning primitives
//!
//! Structural scans work on bytes: every byte the scanners stop at is ASCII,
//! so the returned positions are always valid `str` slice boundaries even
//! when values contain multi-byte UTF-8.

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

#[inline]
pub fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

#[inline]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Identifier character: letters, digits, `-`, `_` and non-ASCII bytes.
#[inline]
pub fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

/// ASCII case-insensitive prefix test.
pub fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Skip whitespace and `/* */` comments starting at `pos`, never past `end`.
pub fn skip_whitespace_and_comments(bytes: &[u8], mut pos: usize, end: usize) -> usize {
    loop {
        while pos < end && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos + 1 < end && bytes[pos] == b'/' && bytes[pos + 1] == b'*' {
            pos = skip_comment(bytes, pos, end);
        } else {
            return pos;
        }
    }
}

/// `pos` is at `/*`; returns the position after `*/` (or `end`).
pub fn skip_comment(bytes: &[u8], pos: usize, end: usize) -> usize {
    let mut i = pos + 2;
    while i + 1 < end {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    end
}

/// `pos` is at a quote; returns the position after the closing quote (or `end`).
pub fn skip_string(bytes: &[u8], pos: usize, end: usize) -> usize {
    let quote = bytes[pos];
    let mut i = pos + 1;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    end
}

/// Find the `}` matching an already consumed `{`, scanning from `pos`.
///
/// Braces inside strings and comments are ignored.
pub fn find_matching_brace(bytes: &[u8], pos: usize, end: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = pos;
    while i < end {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i, end);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(bytes, i, end);
                continue;
            }
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Find the `)` matching an already consumed `(`.
pub fn find_matching_paren(bytes: &[u8], pos: usize, end: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = pos;
    while i < end {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i, end);
                continue;
            }
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// First position in `[pos, end)` holding one of `stops` outside strings,
/// comments, parentheses and brackets.
pub fn find_top_level(bytes: &[u8], pos: usize, end: usize, stops: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = pos;
    while i < end {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => {
                i = skip_string(bytes, i, end);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(bytes, i, end);
                continue;
            }
            b'\\' => {
                i += 2;
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            _ if depth == 0 && stops.contains(&b) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on commas outside parentheses, brackets and strings; parts are trimmed
/// and empty parts dropped.
pub fn split_top_level_commas(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    while let Some(comma) = find_top_level(bytes, start, bytes.len(), b",") {
        parts.push(text[start..comma].trim());
        start = comma + 1;
    }
    parts.push(text[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Split on whitespace outside parentheses and strings.
///
/// `calc(1px + 2px) 10px` yields two tokens.
pub fn split_top_level_whitespace(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if depth == 0 && is_whitespace(b) {
            if let Some(s) = start.take() {
                tokens.push(&text[s..i]);
            }
            i += 1;
            continue;
        }
        if start.is_none() {
            start = Some(i);
        }
        match b {
            b'"' | b'\'' => {
                i = skip_string(bytes, i, bytes.len());
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

/// Collapse whitespace runs to one space and drop comments, outside strings.
pub fn normalize_whitespace(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if is_whitespace(b) {
            pending_space = true;
            i += 1;
            continue;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i = skip_comment(bytes, i, bytes.len());
            pending_space = true;
            continue;
        }

        let next = match b {
            b'"' | b'\'' => skip_string(bytes, i, bytes.len()),
            b'\\' if i + 1 < bytes.len() => next_char_boundary(text, i + 1),
            _ => next_char_boundary(text, i),
        };
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push_str(&text[i..next]);
        i = next;
    }
    out
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_brace_skips_strings_and_comments() {
        let css = b"a { content: \"}\"; /* } */ b { } }";
        let close = find_matching_brace(css, 3, css.len()).unwrap();
        assert_eq!(close, css.len() - 1);
    }

    #[test]
    fn test_matching_brace_unterminated() {
        let css = b"{ a { }";
        assert_eq!(find_matching_brace(css, 1, css.len()), None);
    }

    #[test]
    fn test_find_top_level_ignores_parens() {
        let text = b"url(a;b) x; y";
        assert_eq!(find_top_level(text, 0, text.len(), b";"), Some(10));
    }

    #[test]
    fn test_split_commas() {
        assert_eq!(
            split_top_level_commas("h1, :is(a, b) , [x=\",\"]"),
            vec!["h1", ":is(a, b)", "[x=\",\"]"]
        );
        assert!(split_top_level_commas("  ").is_empty());
    }

    #[test]
    fn test_split_whitespace_respects_functions() {
        assert_eq!(
            split_top_level_whitespace("calc(1px + 2px) 10px"),
            vec!["calc(1px + 2px)", "10px"]
        );
        assert_eq!(
            split_top_level_whitespace("  12px  \"Open Sans\" "),
            vec!["12px", "\"Open Sans\""]
        );
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  div \n  >\tp  "), "div > p");
        assert_eq!(normalize_whitespace("a /* x */ b"), "a b");
        assert_eq!(normalize_whitespace("[title=\"a  b\"]"), "[title=\"a  b\"]");
        assert_eq!(normalize_whitespace("p.é   span"), "p.é span");
    }

    #[test]
    fn test_normalize_escaped_multibyte() {
        assert_eq!(normalize_whitespace(".a\\é  b"), ".a\\é b");
        assert_eq!(normalize_whitespace(".a\\→"), ".a\\→");
        assert_eq!(normalize_whitespace("a\\"), "a\\");
    }

    #[test]
    fn test_case_insensitive_prefix() {
        assert!(starts_with_ignore_case(b"@MEDIA screen", b"@media"));
        assert!(!starts_with_ignore_case(b"@me", b"@media"));
    }
}
