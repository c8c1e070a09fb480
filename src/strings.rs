//! String- and token-level normalization helpers shared by the parser and
//! renderers.

use crate::scanners::{is_ascii_punct, is_whitespace, byte_set};
use crate::tokens::{Item, Tokens};

/// Remove backslash escapes before ASCII punctuation, in token form.
pub fn unescape_tokens(items: &[Item]) -> Tokens {
    let mut out = Tokens::with_capacity(items.len());
    let mut i = 0;
    while i < items.len() {
        if items[i].term == b'\\' && i + 1 < items.len() && is_ascii_punct(items[i + 1].term) {
            out.push(items[i + 1]);
            i += 2;
        } else {
            out.push(items[i]);
            i += 1;
        }
    }
    out
}

/// Remove backslash escapes before ASCII punctuation, in string form.
pub fn unescape_string(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && is_ascii_punct(bytes[i + 1]) {
            out.push(bytes[i + 1] as char);
            i += 2;
        } else {
            let ch = s[i..].chars().next().unwrap_or('\u{fffd}');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Normalize a link reference label: trim, case fold, newlines to spaces,
/// and collapse internal whitespace runs to a single space.
pub fn normalize_label(label: &str) -> String {
    let mut collapsed = String::with_capacity(label.len());
    let mut last_was_space = false;
    for c in label.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                collapsed.push(' ');
                last_was_space = true;
            }
        } else {
            last_was_space = false;
            collapsed.push(c);
        }
    }
    caseless::default_case_fold_str(&collapsed)
}

/// Bytes which pass through destination encoding unchanged: unreserved URI
/// characters plus the reserved set CommonMark leaves intact (including `%`,
/// so pre-encoded destinations are not double-encoded).
const DEST_SAFE: [bool; 256] = byte_set(
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.~!*'();:@&=+$,/?#[]%",
);

/// Percent-encode a link destination for URL safety.
pub fn encode_destination(dest: &str) -> String {
    let mut out = String::with_capacity(dest.len());
    for &b in dest.as_bytes() {
        if DEST_SAFE[b as usize] {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Collapse a trailing all-blank tail to a single newline; used when an
/// indented code block is finalized.
pub fn remove_trailing_blank_lines(tokens: &mut Tokens) {
    let mut len = tokens.len();
    while len > 0 && is_whitespace(tokens[len - 1].term) {
        len -= 1;
    }
    tokens.truncate(len);
    if !tokens.is_empty() {
        tokens.push(Item::new(b'\n'));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_normalization() {
        assert_eq!(normalize_label("  Foo\n Bar "), "foo bar");
        assert_eq!(normalize_label("ΑΓΩ"), "αγω");
    }

    #[test]
    fn destination_encoding() {
        assert_eq!(encode_destination("/a b"), "/a%20b");
        assert_eq!(encode_destination("/a%20b"), "/a%20b");
        assert_eq!(encode_destination("https://x/?q=1&r=2"), "https://x/?q=1&r=2");
    }

    #[test]
    fn unescaping() {
        assert_eq!(unescape_string(r"a\*b\\c"), r"a*b\c");
        assert_eq!(unescape_string(r"a\qb"), r"a\qb");
    }
}
