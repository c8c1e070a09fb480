//! Bare URL detection for the GFM autolink extension.

use crate::scanners::{is_whitespace, isalnum};
use crate::tokens::Item;

/// Scan a bare URL starting at `pos`.  Returns the visible-text length and
/// the scheme prefix that must be prepended to form the destination (for
/// `www.` links).  The caller has already checked the left boundary.
pub fn scan_url(input: &[Item], pos: usize) -> Option<(usize, &'static str)> {
    let tail = &input[pos..];

    let (prefix_len, scheme_prefix) = if starts_with(tail, b"www.") {
        (4, "http://")
    } else if starts_with(tail, b"https://") {
        (8, "")
    } else if starts_with(tail, b"http://") {
        (7, "")
    } else if starts_with(tail, b"ftp://") {
        (6, "")
    } else {
        return None;
    };

    // Something link-like must follow the prefix.
    if !isalnum(byte_at(tail, prefix_len)) {
        return None;
    }

    let mut end = prefix_len;
    while end < tail.len() {
        let b = tail[end].term;
        if is_whitespace(b) || b == b'<' {
            break;
        }
        end += 1;
    }

    // Trailing punctuation does not belong to the link, and a close paren
    // only does when it balances an open one inside the URL.
    loop {
        if end <= prefix_len {
            return None;
        }
        let b = tail[end - 1].term;
        match b {
            b'?' | b'!' | b'.' | b',' | b':' | b';' | b'*' | b'_' | b'~' | b'\'' | b'"' => {
                end -= 1;
            }
            b')' => {
                let opens = tail[..end].iter().filter(|i| i.term == b'(').count();
                let closes = tail[..end].iter().filter(|i| i.term == b')').count();
                if closes > opens {
                    end -= 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    Some((end, scheme_prefix))
}

fn starts_with(tail: &[Item], prefix: &[u8]) -> bool {
    tail.len() >= prefix.len()
        && tail
            .iter()
            .zip(prefix.iter())
            .all(|(i, p)| i.term.eq_ignore_ascii_case(p))
}

fn byte_at(tail: &[Item], ix: usize) -> u8 {
    tail.get(ix).map(|i| i.term).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::str_to_items;

    #[test]
    fn bare_urls() {
        let input = str_to_items("www.github.com, see");
        assert_eq!(scan_url(&input, 0), Some((14, "http://")));

        let input = str_to_items("https://x.dev/a(b)");
        assert_eq!(scan_url(&input, 0), Some((18, "")));

        let input = str_to_items("https://x.dev/a)");
        assert_eq!(scan_url(&input, 0), Some((15, "")));

        let input = str_to_items("wwwnope");
        assert_eq!(scan_url(&input, 0), None);
    }
}
