//! Link reference definitions and the shared link-constituent parsers
//! (label, destination, title).  The inline parser reuses the constituent
//! parsers for inline `(dest "title")` constructs.

use rustc_hash::FxHashMap;

use crate::scanners::{is_control, is_whitespace};
use crate::strings::{encode_destination, normalize_label, unescape_string};
use crate::tokens::{
    decode_rune, is_backslash_escaped, is_blank_line, peek, stat_whitespace, trim_left, Item,
};

/// A resolved reference: the encoded destination and unescaped title.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRefDef {
    pub destination: String,
    pub title: String,
}

/// Try to parse one link reference definition at the head of `tokens`.
///
/// On success the definition is inserted into `refmap` under its normalized
/// label — unless that label is already present: the first definition wins.
/// Returns the number of items consumed; `None` means no definition starts
/// here and the bytes belong to the paragraph.
pub fn parse_link_ref_def(
    refmap: &mut FxHashMap<String, LinkRefDef>,
    tokens: &[Item],
) -> Option<usize> {
    let (leading, _) = trim_left(tokens);
    let mut i = leading.len();
    if i >= tokens.len() {
        return None;
    }

    let (label, label_len) = parse_link_label(&tokens[i..])?;
    i += label_len;

    if peek(tokens, i) != b':' {
        return None;
    }
    i += 1;

    let (ws, _) = trim_left(&tokens[i..]);
    let (newlines, _, _) = stat_whitespace(ws);
    if newlines > 1 {
        return None;
    }
    i += ws.len();

    let (destination, dest_len) = parse_link_dest(&tokens[i..])?;
    i += dest_len;

    // Whitespace must separate the destination from anything that follows.
    let (ws, rest) = trim_left(&tokens[i..]);
    if ws.is_empty() && !rest.is_empty() {
        return None;
    }
    let (newlines, spaces1, tabs1) = stat_whitespace(ws);
    if newlines > 1 {
        return None;
    }
    let title_start = i + ws.len();

    let (valid_title, mut title, title_len) = parse_link_title(&tokens[title_start..]);
    if !valid_title && newlines < 1 {
        // No title and no newline after the destination: this was a
        // paragraph continuation, not a definition.
        return None;
    }
    let mut remains = title_start + title_len;
    if spaces1 + tabs1 > 0 && !is_blank_line(&tokens[remains..]) && peek(tokens, remains) != b'\n'
    {
        return None;
    }

    // A title on its own line only counts if nothing but whitespace follows
    // it to the next blank line; otherwise the definition ends at the line
    // before the title.
    let (ws2, _) = trim_left(&tokens[remains..]);
    let (_, spaces2, tabs2) = stat_whitespace(ws2);
    let after_ws2 = remains + ws2.len();
    if !is_blank_line(&tokens[after_ws2..]) && spaces2 + tabs2 > 0 {
        title.clear();
        remains = title_start;
    } else {
        remains = after_ws2;
    }

    let key = normalize_label(&label);
    refmap.entry(key).or_insert(LinkRefDef { destination, title });

    Some(remains)
}

/// Parse a link label: `[` through the next unescaped `]`.  Labels cannot
/// nest.  Returns the whitespace-collapsed label text and the consumed
/// length.
pub fn parse_link_label(tokens: &[Item]) -> Option<(String, usize)> {
    if tokens.len() < 2 || tokens[0].term != b'[' {
        return None;
    }

    let mut label = String::new();
    let mut i = 1;
    let mut closed = false;
    while i < tokens.len() {
        let b = tokens[i].term;
        if b == b']' && !is_backslash_escaped(tokens, i) {
            closed = true;
            i += 1;
            break;
        }
        if b == b'[' && !is_backslash_escaped(tokens, i) {
            return None;
        }
        let (r, size) = decode_rune(&tokens[i..]);
        label.push(r);
        i += size;
    }

    if !closed || label.trim().is_empty() || label.len() > 999 {
        return None;
    }

    let mut collapsed = label.trim().replace('\n', " ");
    while collapsed.contains("  ") {
        collapsed = collapsed.replace("  ", " ");
    }
    Some((collapsed, i))
}

/// Parse a link destination, pointy-bracket form first, then bare form.
/// The returned destination is backslash-unescaped and percent-encoded.
pub fn parse_link_dest(tokens: &[Item]) -> Option<(String, usize)> {
    let parsed = parse_link_dest_pointy(tokens).or_else(|| parse_link_dest_bare(tokens))?;
    Some((encode_destination(&unescape_string(&parsed.0)), parsed.1))
}

fn parse_link_dest_pointy(tokens: &[Item]) -> Option<(String, usize)> {
    if tokens.len() < 2 || tokens[0].term != b'<' {
        return None;
    }

    let mut dest = String::new();
    let mut i = 1;
    while i < tokens.len() {
        let b = tokens[i].term;
        if b == b'<' && !is_backslash_escaped(tokens, i) {
            return None;
        }
        if b == b'>' && !is_backslash_escaped(tokens, i) {
            return Some((dest, i + 1));
        }
        let (r, size) = decode_rune(&tokens[i..]);
        dest.push(r);
        i += size;
    }
    None
}

fn parse_link_dest_bare(tokens: &[Item]) -> Option<(String, usize)> {
    let mut dest = String::new();
    let mut open_parens = 0i32;
    let mut i = 0;
    while i < tokens.len() {
        let b = tokens[i].term;
        if is_whitespace(b) || is_control(b) {
            break;
        }
        if b == b'(' && !is_backslash_escaped(tokens, i) {
            open_parens += 1;
        }
        if b == b')' && !is_backslash_escaped(tokens, i) {
            if open_parens == 0 {
                // The destination ends just before the first unmatched `)`.
                break;
            }
            open_parens -= 1;
        }
        let (r, size) = decode_rune(&tokens[i..]);
        dest.push(r);
        i += size;
    }

    if dest.is_empty() {
        None
    } else {
        Some((dest, i))
    }
}

/// Parse an optional link title.  Returns `(valid, title, consumed)`; a
/// missing title is valid with zero consumption, except that a `[` head
/// (the start of the next construct) is always treated as "no title".
pub fn parse_link_title(tokens: &[Item]) -> (bool, String, usize) {
    if tokens.is_empty() || tokens[0].term == b'[' {
        return (true, String::new(), 0);
    }

    let attempt = parse_link_title_match(b'"', b'"', tokens)
        .or_else(|| parse_link_title_match(b'\'', b'\'', tokens))
        .or_else(|| parse_link_title_match(b'(', b')', tokens));

    match attempt {
        Some((title, consumed)) => (true, unescape_string(&title), consumed),
        None => (false, String::new(), 0),
    }
}

fn parse_link_title_match(opener: u8, closer: u8, tokens: &[Item]) -> Option<(String, usize)> {
    if tokens.len() < 2 || tokens[0].term != opener {
        return None;
    }

    let mut title = String::new();
    let mut i = 1;
    while i < tokens.len() {
        let b = tokens[i].term;
        if b == closer && !is_backslash_escaped(tokens, i) {
            return Some((title, i + 1));
        }
        let (r, size) = decode_rune(&tokens[i..]);
        title.push(r);
        i += size;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::str_to_items;

    #[test]
    fn labels() {
        let (label, len) = parse_link_label(&str_to_items("[ Foo\n Bar ]: /x")).unwrap();
        assert_eq!(label, "Foo Bar");
        assert_eq!(len, 12);
        assert!(parse_link_label(&str_to_items("[a[b]")).is_none());
        assert!(parse_link_label(&str_to_items("[  ]")).is_none());
        assert!(parse_link_label(&str_to_items("[open")).is_none());
    }

    #[test]
    fn destinations() {
        assert_eq!(
            parse_link_dest(&str_to_items("</my uri> x")),
            Some(("/my%20uri".into(), 9))
        );
        assert_eq!(parse_link_dest(&str_to_items("<>")), Some(("".into(), 2)));
        assert_eq!(
            parse_link_dest(&str_to_items("/a(b)c) x")),
            Some(("/a(b)c".into(), 6))
        );
        assert!(parse_link_dest(&str_to_items("<a<b>")).is_none());
    }

    #[test]
    fn titles() {
        let (ok, title, len) = parse_link_title(&str_to_items("\"a \\\" b\" rest"));
        assert!(ok);
        assert_eq!(title, "a \" b");
        assert_eq!(len, 8);
        let (ok, _, len) = parse_link_title(&str_to_items("[next]"));
        assert!(ok);
        assert_eq!(len, 0);
        let (ok, _, _) = parse_link_title(&str_to_items("\"unclosed"));
        assert!(!ok);
    }

    #[test]
    fn first_definition_wins() {
        let mut refmap = FxHashMap::default();
        let input = str_to_items("[a]: /one\n[a]: /two\n");
        let mut at = 0;
        while let Some(consumed) = parse_link_ref_def(&mut refmap, &input[at..]) {
            if consumed == 0 {
                break;
            }
            at += consumed;
        }
        assert_eq!(refmap["a"].destination, "/one");
    }
}
