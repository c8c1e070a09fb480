//! Low-level byte predicates and construct scanners.
//!
//! Everything here is a pure function over a token slice (usually the tail
//! of the current line).  Scanners return the number of items consumed on a
//! match so the caller can advance its offset, and `None` otherwise.

use crate::tokens::{peek, Item};

pub fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Alias used where the CommonMark reference calls this class "space".
pub fn isspace(ch: u8) -> bool {
    is_whitespace(ch)
}

pub fn is_space_or_tab(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t')
}

pub fn is_line_end(ch: u8) -> bool {
    matches!(ch, b'\n' | b'\r')
}

pub fn is_ascii_punct(ch: u8) -> bool {
    ch.is_ascii_punctuation()
}

pub fn is_control(ch: u8) -> bool {
    ch < 0x20 || ch == 0x7f
}

pub fn isdigit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

pub fn isalpha(ch: u8) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn isalnum(ch: u8) -> bool {
    ch.is_ascii_alphanumeric()
}

/// Build a byte membership table at compile time.
pub(crate) const fn byte_set(bytes: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < bytes.len() {
        table[bytes[i] as usize] = true;
        i += 1;
    }
    table
}

fn starts_with_ignore_case(items: &[Item], prefix: &[u8]) -> bool {
    if items.len() < prefix.len() {
        return false;
    }
    items
        .iter()
        .zip(prefix.iter())
        .all(|(i, p)| i.term.to_ascii_lowercase() == *p)
}

fn contains_ignore_case(items: &[Item], needle: &[u8]) -> bool {
    if items.len() < needle.len() {
        return false;
    }
    (0..=items.len() - needle.len()).any(|i| starts_with_ignore_case(&items[i..], needle))
}

/// An ATX heading opener: one to six `#` followed by space, tab or line end.
/// Returns the consumed length (markers plus one following space, if any)
/// and the heading level.
pub fn atx_heading_start(line: &[Item]) -> Option<(usize, u32)> {
    if peek(line, 0) != b'#' {
        return None;
    }
    let mut level = 0;
    while peek(line, level) == b'#' {
        level += 1;
    }
    if level > 6 {
        return None;
    }
    match peek(line, level) {
        b' ' | b'\t' => Some((level + 1, level as u32)),
        b'\n' | b'\r' | 0 => Some((level, level as u32)),
        _ => None,
    }
}

pub enum SetextChar {
    Equals,
    Hyphen,
}

/// A setext underline: a run of `=` or `-` followed only by whitespace.
pub fn setext_heading_line(line: &[Item]) -> Option<SetextChar> {
    let marker = peek(line, 0);
    if marker != b'=' && marker != b'-' {
        return None;
    }
    let mut i = 0;
    while peek(line, i) == marker {
        i += 1;
    }
    while i < line.len() && is_space_or_tab(line[i].term) {
        i += 1;
    }
    if i < line.len() && !is_line_end(line[i].term) {
        return None;
    }
    if marker == b'=' {
        Some(SetextChar::Equals)
    } else {
        Some(SetextChar::Hyphen)
    }
}

/// A thematic break: three or more of the same `*`, `-` or `_`, interleaved
/// with spaces and tabs only.  Returns the length to the end of the line.
pub fn thematic_break(line: &[Item]) -> Option<usize> {
    let marker = peek(line, 0);
    if marker != b'*' && marker != b'-' && marker != b'_' {
        return None;
    }
    let mut count = 0;
    let mut i = 0;
    while i < line.len() {
        match line[i].term {
            c if c == marker => count += 1,
            b' ' | b'\t' => {}
            b'\n' | b'\r' => break,
            _ => return None,
        }
        i += 1;
    }
    if count >= 3 {
        Some(i)
    } else {
        None
    }
}

// HTML blocks.  Types follow the CommonMark numbering; the scanners see the
// line starting at its first nonspace byte.

const BLOCK_TAG_NAMES: [&str; 62] = [
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "source",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

fn tag_name_end(line: &[Item], start: usize) -> usize {
    let mut i = start;
    while i < line.len() && (isalnum(line[i].term) || line[i].term == b'-') {
        i += 1;
    }
    i
}

pub fn html_block_start(line: &[Item]) -> Option<u8> {
    if peek(line, 0) != b'<' {
        return None;
    }
    if starts_with_ignore_case(line, b"<!--") {
        return Some(2);
    }
    if starts_with_ignore_case(line, b"<?") {
        return Some(3);
    }
    if starts_with_ignore_case(line, b"<![CDATA[") {
        return Some(5);
    }
    if peek(line, 1) == b'!' && isalpha(peek(line, 2)) {
        return Some(4);
    }
    for tag in &["script", "pre", "style", "textarea"] {
        if starts_with_ignore_case(&line[1..], tag.as_bytes()) {
            let after = peek(line, 1 + tag.len());
            if is_whitespace(after) || after == b'>' || after == 0 {
                return Some(1);
            }
        }
    }
    let name_start = if peek(line, 1) == b'/' { 2 } else { 1 };
    let name_end = tag_name_end(line, name_start);
    if name_end > name_start {
        let name: String = line[name_start..name_end]
            .iter()
            .map(|i| i.term.to_ascii_lowercase() as char)
            .collect();
        if BLOCK_TAG_NAMES.contains(&name.as_str()) {
            let mut after = peek(line, name_end);
            if after == b'/' && peek(line, name_end + 1) == b'>' {
                after = b'>';
            }
            if is_whitespace(after) || after == b'>' {
                return Some(6);
            }
        }
    }
    None
}

/// Type 7: a complete open or close tag, alone on its line.
pub fn html_block_start_7(line: &[Item]) -> Option<u8> {
    let c1 = peek(line, 1);
    if c1 != b'/' && !isalpha(c1) {
        return None;
    }
    let consumed = html_tag(line)?;
    let mut i = consumed;
    while i < line.len() && is_space_or_tab(line[i].term) {
        i += 1;
    }
    if i >= line.len() || is_line_end(line[i].term) {
        // Script, pre, style and textarea open tags are type 1, never 7.
        let name_start = if peek(line, 1) == b'/' { 2 } else { 1 };
        let name_end = tag_name_end(line, name_start);
        let name: String = line[name_start..name_end]
            .iter()
            .map(|i| i.term.to_ascii_lowercase() as char)
            .collect();
        if name_start == 1 && ["script", "pre", "style", "textarea"].contains(&name.as_str()) {
            return None;
        }
        Some(7)
    } else {
        None
    }
}

pub fn html_block_end(block_type: u8, line: &[Item]) -> bool {
    match block_type {
        1 => {
            contains_ignore_case(line, b"</script>")
                || contains_ignore_case(line, b"</pre>")
                || contains_ignore_case(line, b"</style>")
                || contains_ignore_case(line, b"</textarea>")
        }
        2 => contains_ignore_case(line, b"-->"),
        3 => contains_ignore_case(line, b"?>"),
        4 => line.iter().any(|i| i.term == b'>'),
        5 => contains_ignore_case(line, b"]]>"),
        _ => false,
    }
}

// Inline raw HTML: the standard CommonMark tag grammar, hand-scanned.  The
// slice starts at `<`; the returned length includes both angle brackets.

fn scan_attribute(line: &[Item], mut i: usize) -> Option<usize> {
    let start = i;
    while i < line.len() && is_whitespace(line[i].term) {
        i += 1;
    }
    if i == start {
        return None;
    }
    if !(isalpha(peek(line, i)) || peek(line, i) == b'_' || peek(line, i) == b':') {
        return None;
    }
    i += 1;
    while matches!(peek(line, i), c if isalnum(c) || matches!(c, b'_' | b'.' | b':' | b'-')) {
        i += 1;
    }
    let mut j = i;
    while j < line.len() && is_whitespace(line[j].term) {
        j += 1;
    }
    if peek(line, j) != b'=' {
        return Some(i);
    }
    j += 1;
    while j < line.len() && is_whitespace(line[j].term) {
        j += 1;
    }
    match peek(line, j) {
        b'\'' | b'"' => {
            let quote = line[j].term;
            j += 1;
            while j < line.len() && line[j].term != quote {
                j += 1;
            }
            if j >= line.len() {
                return None;
            }
            Some(j + 1)
        }
        0 => None,
        _ => {
            let start = j;
            while j < line.len()
                && !is_whitespace(line[j].term)
                && !matches!(line[j].term, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
            {
                j += 1;
            }
            if j == start {
                None
            } else {
                Some(j)
            }
        }
    }
}

pub fn html_tag(line: &[Item]) -> Option<usize> {
    if peek(line, 0) != b'<' {
        return None;
    }
    match peek(line, 1) {
        b'/' => {
            let end = tag_name_end(line, 2);
            if end == 2 || !isalpha(peek(line, 2)) {
                return None;
            }
            let mut i = end;
            while i < line.len() && is_whitespace(line[i].term) {
                i += 1;
            }
            if peek(line, i) == b'>' {
                Some(i + 1)
            } else {
                None
            }
        }
        b'!' => {
            if starts_with_ignore_case(line, b"<!--") {
                let mut i = 4;
                while i + 2 < line.len() {
                    if line[i].term == b'-' && line[i + 1].term == b'-' && line[i + 2].term == b'>'
                    {
                        return Some(i + 3);
                    }
                    i += 1;
                }
                None
            } else if starts_with_ignore_case(line, b"<![CDATA[") {
                let mut i = 9;
                while i + 2 < line.len() {
                    if line[i].term == b']' && line[i + 1].term == b']' && line[i + 2].term == b'>'
                    {
                        return Some(i + 3);
                    }
                    i += 1;
                }
                None
            } else if isalpha(peek(line, 2)) {
                let mut i = 2;
                while i < line.len() && line[i].term != b'>' {
                    i += 1;
                }
                if i < line.len() {
                    Some(i + 1)
                } else {
                    None
                }
            } else {
                None
            }
        }
        b'?' => {
            let mut i = 2;
            while i + 1 < line.len() {
                if line[i].term == b'?' && line[i + 1].term == b'>' {
                    return Some(i + 2);
                }
                i += 1;
            }
            None
        }
        c if isalpha(c) => {
            let mut i = tag_name_end(line, 1);
            loop {
                match scan_attribute(line, i) {
                    Some(next) => i = next,
                    None => break,
                }
            }
            while i < line.len() && is_whitespace(line[i].term) {
                i += 1;
            }
            if peek(line, i) == b'/' {
                i += 1;
            }
            if peek(line, i) == b'>' {
                Some(i + 1)
            } else {
                None
            }
        }
        _ => None,
    }
}

// Angle-bracket autolinks.  Slices start at `<`; returned length includes
// the closing `>`.

pub fn autolink_uri(line: &[Item]) -> Option<usize> {
    if peek(line, 0) != b'<' || !isalpha(peek(line, 1)) {
        return None;
    }
    let mut i = 2;
    while i < line.len()
        && (isalnum(line[i].term) || matches!(line[i].term, b'+' | b'.' | b'-'))
        && i < 33
    {
        i += 1;
    }
    if peek(line, i) != b':' || i < 3 {
        return None;
    }
    i += 1;
    while i < line.len() {
        match line[i].term {
            b'>' => return Some(i + 1),
            b'<' => return None,
            c if is_whitespace(c) || is_control(c) => return None,
            _ => i += 1,
        }
    }
    None
}

pub fn autolink_email(line: &[Item]) -> Option<usize> {
    if peek(line, 0) != b'<' {
        return None;
    }
    let mut i = 1;
    while i < line.len()
        && (isalnum(line[i].term)
            || matches!(
                line[i].term,
                b'.' | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'/' | b'=' | b'?'
                    | b'^' | b'_' | b'`' | b'{' | b'|' | b'}' | b'~' | b'-'
            ))
    {
        i += 1;
    }
    if i == 1 || peek(line, i) != b'@' {
        return None;
    }
    i += 1;
    let mut label_len = 0;
    loop {
        match peek(line, i) {
            c if isalnum(c) => {
                label_len += 1;
            }
            b'-' if label_len > 0 && isalnum(peek(line, i + 1)) => {
                label_len += 1;
            }
            b'.' if label_len > 0 && label_len <= 63 => {
                label_len = 0;
            }
            b'>' if label_len > 0 && label_len <= 63 => {
                return Some(i + 1);
            }
            _ => return None,
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::str_to_items;

    #[test]
    fn atx_openers() {
        assert!(matches!(
            atx_heading_start(&str_to_items("## x\n")),
            Some((3, 2))
        ));
        assert!(atx_heading_start(&str_to_items("####### x\n")).is_none());
        assert!(atx_heading_start(&str_to_items("#x\n")).is_none());
        assert!(matches!(atx_heading_start(&str_to_items("#\n")), Some((1, 1))));
    }

    #[test]
    fn thematic_breaks() {
        assert!(thematic_break(&str_to_items("***\n")).is_some());
        assert!(thematic_break(&str_to_items("- - -  \n")).is_some());
        assert!(thematic_break(&str_to_items("--\n")).is_none());
        assert!(thematic_break(&str_to_items("-*-\n")).is_none());
    }

    #[test]
    fn html_tags() {
        assert_eq!(html_tag(&str_to_items("<a href=\"x\">rest")), Some(12));
        assert_eq!(html_tag(&str_to_items("</div>")), Some(6));
        assert_eq!(html_tag(&str_to_items("<!-- c -->x")), Some(10));
        assert!(html_tag(&str_to_items("<1bad>")).is_none());
    }

    #[test]
    fn autolinks() {
        assert_eq!(
            autolink_uri(&str_to_items("<https://example.com>")),
            Some(21)
        );
        assert!(autolink_uri(&str_to_items("<https://e xample.com>")).is_none());
        assert_eq!(autolink_email(&str_to_items("<a@b.com>")), Some(9));
    }
}
