//! The inline parser.
//!
//! Runs after block parsing closes a node whose tokens contain inline
//! content.  Works a byte at a time over the node's tokens: every inline
//! trigger byte has a handler, everything between triggers becomes a text
//! node, and emphasis is resolved at the end with the classical delimiter
//! stack.

use std::cell::Cell;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use unicode_categories::UnicodeCategories;

use crate::entity;
use crate::nodes::{Arena, Ast, AstNode, NodeCodeSpan, NodeValue};
use crate::parser::link_ref_def::{
    parse_link_dest, parse_link_label, parse_link_title, LinkRefDef,
};
use crate::parser::{autolink, math, Options};
use crate::scanners::{self, is_ascii_punct, is_whitespace};
use crate::strings::{encode_destination, normalize_label};
use crate::tokens::{self, decode_rune, decode_rune_before, str_to_items, Item, Tokens};

const MAXBACKTICKS: usize = 80;

/// Parse `node`'s accumulated tokens into an inline subtree.
pub fn parse_inlines<'a>(
    arena: &'a Arena<'a>,
    options: &Options,
    refmap: &FxHashMap<String, LinkRefDef>,
    footnote_labels: &FxHashSet<String>,
    node: &'a AstNode<'a>,
) {
    let input: Tokens = {
        let mut ast = node.data.borrow_mut();
        let taken = std::mem::take(&mut ast.tokens);
        tokens::trim_right(&taken).to_vec()
    };

    let delimiter_arena = typed_arena::Arena::new();
    let mut subj = Subject::new(
        arena,
        options,
        input,
        refmap,
        footnote_labels,
        &delimiter_arena,
    );
    while subj.parse_inline(node) {}
    subj.process_emphasis(0);
}

struct Delimiter<'a: 'd, 'd> {
    prev: Cell<Option<&'d Delimiter<'a, 'd>>>,
    next: Cell<Option<&'d Delimiter<'a, 'd>>>,
    inl: &'a AstNode<'a>,
    position: usize,
    /// The original delimiter-run length, for the rule-of-three test.
    length: usize,
    delim_byte: u8,
    can_open: bool,
    can_close: bool,
}

struct Bracket<'a> {
    inl_text: &'a AstNode<'a>,
    /// Input position just after the opening bracket.
    position: usize,
    image: bool,
    /// Cleared on enclosing link creation: no links within links.
    active: bool,
}

struct Subject<'a: 'd, 'o, 'r, 'd> {
    arena: &'a Arena<'a>,
    options: &'o Options,
    input: Tokens,
    pos: usize,
    refmap: &'r FxHashMap<String, LinkRefDef>,
    footnote_labels: &'r FxHashSet<String>,
    delimiter_arena: &'d typed_arena::Arena<Delimiter<'a, 'd>>,
    last_delimiter: Option<&'d Delimiter<'a, 'd>>,
    brackets: SmallVec<[Bracket<'a>; 8]>,
    backticks: [usize; MAXBACKTICKS + 1],
    scanned_for_backticks: bool,
    special_bytes: [bool; 256],
}

impl<'a, 'o, 'r, 'd> Subject<'a, 'o, 'r, 'd> {
    fn new(
        arena: &'a Arena<'a>,
        options: &'o Options,
        input: Tokens,
        refmap: &'r FxHashMap<String, LinkRefDef>,
        footnote_labels: &'r FxHashSet<String>,
        delimiter_arena: &'d typed_arena::Arena<Delimiter<'a, 'd>>,
    ) -> Self {
        let mut s = Subject {
            arena,
            options,
            input,
            pos: 0,
            refmap,
            footnote_labels,
            delimiter_arena,
            last_delimiter: None,
            brackets: SmallVec::new(),
            backticks: [0; MAXBACKTICKS + 1],
            scanned_for_backticks: false,
            special_bytes: [false; 256],
        };
        for &b in b"\n\r\\`&<[]!*_" {
            s.special_bytes[b as usize] = true;
        }
        if options.gfm_strikethrough {
            s.special_bytes[b'~' as usize] = true;
        }
        if options.math {
            s.special_bytes[b'$' as usize] = true;
        }
        if options.emoji {
            s.special_bytes[b':' as usize] = true;
        }
        if options.gfm_auto_link {
            s.special_bytes[b'w' as usize] = true;
            s.special_bytes[b'h' as usize] = true;
            s.special_bytes[b'f' as usize] = true;
        }
        s
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).map(|i| i.term)
    }

    fn peek_byte_n(&self, n: usize) -> Option<u8> {
        self.input.get(self.pos + n).map(|i| i.term)
    }

    fn take_while(&mut self, b: u8) -> usize {
        let start = self.pos;
        while self.peek_byte() == Some(b) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn find_special_char(&self, from: usize) -> usize {
        let mut n = from;
        while n < self.input.len() && !self.special_bytes[self.input[n].term as usize] {
            n += 1;
        }
        n
    }

    fn make_inline(&self, value: NodeValue) -> &'a AstNode<'a> {
        let line = self.input.get(self.pos.min(self.input.len().saturating_sub(1)));
        let start_line = line.map(|i| i.ln as usize).unwrap_or(0);
        let node = self.arena.alloc(AstNode::new(Ast::new(value, start_line)));
        node.data.borrow_mut().open = false;
        node
    }

    fn make_text(&self, contents: Tokens) -> &'a AstNode<'a> {
        let node = self.make_inline(NodeValue::Text);
        node.data.borrow_mut().tokens = contents;
        node
    }

    fn make_text_str(&self, s: &str) -> &'a AstNode<'a> {
        self.make_text(str_to_items(s))
    }

    /// Parse one inline construct, appending the produced node to `node`.
    /// Returns false at end of input.
    fn parse_inline(&mut self, node: &'a AstNode<'a>) -> bool {
        let b = match self.peek_byte() {
            Some(b) => b,
            None => return false,
        };

        let new_inl: &'a AstNode<'a> = match b {
            b'\n' | b'\r' => self.handle_newline(node),
            b'`' => self.handle_backticks(),
            b'\\' => self.handle_backslash(),
            b'&' => self.handle_entity(),
            b'<' => self.handle_pointy_brace(),
            b'*' | b'_' => self.handle_delim(b),
            b'~' if self.options.gfm_strikethrough => self.handle_delim(b),
            b'[' => match self.handle_footnote_ref() {
                Some(inl) => inl,
                None => {
                    self.pos += 1;
                    let inl = self.make_text_str("[");
                    self.push_bracket(false, inl);
                    inl
                }
            },
            b'!' if self.peek_byte_n(1) == Some(b'[') => {
                self.pos += 2;
                let inl = self.make_text_str("![");
                self.push_bracket(true, inl);
                inl
            }
            b']' => self.handle_close_bracket(),
            b'$' if self.options.math => self.handle_dollars(),
            b':' if self.options.emoji => match self.handle_colons() {
                Some(inl) => inl,
                None => self.run_of_text(),
            },
            b'w' | b'h' | b'f' if self.options.gfm_auto_link => {
                match self.handle_autolink_candidate() {
                    Some(inl) => inl,
                    None => self.run_of_text(),
                }
            }
            _ => self.run_of_text(),
        };

        node.append(new_inl);
        !self.eof()
    }

    /// A plain text run: the current byte plus everything up to the next
    /// trigger byte.
    fn run_of_text(&mut self) -> &'a AstNode<'a> {
        let endpos = self.find_special_char(self.pos + 1);
        let contents = self.input[self.pos..endpos].to_vec();
        self.pos = endpos;
        self.make_text(contents)
    }

    fn handle_newline(&mut self, node: &'a AstNode<'a>) -> &'a AstNode<'a> {
        let nlpos = self.pos;
        self.pos += 1;

        let hard = nlpos >= 2
            && self.input[nlpos - 1].term == b' '
            && self.input[nlpos - 2].term == b' ';

        // Trailing spaces belong to the break, not the text.
        if let Some(last) = node.last_child() {
            let mut ast = last.data.borrow_mut();
            if matches!(ast.value, NodeValue::Text) {
                let trimmed_len = {
                    let mut len = ast.tokens.len();
                    while len > 0 && ast.tokens[len - 1].term == b' ' {
                        len -= 1;
                    }
                    len
                };
                ast.tokens.truncate(trimmed_len);
            }
        }

        // Leading spaces of the next line are ignored.
        while self.peek_byte() == Some(b' ') {
            self.pos += 1;
        }

        if hard {
            self.make_inline(NodeValue::HardBreak)
        } else {
            self.make_inline(NodeValue::SoftBreak)
        }
    }

    fn handle_backslash(&mut self) -> &'a AstNode<'a> {
        self.pos += 1;
        match self.peek_byte() {
            Some(b) if is_ascii_punct(b) => {
                let item = self.input[self.pos];
                self.pos += 1;
                self.make_text(vec![item])
            }
            Some(b'\n') | Some(b'\r') => {
                self.pos += 1;
                while self.peek_byte() == Some(b' ') {
                    self.pos += 1;
                }
                self.make_inline(NodeValue::HardBreak)
            }
            _ => self.make_text_str("\\"),
        }
    }

    fn handle_entity(&mut self) -> &'a AstNode<'a> {
        self.pos += 1;
        let rest = tokens::items_to_bytes(&self.input[self.pos..]);
        match entity::unescape(&rest) {
            None => self.make_text_str("&"),
            Some((decoded, consumed)) => {
                self.pos += consumed;
                self.make_text(decoded.into_iter().map(Item::new).collect())
            }
        }
    }

    fn handle_backticks(&mut self) -> &'a AstNode<'a> {
        let startpos = self.pos;
        let openticks = self.take_while(b'`');

        match self.scan_to_closing_backtick(openticks) {
            None => {
                self.pos = startpos + openticks;
                self.make_text(self.input[startpos..self.pos].to_vec())
            }
            Some(endpos) => {
                let content = normalize_code_span(&self.input[startpos + openticks..endpos - openticks]);
                let span = self.make_inline(NodeValue::CodeSpan(NodeCodeSpan {
                    marker_len: openticks,
                }));
                let inner = self.make_inline(NodeValue::CodeSpanContent);
                inner.data.borrow_mut().tokens = content;
                span.append(inner);
                span
            }
        }
    }

    fn scan_to_closing_backtick(&mut self, openticklength: usize) -> Option<usize> {
        if openticklength > MAXBACKTICKS {
            return None;
        }

        if self.scanned_for_backticks && self.backticks[openticklength] <= self.pos {
            return None;
        }

        loop {
            while self.peek_byte().map_or(false, |b| b != b'`') {
                self.pos += 1;
            }
            if self.eof() {
                self.scanned_for_backticks = true;
                return None;
            }
            let numticks = self.take_while(b'`');
            if numticks <= MAXBACKTICKS {
                self.backticks[numticks] = self.pos - numticks;
            }
            if numticks == openticklength {
                return Some(self.pos);
            }
        }
    }

    fn handle_pointy_brace(&mut self) -> &'a AstNode<'a> {
        let tail = &self.input[self.pos..];

        if let Some(len) = scanners::autolink_uri(tail) {
            let url = tail[1..len - 1].to_vec();
            self.pos += len;
            return self.make_autolink(url, "");
        }
        if let Some(len) = scanners::autolink_email(tail) {
            let url = tail[1..len - 1].to_vec();
            self.pos += len;
            return self.make_autolink(url, "mailto:");
        }
        if let Some(len) = scanners::html_tag(tail) {
            let contents = tail[..len].to_vec();
            self.pos += len;
            let inl = self.make_inline(NodeValue::InlineHtml);
            inl.data.borrow_mut().tokens = contents;
            return inl;
        }

        self.pos += 1;
        self.make_text_str("<")
    }

    /// An autolink is a `Link` with no bracket markers: just the encoded
    /// destination and the visible text.
    fn make_autolink(&mut self, url: Tokens, scheme_prefix: &str) -> &'a AstNode<'a> {
        let link = self.make_inline(NodeValue::Link);
        let mut dest = String::from(scheme_prefix);
        dest.push_str(&tokens::items_to_str(&url));
        let dest_node = self.make_inline(NodeValue::LinkDest);
        dest_node.data.borrow_mut().tokens = str_to_items(&encode_destination(&dest));
        link.append(dest_node);
        link.append(self.make_text(url));
        link
    }

    fn handle_delim(&mut self, b: u8) -> &'a AstNode<'a> {
        let (numdelims, can_open, can_close) = self.scan_delims(b);
        let contents = self.input[self.pos - numdelims..self.pos].to_vec();
        let inl = self.make_text(contents);

        if can_open || can_close {
            self.push_delimiter(b, can_open, can_close, inl, numdelims);
        }
        inl
    }

    fn scan_delims(&mut self, b: u8) -> (usize, bool, bool) {
        let before_char = decode_rune_before(&self.input, self.pos);

        let numdelims = self.take_while(b);

        let after_char = if self.eof() {
            '\n'
        } else {
            decode_rune(&self.input[self.pos..]).0
        };

        let left_flanking = numdelims > 0
            && !after_char.is_whitespace()
            && (!is_punctuation(after_char)
                || before_char.is_whitespace()
                || is_punctuation(before_char));
        let right_flanking = numdelims > 0
            && !before_char.is_whitespace()
            && (!is_punctuation(before_char)
                || after_char.is_whitespace()
                || is_punctuation(after_char));

        if b == b'_' {
            (
                numdelims,
                left_flanking && (!right_flanking || is_punctuation(before_char)),
                right_flanking && (!left_flanking || is_punctuation(after_char)),
            )
        } else {
            (numdelims, left_flanking, right_flanking)
        }
    }

    fn push_delimiter(
        &mut self,
        c: u8,
        can_open: bool,
        can_close: bool,
        inl: &'a AstNode<'a>,
        length: usize,
    ) {
        let d = self.delimiter_arena.alloc(Delimiter {
            prev: Cell::new(self.last_delimiter),
            next: Cell::new(None),
            inl,
            position: self.pos,
            length,
            delim_byte: c,
            can_open,
            can_close,
        });
        if let Some(last) = self.last_delimiter {
            last.next.set(Some(d));
        }
        self.last_delimiter = Some(d);
    }

    fn remove_delimiter(&mut self, delimiter: &'d Delimiter<'a, 'd>) {
        if let Some(next) = delimiter.next.get() {
            next.prev.set(delimiter.prev.get());
        } else {
            self.last_delimiter = delimiter.prev.get();
        }
        if let Some(prev) = delimiter.prev.get() {
            prev.next.set(delimiter.next.get());
        }
    }

    fn remove_delimiters(&mut self, stack_bottom: usize) {
        while let Some(last) = self.last_delimiter {
            if last.position < stack_bottom {
                break;
            }
            self.remove_delimiter(last);
        }
    }

    /// Resolve emphasis over the delimiter stack above `stack_bottom`.  For
    /// every closing run, search down for a matching opener observing the
    /// rule of three; unmatched runs stay literal text.
    fn process_emphasis(&mut self, stack_bottom: usize) {
        // Prevents quadratic rescans of the stack bottom for openers known
        // to be absent.
        let mut openers_bottom: [usize; 8] = [stack_bottom; 8];

        let mut candidate = self.last_delimiter;
        let mut closer: Option<&'d Delimiter<'a, 'd>> = None;
        while let Some(c) = candidate {
            if c.position < stack_bottom {
                break;
            }
            closer = candidate;
            candidate = c.prev.get();
        }

        while let Some(c) = closer {
            if !c.can_close {
                closer = c.next.get();
                continue;
            }

            let ix = match c.delim_byte {
                b'~' => 0,
                b'_' => 1,
                b'*' => 2 + (if c.can_open { 3 } else { 0 }) + c.length % 3,
                _ => unreachable!(),
            };

            let mut opener = c.prev.get();
            let mut opener_found = false;
            let mut mod_three_rule_invoked = false;
            while let Some(o) = opener {
                if o.position < openers_bottom[ix] {
                    break;
                }
                if o.can_open && o.delim_byte == c.delim_byte {
                    // Rule of three: a run that can both open and close
                    // cannot pair when the combined length is a multiple of
                    // three, unless both are.
                    let odd_match = (c.can_open || o.can_close)
                        && ((o.length + c.length) % 3 == 0)
                        && !(o.length % 3 == 0 && c.length % 3 == 0);
                    if !odd_match {
                        opener_found = true;
                        break;
                    }
                    mod_three_rule_invoked = true;
                }
                opener = o.prev.get();
            }

            let old_c = c;

            if opener_found {
                closer = self.insert_emph(opener.unwrap(), c);
            } else {
                closer = c.next.get();
                if !mod_three_rule_invoked {
                    openers_bottom[ix] = old_c.position;
                }
                if !old_c.can_open {
                    self.remove_delimiter(old_c);
                }
            }
        }

        self.remove_delimiters(stack_bottom);
    }

    fn insert_emph(
        &mut self,
        opener: &'d Delimiter<'a, 'd>,
        closer: &'d Delimiter<'a, 'd>,
    ) -> Option<&'d Delimiter<'a, 'd>> {
        let delim_byte = opener.delim_byte;
        let mut opener_num_bytes = opener.inl.data.borrow().tokens.len();
        let mut closer_num_bytes = closer.inl.data.borrow().tokens.len();
        let use_delims = if closer_num_bytes >= 2 && opener_num_bytes >= 2 {
            2
        } else {
            1
        };

        opener_num_bytes -= use_delims;
        closer_num_bytes -= use_delims;

        // Strikethrough only pairs runs of equal, fully consumed length.
        if delim_byte == b'~' && (opener_num_bytes != closer_num_bytes || opener_num_bytes > 0) {
            return None;
        }

        opener.inl.data.borrow_mut().tokens.truncate(opener_num_bytes);
        closer.inl.data.borrow_mut().tokens.truncate(closer_num_bytes);

        // Remove delimiters strictly between the opener and closer.
        let mut delim = closer.prev.get();
        while let Some(d) = delim {
            if std::ptr::eq(d, opener) {
                break;
            }
            let prev = d.prev.get();
            self.remove_delimiter(d);
            delim = prev;
        }

        let value = if delim_byte == b'~' {
            NodeValue::Strikethrough
        } else if use_delims == 2 {
            NodeValue::Strong(delim_byte)
        } else {
            NodeValue::Emphasis(delim_byte)
        };
        let emph = self.make_inline(value);

        // Move everything between the delimiter text nodes into the new
        // emphasis node.
        let mut tmp = opener.inl.next_sibling();
        while let Some(t) = tmp {
            if t.same_node(closer.inl) {
                break;
            }
            let next = t.next_sibling();
            emph.append(t);
            tmp = next;
        }
        opener.inl.insert_after(emph);

        if opener_num_bytes == 0 {
            opener.inl.detach();
            self.remove_delimiter(opener);
        }

        if closer_num_bytes == 0 {
            closer.inl.detach();
            let next = closer.next.get();
            self.remove_delimiter(closer);
            next
        } else {
            Some(closer)
        }
    }

    fn push_bracket(&mut self, image: bool, inl_text: &'a AstNode<'a>) {
        self.brackets.push(Bracket {
            inl_text,
            position: self.pos,
            image,
            active: true,
        });
    }

    fn handle_footnote_ref(&mut self) -> Option<&'a AstNode<'a>> {
        if !self.options.footnotes || self.peek_byte_n(1) != Some(b'^') {
            return None;
        }
        let tail = &self.input[self.pos..];
        let mut i = 2;
        while i < tail.len() && !matches!(tail[i].term, b']' | b'[' | b'\n' | b'\r') {
            i += 1;
        }
        if i == 2 || tokens::peek(tail, i) != b']' {
            return None;
        }
        let label = normalize_label(&tokens::items_to_str(&tail[2..i]));
        if !self.footnote_labels.contains(&label) {
            return None;
        }
        self.pos += i + 1;
        Some(self.make_inline(NodeValue::FootnoteRef(label)))
    }

    /// On `]`: look back for a matching bracket, then try (in order) the
    /// inline, collapsed, full and shortcut link forms.
    fn handle_close_bracket(&mut self) -> &'a AstNode<'a> {
        self.pos += 1;

        let (inl_text, position, image, active) = match self.brackets.last() {
            None => return self.make_text_str("]"),
            Some(b) => (b.inl_text, b.position, b.image, b.active),
        };

        if !active {
            self.brackets.pop();
            return self.make_text_str("]");
        }

        let label_end = self.pos - 1;

        // Inline form: `](dest "title")`.
        let mut resolved: Option<(String, String, usize)> = None;
        if self.peek_byte() == Some(b'(') {
            resolved = self.scan_inline_link_tail();
        }

        // Reference forms.
        if resolved.is_none() {
            let inner = tokens::items_to_str(&self.input[position..label_end]);
            let (label, consumed) = if self.peek_byte() == Some(b'[') {
                if self.peek_byte_n(1) == Some(b']') {
                    (inner.clone(), 2)
                } else {
                    match parse_link_label(&self.input[self.pos..]) {
                        Some((label, consumed)) => (label, consumed),
                        None => (inner.clone(), 0),
                    }
                }
            } else {
                (inner.clone(), 0)
            };

            if let Some(def) = self.refmap.get(&normalize_label(&label)) {
                resolved = Some((def.destination.clone(), def.title.clone(), consumed));
            }
        }

        let (dest, title, extra_consumed) = match resolved {
            Some(r) => r,
            None => {
                self.brackets.pop();
                return self.make_text_str("]");
            }
        };
        self.pos += extra_consumed;

        let link = self.make_inline(if image {
            NodeValue::Image
        } else {
            NodeValue::Link
        });

        if image {
            link.append(self.make_marker(NodeValue::Bang, "!"));
        }
        link.append(self.make_marker(NodeValue::OpenBracket, "["));

        // The label inlines are the siblings between the opener text node
        // and the end of the parent.
        let mut tmp = inl_text.next_sibling();
        while let Some(t) = tmp {
            let next = t.next_sibling();
            link.append(t);
            tmp = next;
        }
        inl_text.detach();
        self.process_emphasis(position);

        link.append(self.make_marker(NodeValue::CloseBracket, "]"));
        link.append(self.make_marker(NodeValue::OpenParen, "("));
        let dest_node = self.make_inline(NodeValue::LinkDest);
        dest_node.data.borrow_mut().tokens = str_to_items(&dest);
        link.append(dest_node);
        if !title.is_empty() {
            link.append(self.make_inline(NodeValue::LinkSpace));
            let title_node = self.make_inline(NodeValue::LinkTitle);
            title_node.data.borrow_mut().tokens = str_to_items(&title);
            link.append(title_node);
        }
        link.append(self.make_marker(NodeValue::CloseParen, ")"));

        self.brackets.pop();
        if !image {
            for b in self.brackets.iter_mut() {
                if !b.image {
                    b.active = false;
                }
            }
        }

        // Everything after the opener moved into the link and the opener
        // text detached, so the caller's append lands the link exactly
        // where the construct began.
        link
    }

    fn make_marker(&self, value: NodeValue, text: &str) -> &'a AstNode<'a> {
        let marker = self.make_inline(value);
        marker.data.borrow_mut().tokens = str_to_items(text);
        marker
    }

    /// Scan `(dest "title")` after a close bracket.  Returns the encoded
    /// destination, unescaped title, and items consumed including parens.
    fn scan_inline_link_tail(&mut self) -> Option<(String, String, usize)> {
        let base = self.pos;
        let mut i = base + 1;
        i += tokens::trim_left(&self.input[i..]).0.len();

        if tokens::peek(&self.input, i) == b')' {
            return Some((String::new(), String::new(), i + 1 - base));
        }

        let (dest, dest_len) = parse_link_dest(&self.input[i..])?;
        i += dest_len;

        let ws = tokens::trim_left(&self.input[i..]).0.len();
        i += ws;

        let mut title = String::new();
        if ws > 0 {
            let (valid, parsed, title_len) = parse_link_title(&self.input[i..]);
            if valid && title_len > 0 {
                title = parsed;
                i += title_len;
                i += tokens::trim_left(&self.input[i..]).0.len();
            }
        }

        if tokens::peek(&self.input, i) != b')' {
            return None;
        }
        Some((dest, title, i + 1 - base))
    }

    fn handle_dollars(&mut self) -> &'a AstNode<'a> {
        let startpos = self.pos;
        let allow_digit = self.options.inline_math_allow_digit_after_open_marker;

        match math::scan_inline_math(&self.input, self.pos, allow_digit) {
            Some((open_len, content_end, end)) => {
                self.pos = end;
                let inline_math = self.make_inline(NodeValue::InlineMath);
                let marker: String = "$".repeat(open_len);
                inline_math.append(self.make_marker(NodeValue::InlineMathOpenMarker, &marker));
                let content = self.make_inline(NodeValue::InlineMathContent);
                content.data.borrow_mut().tokens =
                    self.input[startpos + open_len..content_end].to_vec();
                inline_math.append(content);
                inline_math.append(self.make_marker(NodeValue::InlineMathCloseMarker, &marker));
                inline_math
            }
            None => {
                self.take_while(b'$');
                self.make_text(self.input[startpos..self.pos].to_vec())
            }
        }
    }

    fn handle_colons(&mut self) -> Option<&'a AstNode<'a>> {
        let tail = &self.input[self.pos..];
        let mut i = 1;
        while i < tail.len()
            && (tail[i].term.is_ascii_lowercase()
                || tail[i].term.is_ascii_digit()
                || matches!(tail[i].term, b'_' | b'+' | b'-'))
        {
            i += 1;
        }
        if i < 2 || tokens::peek(tail, i) != b':' {
            return None;
        }
        let alias = tokens::items_to_str(&tail[1..i]);
        let alias_text: Tokens = tail[..i + 1].to_vec();

        let emoji = self.make_inline(NodeValue::Emoji);
        if let Some(resolved) = emojis::get_by_shortcode(&alias) {
            let unicode = self.make_text_str(resolved.as_str());
            emoji.append(unicode);
        } else if !self.options.emoji_site.is_empty() {
            let img = self.make_inline(NodeValue::EmojiImg);
            img.data.borrow_mut().tokens = str_to_items(&format!(
                "<img alt=\"{alias}\" class=\"emoji\" src=\"{site}/{alias}.png\" title=\"{alias}\" />",
                alias = alias,
                site = self.options.emoji_site,
            ));
            emoji.append(img);
        } else {
            return None;
        }
        let alias_node = self.make_inline(NodeValue::EmojiAlias);
        alias_node.data.borrow_mut().tokens = alias_text;
        emoji.append(alias_node);

        self.pos += i + 1;
        Some(emoji)
    }

    fn handle_autolink_candidate(&mut self) -> Option<&'a AstNode<'a>> {
        let boundary_ok = self.pos == 0 || {
            let b = self.input[self.pos - 1].term;
            is_whitespace(b) || matches!(b, b'*' | b'_' | b'~' | b'(')
        };
        if !boundary_ok {
            return None;
        }

        let (len, scheme_prefix) = autolink::scan_url(&self.input, self.pos)?;
        let url = self.input[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Some(self.make_autolink(url, scheme_prefix))
    }
}

/// CommonMark code-span normalization: line endings become spaces, and one
/// leading plus one trailing space are stripped when both are present and
/// the content is not all spaces.
fn normalize_code_span(content: &[Item]) -> Tokens {
    let mut out: Tokens = content
        .iter()
        .map(|i| {
            if i.term == b'\n' || i.term == b'\r' {
                Item { term: b' ', ..*i }
            } else {
                *i
            }
        })
        .collect();

    let all_spaces = out.iter().all(|i| i.term == b' ');
    if !all_spaces
        && out.len() >= 2
        && out[0].term == b' '
        && out[out.len() - 1].term == b' '
    {
        out.remove(0);
        out.pop();
    }
    out
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_punctuation() || c.is_symbol()
}
