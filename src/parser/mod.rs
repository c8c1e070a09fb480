//! The line-oriented block parser.
//!
//! Parsing maintains a stack of open containers which is always the left
//! spine of the tree.  Every input line goes through four phases: a descent
//! over the open containers (each block kind's *continue* hook), a start
//! phase trying block openers in priority order, a content phase appending
//! the remainder to the deepest leaf, and a close phase finalizing anything
//! the descent failed to match.

mod autolink;
mod inlines;
mod link_ref_def;
mod math;
pub mod options;
mod table;

pub use self::link_ref_def::LinkRefDef;
pub use self::options::Options;

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::nodes::{
    can_contain_type, last_child_is_open, Arena, Ast, AstNode, ListDelimType, ListType,
    NodeCodeBlock, NodeHeading, NodeList, NodeValue,
};
use crate::scanners::{self, is_line_end, is_space_or_tab};
use crate::strings;
use crate::tokens::{self, Item, Tokens};
use crate::typographer;

pub const TAB_STOP: usize = 4;
pub const CODE_INDENT: usize = 4;

// Deeply nested lists are almost certainly adversarial input; cap the
// nesting depth the start phase will open.
const MAX_NESTING: usize = 100;

/// Parse a Markdown document to an AST.
///
/// See the documentation of the crate root for an example.
pub fn parse_document<'a>(
    arena: &'a Arena<'a>,
    buffer: &str,
    options: &Options,
) -> &'a AstNode<'a> {
    let root: &'a AstNode<'a> = arena.alloc(AstNode::new(Ast::new(NodeValue::Document, 1)));
    let mut parser = Parser::new(arena, root, options);
    parser.feed(buffer);
    parser.finish()
}

/// The result of a block's *continue* hook when a new line is matched
/// against an open container.
enum Continuation {
    /// The container stays open and the descent continues.
    Matched,
    /// The container cannot contain this line; it and everything deeper
    /// will be closed.
    Unmatched,
    /// Terminal match: the line closed the container (a fence close), and
    /// the rest of the line is spent.
    Finalized,
}

/// The parsing context: the line reader (tab-aware offsets into the
/// current line), the open-container tip, the link reference map and the
/// options record.
pub struct Parser<'a, 'o> {
    arena: &'a Arena<'a>,
    root: &'a AstNode<'a>,
    /// The tip: deepest open container; new content attaches here.
    current: &'a AstNode<'a>,
    options: &'o Options,
    line_number: usize,
    /// Byte offset into the current line.
    offset: usize,
    /// Visual column, with tabs expanded to 4-column stops.
    column: usize,
    /// Byte offset of the next non-space byte.
    next_nonspace: usize,
    /// Visual column of the next non-space byte.
    next_nonspace_column: usize,
    indent: usize,
    blank: bool,
    partially_consumed_tab: bool,
    link_ref_defs: FxHashMap<String, LinkRefDef>,
}

impl<'a, 'o> Parser<'a, 'o> {
    fn new(arena: &'a Arena<'a>, root: &'a AstNode<'a>, options: &'o Options) -> Self {
        Parser {
            arena,
            root,
            current: root,
            options,
            line_number: 0,
            offset: 0,
            column: 0,
            next_nonspace: 0,
            next_nonspace_column: 0,
            indent: 0,
            blank: false,
            partially_consumed_tab: false,
            link_ref_defs: FxHashMap::default(),
        }
    }

    fn feed(&mut self, buffer: &str) {
        let normalized: Cow<str> = if buffer.contains('\0') || buffer.contains('\r') {
            Cow::Owned(
                buffer
                    .replace("\r\n", "\n")
                    .replace('\r', "\n")
                    .replace('\0', "\u{FFFD}"),
            )
        } else {
            Cow::Borrowed(buffer)
        };

        for (ix, line) in normalized.split_inclusive('\n').enumerate() {
            let ln = (ix + 1) as u32;
            let mut items: Tokens = line
                .bytes()
                .enumerate()
                .map(|(col, term)| Item {
                    term,
                    ln,
                    col: col as u32,
                })
                .collect();
            if items.last().map(|i| i.term) != Some(b'\n') {
                items.push(Item::new(b'\n'));
            }
            self.process_line(&items);
        }
    }

    fn find_next_nonspace(&mut self, line: &[Item]) {
        let mut chars_to_tab = TAB_STOP - (self.column % TAB_STOP);

        if self.next_nonspace <= self.offset {
            self.next_nonspace = self.offset;
            self.next_nonspace_column = self.column;

            while self.next_nonspace < line.len() {
                match line[self.next_nonspace].term {
                    b' ' => {
                        self.next_nonspace += 1;
                        self.next_nonspace_column += 1;
                        chars_to_tab -= 1;
                        if chars_to_tab == 0 {
                            chars_to_tab = TAB_STOP;
                        }
                    }
                    b'\t' => {
                        self.next_nonspace += 1;
                        self.next_nonspace_column += chars_to_tab;
                        chars_to_tab = TAB_STOP;
                    }
                    _ => break,
                }
            }
        }

        self.indent = self.next_nonspace_column - self.column;
        self.blank =
            self.next_nonspace < line.len() && is_line_end(line[self.next_nonspace].term);
    }

    /// Advance the cursor by `count` units: visual columns when `columns`
    /// (tabs expand at 4-column stops, honoring a partially consumed tab),
    /// byte items otherwise.
    fn advance_offset(&mut self, line: &[Item], mut count: usize, columns: bool) {
        while count > 0 {
            match line[self.offset].term {
                b'\t' => {
                    let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
                    if columns {
                        self.partially_consumed_tab = chars_to_tab > count;
                        let chars_to_advance = chars_to_tab.min(count);
                        self.column += chars_to_advance;
                        self.offset += if self.partially_consumed_tab { 0 } else { 1 };
                        count -= chars_to_advance;
                    } else {
                        self.partially_consumed_tab = false;
                        self.column += chars_to_tab;
                        self.offset += 1;
                        count -= 1;
                    }
                }
                _ => {
                    self.partially_consumed_tab = false;
                    self.offset += 1;
                    self.column += 1;
                    count -= 1;
                }
            }
        }
    }

    fn advance_next_nonspace(&mut self) {
        self.offset = self.next_nonspace;
        self.column = self.next_nonspace_column;
        self.partially_consumed_tab = false;
    }

    fn process_line(&mut self, line: &[Item]) {
        self.offset = 0;
        self.column = 0;
        self.next_nonspace = 0;
        self.next_nonspace_column = 0;
        self.indent = 0;
        self.blank = false;
        self.partially_consumed_tab = false;

        if self.line_number == 0
            && line.len() >= 3
            && line[0].term == 0xef
            && line[1].term == 0xbb
            && line[2].term == 0xbf
        {
            self.offset += 3;
        }

        self.line_number += 1;

        let mut all_matched = true;
        if let Some(last_matched_container) = self.check_open_blocks(line, &mut all_matched) {
            let mut container = last_matched_container;
            let current = self.current;
            self.open_new_blocks(&mut container, line, all_matched);

            if current.same_node(self.current) {
                self.add_text_to_container(container, last_matched_container, line);
            }
        }
    }

    // Descent phase: walk the open-container spine, invoking each block's
    // continue hook.  Returns the deepest matched container, or `None` when
    // a terminal match consumed the line.
    fn check_open_blocks(
        &mut self,
        line: &[Item],
        all_matched: &mut bool,
    ) -> Option<&'a AstNode<'a>> {
        let (new_all_matched, mut container, should_continue) =
            self.check_open_blocks_inner(self.root, line);

        *all_matched = new_all_matched;
        if !*all_matched {
            container = container.parent().unwrap();
        }

        if should_continue {
            Some(container)
        } else {
            None
        }
    }

    fn check_open_blocks_inner(
        &mut self,
        mut container: &'a AstNode<'a>,
        line: &[Item],
    ) -> (bool, &'a AstNode<'a>, bool) {
        while last_child_is_open(container) {
            container = container.last_child().unwrap();
            let ast = &mut *container.data.borrow_mut();

            self.find_next_nonspace(line);

            match self.continue_block(container, ast, line) {
                Continuation::Matched => {}
                Continuation::Unmatched => return (false, container, true),
                Continuation::Finalized => return (false, container, false),
            }
        }

        (true, container, true)
    }

    fn continue_block(
        &mut self,
        container: &'a AstNode<'a>,
        ast: &mut Ast,
        line: &[Item],
    ) -> Continuation {
        match ast.value {
            NodeValue::BlockQuote => {
                if self.parse_block_quote_prefix(line) {
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            NodeValue::ListItem(ref nl) => {
                if self.parse_list_item_prefix(line, container, nl) {
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            NodeValue::CodeBlock(..) => self.continue_code_block(line, container, ast),
            NodeValue::HtmlBlock(ref nhb) => {
                if matches!(nhb.block_type, 1..=5) || !self.blank {
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            NodeValue::MathBlock => self.continue_math_block(line, container, ast),
            NodeValue::Paragraph => {
                if self.blank {
                    Continuation::Unmatched
                } else {
                    Continuation::Matched
                }
            }
            NodeValue::Table(..) => {
                if table::row_matches(&line[self.next_nonspace..]) {
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            NodeValue::Heading(..)
            | NodeValue::ThematicBreak
            | NodeValue::TableHead
            | NodeValue::TableRow
            | NodeValue::TableCell(..)
            | NodeValue::LinkRefDefBlock
            | NodeValue::Toc => Continuation::Unmatched,
            NodeValue::FootnoteDef(..) => {
                if self.indent >= CODE_INDENT {
                    self.advance_offset(line, CODE_INDENT, true);
                    Continuation::Matched
                } else if self.blank {
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            _ => Continuation::Matched,
        }
    }

    fn parse_block_quote_prefix(&mut self, line: &[Item]) -> bool {
        let indent = self.indent;
        if indent <= 3 && tokens::peek(line, self.next_nonspace) == b'>' {
            self.advance_offset(line, indent + 1, true);
            if is_space_or_tab(tokens::peek(line, self.offset)) {
                self.advance_offset(line, 1, true);
            }
            return true;
        }
        false
    }

    fn parse_list_item_prefix(
        &mut self,
        line: &[Item],
        container: &'a AstNode<'a>,
        nl: &NodeList,
    ) -> bool {
        if self.indent >= nl.marker_offset + nl.padding {
            self.advance_offset(line, nl.marker_offset + nl.padding, true);
            true
        } else if self.blank && container.first_child().is_some() {
            let offset = self.next_nonspace - self.offset;
            self.advance_offset(line, offset, false);
            true
        } else {
            false
        }
    }

    fn continue_code_block(
        &mut self,
        line: &[Item],
        container: &'a AstNode<'a>,
        ast: &mut Ast,
    ) -> Continuation {
        let (fenced, fence_char, fence_length, fence_offset) = match ast.value {
            NodeValue::CodeBlock(ref ncb) => (
                ncb.fenced,
                ncb.fence_char,
                ncb.fence_length,
                ncb.fence_offset,
            ),
            _ => unreachable!(),
        };

        if !fenced {
            // Indented code block.
            return if self.indent >= CODE_INDENT {
                self.advance_offset(line, CODE_INDENT, true);
                Continuation::Matched
            } else if self.blank {
                self.advance_next_nonspace();
                Continuation::Matched
            } else {
                Continuation::Unmatched
            };
        }

        if self.indent <= 3
            && is_fenced_code_close(&line[self.next_nonspace..], fence_char, fence_length)
        {
            if let NodeValue::CodeBlock(ref mut ncb) = ast.value {
                ncb.closed = true;
            }
            self.advance_offset(line, line.len() - 1 - self.offset, false);
            self.current = self.finalize_borrowed(container, ast).unwrap();
            return Continuation::Finalized;
        }

        // Skip up to fence_offset columns of indentation before the content.
        let mut i = fence_offset;
        while i > 0 && is_space_or_tab(tokens::peek(line, self.offset)) {
            self.advance_offset(line, 1, true);
            i -= 1;
        }
        Continuation::Matched
    }

    fn continue_math_block(
        &mut self,
        line: &[Item],
        container: &'a AstNode<'a>,
        ast: &mut Ast,
    ) -> Continuation {
        if self.indent <= 3 && math::is_math_block_fence(&line[self.next_nonspace..]) {
            self.advance_offset(line, line.len() - 1 - self.offset, false);
            self.current = self.finalize_borrowed(container, ast).unwrap();
            return Continuation::Finalized;
        }
        Continuation::Matched
    }

    // Start phase: try each block opener in priority order until nothing
    // more matches on this line.
    fn open_new_blocks(&mut self, container: &mut &'a AstNode<'a>, line: &[Item], _all_matched: bool) {
        let mut depth = 0;

        while !matches!(
            container.data.borrow().value,
            NodeValue::CodeBlock(..) | NodeValue::HtmlBlock(..) | NodeValue::MathBlock
        ) {
            depth += 1;
            if depth > MAX_NESTING {
                break;
            }

            self.find_next_nonspace(line);
            let indented = self.indent >= CODE_INDENT;

            if !self.handle_block_quote(container, line, indented)
                && !self.handle_atx_heading(container, line, indented)
                && !self.handle_code_fence(container, line, indented)
                && !self.handle_math_block(container, line, indented)
                && !self.handle_html_block(container, line, indented)
                && !self.handle_setext_heading(container, line, indented)
                && !self.handle_thematic_break(container, line, indented)
                && !self.handle_footnote_def(container, line, indented)
                && !self.handle_list_item(container, line, indented)
                && !self.handle_indented_code(container, line, indented)
                && !self.handle_table(container, line, indented)
            {
                break;
            }

            if container.data.borrow().value.accepts_lines() {
                break;
            }
        }
    }

    fn handle_block_quote(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented || tokens::peek(line, self.next_nonspace) != b'>' {
            return false;
        }

        let offset = self.next_nonspace + 1 - self.offset;
        self.advance_offset(line, offset, false);
        if is_space_or_tab(tokens::peek(line, self.offset)) {
            self.advance_offset(line, 1, true);
        }
        *container = self.add_child(*container, NodeValue::BlockQuote);
        true
    }

    fn handle_atx_heading(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented {
            return false;
        }
        let (consumed, level) = match scanners::atx_heading_start(&line[self.next_nonspace..]) {
            Some(m) => m,
            None => return false,
        };

        let start = self.next_nonspace;
        let offset = self.offset;
        self.advance_offset(line, start + consumed - offset, false);
        *container = self.add_child(
            *container,
            NodeValue::Heading(NodeHeading {
                level,
                setext: false,
                id: None,
            }),
        );
        true
    }

    fn handle_code_fence(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented {
            return false;
        }
        let (fence_char, fence_length) = match parse_fenced_code(&line[self.next_nonspace..]) {
            Some(m) => m,
            None => return false,
        };

        let ncb = NodeCodeBlock {
            fenced: true,
            fence_char,
            fence_length,
            fence_offset: self.indent,
            closed: false,
            info: Tokens::new(),
        };
        let start = self.next_nonspace;
        let offset = self.offset;
        *container = self.add_child(*container, NodeValue::CodeBlock(ncb));
        self.advance_offset(line, start + fence_length - offset, false);
        true
    }

    fn handle_math_block(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if !self.options.math || indented {
            return false;
        }
        if !math::is_math_block_fence(&line[self.next_nonspace..]) {
            return false;
        }

        let start = self.next_nonspace;
        let offset = self.offset;
        *container = self.add_child(*container, NodeValue::MathBlock);
        self.advance_offset(line, start + 2 - offset, false);
        true
    }

    fn handle_html_block(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented || tokens::peek(line, self.next_nonspace) != b'<' {
            return false;
        }

        let tail = &line[self.next_nonspace..];
        let block_type = match scanners::html_block_start(tail) {
            Some(t) => Some(t),
            None if !matches!(container.data.borrow().value, NodeValue::Paragraph) => {
                scanners::html_block_start_7(tail)
            }
            None => None,
        };

        match block_type {
            Some(block_type) => {
                *container = self.add_child(
                    *container,
                    NodeValue::HtmlBlock(crate::nodes::NodeHtmlBlock { block_type }),
                );
                true
            }
            None => false,
        }
    }

    fn handle_setext_heading(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented || !matches!(container.data.borrow().value, NodeValue::Paragraph) {
            return false;
        }
        let level = match scanners::setext_heading_line(&line[self.next_nonspace..]) {
            Some(scanners::SetextChar::Equals) => 1,
            Some(scanners::SetextChar::Hyphen) => 2,
            None => return false,
        };

        {
            let mut ast = container.data.borrow_mut();
            ast.value = NodeValue::Heading(NodeHeading {
                level,
                setext: true,
                id: None,
            });
        }
        let adv = line.len() - 1 - self.offset;
        self.advance_offset(line, adv, false);
        true
    }

    fn handle_thematic_break(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented || scanners::thematic_break(&line[self.next_nonspace..]).is_none() {
            return false;
        }

        *container = self.add_child(*container, NodeValue::ThematicBreak);
        let adv = line.len() - 1 - self.offset;
        self.advance_offset(line, adv, false);
        true
    }

    fn handle_footnote_def(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if !self.options.footnotes || indented {
            return false;
        }
        let tail = &line[self.next_nonspace..];
        if tokens::peek(tail, 0) != b'[' || tokens::peek(tail, 1) != b'^' {
            return false;
        }
        let mut i = 2;
        while i < tail.len() && !matches!(tail[i].term, b']' | b'[' | b'\n' | b'\r') {
            i += 1;
        }
        if i == 2 || tokens::peek(tail, i) != b']' || tokens::peek(tail, i + 1) != b':' {
            return false;
        }
        let label = strings::normalize_label(&tokens::items_to_str(&tail[2..i]));

        let offset = self.next_nonspace + i + 2 - self.offset;
        self.advance_offset(line, offset, false);
        if is_space_or_tab(tokens::peek(line, self.offset)) {
            self.advance_offset(line, 1, true);
        }
        *container = self.add_child(*container, NodeValue::FootnoteDef(label));
        true
    }

    fn handle_list_item(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if indented && !matches!(container.data.borrow().value, NodeValue::List(..)) {
            return false;
        }
        let interrupts_paragraph =
            matches!(container.data.borrow().value, NodeValue::Paragraph);
        let (matched, mut nl) =
            match parse_list_marker(line, self.next_nonspace, interrupts_paragraph) {
                Some(m) => m,
                None => return false,
            };

        nl.marker_offset = self.indent;

        let start = self.next_nonspace;
        let offset = self.offset;
        self.advance_offset(line, start + matched - offset, false);

        // Spaces after the marker set the continuation padding: one to four
        // count, otherwise the item is padded as marker-plus-one.
        let (save_partial, save_offset, save_column) =
            (self.partially_consumed_tab, self.offset, self.column);
        while self.column - save_column <= 5 && is_space_or_tab(tokens::peek(line, self.offset)) {
            self.advance_offset(line, 1, true);
        }
        let spaces = self.column - save_column;
        if spaces >= 5 || spaces < 1 || is_line_end(tokens::peek(line, self.offset)) {
            nl.padding = matched + 1;
            self.partially_consumed_tab = save_partial;
            self.offset = save_offset;
            self.column = save_column;
            if spaces >= 1 {
                self.advance_offset(line, 1, true);
            }
        } else {
            nl.padding = matched + spaces;
        }

        let matches_list = match container.data.borrow().value {
            NodeValue::List(ref existing) => lists_match(existing, &nl),
            _ => false,
        };
        if !matches_list {
            *container = self.add_child(*container, NodeValue::List(nl));
        }
        *container = self.add_child(*container, NodeValue::ListItem(nl));
        true
    }

    fn handle_indented_code(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if !indented
            || self.blank
            || matches!(self.current.data.borrow().value, NodeValue::Paragraph)
        {
            return false;
        }

        self.advance_offset(line, CODE_INDENT, true);
        *container = self.add_child(
            *container,
            NodeValue::CodeBlock(NodeCodeBlock {
                fenced: false,
                ..NodeCodeBlock::default()
            }),
        );
        true
    }

    fn handle_table(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &[Item],
        indented: bool,
    ) -> bool {
        if !self.options.gfm_table || indented {
            return false;
        }
        match container.data.borrow().value {
            NodeValue::Paragraph => {}
            NodeValue::Table(..) => {
                return table::append_row(self, *container, line);
            }
            _ => return false,
        }
        table::try_opening_header(self, container, line)
    }

    // Content phase.
    fn add_text_to_container(
        &mut self,
        mut container: &'a AstNode<'a>,
        last_matched_container: &'a AstNode<'a>,
        line: &[Item],
    ) {
        self.find_next_nonspace(line);

        if self.blank {
            if let Some(last_child) = container.last_child() {
                last_child.data.borrow_mut().last_line_blank = true;
            }
        }

        let last_line_blank = self.blank
            && !matches!(
                container.data.borrow().value,
                NodeValue::BlockQuote | NodeValue::Heading(..) | NodeValue::ThematicBreak
            )
            && !matches!(
                container.data.borrow().value,
                NodeValue::CodeBlock(NodeCodeBlock { fenced: true, .. })
            )
            && !(matches!(container.data.borrow().value, NodeValue::ListItem(..))
                && container.first_child().is_none()
                && container.data.borrow().start_line == self.line_number);

        container.data.borrow_mut().last_line_blank = last_line_blank;
        let mut tmp = container;
        while let Some(parent) = tmp.parent() {
            parent.data.borrow_mut().last_line_blank = false;
            tmp = parent;
        }

        // Lazy continuation: an unmatched line that still looks like
        // paragraph text extends the open paragraph.
        if !self.current.same_node(last_matched_container)
            && container.same_node(last_matched_container)
            && !self.blank
            && matches!(self.current.data.borrow().value, NodeValue::Paragraph)
            && !self.current.data.borrow().tokens.is_empty()
        {
            self.add_line(self.current, line);
            return;
        }

        // Close phase for everything the descent did not match.
        while !self.current.same_node(last_matched_container) {
            self.current = self.finalize(self.current).unwrap();
        }

        let html_block_type = match container.data.borrow().value {
            NodeValue::HtmlBlock(ref nhb) => Some(nhb.block_type),
            _ => None,
        };
        if let Some(t) = html_block_type {
            self.add_line(container, line);
            if matches!(t, 1..=5) && scanners::html_block_end(t, &line[self.offset..]) {
                self.current = self.finalize(container).unwrap();
            } else {
                self.current = container;
            }
            return;
        }

        if matches!(
            container.data.borrow().value,
            NodeValue::CodeBlock(..) | NodeValue::MathBlock
        ) {
            self.add_line(container, line);
            self.current = container;
            return;
        }

        if self.blank {
            self.current = container;
            return;
        }

        if container.data.borrow().value.accepts_lines() {
            self.add_line(container, line);
        } else {
            self.advance_next_nonspace();
            let para = self.add_child(container, NodeValue::Paragraph);
            container = para;
            self.add_line(container, line);
        }
        self.current = container;
    }

    fn add_line(&mut self, node: &'a AstNode<'a>, line: &[Item]) {
        let mut ast = node.data.borrow_mut();
        debug_assert!(ast.open);
        if self.partially_consumed_tab {
            self.offset += 1;
            let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
            for _ in 0..chars_to_tab {
                ast.tokens.push(Item::new(b' '));
            }
        }
        if self.offset < line.len() {
            ast.tokens.extend_from_slice(&line[self.offset..]);
        }
    }

    /// Append a child to `parent`, finalizing open blocks until an ancestor
    /// that can contain it is found.
    pub(crate) fn add_child(
        &mut self,
        mut parent: &'a AstNode<'a>,
        value: NodeValue,
    ) -> &'a AstNode<'a> {
        while !can_contain_type(parent, &value) {
            parent = self.finalize(parent).unwrap();
        }

        let node = self
            .arena
            .alloc(AstNode::new(Ast::new(value, self.line_number)));
        parent.append(node);
        node
    }

    // Close phase.
    fn finalize(&mut self, node: &'a AstNode<'a>) -> Option<&'a AstNode<'a>> {
        let ast = &mut *node.data.borrow_mut();
        self.finalize_borrowed(node, ast)
    }

    fn finalize_borrowed(
        &mut self,
        node: &'a AstNode<'a>,
        ast: &mut Ast,
    ) -> Option<&'a AstNode<'a>> {
        debug_assert!(ast.open);
        ast.open = false;
        let parent = node.parent();

        match ast.value {
            NodeValue::Paragraph => self.finalize_paragraph(node, ast),
            NodeValue::Heading(..) => self.finalize_heading(ast),
            NodeValue::CodeBlock(..) => self.finalize_code_block(node, ast),
            NodeValue::MathBlock => self.finalize_math_block(node, ast),
            NodeValue::List(..) => finalize_list(node, ast),
            _ => {}
        }

        parent
    }

    fn finalize_paragraph(&mut self, node: &'a AstNode<'a>, ast: &mut Ast) {
        // Peel link reference definitions off the front, repeatedly.
        let mut consumed = 0;
        while let Some(n) = link_ref_def::parse_link_ref_def(
            &mut self.link_ref_defs,
            &ast.tokens[consumed..],
        ) {
            if n == 0 {
                break;
            }
            consumed += n;
        }

        if consumed > 0 {
            let raw_defs: Tokens = ast.tokens[..consumed].to_vec();
            let residual: Tokens = ast.tokens[consumed..].to_vec();
            if tokens::is_blank_line(&residual) {
                ast.value = NodeValue::LinkRefDefBlock;
                ast.tokens = raw_defs;
                return;
            }
            let def_block = self
                .arena
                .alloc(AstNode::new(Ast::new(NodeValue::LinkRefDefBlock, ast.start_line)));
            def_block.data.borrow_mut().tokens = raw_defs;
            def_block.data.borrow_mut().open = false;
            node.insert_before(def_block);
            ast.tokens = residual;
        }

        if self.options.toc
            && tokens::items_to_str(tokens::trim_whitespace(&ast.tokens)).eq_ignore_ascii_case("[toc]")
        {
            ast.value = NodeValue::Toc;
            ast.tokens.clear();
            return;
        }

        if self.options.gfm_task_list_item {
            self.extract_task_list_marker(node, ast);
        }
    }

    fn extract_task_list_marker(&mut self, node: &'a AstNode<'a>, ast: &mut Ast) {
        let parent = match node.parent() {
            Some(p) if matches!(p.data.borrow().value, NodeValue::ListItem(..)) => p,
            _ => return,
        };
        if !parent.first_child().map_or(false, |c| c.same_node(node)) {
            return;
        }

        let t = &ast.tokens;
        let checked = match (tokens::peek(t, 0), tokens::peek(t, 1), tokens::peek(t, 2)) {
            (b'[', b' ', b']') => false,
            (b'[', b'x', b']') | (b'[', b'X', b']') => true,
            _ => return,
        };
        if !is_space_or_tab(tokens::peek(t, 3)) && !is_line_end(tokens::peek(t, 3)) {
            return;
        }

        let rest = tokens::trim_left(&ast.tokens[3..]).1.to_vec();
        ast.tokens = rest;

        let marker = self.arena.alloc(AstNode::new(Ast::new(
            NodeValue::TaskListItemMarker(checked),
            ast.start_line,
        )));
        marker.data.borrow_mut().open = false;
        node.append(marker);

        set_list_type_task(parent);
        if let Some(list) = parent.parent() {
            set_list_type_task(list);
        }
    }

    fn finalize_heading(&mut self, ast: &mut Ast) {
        let setext = matches!(ast.value, NodeValue::Heading(NodeHeading { setext: true, .. }));
        let mut content: Tokens = tokens::trim_whitespace(&ast.tokens).to_vec();

        if !setext {
            // Chop an optional closing hash run.
            let trimmed = tokens::trim_right(&content);
            let mut end = trimmed.len();
            while end > 0 && trimmed[end - 1].term == b'#' {
                end -= 1;
            }
            if end < trimmed.len()
                && (end == 0 || is_space_or_tab(trimmed[end - 1].term))
            {
                content = tokens::trim_right(&trimmed[..end]).to_vec();
            }
        }

        if self.options.heading_id {
            if let Some(id) = extract_heading_id(&mut content) {
                if let NodeValue::Heading(ref mut nh) = ast.value {
                    nh.id = Some(id);
                }
            }
        }

        ast.tokens = content;
    }

    fn finalize_code_block(&mut self, node: &'a AstNode<'a>, ast: &mut Ast) {
        let fenced = matches!(
            ast.value,
            NodeValue::CodeBlock(NodeCodeBlock { fenced: true, .. })
        );

        if !fenced {
            strings::remove_trailing_blank_lines(&mut ast.tokens);
            return;
        }

        // The first line is the info string; the rest is the code body.
        let newline_at = ast.tokens.iter().position(|i| i.term == b'\n');
        let (info, body): (Tokens, Tokens) = match newline_at {
            Some(ix) => (
                strings::unescape_tokens(tokens::trim_whitespace(&ast.tokens[..ix])),
                ast.tokens[ix + 1..].to_vec(),
            ),
            None => (Tokens::new(), Tokens::new()),
        };

        let (fence_char, fence_length, closed) = match ast.value {
            NodeValue::CodeBlock(ref mut ncb) => {
                ncb.info = info.clone();
                (ncb.fence_char, ncb.fence_length, ncb.closed)
            }
            _ => unreachable!(),
        };
        ast.tokens = body.clone();

        let start_line = ast.start_line;
        let fence: Tokens = std::iter::repeat(Item::new(fence_char))
            .take(fence_length)
            .collect();
        self.append_marker(
            node,
            NodeValue::CodeBlockFenceOpenMarker,
            fence.clone(),
            start_line,
        );
        self.append_marker(node, NodeValue::CodeBlockFenceInfoMarker, info, start_line);
        self.append_marker(node, NodeValue::CodeBlockCode, body, start_line);
        if closed {
            self.append_marker(node, NodeValue::CodeBlockFenceCloseMarker, fence, start_line);
        }
    }

    fn finalize_math_block(&mut self, node: &'a AstNode<'a>, ast: &mut Ast) {
        // Drop the remainder of the opening line, then trim the body.
        let newline_at = ast.tokens.iter().position(|i| i.term == b'\n');
        let body: Tokens = match newline_at {
            Some(ix) => tokens::trim_whitespace(&ast.tokens[ix + 1..]).to_vec(),
            None => tokens::trim_whitespace(&ast.tokens).to_vec(),
        };
        ast.tokens = body.clone();

        let start_line = ast.start_line;
        self.append_marker(
            node,
            NodeValue::MathBlockOpenMarker,
            tokens::str_to_items("$$"),
            start_line,
        );
        self.append_marker(node, NodeValue::MathBlockContent, body, start_line);
        self.append_marker(
            node,
            NodeValue::MathBlockCloseMarker,
            tokens::str_to_items("$$"),
            start_line,
        );
    }

    fn append_marker(
        &mut self,
        node: &'a AstNode<'a>,
        value: NodeValue,
        marker_tokens: Tokens,
        start_line: usize,
    ) {
        let marker = self.arena.alloc(AstNode::new(Ast::new(value, start_line)));
        {
            let mut ast = marker.data.borrow_mut();
            ast.tokens = marker_tokens;
            ast.open = false;
        }
        node.append(marker);
    }

    fn finish(&mut self) -> &'a AstNode<'a> {
        loop {
            let current = self.current;
            match self.finalize(current) {
                Some(parent) => self.current = parent,
                None => break,
            }
        }
        self.finalize_document();
        self.root
    }

    fn finalize_document(&mut self) {
        // Footnote labels must be known before the inline pass so that
        // references to undefined footnotes stay literal.
        let mut footnote_labels: FxHashSet<String> = FxHashSet::default();
        if self.options.footnotes {
            for n in self.root.descendants() {
                if let NodeValue::FootnoteDef(ref label) = n.data.borrow().value {
                    footnote_labels.insert(label.clone());
                }
            }
        }

        let inline_nodes: Vec<&'a AstNode<'a>> = self
            .root
            .descendants()
            .filter(|n| n.data.borrow().value.contains_inlines())
            .collect();
        for node in inline_nodes {
            inlines::parse_inlines(
                self.arena,
                self.options,
                &self.link_ref_defs,
                &footnote_labels,
                node,
            );
        }

        if self.options.fix_term_typo {
            typographer::fix_term_typo(self.root);
        }
        if self.options.auto_space {
            typographer::auto_space(self.root);
        }

        if self.options.footnotes {
            let defs: Vec<&'a AstNode<'a>> = self
                .root
                .descendants()
                .filter(|n| matches!(n.data.borrow().value, NodeValue::FootnoteDef(..)))
                .collect();
            for def in defs {
                def.detach();
                self.root.append(def);
            }
        }
    }
}

fn set_list_type_task<'a>(node: &'a AstNode<'a>) {
    let mut ast = node.data.borrow_mut();
    match ast.value {
        NodeValue::List(ref mut nl) | NodeValue::ListItem(ref mut nl) => {
            nl.typ = ListType::Task;
        }
        _ => {}
    }
}

fn lists_match(a: &NodeList, b: &NodeList) -> bool {
    // A task list is a bullet list whose earlier items already revealed
    // their checkboxes; later plain-looking bullets still belong to it.
    let same_typ = a.typ == b.typ
        || matches!(
            (a.typ, b.typ),
            (ListType::Task, ListType::Bullet) | (ListType::Bullet, ListType::Task)
        );
    same_typ && a.delimiter == b.delimiter && a.bullet_char == b.bullet_char
}

/// The fenced-code start matcher: a run of three or more identical backtick
/// or tilde markers.  A backtick fence's info string must not contain
/// another backtick.
fn parse_fenced_code(tail: &[Item]) -> Option<(u8, usize)> {
    let marker = tokens::peek(tail, 0);
    if marker != b'`' && marker != b'~' {
        return None;
    }

    let fence_length = tokens::accept(tail, marker);
    if fence_length < 3 {
        return None;
    }

    if marker == b'`' && tokens::contains_byte(&tail[fence_length..], b'`') {
        return None;
    }
    Some((marker, fence_length))
}

/// A close line holds only the fence character, whitespace-trimmed, with a
/// run at least as long as the opening fence.
fn is_fenced_code_close(tail: &[Item], fence_char: u8, fence_length: usize) -> bool {
    if tokens::peek(tail, 0) != fence_char {
        return false;
    }
    if tokens::accept(tail, fence_char) < fence_length {
        return false;
    }
    tokens::trim_whitespace(tail)
        .iter()
        .all(|i| i.term == fence_char)
}

fn parse_list_marker(
    line: &[Item],
    pos: usize,
    interrupts_paragraph: bool,
) -> Option<(usize, NodeList)> {
    let c = tokens::peek(line, pos);

    if matches!(c, b'*' | b'-' | b'+') {
        let after = tokens::peek(line, pos + 1);
        if !is_space_or_tab(after) && !is_line_end(after) {
            return None;
        }
        if interrupts_paragraph && tokens::is_blank_line(&line[pos + 1..]) {
            return None;
        }
        return Some((
            1,
            NodeList {
                typ: ListType::Bullet,
                bullet_char: c,
                ..NodeList::default()
            },
        ));
    }

    if c.is_ascii_digit() {
        let mut digits = 0;
        let mut start: usize = 0;
        while tokens::peek(line, pos + digits).is_ascii_digit() {
            start = start * 10 + (tokens::peek(line, pos + digits) - b'0') as usize;
            digits += 1;
            if digits > 9 {
                return None;
            }
        }
        let delim_byte = tokens::peek(line, pos + digits);
        let delimiter = match delim_byte {
            b'.' => ListDelimType::Period,
            b')' => ListDelimType::Paren,
            _ => return None,
        };
        let after = tokens::peek(line, pos + digits + 1);
        if !is_space_or_tab(after) && !is_line_end(after) {
            return None;
        }
        if interrupts_paragraph
            && (start != 1 || tokens::is_blank_line(&line[pos + digits + 1..]))
        {
            return None;
        }
        return Some((
            digits + 1,
            NodeList {
                typ: ListType::Ordered,
                start,
                delimiter,
                ..NodeList::default()
            },
        ));
    }

    None
}

fn finalize_list<'a>(node: &'a AstNode<'a>, ast: &mut Ast) {
    let mut tight = true;

    let mut item = node.first_child();
    while let Some(it) = item {
        if it.data.borrow().last_line_blank && it.next_sibling().is_some() {
            tight = false;
            break;
        }
        let mut sub = it.first_child();
        while let Some(s) = sub {
            if crate::nodes::ends_with_blank_line(s)
                && (it.next_sibling().is_some() || s.next_sibling().is_some())
            {
                tight = false;
                break;
            }
            sub = s.next_sibling();
        }
        if !tight {
            break;
        }
        item = it.next_sibling();
    }

    if let NodeValue::List(ref mut nl) = ast.value {
        nl.tight = tight;
    }
    let mut item = node.first_child();
    while let Some(it) = item {
        if let NodeValue::ListItem(ref mut inl) = it.data.borrow_mut().value {
            inl.tight = tight;
        }
        item = it.next_sibling();
    }
}

/// Strip a trailing `{#custom-id}` from heading content.
fn extract_heading_id(content: &mut Tokens) -> Option<String> {
    if content.last().map(|i| i.term) != Some(b'}') {
        return None;
    }
    let bytes = tokens::items_to_bytes(content);
    let open = bytes.windows(2).rposition(|w| w == b"{#")?;
    let id: String = String::from_utf8_lossy(&bytes[open + 2..bytes.len() - 1]).into_owned();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return None;
    }
    let trimmed = tokens::trim_right(&content[..open]).to_vec();
    *content = trimmed;
    Some(id)
}
