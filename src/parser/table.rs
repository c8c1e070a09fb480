//! GFM table construction.
//!
//! A table opens when the line under a one-line paragraph is a delimiter
//! row with the same column count; subsequent row lines attach while they
//! keep matching.

use crate::nodes::{Ast, AstNode, NodeValue, TableAlignment};
use crate::parser::Parser;
use crate::tokens::{self, is_backslash_escaped, Item, Tokens};

/// Whether a line can continue an open table.
pub fn row_matches(tail: &[Item]) -> bool {
    split_row(tail).is_some()
}

/// Split a line into cell token slices.  Requires at least one unescaped
/// pipe; leading and trailing pipes are consumed.
fn split_row(tail: &[Item]) -> Option<Vec<Tokens>> {
    let line = tokens::trim_whitespace(tail);
    if line.is_empty() || !line.iter().any(|i| i.term == b'|') {
        return None;
    }

    let mut cells: Vec<Tokens> = Vec::new();
    let mut cell_start = 0;
    let mut i = 0;
    let body = if line[0].term == b'|' { &line[1..] } else { line };
    while i < body.len() {
        if body[i].term == b'|' && !is_backslash_escaped(body, i) {
            cells.push(tokens::trim_whitespace(&body[cell_start..i]).to_vec());
            cell_start = i + 1;
        }
        i += 1;
    }
    if cell_start < body.len() {
        cells.push(tokens::trim_whitespace(&body[cell_start..]).to_vec());
    }

    if cells.is_empty() {
        None
    } else {
        Some(cells)
    }
}

/// Parse a delimiter row: each cell is `:?-+:?`.
fn delimiter_row(cells: &[Tokens]) -> Option<Vec<TableAlignment>> {
    let mut alignments = Vec::with_capacity(cells.len());
    for cell in cells {
        if cell.is_empty() {
            return None;
        }
        let left = cell[0].term == b':';
        let right = cell[cell.len() - 1].term == b':';
        let dashes = &cell[left as usize..cell.len() - right as usize];
        if dashes.is_empty() || dashes.iter().any(|i| i.term != b'-') {
            return None;
        }
        alignments.push(if left && right {
            TableAlignment::Center
        } else if left {
            TableAlignment::Left
        } else if right {
            TableAlignment::Right
        } else {
            TableAlignment::None
        });
    }
    Some(alignments)
}

/// Try to open a table: `container` is a paragraph whose last line is the
/// header candidate, and the current line must be a matching delimiter row.
pub fn try_opening_header<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    container: &mut &'a AstNode<'a>,
    line: &[Item],
) -> bool {
    let delim_cells = match split_row(&line[parser.next_nonspace..]) {
        Some(cells) => cells,
        None => return false,
    };
    let alignments = match delimiter_row(&delim_cells) {
        Some(a) => a,
        None => return false,
    };

    // The header is the last line of the paragraph's accumulated content.
    let (header_cells, header_start) = {
        let ast = container.data.borrow();
        let content = tokens::trim_right(&ast.tokens);
        let header_start = content
            .iter()
            .rposition(|i| i.term == b'\n')
            .map(|ix| ix + 1)
            .unwrap_or(0);
        match split_row(&content[header_start..]) {
            Some(cells) => (cells, header_start),
            None => return false,
        }
    };
    if header_cells.len() != alignments.len() {
        return false;
    }

    let table = if header_start == 0 {
        // The paragraph was just the header; morph it into the table.
        let mut ast = container.data.borrow_mut();
        ast.value = NodeValue::Table(alignments.clone());
        ast.tokens.clear();
        *container
    } else {
        // Earlier lines stay a paragraph; the table follows it.
        let start_line = parser.line_number;
        {
            let mut ast = container.data.borrow_mut();
            let kept = ast.tokens[..header_start].to_vec();
            ast.tokens = kept;
        }
        parser.finalize(*container);
        let table: &'a AstNode<'a> = parser
            .arena
            .alloc(AstNode::new(Ast::new(NodeValue::Table(alignments.clone()), start_line)));
        container.insert_after(table);
        table
    };

    let head = append_closed(parser, table, NodeValue::TableHead);
    let row = append_closed(parser, head, NodeValue::TableRow);
    for (ix, cell) in header_cells.into_iter().enumerate() {
        let cell_node = append_closed(parser, row, NodeValue::TableCell(alignments[ix]));
        cell_node.data.borrow_mut().tokens = cell;
    }

    let adv = line.len() - 1 - parser.offset;
    parser.advance_offset(line, adv, false);
    *container = table;
    true
}

/// Append a body row to an open table.
pub fn append_row<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    table: &'a AstNode<'a>,
    line: &[Item],
) -> bool {
    let cells = match split_row(&line[parser.next_nonspace..]) {
        Some(cells) => cells,
        None => return false,
    };
    let alignments = match table.data.borrow().value {
        NodeValue::Table(ref a) => a.clone(),
        _ => return false,
    };

    let row = append_closed(parser, table, NodeValue::TableRow);
    for (ix, alignment) in alignments.iter().enumerate() {
        let cell_node = append_closed(parser, row, NodeValue::TableCell(*alignment));
        if let Some(cell) = cells.get(ix) {
            cell_node.data.borrow_mut().tokens = cell.clone();
        }
    }

    let adv = line.len() - 1 - parser.offset;
    parser.advance_offset(line, adv, false);
    true
}

// Table internals never sit on the open-container spine; they are born
// closed so the descent phase skips over them.
fn append_closed<'a, 'o>(
    parser: &mut Parser<'a, 'o>,
    parent: &'a AstNode<'a>,
    value: NodeValue,
) -> &'a AstNode<'a> {
    let node = parser
        .arena
        .alloc(AstNode::new(Ast::new(value, parser.line_number)));
    node.data.borrow_mut().open = false;
    parent.append(node);
    node
}
