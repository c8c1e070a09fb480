//! The normalized Markdown renderer.
//!
//! Re-emits the tree as CommonMark.  Container prefixes (`> `, list
//! indents, footnote indents) are applied by rewriting the rendered region
//! when the container closes, so nesting composes without a writer stack.
//! The output is a fixed point: formatting the parse of formatted output
//! reproduces it byte-for-byte.

use crate::nodes::{
    AstNode, ListDelimType, ListType, NodeType, NodeValue, TableAlignment, WalkStatus,
};
use crate::parser::Options;
use crate::tokens::Tokens;

use super::{in_tight_list, RenderError, Renderer};

/// Build a renderer with the Markdown formatting function set registered.
pub fn format_renderer<'a, 'o>(root: &'a AstNode<'a>, options: &'o Options) -> Renderer<'a, 'o> {
    let mut r = Renderer::new(root, options);
    attach(&mut r);
    r
}

/// Render a tree back to normalized Markdown.
pub fn render_format<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
) -> Result<Vec<u8>, RenderError> {
    format_renderer(root, options).render()
}

pub fn attach<'a, 'o>(r: &mut Renderer<'a, 'o>) {
    r.register(NodeType::Document, document);
    r.register(NodeType::Paragraph, paragraph);
    r.register(NodeType::Heading, heading);
    r.register(NodeType::BlockQuote, block_quote);
    r.register(NodeType::List, list);
    r.register(NodeType::ListItem, list_item);
    r.register(NodeType::CodeBlock, code_block);
    r.register(NodeType::HtmlBlock, html_block);
    r.register(NodeType::ThematicBreak, thematic_break);
    r.register(NodeType::Table, table);
    r.register(NodeType::TableHead, table_head);
    r.register(NodeType::TableRow, table_row);
    r.register(NodeType::TableCell, table_cell);
    r.register(NodeType::FootnoteDef, footnote_def);
    r.register(NodeType::FootnoteRef, footnote_ref);
    r.register(NodeType::LinkRefDefBlock, link_ref_def_block);
    r.register(NodeType::MathBlock, math_block);
    r.register(NodeType::Toc, toc);
    r.register(NodeType::Text, write_tokens_raw);
    r.register(NodeType::SoftBreak, soft_break);
    r.register(NodeType::HardBreak, hard_break);
    r.register(NodeType::CodeSpan, code_span);
    r.register(NodeType::CodeSpanContent, write_tokens_raw);
    r.register(NodeType::Emphasis, emphasis);
    r.register(NodeType::Strong, strong);
    r.register(NodeType::Strikethrough, strikethrough);
    r.register(NodeType::Link, link);
    r.register(NodeType::Image, link);
    r.register(NodeType::InlineHtml, write_tokens_raw);
    r.register(NodeType::InlineMath, noop);
    r.register(NodeType::InlineMathOpenMarker, write_tokens_raw);
    r.register(NodeType::InlineMathContent, write_tokens_raw);
    r.register(NodeType::InlineMathCloseMarker, write_tokens_raw);
    r.register(NodeType::Emoji, emoji);
    r.register(NodeType::EmojiImg, skip);
    r.register(NodeType::EmojiAlias, write_tokens_raw);
    r.register(NodeType::TaskListItemMarker, task_list_item_marker);

    r.register(NodeType::Bang, write_tokens_raw);
    r.register(NodeType::OpenBracket, write_tokens_raw);
    r.register(NodeType::CloseBracket, write_tokens_raw);
    r.register(NodeType::OpenParen, write_tokens_raw);
    r.register(NodeType::CloseParen, write_tokens_raw);
    r.register(NodeType::LinkDest, link_dest);
    r.register(NodeType::LinkSpace, link_space);
    r.register(NodeType::LinkTitle, link_title);

    // Fence markers are covered by the code block itself.
    r.register(NodeType::CodeBlockFenceOpenMarker, skip);
    r.register(NodeType::CodeBlockFenceInfoMarker, skip);
    r.register(NodeType::CodeBlockCode, skip);
    r.register(NodeType::CodeBlockFenceCloseMarker, skip);
    r.register(NodeType::MathBlockOpenMarker, skip);
    r.register(NodeType::MathBlockContent, skip);
    r.register(NodeType::MathBlockCloseMarker, skip);
}

type Res = Result<WalkStatus, RenderError>;

fn noop<'a, 'o>(_r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, _entering: bool) -> Res {
    Ok(WalkStatus::Continue)
}

fn skip<'a, 'o>(_r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, _entering: bool) -> Res {
    Ok(WalkStatus::SkipChildren)
}

fn write_tokens_raw<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let tokens = node.data.borrow().tokens.clone();
        r.write_tokens(&tokens);
    }
    Ok(WalkStatus::Continue)
}

/// Re-prefix every line rendered since `start`.  Blank lines get the
/// prefix right-trimmed so no trailing whitespace leaks into the output.
fn prefix_region<'a, 'o>(r: &mut Renderer<'a, 'o>, start: usize, first: &str, rest: &str) {
    if r.writer.len() <= start {
        return;
    }
    let region = r.writer.split_off(start);
    let mut out: Vec<u8> = Vec::with_capacity(region.len() + 16);
    let mut first_line = true;
    for line in region.split_inclusive(|&b| b == b'\n') {
        let prefix = if first_line { first } else { rest };
        let blank = line.iter().all(|&b| b == b'\n' || b == b'\r');
        if blank && !first_line {
            out.extend_from_slice(prefix.trim_end().as_bytes());
        } else {
            out.extend_from_slice(prefix.as_bytes());
        }
        out.extend_from_slice(line);
        first_line = false;
    }
    r.writer.extend_from_slice(&out);
}

fn document<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering {
        while r.writer.ends_with(b"\n\n") {
            r.writer.pop();
        }
        if !r.writer.is_empty() && !r.writer.ends_with(b"\n") {
            r.writer.push(b'\n');
        }
    }
    Ok(WalkStatus::Continue)
}

fn paragraph<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering {
        if in_tight_list(node) {
            r.newline();
        } else {
            r.blankline();
        }
    }
    Ok(WalkStatus::Continue)
}

fn heading<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let (level, id) = match node.data.borrow().value {
        NodeValue::Heading(ref nh) => (nh.level, nh.id.clone()),
        _ => unreachable!(),
    };
    if entering {
        for _ in 0..level {
            r.write_byte(b'#');
        }
        r.write_byte(b' ');
    } else {
        if let Some(id) = id {
            r.write_str(&format!(" {{#{}}}", id));
        }
        r.blankline();
    }
    Ok(WalkStatus::Continue)
}

fn block_quote<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let start = r.writer.len();
        r.block_starts.push(start);
    } else {
        let start = r.block_starts.pop().unwrap_or(0);
        if r.writer.len() == start {
            r.write_str(">\n");
        } else {
            r.trim_region_to_single_newline(start);
            prefix_region(r, start, "> ", "> ");
        }
        r.blankline();
    }
    Ok(WalkStatus::Continue)
}

fn list<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering {
        r.blankline();
    }
    Ok(WalkStatus::Continue)
}

fn list_item<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let start = r.writer.len();
        r.block_starts.push(start);
    } else {
        let nl = match node.data.borrow().value {
            NodeValue::ListItem(ref nl) => *nl,
            _ => unreachable!(),
        };
        let marker = match nl.typ {
            ListType::Ordered => format!(
                "{}{} ",
                nl.start,
                match nl.delimiter {
                    ListDelimType::Period => '.',
                    ListDelimType::Paren => ')',
                }
            ),
            _ => format!("{} ", nl.bullet_char as char),
        };
        let hang = " ".repeat(marker.len());

        let start = r.block_starts.pop().unwrap_or(0);
        if r.writer.len() == start {
            r.write_str(marker.trim_end());
            r.write_byte(b'\n');
        } else {
            r.trim_region_to_single_newline(start);
            prefix_region(r, start, &marker, &hang);
        }

        if !nl.tight && node.next_sibling().is_some() {
            r.blankline();
        }
    }
    Ok(WalkStatus::Continue)
}

fn code_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let (ncb, body): (crate::nodes::NodeCodeBlock, Tokens) = {
            let ast = node.data.borrow();
            match ast.value {
                NodeValue::CodeBlock(ref ncb) => (ncb.clone(), ast.tokens.clone()),
                _ => unreachable!(),
            }
        };

        if ncb.fenced {
            let fence: String = (ncb.fence_char as char).to_string().repeat(ncb.fence_length);
            r.write_str(&fence);
            r.write_tokens(&ncb.info);
            r.write_byte(b'\n');
            r.write_tokens(&body);
            r.newline();
            r.write_str(&fence);
            r.write_byte(b'\n');
        } else {
            let start = r.writer.len();
            r.write_tokens(&body);
            r.newline();
            prefix_region(r, start, "    ", "    ");
        }
        r.blankline();
    }
    Ok(WalkStatus::SkipChildren)
}

fn html_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let tokens = node.data.borrow().tokens.clone();
        r.write_tokens(&tokens);
        r.blankline();
    }
    Ok(WalkStatus::SkipChildren)
}

fn thematic_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("---");
        r.blankline();
    }
    Ok(WalkStatus::Continue)
}

fn math_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let tokens = node.data.borrow().tokens.clone();
        r.write_str("$$\n");
        r.write_tokens(&tokens);
        r.newline();
        r.write_str("$$");
        r.blankline();
    }
    Ok(WalkStatus::SkipChildren)
}

fn toc<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("[toc]");
        r.blankline();
    }
    Ok(WalkStatus::SkipChildren)
}

fn link_ref_def_block<'a, 'o>(
    r: &mut Renderer<'a, 'o>,
    node: &'a AstNode<'a>,
    entering: bool,
) -> Res {
    if entering {
        let tokens = node.data.borrow().tokens.clone();
        r.write_tokens(&tokens);
        r.blankline();
    }
    Ok(WalkStatus::SkipChildren)
}

fn footnote_def<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let label = match node.data.borrow().value {
            NodeValue::FootnoteDef(ref l) => l.clone(),
            _ => unreachable!(),
        };
        r.write_str(&format!("[^{}]: ", label));
        let start = r.writer.len();
        r.block_starts.push(start);
    } else {
        let start = r.block_starts.pop().unwrap_or(0);
        r.trim_region_to_single_newline(start);
        prefix_region(r, start, "", "    ");
        r.blankline();
    }
    Ok(WalkStatus::Continue)
}

fn footnote_ref<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let label = match node.data.borrow().value {
            NodeValue::FootnoteRef(ref l) => l.clone(),
            _ => unreachable!(),
        };
        r.write_str(&format!("[^{}]", label));
    }
    Ok(WalkStatus::Continue)
}

fn table<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering {
        r.blankline();
    }
    Ok(WalkStatus::Continue)
}

fn table_head<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering {
        let alignments = node
            .parent()
            .and_then(|t| match t.data.borrow().value {
                NodeValue::Table(ref a) => Some(a.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let mut row = String::from("|");
        for a in &alignments {
            let marker = match a {
                TableAlignment::None => "---",
                TableAlignment::Left => ":---",
                TableAlignment::Center => ":---:",
                TableAlignment::Right => "---:",
            };
            row.push_str(&format!(" {} |", marker));
        }
        row.push('\n');
        r.write_str(&row);
    }
    Ok(WalkStatus::Continue)
}

fn table_row<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_byte(b'|');
    } else {
        r.write_byte(b'\n');
    }
    Ok(WalkStatus::Continue)
}

fn table_cell<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_byte(b' ');
    } else {
        r.write_str(" |");
    }
    Ok(WalkStatus::Continue)
}

fn soft_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_byte(b'\n');
    }
    Ok(WalkStatus::Continue)
}

fn hard_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("  \n");
    }
    Ok(WalkStatus::Continue)
}

fn code_span_pad<'a>(node: &'a AstNode<'a>) -> bool {
    match node.child_of_type(NodeType::CodeSpanContent) {
        Some(content) => {
            let tokens = &content.data.borrow().tokens;
            match (tokens.first(), tokens.last()) {
                (Some(f), Some(l)) => {
                    matches!(f.term, b'`' | b' ') || matches!(l.term, b'`' | b' ')
                }
                _ => false,
            }
        }
        None => false,
    }
}

fn code_span<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let marker_len = match node.data.borrow().value {
        NodeValue::CodeSpan(ref ncs) => ncs.marker_len.max(1),
        _ => unreachable!(),
    };
    let pad = code_span_pad(node);
    if entering {
        for _ in 0..marker_len {
            r.write_byte(b'`');
        }
        if pad {
            r.write_byte(b' ');
        }
    } else {
        if pad {
            r.write_byte(b' ');
        }
        for _ in 0..marker_len {
            r.write_byte(b'`');
        }
    }
    Ok(WalkStatus::Continue)
}

fn emphasis<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, _entering: bool) -> Res {
    let marker = match node.data.borrow().value {
        NodeValue::Emphasis(m) => m,
        _ => unreachable!(),
    };
    r.write_byte(marker);
    Ok(WalkStatus::Continue)
}

fn strong<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, _entering: bool) -> Res {
    let marker = match node.data.borrow().value {
        NodeValue::Strong(m) => m,
        _ => unreachable!(),
    };
    r.write_byte(marker);
    r.write_byte(marker);
    Ok(WalkStatus::Continue)
}

fn strikethrough<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, _entering: bool) -> Res {
    r.write_str("~~");
    Ok(WalkStatus::Continue)
}

fn link<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let autolink = node.child_of_type(NodeType::OpenBracket).is_none();
    if autolink {
        if entering {
            r.write_byte(b'<');
        } else {
            r.write_byte(b'>');
        }
    }
    Ok(WalkStatus::Continue)
}

fn link_dest<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let bracketed = node
            .parent()
            .map_or(false, |p| p.child_of_type(NodeType::OpenBracket).is_some());
        if bracketed {
            let tokens = node.data.borrow().tokens.clone();
            r.write_tokens(&tokens);
        }
    }
    Ok(WalkStatus::Continue)
}

fn link_space<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_byte(b' ');
    }
    Ok(WalkStatus::Continue)
}

fn link_title<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_byte(b'"');
        for item in node.data.borrow().tokens.iter() {
            if item.term == b'"' {
                r.write_str("\\\"");
            } else {
                r.write_byte(item.term);
            }
        }
        r.write_byte(b'"');
    }
    Ok(WalkStatus::Continue)
}

fn emoji<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        if let Some(alias) = node.child_of_type(NodeType::EmojiAlias) {
            let tokens = alias.data.borrow().tokens.clone();
            r.write_tokens(&tokens);
        }
    }
    Ok(WalkStatus::SkipChildren)
}

fn task_list_item_marker<'a, 'o>(
    r: &mut Renderer<'a, 'o>,
    node: &'a AstNode<'a>,
    entering: bool,
) -> Res {
    if entering {
        let checked = match node.data.borrow().value {
            NodeValue::TaskListItemMarker(c) => c,
            _ => unreachable!(),
        };
        r.write_str(if checked { "[x] " } else { "[ ] " });
    }
    Ok(WalkStatus::Continue)
}
