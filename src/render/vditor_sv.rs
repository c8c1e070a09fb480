//! The split-view editor DOM renderer.
//!
//! Emits annotated HTML fragments: every block is a `data-block` element
//! with a `data-type`, construct markers become typed `<span>`s, and inline
//! constructs wrap their raw source text.  The caret sentinel passes
//! through untouched (it is plain text to the escaper), so an editor can
//! round-trip the cursor position.  Zero-width-space anchors mark spots the
//! editor needs an insertion point at.

use crate::nodes::{
    AstNode, ListType, NodeType, NodeValue, WalkStatus,
};
use crate::parser::Options;
use crate::tokens::items_to_bytes;

use super::html::escape;
use super::{RenderError, Renderer};

/// The zero-width space used as an editor text anchor.
pub const ZWSP: &str = "\u{200b}";

/// Build a renderer with the split-view DOM function set registered.
pub fn vditor_sv_renderer<'a, 'o>(
    root: &'a AstNode<'a>,
    options: &'o Options,
) -> Renderer<'a, 'o> {
    let mut r = Renderer::new(root, options);
    attach(&mut r);
    r
}

/// Render a tree as the split-view editor DOM.
pub fn render_vditor_sv<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
) -> Result<Vec<u8>, RenderError> {
    vditor_sv_renderer(root, options).render()
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
    r.register(NodeType::Text, text);
    r.register(NodeType::SoftBreak, soft_break);
    r.register(NodeType::HardBreak, hard_break);
    r.register(NodeType::CodeSpan, code_span);
    r.register(NodeType::CodeSpanContent, skip);
    r.register(NodeType::Emphasis, emphasis);
    r.register(NodeType::Strong, strong);
    r.register(NodeType::Strikethrough, strikethrough);
    r.register(NodeType::Link, link);
    r.register(NodeType::Image, image);
    r.register(NodeType::InlineHtml, inline_html);
    r.register(NodeType::InlineMath, inline_math);
    r.register(NodeType::InlineMathOpenMarker, skip);
    r.register(NodeType::InlineMathContent, skip);
    r.register(NodeType::InlineMathCloseMarker, skip);
    r.register(NodeType::Emoji, emoji);
    r.register(NodeType::EmojiImg, skip);
    r.register(NodeType::EmojiAlias, skip);
    r.register(NodeType::TaskListItemMarker, task_list_item_marker);

    r.register(NodeType::Bang, marker_text);
    r.register(NodeType::OpenBracket, marker_text);
    r.register(NodeType::CloseBracket, marker_text);
    r.register(NodeType::OpenParen, marker_text);
    r.register(NodeType::CloseParen, marker_text);
    r.register(NodeType::LinkDest, link_dest);
    r.register(NodeType::LinkSpace, link_space);
    r.register(NodeType::LinkTitle, link_title);

    r.register(NodeType::CodeBlockFenceOpenMarker, skip);
    r.register(NodeType::CodeBlockFenceInfoMarker, skip);
    r.register(NodeType::CodeBlockCode, skip);
    r.register(NodeType::CodeBlockFenceCloseMarker, skip);
    r.register(NodeType::MathBlockOpenMarker, skip);
    r.register(NodeType::MathBlockContent, skip);
    r.register(NodeType::MathBlockCloseMarker, skip);
}

type Res = Result<WalkStatus, RenderError>;

fn skip<'a, 'o>(_r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, _entering: bool) -> Res {
    Ok(WalkStatus::SkipChildren)
}

fn escape_tokens<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>) {
    let bytes = items_to_bytes(&node.data.borrow().tokens);
    escape(r, &bytes);
}

fn document<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering && r.footnote_ix > 0 {
        r.write_str("</div>");
    }
    Ok(WalkStatus::Continue)
}

fn paragraph<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<p data-block=\"0\">");
    } else {
        r.write_str("</p>");
    }
    Ok(WalkStatus::Continue)
}

fn heading<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let level = match node.data.borrow().value {
        NodeValue::Heading(ref nh) => nh.level,
        _ => unreachable!(),
    };
    if entering {
        r.write_str(&format!(
            "<h{} data-block=\"0\" data-marker=\"#\">",
            level
        ));
        r.write_str("<span data-type=\"heading-marker\">");
        for _ in 0..level {
            r.write_byte(b'#');
        }
        r.write_str(" </span>");
    } else {
        r.write_str(&format!("</h{}>", level));
    }
    Ok(WalkStatus::Continue)
}

fn block_quote<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<div data-block=\"0\" data-type=\"blockquote\">");
        r.write_str("<span data-type=\"blockquote-marker\">&gt; </span>");
    } else {
        r.write_str("</div>");
    }
    Ok(WalkStatus::Continue)
}

fn list<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let nl = match node.data.borrow().value {
        NodeValue::List(ref nl) => *nl,
        _ => unreachable!(),
    };
    let tag = match nl.typ {
        ListType::Ordered => "ol",
        _ => "ul",
    };
    if entering {
        let marker = match nl.typ {
            ListType::Ordered => "1".to_string(),
            _ => (nl.bullet_char as char).to_string(),
        };
        r.write_str(&format!(
            "<{} data-block=\"0\" data-marker=\"{}\">",
            tag, marker
        ));
    } else {
        r.write_str(&format!("</{}>", tag));
    }
    Ok(WalkStatus::Continue)
}

fn list_item<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let nl = match node.data.borrow().value {
            NodeValue::ListItem(ref nl) => *nl,
            _ => unreachable!(),
        };
        let marker = match nl.typ {
            ListType::Ordered => format!(
                "{}{}",
                nl.start,
                match nl.delimiter {
                    crate::nodes::ListDelimType::Period => '.',
                    crate::nodes::ListDelimType::Paren => ')',
                }
            ),
            _ => (nl.bullet_char as char).to_string(),
        };
        r.write_str(&format!("<li data-marker=\"{}\">", marker));
        r.write_str(&format!(
            "<span data-type=\"li-marker\">{} </span>",
            marker
        ));
    } else {
        r.write_str("</li>");
    }
    Ok(WalkStatus::Continue)
}

fn code_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let (ncb, body) = {
            let ast = node.data.borrow();
            match ast.value {
                NodeValue::CodeBlock(ref ncb) => (ncb.clone(), items_to_bytes(&ast.tokens)),
                _ => unreachable!(),
            }
        };
        let fence: String = if ncb.fenced {
            (ncb.fence_char as char).to_string().repeat(ncb.fence_length)
        } else {
            "```".to_string()
        };

        r.write_str("<div data-block=\"0\" data-type=\"code-block\">");
        r.write_str(&format!(
            "<span data-type=\"code-block-open-marker\">{}</span>",
            fence
        ));
        r.write_str(&format!(
            "<span data-type=\"code-block-info\">{}",
            ZWSP
        ));
        escape(r, &items_to_bytes(&ncb.info));
        r.write_str("</span>");
        r.write_str("<pre><code>");
        escape(r, &body);
        r.write_str("</code></pre>");
        r.write_str(&format!(
            "<span data-type=\"code-block-close-marker\">{}</span>",
            fence
        ));
        r.write_str("</div>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn html_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<div data-block=\"0\" data-type=\"html-block\"><pre><code>");
        escape_tokens(r, node);
        r.write_str("</code></pre></div>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn thematic_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<hr data-block=\"0\" />");
    }
    Ok(WalkStatus::Continue)
}

fn table<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<table data-block=\"0\">");
    } else {
        if node
            .last_child()
            .map_or(false, |c| matches!(c.data.borrow().value, NodeValue::TableRow))
        {
            r.write_str("</tbody>");
        }
        r.write_str("</table>");
    }
    Ok(WalkStatus::Continue)
}

fn table_head<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<thead>");
    } else {
        r.write_str("</thead>");
    }
    Ok(WalkStatus::Continue)
}

fn table_row<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        if node
            .previous_sibling()
            .map_or(false, |p| matches!(p.data.borrow().value, NodeValue::TableHead))
        {
            r.write_str("<tbody>");
        }
        r.write_str("<tr>");
    } else {
        r.write_str("</tr>");
    }
    Ok(WalkStatus::Continue)
}

fn table_cell<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let in_head = node
        .parent()
        .and_then(|row| row.parent())
        .map_or(false, |h| matches!(h.data.borrow().value, NodeValue::TableHead));
    let tag = if in_head { "th" } else { "td" };
    if entering {
        r.write_str(&format!("<{}>", tag));
    } else {
        r.write_str(&format!("</{}>", tag));
    }
    Ok(WalkStatus::Continue)
}

fn footnote_def<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let label = match node.data.borrow().value {
        NodeValue::FootnoteDef(ref l) => l.clone(),
        _ => unreachable!(),
    };
    if entering {
        if r.footnote_ix == 0 {
            r.write_str("<div data-type=\"footnotes-block\">");
        }
        r.footnote_ix += 1;
        r.write_str(&format!(
            "<div data-type=\"footnotes-def\"><span data-type=\"footnotes-def-marker\">[^{}]: </span>",
            label
        ));
    } else {
        r.write_str("</div>");
    }
    Ok(WalkStatus::Continue)
}

fn footnote_ref<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let label = match node.data.borrow().value {
            NodeValue::FootnoteRef(ref l) => l.clone(),
            _ => unreachable!(),
        };
        r.write_str(&format!(
            "<sup data-type=\"footnotes-ref\">[^{}]</sup>",
            label
        ));
    }
    Ok(WalkStatus::Continue)
}

fn link_ref_def_block<'a, 'o>(
    r: &mut Renderer<'a, 'o>,
    node: &'a AstNode<'a>,
    entering: bool,
) -> Res {
    if entering {
        r.write_str("<div data-block=\"0\" data-type=\"link-ref-defs-block\">");
        escape_tokens(r, node);
        r.write_str("</div>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn math_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<div data-block=\"0\" data-type=\"math-block\">");
        r.write_str("<span data-type=\"math-block-open-marker\">$$</span>");
        r.write_str("<pre><code>");
        escape_tokens(r, node);
        r.write_str("</code></pre>");
        r.write_str("<span data-type=\"math-block-close-marker\">$$</span>");
        r.write_str("</div>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn toc<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<div data-block=\"0\" data-type=\"toc-block\">[toc]</div>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn text<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        escape_tokens(r, node);
    }
    Ok(WalkStatus::Continue)
}

fn marker_text<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        escape_tokens(r, node);
    }
    Ok(WalkStatus::Continue)
}

fn soft_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("\n");
    }
    Ok(WalkStatus::Continue)
}

fn hard_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<br />\n");
    }
    Ok(WalkStatus::Continue)
}

fn code_span<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let marker_len = match node.data.borrow().value {
            NodeValue::CodeSpan(ref ncs) => ncs.marker_len.max(1),
            _ => unreachable!(),
        };
        let marker = "`".repeat(marker_len);
        r.write_str("<span data-type=\"code-inline\"><code>");
        let mut source = marker.clone().into_bytes();
        if let Some(content) = node.child_of_type(NodeType::CodeSpanContent) {
            source.extend(items_to_bytes(&content.data.borrow().tokens));
        }
        source.extend(marker.into_bytes());
        escape(r, &source);
        r.write_str("</code></span>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn emphasis<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    inline_wrap(r, node, entering, "em")
}

fn strong<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    inline_wrap(r, node, entering, "strong")
}

fn strikethrough<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    inline_wrap(r, node, entering, "s")
}

// Inline constructs wrap their raw delimiters so the split view shows the
// source text.
fn inline_wrap<'a, 'o>(
    r: &mut Renderer<'a, 'o>,
    node: &'a AstNode<'a>,
    entering: bool,
    data_type: &str,
) -> Res {
    let marker = match node.data.borrow().value {
        NodeValue::Emphasis(m) => (m as char).to_string(),
        NodeValue::Strong(m) => (m as char).to_string().repeat(2),
        NodeValue::Strikethrough => "~~".to_string(),
        _ => String::new(),
    };
    if entering {
        r.write_str(&format!("<span data-type=\"{}\">", data_type));
        r.write_str(&marker);
    } else {
        r.write_str(&marker);
        r.write_str("</span>");
    }
    Ok(WalkStatus::Continue)
}

fn link<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let autolink = node.child_of_type(NodeType::OpenBracket).is_none();
    if entering {
        r.write_str("<span data-type=\"a\">");
        if autolink {
            r.write_str("&lt;");
        }
    } else {
        if autolink {
            r.write_str("&gt;");
        }
        r.write_str("</span>");
    }
    Ok(WalkStatus::Continue)
}

fn image<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<span data-type=\"img\">");
    } else {
        r.write_str("</span>");
    }
    Ok(WalkStatus::Continue)
}

fn link_dest<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let bracketed = node
            .parent()
            .map_or(false, |p| p.child_of_type(NodeType::OpenBracket).is_some());
        if bracketed {
            r.write_str("<span data-type=\"link-dest\">");
            escape_tokens(r, node);
            r.write_str("</span>");
        }
    }
    Ok(WalkStatus::Continue)
}

fn link_space<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str(" ");
    }
    Ok(WalkStatus::Continue)
}

fn link_title<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<span data-type=\"link-title\">&quot;");
        escape_tokens(r, node);
        r.write_str("&quot;</span>");
    }
    Ok(WalkStatus::Continue)
}

fn inline_html<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<span data-type=\"html-inline\"><code>");
        escape_tokens(r, node);
        r.write_str("</code></span>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn inline_math<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<span data-type=\"math-inline\"><code>");
        if let Some(content) = node.child_of_type(NodeType::InlineMathContent) {
            let bytes = items_to_bytes(&content.data.borrow().tokens);
            escape(r, &bytes);
        }
        r.write_str("</code></span>");
    }
    Ok(WalkStatus::SkipChildren)
}

fn emoji<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.write_str("<span data-type=\"emoji\">");
        if let Some(alias) = node.child_of_type(NodeType::EmojiAlias) {
            let bytes = items_to_bytes(&alias.data.borrow().tokens);
            escape(r, &bytes);
        }
        r.write_str("</span>");
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
        r.write_str(&format!(
            "<span data-type=\"task-marker\">{} </span>",
            if checked { "[x]" } else { "[ ]" }
        ));
    }
    Ok(WalkStatus::Continue)
}
