//! The HTML renderer: UTF-8 HTML5 fragments.

use crate::nodes::{
    collect_text, AstNode, ListType, NodeType, NodeValue, TableAlignment, WalkStatus,
};
use crate::parser::Options;
use crate::scanners::{byte_set, is_whitespace};
use crate::tokens::items_to_str;

use super::{in_tight_list, RenderError, Renderer};

/// Build a renderer with the full HTML function set registered.
pub fn html_renderer<'a, 'o>(root: &'a AstNode<'a>, options: &'o Options) -> Renderer<'a, 'o> {
    let mut r = Renderer::new(root, options);
    attach(&mut r);
    r
}

/// Render a tree as HTML with the default function set.
pub fn render_html<'a>(root: &'a AstNode<'a>, options: &Options) -> Result<Vec<u8>, RenderError> {
    html_renderer(root, options).render()
}

/// Register the HTML function for every node type.
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
    r.register(NodeType::LinkRefDefBlock, invisible);
    r.register(NodeType::MathBlock, math_block);
    r.register(NodeType::Toc, toc);
    r.register(NodeType::Text, text);
    r.register(NodeType::SoftBreak, soft_break);
    r.register(NodeType::HardBreak, hard_break);
    r.register(NodeType::CodeSpan, code_span);
    r.register(NodeType::CodeSpanContent, code_span_content);
    r.register(NodeType::Emphasis, emphasis);
    r.register(NodeType::Strong, strong);
    r.register(NodeType::Strikethrough, strikethrough);
    r.register(NodeType::Link, link);
    r.register(NodeType::Image, image);
    r.register(NodeType::InlineHtml, inline_html);
    r.register(NodeType::InlineMath, inline_math);
    r.register(NodeType::InlineMathContent, inline_math_content);
    r.register(NodeType::Emoji, noop);
    r.register(NodeType::EmojiImg, emoji_img);
    r.register(NodeType::EmojiAlias, invisible);
    r.register(NodeType::TaskListItemMarker, task_list_item_marker);

    // Construct markers carry no HTML of their own.
    for marker in [
        NodeType::Bang,
        NodeType::OpenBracket,
        NodeType::CloseBracket,
        NodeType::OpenParen,
        NodeType::CloseParen,
        NodeType::LinkDest,
        NodeType::LinkSpace,
        NodeType::LinkTitle,
        NodeType::CodeBlockFenceOpenMarker,
        NodeType::CodeBlockFenceInfoMarker,
        NodeType::CodeBlockCode,
        NodeType::CodeBlockFenceCloseMarker,
        NodeType::MathBlockOpenMarker,
        NodeType::MathBlockContent,
        NodeType::MathBlockCloseMarker,
        NodeType::InlineMathOpenMarker,
        NodeType::InlineMathCloseMarker,
    ]
    .iter()
    {
        r.register(*marker, invisible);
    }
}

/// Escape `<`, `>`, `&` and `"` for free text and attribute values.
pub fn escape<'a, 'o>(r: &mut Renderer<'a, 'o>, buffer: &[u8]) {
    let matcher = jetscii::bytes!(b'"', b'&', b'<', b'>');

    let mut offset = 0;
    while let Some(i) = matcher.find(&buffer[offset..]) {
        let esc: &str = match buffer[offset + i] {
            b'"' => "&quot;",
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => unreachable!(),
        };
        r.write_bytes(&buffer[offset..offset + i]);
        r.write_str(esc);
        offset += i + 1;
    }
    r.write_bytes(&buffer[offset..]);
}

fn escape_to_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

const HREF_SAFE: [bool; 256] = byte_set(
    b"-_.+!*(),%#@?=;:/,+$~abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
);

/// Escape a URL for an HTML attribute, leaving already-encoded sequences
/// intact.
pub fn escape_href<'a, 'o>(r: &mut Renderer<'a, 'o>, buffer: &[u8]) {
    let size = buffer.len();
    let mut i = 0;

    while i < size {
        let org = i;
        while i < size && HREF_SAFE[buffer[i] as usize] {
            i += 1;
        }

        if i > org {
            r.write_bytes(&buffer[org..i]);
        }

        if i >= size {
            break;
        }

        match buffer[i] {
            b'&' => r.write_str("&amp;"),
            b'\'' => r.write_str("&#x27;"),
            c => r.write_str(&format!("%{:02X}", c)),
        }

        i += 1;
    }
}

fn full_dest(r: &Renderer, dest: &str) -> String {
    let base = &r.options.link_base;
    if base.is_empty()
        || dest.contains("://")
        || dest.starts_with('#')
        || dest.starts_with("mailto:")
        || dest.starts_with("data:")
    {
        dest.to_string()
    } else {
        format!("{}{}", base, dest)
    }
}

fn link_dest_of<'a>(node: &'a AstNode<'a>) -> String {
    node.child_of_type(NodeType::LinkDest)
        .map(|d| items_to_str(&d.data.borrow().tokens))
        .unwrap_or_default()
}

fn slugize(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// The anchor slug of a heading, disambiguated by document order so the
/// TOC and the heading anchors always agree.
fn heading_slug<'a>(root: &'a AstNode<'a>, target: &'a AstNode<'a>) -> String {
    let base = slugize(&collect_text(target));
    let mut seen = 0;
    for n in root.descendants() {
        if !matches!(n.data.borrow().value, NodeValue::Heading(..)) {
            continue;
        }
        if n.same_node(target) {
            break;
        }
        if slugize(&collect_text(n)) == base {
            seen += 1;
        }
    }
    if seen == 0 {
        base
    } else {
        format!("{}-{}", base, seen)
    }
}

fn footnote_number<'a>(root: &'a AstNode<'a>, label: &str) -> usize {
    let mut n = 0;
    for child in root.descendants() {
        if let NodeValue::FootnoteDef(ref l) = child.data.borrow().value {
            n += 1;
            if l == label {
                return n;
            }
        }
    }
    0
}

type Res = Result<WalkStatus, RenderError>;

fn noop<'a, 'o>(_r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, _entering: bool) -> Res {
    Ok(WalkStatus::Continue)
}

fn invisible<'a, 'o>(_r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, _entering: bool) -> Res {
    Ok(WalkStatus::SkipChildren)
}

fn document<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if !entering && r.footnote_ix > 0 {
        r.tag("</ol>\n</section>\n");
    }
    Ok(WalkStatus::Continue)
}

fn paragraph<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let tight = in_tight_list(node);
    if entering {
        if !tight {
            r.newline();
            r.tag("<p>");
        }
    } else if !tight {
        r.tag("</p>\n");
    }
    Ok(WalkStatus::Continue)
}

fn heading<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let level = match node.data.borrow().value {
        NodeValue::Heading(ref nh) => nh.level,
        _ => unreachable!(),
    };
    if entering {
        r.newline();
        r.tag(&format!("<h{}", level));
        let id = match node.data.borrow().value {
            NodeValue::Heading(ref nh) => nh.id.clone(),
            _ => None,
        };
        if let Some(id) = id {
            r.tag(&format!(" id=\"{}\"", escape_to_string(&id)));
        }
        r.tag(">");
        if r.options.heading_anchor {
            let slug = heading_slug(r.root(), node);
            r.tag(&format!(
                "<a href=\"#{slug}\" aria-hidden=\"true\" class=\"anchor\" id=\"{slug}\"></a>",
                slug = slug
            ));
        }
    } else {
        r.tag(&format!("</h{}>\n", level));
    }
    Ok(WalkStatus::Continue)
}

fn block_quote<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        r.tag("<blockquote>\n");
    } else {
        r.newline();
        r.tag("</blockquote>\n");
    }
    Ok(WalkStatus::Continue)
}

fn list<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let nl = match node.data.borrow().value {
        NodeValue::List(ref nl) => *nl,
        _ => unreachable!(),
    };
    if entering {
        r.newline();
        match nl.typ {
            ListType::Ordered => {
                if nl.start == 1 {
                    r.tag("<ol>\n");
                } else {
                    r.tag(&format!("<ol start=\"{}\">\n", nl.start));
                }
            }
            _ => r.tag("<ul>\n"),
        }
    } else {
        match nl.typ {
            ListType::Ordered => r.tag("</ol>\n"),
            _ => r.tag("</ul>\n"),
        }
    }
    Ok(WalkStatus::Continue)
}

fn list_item<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.tag("<li>");
    } else {
        r.tag("</li>\n");
    }
    Ok(WalkStatus::Continue)
}

fn code_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        let ast = node.data.borrow();
        let info = match ast.value {
            NodeValue::CodeBlock(ref ncb) => ncb.info.clone(),
            _ => unreachable!(),
        };
        if info.is_empty() {
            r.tag("<pre><code>");
        } else {
            let bytes: Vec<u8> = info
                .iter()
                .map(|i| i.term)
                .take_while(|&b| !is_whitespace(b))
                .collect();
            let lang = String::from_utf8_lossy(&bytes).into_owned();
            r.tag(&format!(
                "<pre><code class=\"language-{}\">",
                escape_to_string(&lang)
            ));
        }
        escape(r, &ast.tokens.iter().map(|i| i.term).collect::<Vec<u8>>());
        r.tag("</code></pre>\n");
    }
    Ok(WalkStatus::SkipChildren)
}

fn html_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        if r.disable_tags == 0 {
            let tokens = node.data.borrow().tokens.clone();
            r.write_tokens(&tokens);
        }
        r.newline();
    }
    Ok(WalkStatus::SkipChildren)
}

fn thematic_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        r.tag("<hr />\n");
    }
    Ok(WalkStatus::Continue)
}

fn table<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        r.tag("<table>\n");
    } else {
        if node
            .last_child()
            .map_or(false, |c| matches!(c.data.borrow().value, NodeValue::TableRow))
        {
            r.tag("</tbody>\n");
        }
        r.tag("</table>\n");
    }
    Ok(WalkStatus::Continue)
}

fn table_head<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.tag("<thead>\n");
    } else {
        r.tag("</thead>\n");
    }
    Ok(WalkStatus::Continue)
}

fn table_row<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let first_body_row = node
            .previous_sibling()
            .map_or(false, |p| matches!(p.data.borrow().value, NodeValue::TableHead));
        if first_body_row {
            r.tag("<tbody>\n");
        }
        r.tag("<tr>\n");
    } else {
        r.tag("</tr>\n");
    }
    Ok(WalkStatus::Continue)
}

fn table_cell<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    let in_head = node
        .parent()
        .and_then(|row| row.parent())
        .map_or(false, |h| matches!(h.data.borrow().value, NodeValue::TableHead));
    let tag_name = if in_head { "th" } else { "td" };
    if entering {
        let align = match node.data.borrow().value {
            NodeValue::TableCell(a) => a,
            _ => unreachable!(),
        };
        let align_attr = match align {
            TableAlignment::None => "",
            TableAlignment::Left => " align=\"left\"",
            TableAlignment::Center => " align=\"center\"",
            TableAlignment::Right => " align=\"right\"",
        };
        r.tag(&format!("<{}{}>", tag_name, align_attr));
    } else {
        r.tag(&format!("</{}>\n", tag_name));
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
            r.newline();
            r.tag("<section class=\"footnotes\" data-footnotes>\n<ol>\n");
        }
        r.footnote_ix += 1;
        r.tag(&format!("<li id=\"fn-{}\">\n", label));
    } else {
        r.newline();
        r.tag("</li>\n");
    }
    Ok(WalkStatus::Continue)
}

fn footnote_ref<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let label = match node.data.borrow().value {
            NodeValue::FootnoteRef(ref l) => l.clone(),
            _ => unreachable!(),
        };
        let n = footnote_number(r.root(), &label);
        r.tag(&format!(
            "<sup class=\"footnote-ref\"><a href=\"#fn-{label}\" id=\"fnref-{label}\">{n}</a></sup>",
            label = label,
            n = n
        ));
    }
    Ok(WalkStatus::Continue)
}

fn math_block<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        r.tag("<div class=\"language-math\">");
        let bytes: Vec<u8> = node.data.borrow().tokens.iter().map(|i| i.term).collect();
        escape(r, &bytes);
        r.tag("</div>\n");
    }
    Ok(WalkStatus::SkipChildren)
}

fn toc<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.newline();
        r.tag("<div class=\"toc\">\n<ul>\n");
        let root = r.root();
        let headings: Vec<_> = root
            .descendants()
            .filter(|n| matches!(n.data.borrow().value, NodeValue::Heading(..)))
            .collect();
        for h in headings {
            let slug = heading_slug(root, h);
            let label = escape_to_string(&collect_text(h));
            r.tag(&format!(
                "<li><a href=\"#{}\">{}</a></li>\n",
                slug, label
            ));
        }
        r.tag("</ul>\n</div>\n");
    }
    Ok(WalkStatus::SkipChildren)
}

fn text<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        let bytes: Vec<u8> = node.data.borrow().tokens.iter().map(|i| i.term).collect();
        escape(r, &bytes);
    }
    Ok(WalkStatus::Continue)
}

fn soft_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        if r.disable_tags > 0 {
            r.write_str(" ");
        } else {
            r.write_str("\n");
        }
    }
    Ok(WalkStatus::Continue)
}

fn hard_break<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        if r.disable_tags > 0 {
            r.write_str(" ");
        } else {
            r.write_str("<br />\n");
        }
    }
    Ok(WalkStatus::Continue)
}

fn code_span<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.tag("<code>");
    } else {
        r.tag("</code>");
    }
    Ok(WalkStatus::Continue)
}

fn code_span_content<'a, 'o>(
    r: &mut Renderer<'a, 'o>,
    node: &'a AstNode<'a>,
    entering: bool,
) -> Res {
    if entering {
        let bytes: Vec<u8> = node.data.borrow().tokens.iter().map(|i| i.term).collect();
        escape(r, &bytes);
    }
    Ok(WalkStatus::Continue)
}

fn emphasis<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    r.tag(if entering { "<em>" } else { "</em>" });
    Ok(WalkStatus::Continue)
}

fn strong<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    r.tag(if entering { "<strong>" } else { "</strong>" });
    Ok(WalkStatus::Continue)
}

fn strikethrough<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    r.tag(if entering { "<del>" } else { "</del>" });
    Ok(WalkStatus::Continue)
}

fn link<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        if r.disable_tags == 0 {
            let dest = full_dest(r, &link_dest_of(node));
            r.write_str("<a href=\"");
            escape_href(r, dest.as_bytes());
            r.write_str("\"");
            if let Some(title) = node.child_of_type(NodeType::LinkTitle) {
                let bytes: Vec<u8> = title.data.borrow().tokens.iter().map(|i| i.term).collect();
                r.write_str(" title=\"");
                escape(r, &bytes);
                r.write_str("\"");
            }
            r.write_str(">");
        }
    } else {
        r.tag("</a>");
    }
    Ok(WalkStatus::Continue)
}

fn image<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        if r.disable_tags == 0 {
            let dest = full_dest(r, &link_dest_of(node));
            r.write_str("<img src=\"");
            escape_href(r, dest.as_bytes());
            r.write_str("\" alt=\"");
        }
        r.disable_tags += 1;
    } else {
        r.disable_tags -= 1;
        if r.disable_tags == 0 {
            if let Some(title) = node.child_of_type(NodeType::LinkTitle) {
                let bytes: Vec<u8> = title.data.borrow().tokens.iter().map(|i| i.term).collect();
                r.write_str("\" title=\"");
                escape(r, &bytes);
            }
            r.write_str("\" />");
        }
    }
    Ok(WalkStatus::Continue)
}

fn inline_html<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering && r.disable_tags == 0 {
        let tokens = node.data.borrow().tokens.clone();
        r.write_tokens(&tokens);
    }
    Ok(WalkStatus::Continue)
}

fn inline_math<'a, 'o>(r: &mut Renderer<'a, 'o>, _node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering {
        r.tag("<span class=\"language-math\">");
    } else {
        r.tag("</span>");
    }
    Ok(WalkStatus::Continue)
}

fn inline_math_content<'a, 'o>(
    r: &mut Renderer<'a, 'o>,
    node: &'a AstNode<'a>,
    entering: bool,
) -> Res {
    if entering {
        let bytes: Vec<u8> = node.data.borrow().tokens.iter().map(|i| i.term).collect();
        escape(r, &bytes);
    }
    Ok(WalkStatus::Continue)
}

fn emoji_img<'a, 'o>(r: &mut Renderer<'a, 'o>, node: &'a AstNode<'a>, entering: bool) -> Res {
    if entering && r.disable_tags == 0 {
        let tokens = node.data.borrow().tokens.clone();
        r.write_tokens(&tokens);
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
        if checked {
            r.tag("<input type=\"checkbox\" checked=\"\" disabled=\"\" /> ");
        } else {
            r.tag("<input type=\"checkbox\" disabled=\"\" /> ");
        }
    }
    Ok(WalkStatus::Continue)
}
