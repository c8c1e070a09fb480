use super::*;

#[test]
fn basic() {
    html(
        concat!(
            "A tiny engine check.\n",
            "\n",
            "It parses **blocks** and *inlines*.\n",
            "\n",
            "> Quoted wisdom.\n",
            "\n",
            "### Closing notes\n",
            "\n",
            "Done here.\n"
        ),
        concat!(
            "<p>A tiny engine check.</p>\n",
            "<p>It parses <strong>blocks</strong> and <em>inlines</em>.</p>\n",
            "<blockquote>\n",
            "<p>Quoted wisdom.</p>\n",
            "</blockquote>\n",
            "<h3>Closing notes</h3>\n",
            "<p>Done here.</p>\n"
        ),
    );
}

#[test]
fn thematic_breaks() {
    html(
        concat!("___\n", "\n", "***\n", "\n", "\n", "*  *  *  *\n"),
        concat!("<hr />\n", "<hr />\n", "<hr />\n"),
    );
}

#[test]
fn atx_heading() {
    html(
        concat!("### three hashes\n", "still a paragraph\n", "##### five\n"),
        concat!(
            "<h3>three hashes</h3>\n",
            "<p>still a paragraph</p>\n",
            "<h5>five</h5>\n"
        ),
    );
}

#[test]
fn atx_heading_closing_hashes() {
    html("## h2 ##\n", "<h2>h2</h2>\n");
    html("# not#closed\n", "<h1>not#closed</h1>\n");
}

#[test]
fn setext_heading() {
    html(
        concat!(
            "Second level\n",
            "------------\n",
            "\n",
            "First level\n",
            "===========\n"
        ),
        concat!("<h2>Second level</h2>\n", "<h1>First level</h1>\n"),
    );
}

#[test]
fn lists() {
    html(
        concat!("7) seven\n", "8) eight\n"),
        concat!(
            "<ol start=\"7\">\n",
            "<li>seven</li>\n",
            "<li>eight</li>\n",
            "</ol>\n"
        ),
    );

    html(
        concat!("+ pears\n", "+ plums\n"),
        concat!("<ul>\n", "<li>pears</li>\n", "<li>plums</li>\n", "</ul>\n"),
    );
}

#[test]
fn loose_list() {
    html(
        concat!("- a\n", "\n", "- b\n"),
        concat!(
            "<ul>\n",
            "<li>\n<p>a</p>\n</li>\n",
            "<li>\n<p>b</p>\n</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn nested_blockquote_paragraph() {
    html(
        concat!("> a\n", "b\n"),
        concat!("<blockquote>\n", "<p>a\nb</p>\n", "</blockquote>\n"),
    );
}

#[test]
fn breaks() {
    html("foo  \nbar\n", "<p>foo<br />\nbar</p>\n");
    html("foo\\\nbar\n", "<p>foo<br />\nbar</p>\n");
    html("foo\nbar\n", "<p>foo\nbar</p>\n");
}

#[test]
fn backslash_escapes() {
    html("\\*not em\\*\n", "<p>*not em*</p>\n");
    html("\\# not a heading\n", "<p># not a heading</p>\n");
}

#[test]
fn entities() {
    html("&amp; &#65; &bogus\n", "<p>&amp; A &amp;bogus</p>\n");
}

#[test]
fn inline_html() {
    html("a <b>c</b>\n", "<p>a <b>c</b></p>\n");
}

#[test]
fn html_block() {
    html(
        concat!("<div>\n", "x\n", "</div>\n"),
        concat!("<div>\n", "x\n", "</div>\n"),
    );
}

#[test]
fn html_block_comment() {
    html(
        concat!("<!-- c -->\n", "x\n"),
        concat!("<!-- c -->\n", "<p>x</p>\n"),
    );
}

#[test]
fn code_spans() {
    html("`code`\n", "<p><code>code</code></p>\n");
    html("`` a`b ``\n", "<p><code>a`b</code></p>\n");
    html("`unclosed\n", "<p>`unclosed</p>\n");
}

#[test]
fn angle_autolinks() {
    html(
        "<https://a.b>\n",
        "<p><a href=\"https://a.b\">https://a.b</a></p>\n",
    );
    html(
        "<me@example.com>\n",
        "<p><a href=\"mailto:me@example.com\">me@example.com</a></p>\n",
    );
}

#[test]
fn indented_code() {
    html("    foo\n", "<pre><code>foo\n</code></pre>\n");
}

#[test]
fn indented_code_does_not_interrupt_paragraph() {
    html("a\n    b\n", "<p>a\nb</p>\n");
}

#[test]
fn emphasis_nesting() {
    html(
        "*a* **b** ***c***\n",
        "<p><em>a</em> <strong>b</strong> <em><strong>c</strong></em></p>\n",
    );
}

#[test]
fn underscore_intraword_stays_literal() {
    html("a_b_c\n", "<p>a_b_c</p>\n");
    html("a*b*c\n", "<p>a<em>b</em>c</p>\n");
}

#[test]
fn unmatched_delimiters_stay_literal() {
    html("*not closed\n", "<p>*not closed</p>\n");
    html("fine* here\n", "<p>fine* here</p>\n");
}

#[test]
fn heading_anchors() {
    html_opts!(
        [heading_anchor],
        "# My Title\n",
        concat!(
            "<h1><a href=\"#my-title\" aria-hidden=\"true\" class=\"anchor\" ",
            "id=\"my-title\"></a>My Title</h1>\n"
        ),
    );
}

#[test]
fn heading_custom_ids() {
    html_opts!([heading_id], "## Hi {#custom}\n", "<h2 id=\"custom\">Hi</h2>\n");
    html("## Hi {#custom}\n", "<h2>Hi {#custom}</h2>\n");
}

#[test]
fn toc_synthesis() {
    html_opts!(
        [toc],
        "[toc]\n\n# One\n\n## Two\n",
        concat!(
            "<div class=\"toc\">\n",
            "<ul>\n",
            "<li><a href=\"#one\">One</a></li>\n",
            "<li><a href=\"#two\">Two</a></li>\n",
            "</ul>\n",
            "</div>\n",
            "<h1>One</h1>\n",
            "<h2>Two</h2>\n"
        ),
    );
}

#[test]
fn nul_bytes_are_replaced() {
    html("a\u{0}b\n", "<p>a\u{FFFD}b</p>\n");
}

#[test]
fn tabs_expand_in_indented_code() {
    html("\tfoo\n", "<pre><code>foo\n</code></pre>\n");
}
