use super::*;
use crate::{markdown_to_editor_dom, CARET};

fn dom(input: &str) -> String {
    let mut options = Options::default();
    options.vditor_sv = true;
    markdown_to_editor_dom(input, &options)
}

#[test]
fn paragraph_block() {
    assert_eq!(dom("hi\n"), "<p data-block=\"0\">hi</p>");
}

#[test]
fn heading_marker_span() {
    assert_eq!(
        dom("## Hi\n"),
        "<h2 data-block=\"0\" data-marker=\"#\"><span data-type=\"heading-marker\">## </span>Hi</h2>",
    );
}

#[test]
fn code_block_markers() {
    assert_eq!(
        dom("```rust\nx\n```\n"),
        concat!(
            "<div data-block=\"0\" data-type=\"code-block\">",
            "<span data-type=\"code-block-open-marker\">```</span>",
            "<span data-type=\"code-block-info\">\u{200b}rust</span>",
            "<pre><code>x\n</code></pre>",
            "<span data-type=\"code-block-close-marker\">```</span>",
            "</div>"
        ),
    );
}

#[test]
fn inline_constructs_wrap_their_source() {
    assert_eq!(
        dom("*em* and `c`\n"),
        concat!(
            "<p data-block=\"0\">",
            "<span data-type=\"em\">*em*</span>",
            " and ",
            "<span data-type=\"code-inline\"><code>`c`</code></span>",
            "</p>"
        ),
    );
}

#[test]
fn link_source_is_annotated() {
    assert_eq!(
        dom("[t](/u)\n"),
        concat!(
            "<p data-block=\"0\">",
            "<span data-type=\"a\">",
            "[t](",
            "<span data-type=\"link-dest\">/u</span>",
            ")",
            "</span>",
            "</p>"
        ),
    );
}

#[test]
fn link_ref_defs_block() {
    assert_eq!(
        dom("[a]: /u\n"),
        "<div data-block=\"0\" data-type=\"link-ref-defs-block\">[a]: /u\n</div>",
    );
}

#[test]
fn caret_sentinel_passes_through() {
    let input = format!("# He{}llo\n", CARET);
    let out = dom(&input);
    assert!(out.contains(CARET), "caret lost: {}", out);
}

#[test]
fn caret_never_appears_unprompted() {
    let out = dom("# Hello\n\ntext\n");
    assert!(!out.contains(CARET));
}

#[test]
fn thematic_break_block() {
    assert_eq!(dom("---\n"), "<hr data-block=\"0\" />");
}
