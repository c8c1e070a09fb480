use super::*;
use crate::nodes::NodeValue;

#[test]
fn backtick_fence_with_info() {
    html(
        concat!("``` rust yum\n", "fn main<'a>();\n", "```\n"),
        concat!(
            "<pre><code class=\"language-rust\">fn main&lt;'a&gt;();\n",
            "</code></pre>\n"
        ),
    );
}

#[test]
fn tilde_fence_with_two_space_indent() {
    html(
        concat!("  ~~~ruby\n", "  puts 1\n", "  ~~~\n"),
        concat!("<pre><code class=\"language-ruby\">puts 1\n", "</code></pre>\n"),
    );
}

#[test]
fn backtick_info_may_not_contain_backtick() {
    html("``` a`b\n", "<p>``` a`b</p>\n");
}

#[test]
fn close_requires_at_least_open_length() {
    html(
        concat!("````\n", "```\n", "````\n"),
        concat!("<pre><code>```\n", "</code></pre>\n"),
    );
}

#[test]
fn fence_close_may_not_carry_text() {
    html(
        concat!("```\n", "a\n", "``` x\n", "```\n"),
        concat!("<pre><code>a\n", "``` x\n", "</code></pre>\n"),
    );
}

#[test]
fn info_string_is_unescaped() {
    html(
        concat!("```c\\+\\+\n", "x\n", "```\n"),
        concat!("<pre><code class=\"language-c++\">x\n", "</code></pre>\n"),
    );
}

#[test]
fn unclosed_fence_finalizes_at_eof() {
    let arena = Arena::new();
    let options = Options::default();

    let root = parse_document(&arena, "```\nfn this_does_not() {}\n", &options);
    let mut found = false;
    for n in root.descendants() {
        if let NodeValue::CodeBlock(ref ncb) = n.data.borrow().value {
            assert!(ncb.fenced, "expected fenced code block");
            assert!(!ncb.closed, "expected unclosed code block");
            found = true;
            break;
        }
    }
    assert!(found, "expected a code block node");

    html(
        "```\nfn this_does_not() {}\n",
        "<pre><code>fn this_does_not() {}\n</code></pre>\n",
    );
}

#[test]
fn closed_fence_in_blockquote() {
    html(
        concat!("> ```\n", "> fn f() {}\n", "> ```\n"),
        concat!(
            "<blockquote>\n",
            "<pre><code>fn f() {}\n",
            "</code></pre>\n",
            "</blockquote>\n"
        ),
    );
}

#[test]
fn indented_code_trailing_blanks_collapse() {
    html(
        concat!("    a\n", "    \n", "\n"),
        concat!("<pre><code>a\n", "</code></pre>\n"),
    );
}

#[test]
fn fence_marker_children_are_present() {
    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "```rust\nx\n```\n", &options);

    let code = root
        .descendants()
        .find(|n| matches!(n.data.borrow().value, NodeValue::CodeBlock(..)))
        .unwrap();
    let kinds: Vec<_> = code.children().map(|c| c.node_type()).collect();
    assert_eq!(
        kinds,
        vec![
            crate::NodeType::CodeBlockFenceOpenMarker,
            crate::NodeType::CodeBlockFenceInfoMarker,
            crate::NodeType::CodeBlockCode,
            crate::NodeType::CodeBlockFenceCloseMarker,
        ]
    );
}
