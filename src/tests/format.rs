use super::*;

#[test]
fn paragraphs_and_emphasis() {
    format("Hello *world*\n", "Hello *world*\n");
    format("a\nb\n\nc\n", "a\nb\n\nc\n");
}

#[test]
fn setext_normalizes_to_atx() {
    format("Title\n=====\n", "# Title\n");
    format("Sub\n---\n", "## Sub\n");
}

#[test]
fn list_markers_are_preserved() {
    format("* a\n* b\n", "* a\n* b\n");
    format("2. x\n3. y\n", "2. x\n3. y\n");
}

#[test]
fn block_quotes_reprefix() {
    format("> a\n> b\n", "> a\n> b\n");
    format(">quote\n", "> quote\n");
}

#[test]
fn fenced_code_keeps_fence_and_info() {
    format("```rust\nfn x() {}\n```\n", "```rust\nfn x() {}\n```\n");
    format("~~~~\nx\n~~~~\n", "~~~~\nx\n~~~~\n");
}

#[test]
fn reference_definitions_survive_and_links_inline() {
    format(
        "[a]: /one\n\n[a]\n",
        "[a]: /one\n\n[a](/one)\n",
    );
}

#[test]
fn autolinks_keep_their_brackets() {
    format("<https://a.b>\n", "<https://a.b>\n");
}

#[test]
fn idempotence() {
    let options = Options::default();
    for input in [
        "Hello *world*\n",
        "# h1\n\ntext `code` **strong**\n",
        "- a\n  - b\n- c\n",
        "1. x\n\n2. y\n",
        "> quote\n>\n> more\n",
        "```rust\nfn x() {}\n```\n",
        "    indented\n",
        "[a]: /u \"t\"\n\n[a] and ![i](/img)\n",
        "a  \nhard break\n",
        "---\n",
        "Setext\n======\n",
        "para\n\n<div>\nraw\n</div>\n",
    ] {
        assert_format_idempotent(input, &options);
    }
}

#[test]
fn idempotence_with_extensions() {
    let mut options = Options::default();
    options.gfm_table = true;
    options.gfm_strikethrough = true;
    options.gfm_task_list_item = true;
    options.footnotes = true;
    options.math = true;

    for input in [
        "| a | b |\n|:--|--:|\n| c | d |\n",
        "- [x] done\n- [ ] not\n",
        "~~gone~~ kept\n",
        "x[^a]\n\n[^a]: note\n",
        "$$\na^2\n$$\n",
        "$x+y$ inline\n",
    ] {
        assert_format_idempotent(input, &options);
    }
}
