use super::*;

#[test]
fn terms_are_fixed_in_plain_text() {
    html_opts!(
        [fix_term_typo],
        "we deploy mysql and redis today\n",
        "<p>we deploy MySQL and Redis today</p>\n",
    );
}

#[test]
fn autolink_text_is_never_touched() {
    html_opts!(
        [fix_term_typo],
        "See github and <https://github.com>.\n",
        "<p>See GitHub and <a href=\"https://github.com\">https://github.com</a>.</p>\n",
    );
}

#[test]
fn hostnames_and_filenames_survive() {
    html_opts!(
        [fix_term_typo],
        "github.com hosts test.html pages\n",
        "<p>github.com hosts test.html pages</p>\n",
    );
}

#[test]
fn code_spans_and_code_blocks_survive() {
    html_opts!(
        [fix_term_typo],
        "`github` stays\n",
        "<p><code>github</code> stays</p>\n",
    );
    html_opts!(
        [fix_term_typo],
        "```\ngithub\n```\n",
        "<pre><code>github\n</code></pre>\n",
    );
}

#[test]
fn link_labels_are_skipped() {
    html_opts!(
        [fix_term_typo],
        "[github here](/x)\n",
        "<p><a href=\"/x\">github here</a></p>\n",
    );
}

#[test]
fn auto_space_between_cjk_and_western() {
    html_opts!(
        [auto_space],
        "用Rust写解析器\n",
        "<p>用 Rust 写解析器</p>\n",
    );
}

#[test]
fn typo_fixing_needs_the_option() {
    html("github\n", "<p>github</p>\n");
}
