use super::*;

#[test]
fn title_on_next_line() {
    html(
        "[a]: /u\n  \"t\"\n\n[a]\n",
        "<p><a href=\"/u\" title=\"t\">a</a></p>\n",
    );
}

#[test]
fn label_whitespace_collapses() {
    html(
        "[ Foo\n Bar ]: /x\n\n[foo bar]\n",
        "<p><a href=\"/x\">foo bar</a></p>\n",
    );
}

#[test]
fn first_definition_wins() {
    html(
        "[a]: /one\n[a]: /two\n\n[a]\n",
        "<p><a href=\"/one\">a</a></p>\n",
    );
}

#[test]
fn definition_followed_by_text_keeps_paragraph() {
    html(
        "[a]: /u\nrest\n\n[a]\n",
        "<p>rest</p>\n<p><a href=\"/u\">a</a></p>\n",
    );
}

#[test]
fn same_line_title_with_trailing_text_is_no_definition() {
    html(
        "[a]: /u \"t\" x\n\n[a]\n",
        "<p>[a]: /u &quot;t&quot; x</p>\n<p>[a]</p>\n",
    );
}

#[test]
fn next_line_title_with_trailing_text_drops_the_title() {
    html(
        "[a]: /u\n\"t\" x\n\n[a]\n",
        "<p>&quot;t&quot; x</p>\n<p><a href=\"/u\">a</a></p>\n",
    );
}

#[test]
fn destination_is_percent_encoded() {
    html(
        "[a]: </my uri>\n\n[a]\n",
        "<p><a href=\"/my%20uri\">a</a></p>\n",
    );
}

#[test]
fn label_matching_is_case_insensitive() {
    html(
        "[ГitHub]: /x\n\n[гithub]\n",
        "<p><a href=\"/x\">гithub</a></p>\n",
    );
}

#[test]
fn unknown_reference_stays_literal() {
    html("[nope]\n", "<p>[nope]</p>\n");
}

#[test]
fn definitions_never_render_in_html() {
    html("[a]: /u\n", "");
}
