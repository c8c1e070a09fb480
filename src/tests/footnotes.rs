use super::*;

#[test]
fn reference_and_definition() {
    html_opts!(
        [footnotes],
        "Hi[^x].\n\n[^x]: A greeting.\n",
        concat!(
            "<p>Hi<sup class=\"footnote-ref\"><a href=\"#fn-x\" id=\"fnref-x\">1</a></sup>.</p>\n",
            "<section class=\"footnotes\" data-footnotes>\n",
            "<ol>\n",
            "<li id=\"fn-x\">\n",
            "<p>A greeting.</p>\n",
            "</li>\n",
            "</ol>\n",
            "</section>\n"
        ),
    );
}

#[test]
fn definitions_are_numbered_in_document_order() {
    html_opts!(
        [footnotes],
        "a[^one] b[^two]\n\n[^one]: 1\n\n[^two]: 2\n",
        concat!(
            "<p>a<sup class=\"footnote-ref\"><a href=\"#fn-one\" id=\"fnref-one\">1</a></sup> ",
            "b<sup class=\"footnote-ref\"><a href=\"#fn-two\" id=\"fnref-two\">2</a></sup></p>\n",
            "<section class=\"footnotes\" data-footnotes>\n",
            "<ol>\n",
            "<li id=\"fn-one\">\n<p>1</p>\n</li>\n",
            "<li id=\"fn-two\">\n<p>2</p>\n</li>\n",
            "</ol>\n",
            "</section>\n"
        ),
    );
}

#[test]
fn undefined_reference_stays_literal() {
    html_opts!(
        [footnotes],
        "Hi[^nope].\n",
        "<p>Hi[^nope].</p>\n",
    );
}

#[test]
fn footnotes_need_the_option() {
    html(
        "Hi[^x].\n\n[^x]: A greeting.\n",
        "<p>Hi[^x].</p>\n<p>[^x]: A greeting.</p>\n",
    );
}

#[test]
fn multi_paragraph_definition() {
    html_opts!(
        [footnotes],
        "x[^a]\n\n[^a]: first\n\n    second\n",
        concat!(
            "<p>x<sup class=\"footnote-ref\"><a href=\"#fn-a\" id=\"fnref-a\">1</a></sup></p>\n",
            "<section class=\"footnotes\" data-footnotes>\n",
            "<ol>\n",
            "<li id=\"fn-a\">\n",
            "<p>first</p>\n",
            "<p>second</p>\n",
            "</li>\n",
            "</ol>\n",
            "</section>\n"
        ),
    );
}
