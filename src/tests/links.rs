use super::*;

#[test]
fn inline_link() {
    html("[text](/url)\n", "<p><a href=\"/url\">text</a></p>\n");
    html(
        "[text](/url \"title\")\n",
        "<p><a href=\"/url\" title=\"title\">text</a></p>\n",
    );
    html("[empty]()\n", "<p><a href=\"\">empty</a></p>\n");
}

#[test]
fn image() {
    html(
        "![alt](/img.png)\n",
        "<p><img src=\"/img.png\" alt=\"alt\" /></p>\n",
    );
    html(
        "![alt](/img.png \"t\")\n",
        "<p><img src=\"/img.png\" alt=\"alt\" title=\"t\" /></p>\n",
    );
}

#[test]
fn emphasis_inside_label() {
    html(
        "[*em* text](/u)\n",
        "<p><a href=\"/u\"><em>em</em> text</a></p>\n",
    );
}

#[test]
fn image_alt_suppresses_markup() {
    html(
        "![*a* b](/i)\n",
        "<p><img src=\"/i\" alt=\"a b\" /></p>\n",
    );
}

#[test]
fn no_links_inside_links() {
    html(
        "[a [b](/x)](/y)\n",
        "<p>[a <a href=\"/x\">b</a>](/y)</p>\n",
    );
}

#[test]
fn collapsed_and_full_references() {
    html(
        "[label]: /u\n\n[label][]\n",
        "<p><a href=\"/u\">label</a></p>\n",
    );
    html(
        "[label]: /u\n\n[text][label]\n",
        "<p><a href=\"/u\">text</a></p>\n",
    );
}

#[test]
fn undefined_full_reference_stays_literal() {
    html(
        "[label]: /u\n\n[text][nope]\n",
        "<p>[text][nope]</p>\n",
    );
}

#[test]
fn pointy_destination_and_escapes() {
    html("[a](</my uri>)\n", "<p><a href=\"/my%20uri\">a</a></p>\n");
    html("[a](/u\\(1\\))\n", "<p><a href=\"/u(1)\">a</a></p>\n");
}

#[test]
fn destination_stops_at_unbalanced_paren() {
    html("[a](/u) tail\n", "<p><a href=\"/u\">a</a> tail</p>\n");
}

#[test]
fn link_base_prefixes_relative_destinations() {
    let mut options = Options::default();
    options.link_base = "https://cdn.example".to_string();
    pretty_assertions::assert_eq!(
        crate::markdown_to_html("[a](/u)\n[b](https://abs/x)\n", &options),
        "<p><a href=\"https://cdn.example/u\">a</a>\n<a href=\"https://abs/x\">b</a></p>\n",
    );
}
