use super::*;

#[test]
fn known_alias_becomes_unicode() {
    html_opts!([emoji], "hi :heart:\n", "<p>hi \u{2764}\u{fe0f}</p>\n");
}

#[test]
fn unknown_alias_without_site_stays_literal() {
    html_opts!([emoji], "hi :not_an_emoji_alias:\n", "<p>hi :not_an_emoji_alias:</p>\n");
}

#[test]
fn unknown_alias_with_site_renders_an_image() {
    let mut options = Options::default();
    options.emoji = true;
    options.emoji_site = "https://img.example/emoji".to_string();
    pretty_assertions::assert_eq!(
        crate::markdown_to_html(":not_an_emoji_alias:\n", &options),
        concat!(
            "<p><img alt=\"not_an_emoji_alias\" class=\"emoji\" ",
            "src=\"https://img.example/emoji/not_an_emoji_alias.png\" ",
            "title=\"not_an_emoji_alias\" /></p>\n"
        ),
    );
}

#[test]
fn colons_without_alias_are_plain_text() {
    html_opts!([emoji], "a : b :: c\n", "<p>a : b :: c</p>\n");
}

#[test]
fn emoji_needs_the_option() {
    html(":heart:\n", "<p>:heart:</p>\n");
}
