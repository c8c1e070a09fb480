use super::*;

#[test]
fn www_autolink() {
    html_opts!(
        [gfm_auto_link],
        "visit www.github.com now\n",
        "<p>visit <a href=\"http://www.github.com\">www.github.com</a> now</p>\n",
    );
}

#[test]
fn scheme_autolink() {
    html_opts!(
        [gfm_auto_link],
        "see https://example.com/a?b=c for details\n",
        "<p>see <a href=\"https://example.com/a?b=c\">https://example.com/a?b=c</a> for details</p>\n",
    );
}

#[test]
fn trailing_punctuation_is_left_out() {
    html_opts!(
        [gfm_auto_link],
        "go to https://example.com/a.\n",
        "<p>go to <a href=\"https://example.com/a\">https://example.com/a</a>.</p>\n",
    );
}

#[test]
fn unbalanced_close_paren_is_left_out() {
    html_opts!(
        [gfm_auto_link],
        "(see https://example.com/a)\n",
        "<p>(see <a href=\"https://example.com/a\">https://example.com/a</a>)</p>\n",
    );
}

#[test]
fn balanced_parens_stay_in_the_url() {
    html_opts!(
        [gfm_auto_link],
        "https://en.wikipedia.org/wiki/X_(Y)\n",
        "<p><a href=\"https://en.wikipedia.org/wiki/X_(Y)\">https://en.wikipedia.org/wiki/X_(Y)</a></p>\n",
    );
}

#[test]
fn mid_word_is_not_a_link() {
    html_opts!(
        [gfm_auto_link],
        "nothttps://example.com here\n",
        "<p>nothttps://example.com here</p>\n",
    );
}

#[test]
fn bare_urls_need_the_option() {
    html(
        "visit www.github.com now\n",
        "<p>visit www.github.com now</p>\n",
    );
}
