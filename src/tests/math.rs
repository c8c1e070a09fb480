use super::*;
use ntest::test_case;

#[test_case("$2+2$", "<p><span class=\"language-math\">2+2</span></p>\n")]
#[test_case("$a!$ and $b$", "<p><span class=\"language-math\">a!</span> and <span class=\"language-math\">b</span></p>\n")]
#[test_case("$20 and $30", "<p>$20 and $30</p>\n")]
#[test_case("$x $", "<p>$x $</p>\n")]
#[test_case("$$a^2 + b^2$$", "<p><span class=\"language-math\">a^2 + b^2</span></p>\n")]
#[test_case("$1+\\$2$", "<p><span class=\"language-math\">1+\\$2</span></p>\n")]
fn inline_math(markdown: &str, expected: &str) {
    html_opts!([math], &format!("{}\n", markdown), expected);
}

#[test]
fn digit_after_open_marker_needs_the_option() {
    html_opts!([math], "$1$\n", "<p>$1$</p>\n");
    html_opts!(
        [math, inline_math_allow_digit_after_open_marker],
        "$1$\n",
        "<p><span class=\"language-math\">1</span></p>\n",
    );
}

#[test]
fn math_needs_the_option() {
    html("$2+2$\n", "<p>$2+2$</p>\n");
}

#[test]
fn display_math_block() {
    html_opts!(
        [math],
        "$$\na^2 + b^2 = c^2\n$$\n",
        "<div class=\"language-math\">a^2 + b^2 = c^2</div>\n",
    );
}

#[test]
fn unclosed_math_block_finalizes_at_eof() {
    html_opts!(
        [math],
        "$$\nx < y\n",
        "<div class=\"language-math\">x &lt; y</div>\n",
    );
}
