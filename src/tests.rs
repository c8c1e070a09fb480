mod autolink;
mod code;
mod core;
mod emoji;
mod footnotes;
mod format;
mod link_ref_def;
mod links;
mod math;
mod renderer;
mod table;
mod tasklist;
mod typographer;
mod vditor;

pub use crate::{
    format_markdown, markdown_to_html, parse_document, Arena, Options,
};

#[track_caller]
pub fn html(input: &str, expected: &str) {
    let options = Options::default();
    pretty_assertions::assert_eq!(
        markdown_to_html(input, &options),
        expected,
        "input: {:?}",
        input
    );
}

macro_rules! html_opts {
    ([$($opt:ident),* $(,)?], $input:expr, $expected:expr $(,)?) => {{
        let mut options = $crate::Options::default();
        $( options.$opt = true; )*
        pretty_assertions::assert_eq!(
            $crate::markdown_to_html($input, &options),
            $expected,
            "input: {:?}",
            $input
        );
    }};
}
pub(crate) use html_opts;

#[track_caller]
pub fn format(input: &str, expected: &str) {
    let options = Options::default();
    pretty_assertions::assert_eq!(
        format_markdown(input, &options),
        expected,
        "input: {:?}",
        input
    );
}

/// `format ∘ parse` must be a fixed point of itself.
#[track_caller]
pub fn assert_format_idempotent(input: &str, options: &Options) {
    let once = format_markdown(input, options);
    let twice = format_markdown(&once, options);
    pretty_assertions::assert_eq!(twice, once, "input: {:?}", input);
}
