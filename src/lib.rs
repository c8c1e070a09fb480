//! A structured Markdown engine.
//!
//! vellum parses CommonMark (plus the usual extensions: tables,
//! strikethrough, task lists, footnotes, math, emoji, autolinks) into a
//! full-fidelity AST and renders it to HTML, normalized Markdown, or an
//! annotated DOM for split-view editors.  Construct markers survive in the
//! tree, so source-oriented renderers can reproduce the input.
//!
//! ```
//! use vellum::{markdown_to_html, Options};
//!
//! let html = markdown_to_html("Hello, **世界**!\n", &Options::default());
//! assert_eq!(html, "<p>Hello, <strong>世界</strong>!</p>\n");
//! ```
//!
//! Parsing and rendering can be driven separately when the tree itself is
//! of interest:
//!
//! ```
//! use vellum::nodes::NodeValue;
//! use vellum::{parse_document, Arena, Options};
//!
//! let arena = Arena::new();
//! let options = Options::default();
//! let root = parse_document(&arena, "- one\n- two\n", &options);
//!
//! let items = root
//!     .descendants()
//!     .filter(|n| matches!(n.data.borrow().value, NodeValue::ListItem(..)))
//!     .count();
//! assert_eq!(items, 2);
//! ```

mod entity;
mod scanners;
mod strings;
mod typographer;

pub mod nodes;
pub mod parser;
pub mod render;
pub mod tokens;

pub use crate::nodes::{Arena, Ast, AstNode, NodeType, NodeValue, WalkStatus};
pub use crate::parser::{parse_document, LinkRefDef, Options};
pub use crate::render::vditor_sv::ZWSP;
pub use crate::render::{RenderError, Renderer};

/// The caret sentinel: a reserved codepoint marking the editor cursor
/// position during DOM round-trips.  Injected on input, stripped on
/// output; never produced by ordinary Markdown.
pub const CARET: &str = "\u{2038}";

/// Render Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str, options: &Options) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, options);
    let out = render::html::render_html(root, options).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

/// Reformat Markdown to its normalized form.  The result is a fixed point:
/// formatting it again returns it unchanged.
///
/// ```
/// use vellum::{format_markdown, Options};
///
/// let options = Options::default();
/// assert_eq!(format_markdown("Title\n=====\n", &options), "# Title\n");
/// ```
pub fn format_markdown(markdown: &str, options: &Options) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, options);
    let out = render::format::render_format(root, options).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

/// Render Markdown to the split-view editor DOM.  See
/// [`render::vditor_sv`] for the annotation scheme and [`CARET`] for the
/// cursor sentinel.
pub fn markdown_to_editor_dom(markdown: &str, options: &Options) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, options);
    let out = render::vditor_sv::render_vditor_sv(root, options).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests;
