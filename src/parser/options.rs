//! The options record.  Parsing and rendering read it by shared reference;
//! nothing in the engine consults global state.

/// Engine options.  Everything defaults to off, giving plain CommonMark
/// behavior; each flag documents where it diverges.
#[derive(Default, Debug, Clone)]
pub struct Options {
    /// Emit an anchor `<a>` inside each heading in HTML output, with an id
    /// slugified from the heading text.
    pub heading_anchor: bool,

    /// Insert a space between adjacent CJK and Western characters in text
    /// content (a post-parse pass over text nodes).
    pub auto_space: bool,

    /// Fix the capitalization of well-known technical terms in text content
    /// ("github" becomes "GitHub").  Link destinations, code, raw HTML and
    /// autolinks are never touched.
    ///
    /// A term touching a dot is left alone, so `github.com` and
    /// `test.html` survive.
    ///
    /// ```
    /// # use vellum::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.fix_term_typo = true;
    /// assert_eq!(markdown_to_html("I use github for code.\n", &options),
    ///            "<p>I use GitHub for code.</p>\n");
    /// ```
    pub fix_term_typo: bool,

    /// Enables `:alias:` emoji.  Aliases known to the emoji dictionary
    /// render as Unicode; with [`Options::emoji_site`] set, unknown aliases
    /// render as an `<img>` from that base URL.
    pub emoji: bool,

    /// Base URL for emoji images used for aliases the dictionary cannot
    /// resolve to Unicode.  The image URL is `{emoji_site}/{alias}.png`.
    pub emoji_site: String,

    /// Recognize a trailing `{#custom-id}` on headings and use it as the
    /// heading's HTML id.
    pub heading_id: bool,

    /// Enables GFM tables.
    ///
    /// ```
    /// # use vellum::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.gfm_table = true;
    /// assert_eq!(markdown_to_html("| a |\n|---|\n| b |\n", &options),
    ///            "<table>\n<thead>\n<tr>\n<th>a</th>\n</tr>\n</thead>\n\
    ///             <tbody>\n<tr>\n<td>b</td>\n</tr>\n</tbody>\n</table>\n");
    /// ```
    pub gfm_table: bool,

    /// Enables GFM strikethrough (`~~gone~~`).
    ///
    /// ```
    /// # use vellum::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.gfm_strikethrough = true;
    /// assert_eq!(markdown_to_html("Hello ~~world~~.\n", &options),
    ///            "<p>Hello <del>world</del>.</p>\n");
    /// ```
    pub gfm_strikethrough: bool,

    /// Enables GFM task list items (`- [x] done`).
    pub gfm_task_list_item: bool,

    /// Detect bare `www.` and `http(s)://` URLs in text and link them.
    pub gfm_auto_link: bool,

    /// Enables footnotes (`[^1]` references with `[^1]: …` definitions).
    pub footnotes: bool,

    /// Replace a paragraph consisting of `[toc]` with a table of contents
    /// synthesized from the document's headings.
    pub toc: bool,

    /// Enables `$…$` inline math and `$$` display math blocks.
    pub math: bool,

    /// Allow a digit immediately after the opening `$` of inline math.
    /// Off by default so amounts like `$20 and $30` stay plain text.
    pub inline_math_allow_digit_after_open_marker: bool,

    /// Prefix prepended to relative link and image destinations at render
    /// time.
    pub link_base: String,

    /// Editor WYSIWYG mode: the caret sentinel is tolerated inside
    /// constructs during parsing so a mid-edit document round-trips.
    pub vditor_wysiwyg: bool,

    /// Editor split-view mode; selects the annotated-DOM renderer.
    pub vditor_sv: bool,
}
