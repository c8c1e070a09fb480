use super::*;
use crate::nodes::{AstNode, NodeType, WalkStatus};
use crate::render::html::html_renderer;
use crate::render::{RenderError, Renderer};

#[test]
fn missing_function_is_an_error() {
    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "x\n", &options);

    let mut r = Renderer::new(root, &options);
    match r.render() {
        Err(RenderError::MissingRenderer { node_type, .. }) => {
            assert_eq!(node_type, NodeType::Document);
        }
        other => panic!("expected MissingRenderer, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn error_message_names_the_node_type() {
    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "x\n", &options);

    let err = Renderer::new(root, &options).render().unwrap_err();
    assert!(err.to_string().contains("Document"), "{}", err);
}

#[test]
fn registered_overrides_win() {
    fn italics<'a, 'o>(
        r: &mut Renderer<'a, 'o>,
        _node: &'a AstNode<'a>,
        entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        r.tag(if entering { "<i>" } else { "</i>" });
        Ok(WalkStatus::Continue)
    }

    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "*hi*\n", &options);

    let mut r = html_renderer(root, &options);
    r.register(NodeType::Emphasis, italics);
    let out = r.render().unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<p><i>hi</i></p>\n"
    );
}

#[test]
fn default_function_catches_everything() {
    fn swallow<'a, 'o>(
        _r: &mut Renderer<'a, 'o>,
        _node: &'a AstNode<'a>,
        _entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        Ok(WalkStatus::Continue)
    }

    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "# hi\n\ntext\n", &options);

    let mut r = Renderer::new(root, &options);
    r.register_default(swallow);
    let out = r.render().unwrap();
    assert!(out.is_empty());
}

#[test]
fn panics_become_errors_and_discard_output() {
    fn blows_up<'a, 'o>(
        _r: &mut Renderer<'a, 'o>,
        _node: &'a AstNode<'a>,
        entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        if entering {
            panic!("text node exploded");
        }
        Ok(WalkStatus::Continue)
    }

    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "before *boom*\n", &options);

    let mut r = html_renderer(root, &options);
    r.register(NodeType::Text, blows_up);
    match r.render() {
        Err(RenderError::Panic(msg)) => assert!(msg.contains("exploded")),
        other => panic!("expected Panic, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn render_is_repeatable() {
    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, "twice\n", &options);

    let mut r = html_renderer(root, &options);
    let first = r.render().unwrap();
    let second = r.render().unwrap();
    assert_eq!(first, second);
}

#[test]
fn no_node_type_is_left_unregistered() {
    // Every construct the parser can produce must render without touching
    // the default function.
    let mut options = Options::default();
    options.gfm_table = true;
    options.gfm_strikethrough = true;
    options.gfm_task_list_item = true;
    options.gfm_auto_link = true;
    options.footnotes = true;
    options.math = true;
    options.emoji = true;
    options.toc = true;

    let input = concat!(
        "[toc]\n\n",
        "# h *em* **st** ~~del~~ `c` $m$ :heart: [^f]\n\n",
        "> q\n\n",
        "- [x] t\n\n",
        "1. o\n\n",
        "| a |\n|---|\n| b |\n\n",
        "```i\nc\n```\n\n",
        "    ind\n\n",
        "$$\nm\n$$\n\n",
        "<div>\nh\n</div>\n\n",
        "[l](/u \"t\") ![i](/img) <https://a.b> www.x.com a@ <b>i</b>\n\n",
        "[^f]: def\n\n",
        "[r]: /ref\n\n",
        "[r]\n"
    );

    let arena = Arena::new();
    let root = parse_document(&arena, input, &options);
    assert!(crate::render::html::render_html(root, &options).is_ok());
    assert!(crate::render::format::render_format(root, &options).is_ok());
    assert!(crate::render::vditor_sv::render_vditor_sv(root, &options).is_ok());
}
