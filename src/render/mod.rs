//! The tree-walking renderer framework.
//!
//! A [`Renderer`] owns an output buffer and a dispatch table mapping node
//! types to functions of `(node, entering)`.  Concrete renderers (HTML,
//! normalized Markdown, the editor DOM flavor) register their function
//! sets; callers may override individual node types before rendering.

pub mod format;
pub mod html;
pub mod vditor_sv;

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rustc_hash::FxHashMap;

use crate::nodes::{AstNode, NodeType, NodeValue, WalkStatus};
use crate::parser::Options;
use crate::tokens::{items_to_str, Item};

/// A per-node-type rendering function.
pub type RendererFunc<'a, 'o> =
    fn(&mut Renderer<'a, 'o>, &'a AstNode<'a>, bool) -> Result<WalkStatus, RenderError>;

/// Rendering failures.  Parsing never fails; rendering only fails when
/// dispatch finds no function for a node type, or a renderer function
/// panicked.
#[derive(Debug)]
pub enum RenderError {
    /// No function registered for this node type and no default function
    /// installed.
    MissingRenderer {
        node_type: NodeType,
        tokens: String,
    },
    /// A renderer function panicked; the partial output was discarded.
    Panic(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingRenderer { node_type, tokens } => write!(
                f,
                "no render function for node [type={}, tokens={}]",
                node_type, tokens
            ),
            RenderError::Panic(msg) => write!(f, "renderer panicked: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// The base renderer: output buffer, last-byte tracking, the dispatch
/// table, and a tag-nesting guard used to suppress markup in contexts that
/// cannot nest it (an `<img alt>`, for instance).
pub struct Renderer<'a, 'o> {
    pub(crate) writer: Vec<u8>,
    last_out: u8,
    funcs: FxHashMap<NodeType, RendererFunc<'a, 'o>>,
    default_func: Option<RendererFunc<'a, 'o>>,
    pub(crate) disable_tags: usize,
    pub options: &'o Options,
    root: &'a AstNode<'a>,
    // Per-render scratch used by the concrete renderers.
    pub(crate) footnote_ix: usize,
    pub(crate) block_starts: Vec<usize>,
}

impl<'a, 'o> Renderer<'a, 'o> {
    pub fn new(root: &'a AstNode<'a>, options: &'o Options) -> Renderer<'a, 'o> {
        Renderer {
            writer: Vec::with_capacity(4096),
            last_out: b'\n',
            funcs: FxHashMap::default(),
            default_func: None,
            disable_tags: 0,
            options,
            root,
            footnote_ix: 0,
            block_starts: Vec::new(),
        }
    }

    /// Register the function for a node type, replacing any previous one.
    pub fn register(&mut self, node_type: NodeType, f: RendererFunc<'a, 'o>) {
        self.funcs.insert(node_type, f);
    }

    /// Install the fallback for node types without a registered function.
    pub fn register_default(&mut self, f: RendererFunc<'a, 'o>) {
        self.default_func = Some(f);
    }

    pub fn root(&self) -> &'a AstNode<'a> {
        self.root
    }

    /// Walk the tree and render.  On success the full output buffer is
    /// returned; on error (missing dispatch entry, renderer panic) no
    /// partial bytes escape.
    pub fn render(&mut self) -> Result<Vec<u8>, RenderError> {
        self.writer.clear();
        self.last_out = b'\n';
        self.disable_tags = 0;
        self.footnote_ix = 0;
        self.block_starts.clear();

        let outcome = {
            let this = AssertUnwindSafe(&mut *self);
            catch_unwind(move || {
                let mut this = this;
                let root = this.root;
                this.render_node(root).map(|_| ())
            })
        };

        match outcome {
            Ok(Ok(())) => Ok(std::mem::take(&mut self.writer)),
            Ok(Err(err)) => {
                self.writer.clear();
                Err(err)
            }
            Err(payload) => {
                self.writer.clear();
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                Err(RenderError::Panic(msg))
            }
        }
    }

    fn render_node(&mut self, node: &'a AstNode<'a>) -> Result<WalkStatus, RenderError> {
        match self.dispatch(node, true)? {
            WalkStatus::Stop => return Ok(WalkStatus::Stop),
            WalkStatus::SkipChildren => {}
            WalkStatus::Continue => {
                let mut child = node.first_child();
                while let Some(c) = child {
                    let next = c.next_sibling();
                    if let WalkStatus::Stop = self.render_node(c)? {
                        return Ok(WalkStatus::Stop);
                    }
                    child = next;
                }
            }
        }
        self.dispatch(node, false)
    }

    fn dispatch(
        &mut self,
        node: &'a AstNode<'a>,
        entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        let node_type = node.node_type();
        match self.funcs.get(&node_type).copied().or(self.default_func) {
            Some(f) => f(self, node, entering),
            None => Err(RenderError::MissingRenderer {
                node_type,
                tokens: items_to_str(&node.data.borrow().tokens),
            }),
        }
    }

    pub fn write_byte(&mut self, b: u8) {
        self.writer.push(b);
        self.last_out = b;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if let Some(&last) = bytes.last() {
            self.writer.extend_from_slice(bytes);
            self.last_out = last;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub fn write_tokens(&mut self, items: &[Item]) {
        if let Some(last) = items.last() {
            self.writer.extend(items.iter().map(|i| i.term));
            self.last_out = last.term;
        }
    }

    /// Write markup, suppressed while the tag-nesting guard is active.
    /// Text writes always go through the plain `write_*` helpers.
    pub fn tag(&mut self, s: &str) {
        if self.disable_tags == 0 {
            self.write_str(s);
        }
    }

    /// Emit `\n` unless the last byte out already was one.  Idempotent, so
    /// block separators never stack.
    pub fn newline(&mut self) {
        if self.last_out != b'\n' {
            self.write_byte(b'\n');
        }
    }

    /// Terminate the current line and leave exactly one blank line.
    pub fn blankline(&mut self) {
        self.newline();
        if !self.writer.ends_with(b"\n\n") {
            self.write_byte(b'\n');
        }
    }

    /// Reduce a trailing newline run that began inside `start..` to a
    /// single newline.
    pub(crate) fn trim_region_to_single_newline(&mut self, start: usize) {
        while self.writer.len() > start + 1
            && self.writer.ends_with(b"\n")
            && self.writer[self.writer.len() - 2] == b'\n'
        {
            self.writer.pop();
        }
        if self.writer.len() > start && !self.writer.ends_with(b"\n") {
            self.write_byte(b'\n');
        }
        self.last_out = *self.writer.last().unwrap_or(&b'\n');
    }
}

/// Whether a node sits directly inside a tight list item.
pub(crate) fn in_tight_list<'a>(node: &'a AstNode<'a>) -> bool {
    match node.parent() {
        Some(parent) => match parent.data.borrow().value {
            NodeValue::ListItem(ref nl) => nl.tight,
            _ => false,
        },
        None => false,
    }
}
