//! # View Renderer
//!
//! Projects a token sequence onto a [`DisplayTree`].
//!
//! - **Raw**: one editable text node per token, directives and placeholders
//!   included as plain text
//! - **Live**: literal markup becomes elements and text, placeholders become
//!   atomic chips and directives become hidden markers
//!
//! Rendering is pure: the same tokens and mode always give the same tree.

use crate::tree::{DisplayTree, NodeId, NodeKind, ViewMode};
use stencil_parser::markup::{is_self_closing, is_void_element, tag_name};
use stencil_parser::{lex_markup, MarkupToken, Token};
use tracing::{debug, instrument};

#[instrument(skip_all, fields(tokens = tokens.len(), mode = ?mode))]
pub fn render(tokens: &[Token], mode: ViewMode) -> DisplayTree {
    let tree = match mode {
        ViewMode::Raw => render_raw(tokens),
        ViewMode::Live => LiveBuilder::new().build(tokens),
    };
    debug!(nodes = tree.descendants().len(), "Rendered display tree");
    tree
}

fn render_raw(tokens: &[Token]) -> DisplayTree {
    let mut tree = DisplayTree::new(ViewMode::Raw);
    let root = tree.root();
    for (index, token) in tokens.iter().enumerate() {
        tree.push_node(
            root,
            NodeKind::Text {
                content: token.source().to_string(),
            },
            Some(index),
        );
    }
    tree
}

struct LiveBuilder {
    tree: DisplayTree,
    /// Open elements, innermost last. Elements stay open across tokens, so a
    /// directive between `<p>` and `</p>` lands inside the paragraph.
    open: Vec<(NodeId, String)>,
}

impl LiveBuilder {
    fn new() -> Self {
        Self {
            tree: DisplayTree::new(ViewMode::Live),
            open: Vec::new(),
        }
    }

    fn current(&self) -> NodeId {
        self.open
            .last()
            .map(|(id, _)| *id)
            .unwrap_or(DisplayTree::ROOT)
    }

    fn build(mut self, tokens: &[Token]) -> DisplayTree {
        for (index, token) in tokens.iter().enumerate() {
            match token {
                Token::Literal { text } => self.literal(text, index),
                Token::Output { expression, raw } => {
                    let parent = self.current();
                    self.tree.push_node(
                        parent,
                        NodeKind::Chip {
                            expression: expression.clone(),
                            raw: raw.clone(),
                        },
                        Some(index),
                    );
                }
                Token::Logic { raw, role } => {
                    let parent = self.current();
                    self.tree.push_node(
                        parent,
                        NodeKind::Marker {
                            raw: raw.clone(),
                            role: *role,
                        },
                        Some(index),
                    );
                }
            }
        }
        self.tree
    }

    fn literal(&mut self, text: &str, index: usize) {
        for (kind, span) in lex_markup(text) {
            let piece = &text[span];
            match kind {
                MarkupToken::OpenTag => self.open_tag(piece, index),
                MarkupToken::CloseTag => self.close_tag(piece, index),
                MarkupToken::Comment | MarkupToken::Doctype => {
                    let parent = self.current();
                    self.tree.push_node(
                        parent,
                        NodeKind::Markup {
                            source: piece.to_string(),
                        },
                        Some(index),
                    );
                }
                MarkupToken::Text
                | MarkupToken::Whitespace
                | MarkupToken::Nbsp
                | MarkupToken::NbspEntity => self.text(piece, index),
            }
        }
    }

    fn open_tag(&mut self, piece: &str, index: usize) {
        let name = tag_name(piece).to_string();
        let parent = self.current();
        let leaf = is_self_closing(piece) || is_void_element(&name);
        let id = self.tree.push_node(
            parent,
            NodeKind::Element {
                tag: name.clone(),
                open_tag: piece.to_string(),
                close_tag: None,
            },
            Some(index),
        );
        if !leaf {
            self.open.push((id, name));
        }
    }

    fn close_tag(&mut self, piece: &str, index: usize) {
        let name = tag_name(piece);
        let matching = self
            .open
            .iter()
            .rposition(|(_, open_name)| open_name.eq_ignore_ascii_case(name));

        match matching {
            Some(depth) => {
                let (id, _) = self.open[depth].clone();
                if let Some(NodeKind::Element { close_tag, .. }) = self.tree.kind_mut(id) {
                    *close_tag = Some(piece.to_string());
                }
                // Elements opened inside it and never closed end here
                self.open.truncate(depth);
            }
            None => {
                let parent = self.current();
                self.tree.push_node(
                    parent,
                    NodeKind::Markup {
                        source: piece.to_string(),
                    },
                    Some(index),
                );
            }
        }
    }

    fn text(&mut self, piece: &str, index: usize) {
        let parent = self.current();
        if let Ok(children) = self.tree.children(parent) {
            if let Some(&last) = children.last() {
                let same_token = self
                    .tree
                    .get(last)
                    .map(|n| n.token == Some(index))
                    .unwrap_or(false);
                if same_token {
                    if let Some(NodeKind::Text { content }) = self.tree.kind_mut(last) {
                        content.push_str(piece);
                        return;
                    }
                }
            }
        }
        self.tree.push_node(
            parent,
            NodeKind::Text {
                content: piece.to_string(),
            },
            Some(index),
        );
    }
}
