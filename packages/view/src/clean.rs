//! # View Cleaner
//!
//! Normalizes live-view markup back into canonical template source.
//!
//! Two passes over a piece stream (template spans are opaque pieces):
//!
//! 1. **Structure**: unwrap chip and marker wrappers (their text survives),
//!    drop `<span>`s whose content is only whitespace
//! 2. **Whitespace**: `&nbsp;`/U+00A0 count as whitespace; runs collapse to a
//!    single space (or to their newlines when line breaks are preserved), and
//!    runs touching a tag are removed (keeping newlines when preserved)
//!
//! Dropping an empty `<span>` can join its neighbours into a new tag,
//! entity or placeholder, so the passes repeat until the output is stable.
//! Every changing pass either shortens the text or turns a whitespace
//! character into a plain space, so this terminates, and
//! `clean(clean(x)) == clean(x)`.

use crate::config::ViewConfig;
use crate::tree::DisplayTree;
use stencil_parser::markup::{has_class, is_self_closing, is_void_element, tag_name};
use stencil_parser::{lex_markup, tokenize, MarkupToken, Token};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind {
    OpenTag,
    CloseTag,
    /// Comments and doctypes
    Markup,
    Blank,
    Text,
    /// `{{ ... }}` or `{% ... %}`, never altered
    Template,
}

impl PieceKind {
    fn is_tag_boundary(self) -> bool {
        matches!(
            self,
            PieceKind::OpenTag | PieceKind::CloseTag | PieceKind::Markup
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    kind: PieceKind,
    source: &'a str,
}

enum Frame {
    /// Chip or marker wrapper; its tags are dropped
    Wrapper { name: String },
    Element { name: String, out_start: usize },
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Wrapper { name } | Frame::Element { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cleaner {
    config: ViewConfig,
}

impl Cleaner {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    #[instrument(skip_all, fields(bytes = markup.len()))]
    pub fn clean(&self, markup: &str) -> String {
        let mut cleaned = self.clean_once(markup);
        let mut passes = 1;
        loop {
            let next = self.clean_once(&cleaned);
            if next == cleaned {
                break;
            }
            cleaned = next;
            passes += 1;
        }
        debug!(before = markup.len(), after = cleaned.len(), passes, "Cleaned markup");
        cleaned
    }

    fn clean_once(&self, markup: &str) -> String {
        let pieces = split_pieces(markup);
        let structural = self.strip_structure(pieces);
        self.normalize_whitespace(&structural)
    }

    /// Clean the markup form of a display tree
    pub fn clean_tree(&self, tree: &DisplayTree) -> String {
        self.clean(&tree.to_markup(&self.config))
    }

    fn is_wrapper(&self, tag: &str) -> bool {
        has_class(tag, &self.config.chip_class) || has_class(tag, &self.config.marker_class)
    }

    fn strip_structure<'a>(&self, pieces: Vec<Piece<'a>>) -> Vec<Piece<'a>> {
        let mut out: Vec<Piece<'a>> = Vec::with_capacity(pieces.len());
        let mut frames: Vec<Frame> = Vec::new();

        for piece in pieces {
            match piece.kind {
                PieceKind::OpenTag => {
                    let name = tag_name(piece.source).to_ascii_lowercase();
                    if self.is_wrapper(piece.source) {
                        if !is_self_closing(piece.source) {
                            frames.push(Frame::Wrapper { name });
                        }
                        continue;
                    }
                    if !is_self_closing(piece.source) && !is_void_element(&name) {
                        frames.push(Frame::Element {
                            name,
                            out_start: out.len(),
                        });
                    }
                    out.push(piece);
                }
                PieceKind::CloseTag => {
                    let name = tag_name(piece.source);
                    let matching = frames
                        .iter()
                        .rposition(|f| f.name().eq_ignore_ascii_case(name));

                    let Some(depth) = matching else {
                        out.push(piece);
                        continue;
                    };

                    frames.truncate(depth + 1);
                    match frames.pop() {
                        Some(Frame::Wrapper { .. }) => {}
                        Some(Frame::Element { name, out_start }) => {
                            let empty = out[out_start + 1..]
                                .iter()
                                .all(|p| p.kind == PieceKind::Blank);
                            if name == "span" && empty {
                                out.truncate(out_start);
                            } else {
                                out.push(piece);
                            }
                        }
                        None => out.push(piece),
                    }
                }
                _ => out.push(piece),
            }
        }

        out
    }

    fn normalize_whitespace(&self, pieces: &[Piece<'_>]) -> String {
        let mut output = String::new();
        let mut index = 0;

        while index < pieces.len() {
            let piece = pieces[index];
            if piece.kind != PieceKind::Blank {
                output.push_str(piece.source);
                index += 1;
                continue;
            }

            let run_start = index;
            while index < pieces.len() && pieces[index].kind == PieceKind::Blank {
                index += 1;
            }

            let touches_tag = (run_start > 0 && pieces[run_start - 1].kind.is_tag_boundary())
                || pieces
                    .get(index)
                    .map(|p| p.kind.is_tag_boundary())
                    .unwrap_or(false);

            let newlines = if self.config.preserve_line_breaks {
                pieces[run_start..index]
                    .iter()
                    .map(|p| p.source.matches('\n').count())
                    .sum()
            } else {
                0
            };

            if newlines > 0 {
                output.push_str(&"\n".repeat(newlines));
            } else if !touches_tag {
                output.push(' ');
            }
        }

        output
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

/// Clean markup with the default view configuration
pub fn clean(markup: &str) -> String {
    Cleaner::default().clean(markup)
}

fn split_pieces(markup: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut offset = 0;

    for token in tokenize(markup) {
        let len = token.len();
        let source = &markup[offset..offset + len];
        match token {
            Token::Literal { .. } => {
                for (kind, span) in lex_markup(source) {
                    pieces.push(Piece {
                        kind: piece_kind(kind),
                        source: &source[span],
                    });
                }
            }
            Token::Output { .. } | Token::Logic { .. } => pieces.push(Piece {
                kind: PieceKind::Template,
                source,
            }),
        }
        offset += len;
    }

    pieces
}

fn piece_kind(token: MarkupToken) -> PieceKind {
    match token {
        MarkupToken::OpenTag => PieceKind::OpenTag,
        MarkupToken::CloseTag => PieceKind::CloseTag,
        MarkupToken::Comment | MarkupToken::Doctype => PieceKind::Markup,
        MarkupToken::Whitespace | MarkupToken::Nbsp | MarkupToken::NbspEntity => PieceKind::Blank,
        MarkupToken::Text => PieceKind::Text,
    }
}
