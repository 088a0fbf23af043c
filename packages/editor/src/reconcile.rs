//! # Token Position Reconciler
//!
//! Derives raw source from an edited display tree.
//!
//! Live trees carry text, markup and chips in their edited order, which is
//! authoritative. Directives have no visible anchor, so every directive from
//! the previous token sequence is re-inserted:
//!
//! - at its hidden marker's position, when the marker is still in the tree
//! - otherwise by line: opening and standalone directives move to the next
//!   line boundary at or after their old offset, closing directives to the
//!   previous one at or before it
//!
//! A scan cursor only moves forward, so directives keep their original
//! relative order. No directive is ever dropped or duplicated. Placement is
//! best effort: large edits to the line structure can shift a directive.

use crate::errors::EditError;
use std::collections::HashMap;
use std::ops::Range;
use stencil_parser::{LogicRole, Token};
use stencil_view::{DisplayTree, NodeId, NodeKind, TreeResult, ViewMode};
use tracing::{debug, instrument, warn};

/// How a directive's position was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Marker,
    LineHeuristic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectivePlacement {
    /// Index of the directive in the previous token sequence
    pub token: usize,
    /// Byte offset in the reconciled text before directives were re-inserted
    pub offset: usize,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub source: String,
    pub placements: Vec<DirectivePlacement>,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    anchor_surviving_markers: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reconciler {
    pub fn new(anchor_surviving_markers: bool) -> Self {
        Self {
            anchor_surviving_markers,
        }
    }

    #[instrument(skip_all, fields(mode = ?tree.mode(), previous = previous.len()))]
    pub fn reconcile(&self, tree: &DisplayTree, previous: &[Token]) -> Result<Reconciliation, EditError> {
        if tree.mode() == ViewMode::Raw {
            return Ok(Reconciliation {
                source: raw_text(tree)?,
                placements: Vec::new(),
            });
        }

        let mut flat = Flattened::default();
        flat.walk(tree, tree.root(), previous)?;

        let mut placements = Vec::new();
        let mut stripped_offset = 0;
        let mut cursor = 0;

        for (index, token) in previous.iter().enumerate() {
            let Token::Logic { role, .. } = token else {
                stripped_offset += token.len();
                continue;
            };

            let surviving = self
                .anchor_surviving_markers
                .then(|| flat.markers.get(&index).copied())
                .flatten();

            let (offset, anchor) = match surviving {
                Some(offset) => (offset, Anchor::Marker),
                None => {
                    let offset = flat.line_anchor(stripped_offset, *role);
                    warn!(token = index, offset, "Directive re-anchored by line");
                    (offset, Anchor::LineHeuristic)
                }
            };

            cursor = cursor.max(offset);
            placements.push(DirectivePlacement {
                token: index,
                offset: cursor,
                anchor,
            });
        }

        let mut source = String::with_capacity(flat.content.len());
        let mut last = 0;
        for placement in &placements {
            source.push_str(&flat.content[last..placement.offset]);
            source.push_str(previous[placement.token].source());
            last = placement.offset;
        }
        source.push_str(&flat.content[last..]);

        debug!(
            directives = placements.len(),
            bytes = source.len(),
            "Reconciled live tree"
        );
        Ok(Reconciliation { source, placements })
    }
}

/// Reconcile with surviving markers as anchors
pub fn reconcile(tree: &DisplayTree, previous: &[Token]) -> Result<String, EditError> {
    Ok(Reconciler::default().reconcile(tree, previous)?.source)
}

fn raw_text(tree: &DisplayTree) -> TreeResult<String> {
    let mut text = String::new();
    for id in tree.descendants() {
        if let NodeKind::Text { content } = &tree.get(id)?.kind {
            text.push_str(content);
        }
    }
    Ok(text)
}

/// Visible content of a live tree with directives stripped out
#[derive(Default)]
struct Flattened {
    content: String,
    /// Spans directives must not split: tags, opaque markup, chips
    atomic: Vec<Range<usize>>,
    /// Surviving marker offsets by token index
    markers: HashMap<usize, usize>,
}

impl Flattened {
    fn walk(&mut self, tree: &DisplayTree, id: NodeId, previous: &[Token]) -> TreeResult<()> {
        for &child in tree.children(id)? {
            let node = tree.get(child)?;
            match &node.kind {
                NodeKind::Root => {}
                NodeKind::Element {
                    open_tag,
                    close_tag,
                    ..
                } => {
                    self.push_atomic(open_tag);
                    self.walk(tree, child, previous)?;
                    if let Some(close) = close_tag {
                        self.push_atomic(close);
                    }
                }
                NodeKind::Text { content } => self.content.push_str(content),
                NodeKind::Markup { source } => self.push_atomic(source),
                NodeKind::Chip { raw, .. } => self.push_atomic(raw),
                NodeKind::Marker { raw, .. } => {
                    let matches_token = node
                        .token
                        .filter(|&t| previous.get(t).is_some_and(|p| p.is_logic() && p.source() == raw.as_str()));
                    if let Some(token) = matches_token {
                        self.markers.entry(token).or_insert(self.content.len());
                    }
                }
            }
        }
        Ok(())
    }

    fn push_atomic(&mut self, text: &str) {
        let start = self.content.len();
        self.content.push_str(text);
        self.atomic.push(start..self.content.len());
    }

    /// Offset just before or after a newline (or a document edge) that
    /// does not split an atomic span
    fn is_line_boundary(&self, at: usize) -> bool {
        let bytes = self.content.as_bytes();
        let on_line = at == 0
            || at == bytes.len()
            || bytes[at - 1] == b'\n'
            || bytes[at] == b'\n';
        if !on_line {
            return false;
        }

        let next = self.atomic.partition_point(|r| r.end <= at);
        !self.atomic.get(next).is_some_and(|r| r.start < at)
    }

    fn line_anchor(&self, old_offset: usize, role: LogicRole) -> usize {
        let len = self.content.len();
        let mut offset = old_offset.min(len);
        while !self.content.is_char_boundary(offset) {
            offset -= 1;
        }

        match role {
            LogicRole::Opening | LogicRole::Standalone => (offset..=len)
                .find(|&at| self.is_line_boundary(at))
                .unwrap_or(len),
            LogicRole::Closing => (0..=offset)
                .rev()
                .find(|&at| self.is_line_boundary(at))
                .unwrap_or(0),
        }
    }
}
