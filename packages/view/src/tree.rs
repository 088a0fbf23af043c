//! # Display Tree
//!
//! Arena of display nodes addressed by [`NodeId`]. Each node keeps an ordered
//! child list and the index of its parent, so hosts can walk and mutate the
//! tree without holding references into it.
//!
//! Removing a node detaches it from its parent; the slot stays in the arena so
//! ids handed out earlier never point at a different node.

use crate::config::ViewConfig;
use crate::error::{TreeError, TreeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use stencil_parser::LogicRole;

/// Index of a node in its [`DisplayTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which projection of the token sequence a tree shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Source text, every token editable
    Raw,
    /// Formatted preview, placeholders as chips and directives hidden
    Live,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Raw => ViewMode::Live,
            ViewMode::Live => ViewMode::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Root,

    /// Markup element; tags are kept verbatim so serialization is lossless
    Element {
        tag: String,
        open_tag: String,
        /// `None` for void, self-closing and never-closed elements
        close_tag: Option<String>,
    },

    /// Editable text
    Text { content: String },

    /// Opaque markup with no children (comments, doctypes, stray close tags)
    Markup { source: String },

    /// Atomic placeholder; `raw` is the exact `{{ ... }}` span
    Chip { expression: String, raw: String },

    /// Invisible bookkeeping node for a directive
    Marker { raw: String, role: LogicRole },
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Element { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub kind: NodeKind,
    /// Index of the token this node was rendered from
    pub token: Option<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DisplayNode {
    fn new(kind: NodeKind, token: Option<usize>, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            token,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_chip(&self) -> bool {
        matches!(self.kind, NodeKind::Chip { .. })
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, NodeKind::Marker { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTree {
    mode: ViewMode,
    nodes: Vec<DisplayNode>,
}

impl DisplayTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            nodes: vec![DisplayNode::new(NodeKind::Root, None, None)],
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn get(&self, id: NodeId) -> TreeResult<&DisplayNode> {
        self.nodes.get(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> TreeResult<&mut DisplayNode> {
        self.nodes.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.get(id)?.children())
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == Self::ROOT {
                return true;
            }
            match self.nodes.get(current.0).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Attached nodes in document order (pre-order), excluding the root
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[0].children.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(id.0) {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        order
    }

    /// Attached chips in document order
    pub fn chips(&self) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.nodes[id.0].is_chip())
            .collect()
    }

    /// Attached directive markers in document order
    pub fn markers(&self) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.nodes[id.0].is_marker())
            .collect()
    }

    /// Locate the attached chip rendered from a token
    pub fn find_chip(&self, token: usize) -> Option<NodeId> {
        self.chips()
            .into_iter()
            .find(|id| self.nodes[id.0].token == Some(token))
    }

    /// Append without validation; the caller guarantees `parent` is a container
    pub(crate) fn push_node(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        token: Option<usize>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DisplayNode::new(kind, token, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id.0).map(|n| &mut n.kind)
    }

    pub fn append(&mut self, parent: NodeId, kind: NodeKind, token: Option<usize>) -> TreeResult<NodeId> {
        let len = self.children(parent)?.len();
        self.insert(parent, len, kind, token)
    }

    pub fn insert(
        &mut self,
        parent: NodeId,
        index: usize,
        kind: NodeKind,
        token: Option<usize>,
    ) -> TreeResult<NodeId> {
        let parent_node = self.get(parent)?;
        if !parent_node.kind.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        if !self.is_attached(parent) {
            return Err(TreeError::Detached(parent));
        }
        let len = parent_node.children.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(DisplayNode::new(kind, token, Some(parent)));
        self.nodes[parent.0].children.insert(index, id);
        Ok(id)
    }

    /// Detach a node (and its subtree) from its parent
    pub fn remove(&mut self, id: NodeId) -> TreeResult<()> {
        if id == Self::ROOT {
            return Err(TreeError::RootRemoval);
        }
        let parent = self.get(id)?.parent.ok_or(TreeError::Detached(id))?;
        self.nodes[parent.0].children.retain(|child| *child != id);
        self.get_mut(id)?.parent = None;
        Ok(())
    }

    /// Replace the content of a text node. Chips and markers are never editable.
    pub fn set_text(&mut self, id: NodeId, content: impl Into<String>) -> TreeResult<()> {
        let node = self.get_mut(id)?;
        match &mut node.kind {
            NodeKind::Text { content: current } => {
                *current = content.into();
                Ok(())
            }
            NodeKind::Chip { .. } => Err(TreeError::ChipIsAtomic(id)),
            _ => Err(TreeError::NotText(id)),
        }
    }

    /// Place text typed at a chip's trailing edge outside the chip: prepended
    /// to the following text sibling, or in a new text node right after it.
    pub fn insert_text_after_chip(&mut self, chip: NodeId, text: &str) -> TreeResult<NodeId> {
        let node = self.get(chip)?;
        if !node.is_chip() {
            return Err(TreeError::NotAChip(chip));
        }
        let parent = node.parent.ok_or(TreeError::Detached(chip))?;
        let siblings = self.children(parent)?;
        let index = siblings
            .iter()
            .position(|s| *s == chip)
            .ok_or(TreeError::Detached(chip))?;

        if let Some(&next) = siblings.get(index + 1) {
            if let NodeKind::Text { content } = &mut self.nodes[next.0].kind {
                content.insert_str(0, text);
                return Ok(next);
            }
        }

        self.insert(
            parent,
            index + 1,
            NodeKind::Text {
                content: text.to_string(),
            },
            None,
        )
    }

    /// Text the user sees: text nodes and chip labels, without markup or markers
    pub fn visible_text(&self) -> String {
        let mut text = String::new();
        for id in self.descendants() {
            match &self.nodes[id.0].kind {
                NodeKind::Text { content } => text.push_str(content),
                NodeKind::Chip { expression, .. } => text.push_str(expression),
                _ => {}
            }
        }
        text
    }

    /// Serialize to markup. Raw trees yield their text; live trees wrap chips
    /// and markers in elements carrying the configured classes.
    pub fn to_markup(&self, config: &ViewConfig) -> String {
        let mut out = String::new();
        for &child in self.nodes[0].children.iter() {
            self.write_markup(child, config, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, config: &ViewConfig, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Root => {}
            NodeKind::Element {
                open_tag,
                close_tag,
                ..
            } => {
                out.push_str(open_tag);
                for &child in &node.children {
                    self.write_markup(child, config, out);
                }
                if let Some(close) = close_tag {
                    out.push_str(close);
                }
            }
            NodeKind::Text { content } => out.push_str(content),
            NodeKind::Markup { source } => out.push_str(source),
            NodeKind::Chip { raw, .. } => {
                out.push_str(&format!(
                    r#"<span class="{}" data-token="{}" contenteditable="false">{}</span>"#,
                    config.chip_class,
                    token_attr(node.token),
                    raw
                ));
            }
            NodeKind::Marker { raw, .. } => {
                out.push_str(&format!(
                    r#"<span class="{}" data-token="{}" hidden>{}</span>"#,
                    config.marker_class,
                    token_attr(node.token),
                    raw
                ));
            }
        }
    }
}

fn token_attr(token: Option<usize>) -> String {
    token.map(|t| t.to_string()).unwrap_or_default()
}
