//! Error types for display tree operations

use crate::tree::NodeId;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is detached from the tree: {0}")]
    Detached(NodeId),

    #[error("Chip text is atomic and cannot be edited: {0}")]
    ChipIsAtomic(NodeId),

    #[error("Node cannot hold children: {0}")]
    NotAContainer(NodeId),

    #[error("Node is not text: {0}")]
    NotText(NodeId),

    #[error("Node is not a chip: {0}")]
    NotAChip(NodeId),

    #[error("Cannot remove the root node")]
    RootRemoval,

    #[error("Child index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}
