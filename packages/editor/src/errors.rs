//! Error types for the editor

use crate::position::BufferPosition;
use stencil_view::TreeError;
use thiserror::Error;

/// Rejected edit: the position or target violates the document contract.
/// The document is left untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Position {position} is out of range for a document of {len} tokens")]
    OutOfRange { position: BufferPosition, len: usize },

    #[error("Position {position} falls inside placeholder token {token}")]
    InsideChip { position: BufferPosition, token: usize },

    #[error("Token {0} is not a placeholder")]
    NotAChip(usize),

    #[error("Position {position} falls inside directive token {token}")]
    HiddenDirective { position: BufferPosition, token: usize },

    #[error("Offset {offset} is not a character boundary of token {token}")]
    NotCharBoundary { token: usize, offset: usize },

    #[error("Variable name {0:?} cannot form a placeholder")]
    InvalidVariable(String),

    #[error("Display tree error: {0}")]
    Tree(#[from] TreeError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
