//! # Stencil View
//!
//! Display trees derived from a token sequence, and the cleaner that turns
//! edited live markup back into canonical template source.
//!
//! ```text
//! tokens ──render(Raw)──▶ DisplayTree (plain text per token)
//!        ──render(Live)─▶ DisplayTree (elements, chips, hidden markers)
//!                             │
//!                        to_markup / clean
//!                             ▼
//!                      canonical source
//! ```

pub mod clean;
pub mod config;
pub mod error;
pub mod render;
pub mod tree;

pub use clean::{clean, Cleaner};
pub use config::ViewConfig;
pub use error::{TreeError, TreeResult};
pub use render::render;
pub use tree::{DisplayNode, DisplayTree, NodeId, NodeKind, ViewMode};

/// Clean a display tree's markup with the given configuration
pub fn clean_tree(tree: &DisplayTree, config: &ViewConfig) -> String {
    Cleaner::new(config).clean_tree(tree)
}
