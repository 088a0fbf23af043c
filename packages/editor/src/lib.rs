//! # Stencil Editor
//!
//! Editing engine for templates that mix markup with `{{ placeholders }}`
//! and `{% directives %}`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: raw source → tokens                 │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + edit semantics           │
//! │  - Atomic placeholder edits                 │
//! │  - Variable insertion at the picker anchor  │
//! │  - Reconcile edited live trees              │
//! │  - Raw/live switching with cursor restore   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view: tokens → display tree, cleaning       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tokens are the source of truth**: display trees are derived views
//! 2. **Chips are atomic**: a placeholder is removed whole or not at all
//! 3. **Directives are never lost**: reconciliation re-inserts every one
//!
//! ## Usage
//!
//! ```rust
//! use stencil_editor::{
//!     BufferPosition, EditIntent, EditSession, EditorConfig, NoopHost, VariableDescriptor,
//! };
//!
//! let mut session = EditSession::new("Hello {{ name }}!", EditorConfig::default(), NoopHost);
//! session.toggle_mode(BufferPosition::text(0, 0));
//!
//! session
//!     .apply_edit(EditIntent::DeleteBackward {
//!         position: BufferPosition::AfterChip { token: 1 },
//!     })
//!     .unwrap();
//! assert_eq!(session.raw(), "Hello !");
//!
//! session
//!     .insert_variable(&VariableDescriptor::new("customer.first_name", ""))
//!     .unwrap();
//! assert_eq!(session.raw(), "Hello !{{ customer.first_name }}\u{a0}");
//! ```

mod catalog;
mod config;
mod controller;
mod document;
mod errors;
mod host;
mod insertion;
mod position;
mod reconcile;
mod session;

pub use catalog::{VariableCatalog, VariableDescriptor};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use controller::{EditController, EditIntent, EditOutcome};
pub use document::Document;
pub use errors::{ConfigError, EditError, EditorError};
pub use host::{EditorHost, NoopHost};
pub use insertion::VariableInserter;
pub use position::{canonical_boundary, end_position, position_at_offset, raw_offset, validate, BufferPosition};
pub use reconcile::{reconcile, Anchor, DirectivePlacement, Reconciler, Reconciliation};
pub use session::EditSession;

// Re-export common types for convenience
pub use stencil_parser::{tokenize, Token};
pub use stencil_view::{render, DisplayTree, ViewMode};
