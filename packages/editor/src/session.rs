//! # Edit Session
//!
//! Owns the document for one editing surface and routes every host event
//! through the controllers, in the order the host delivers them. The host
//! hears about changes through [`EditorHost`].
//!
//! Sessions start in raw mode, like a source textarea.

use crate::catalog::VariableDescriptor;
use crate::config::EditorConfig;
use crate::controller::{EditController, EditIntent, EditOutcome};
use crate::document::Document;
use crate::errors::EditorError;
use crate::host::EditorHost;
use crate::insertion::VariableInserter;
use crate::position::{end_position, position_at_offset, raw_offset, BufferPosition};
use crate::reconcile::Reconciler;
use std::path::Path;
use stencil_parser::{Token, Tokenizer};
use stencil_view::{render, Cleaner, DisplayTree, ViewMode};
use tracing::{debug, info, warn};

pub struct EditSession<H: EditorHost> {
    config: EditorConfig,
    document: Document,
    controller: EditController,
    inserter: VariableInserter,
    reconciler: Reconciler,
    cleaner: Cleaner,
    host: H,
}

impl<H: EditorHost> EditSession<H> {
    pub fn new(raw: &str, config: EditorConfig, host: H) -> Self {
        let tokenizer = Tokenizer::new(config.keywords.clone());
        let document = Document::from_source(raw, &tokenizer);
        info!(tokens = document.len(), "Edit session created");

        Self {
            controller: EditController::new(ViewMode::Raw, tokenizer.clone()),
            inserter: VariableInserter::new(config.spacing_unit.clone(), tokenizer),
            reconciler: Reconciler::new(config.anchor_surviving_markers),
            cleaner: Cleaner::new(&config.view),
            document,
            config,
            host,
        }
    }

    /// Create a session configured from `stencil.config.json` in `dir`
    pub fn with_config_dir(raw: &str, dir: impl AsRef<Path>, host: H) -> Result<Self, EditorError> {
        let config = EditorConfig::load(dir)?;
        Ok(Self::new(raw, config, host))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tokens(&self) -> &[Token] {
        self.document.tokens()
    }

    /// Canonical raw source
    pub fn raw(&self) -> String {
        self.document.source()
    }

    pub fn char_count(&self) -> usize {
        self.document.char_count()
    }

    pub fn mode(&self) -> ViewMode {
        self.controller.mode()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn pending_anchor(&self) -> Option<BufferPosition> {
        self.controller.pending_anchor()
    }

    /// Display tree for the current mode
    pub fn display(&self) -> DisplayTree {
        render(self.document.tokens(), self.mode())
    }

    /// Markup form of the current display tree
    pub fn markup(&self) -> String {
        self.display().to_markup(&self.config.view)
    }

    /// Replace the document wholesale. The host supplied the text, so it is
    /// not notified back.
    pub fn reset(&mut self, raw: &str) {
        self.document.replace_source(raw, self.controller.tokenizer());
        self.controller.cancel();
        info!(tokens = self.document.len(), "Edit session reset");
    }

    /// Switch between raw and live mode and return where the cursor goes.
    ///
    /// The cursor is carried over through its source offset. If cleaning
    /// rewrote text before the cursor, or no equivalent position exists in
    /// the new view, it moves to the end.
    pub fn toggle_mode(&mut self, cursor: BufferPosition) -> BufferPosition {
        let from = self.mode();
        let to = from.toggled();
        let mut offset = raw_offset(self.document.tokens(), cursor, from).ok();

        if self.config.clean_on_mode_switch {
            let before = self.document.source();
            let cleaned = self.cleaner.clean(&before);
            if cleaned != before {
                let unchanged = common_prefix_len(&before, &cleaned);
                offset = offset.filter(|&offset| offset <= unchanged);
                self.document.replace_source(&cleaned, self.controller.tokenizer());
                self.notify();
            }
        }
        self.controller.set_mode(to);

        let tokens = self.document.tokens();
        let restored = match offset.and_then(|offset| position_at_offset(tokens, offset, to)) {
            Some(position) => position,
            None => {
                let end = end_position(tokens, to);
                warn!(%cursor, %end, "Cursor not found in new view, moved to end");
                end
            }
        };

        info!(mode = ?to, tokens = tokens.len(), "Switched view mode");
        restored
    }

    pub fn apply_edit(&mut self, intent: EditIntent) -> Result<EditOutcome, EditorError> {
        let version = self.document.version;
        let outcome = self.controller.apply(&mut self.document, intent)?;

        if let EditOutcome::PickerRequested { anchor } = outcome {
            self.host.open_picker(anchor);
        }
        if self.document.version != version {
            self.notify();
        }
        Ok(outcome)
    }

    /// A typed character: the trigger key opens the picker, anything else is inserted
    pub fn key_pressed(&mut self, position: BufferPosition, key: char) -> Result<EditOutcome, EditorError> {
        let intent = if key == self.config.trigger_key {
            EditIntent::TriggerPicker { position }
        } else {
            EditIntent::Insert {
                position,
                text: key.to_string(),
            }
        };
        self.apply_edit(intent)
    }

    /// Insert a variable at the pending picker anchor, or at the end of the
    /// document when no picker session is open
    pub fn insert_variable(&mut self, descriptor: &VariableDescriptor) -> Result<BufferPosition, EditorError> {
        let at = self
            .controller
            .pending_anchor()
            .unwrap_or_else(|| end_position(self.document.tokens(), self.mode()));
        self.insert_variable_at(descriptor, at)
    }

    pub fn insert_variable_at(
        &mut self,
        descriptor: &VariableDescriptor,
        at: BufferPosition,
    ) -> Result<BufferPosition, EditorError> {
        let mode = self.mode();
        let cursor = self.inserter.insert(&mut self.document, descriptor, at, mode)?;
        self.controller.take_anchor();
        self.notify();
        Ok(cursor)
    }

    /// Absorb an edited display tree back into the document
    pub fn reconcile(&mut self, tree: &DisplayTree) -> Result<String, EditorError> {
        let result = self.reconciler.reconcile(tree, self.document.tokens())?;
        if result.source != self.document.source() {
            self.document
                .replace_source(&result.source, self.controller.tokenizer());
            self.notify();
        }
        Ok(result.source)
    }

    /// Replace the source from a raw text editor
    pub fn set_raw_text(&mut self, text: &str) {
        if text == self.document.source() {
            return;
        }
        self.document.replace_source(text, self.controller.tokenizer());
        self.notify();
    }

    /// The cursor left the trigger context; drop any pending picker session
    pub fn focus_changed(&mut self) -> bool {
        let cancelled = self.controller.cancel();
        if cancelled {
            debug!("Picker cancelled by focus change");
        }
        cancelled
    }

    pub fn cancel_picker(&mut self) -> bool {
        self.controller.cancel()
    }

    fn notify(&mut self) {
        let raw = self.document.source();
        self.host.content_changed(&raw);
    }
}

/// Byte length of the longest common prefix of `a` and `b`
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or(a.len().min(b.len()), |((index, _), _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoopHost;

    #[derive(Default)]
    struct RecordingHost {
        pickers: Vec<BufferPosition>,
        changes: Vec<String>,
    }

    impl EditorHost for RecordingHost {
        fn open_picker(&mut self, anchor: BufferPosition) {
            self.pickers.push(anchor);
        }

        fn content_changed(&mut self, raw: &str) {
            self.changes.push(raw.to_string());
        }
    }

    fn session(raw: &str) -> EditSession<RecordingHost> {
        EditSession::new(raw, EditorConfig::default(), RecordingHost::default())
    }

    #[test]
    fn test_new_session_starts_in_raw_mode() {
        let session = EditSession::new("Hi {{ a }}", EditorConfig::default(), NoopHost);
        assert_eq!(session.mode(), ViewMode::Raw);
        assert_eq!(session.raw(), "Hi {{ a }}");
        assert_eq!(session.tokens().len(), 2);
    }

    #[test]
    fn test_trigger_key_opens_picker_without_typing() {
        let mut session = session("Hi ");
        session.toggle_mode(BufferPosition::text(0, 0));

        let anchor = BufferPosition::text(0, 3);
        let outcome = session.key_pressed(anchor, '{').unwrap();
        assert_eq!(outcome, EditOutcome::PickerRequested { anchor });
        assert_eq!(session.host().pickers, vec![anchor]);
        assert_eq!(session.raw(), "Hi ");
        assert!(session.host().changes.is_empty());
    }

    #[test]
    fn test_other_keys_are_typed() {
        let mut session = session("Hi");
        session.key_pressed(BufferPosition::text(0, 2), '!').unwrap();
        assert_eq!(session.raw(), "Hi!");
        assert_eq!(session.host().changes, vec!["Hi!".to_string()]);
    }

    #[test]
    fn test_insert_variable_uses_pending_anchor() {
        let mut session = session("Price: ");
        session.toggle_mode(BufferPosition::text(0, 0));
        session.key_pressed(BufferPosition::text(0, 0), '{').unwrap();

        let price = VariableDescriptor::new("product.price", "");
        session.insert_variable(&price).unwrap();

        assert_eq!(session.raw(), "{{ product.price }}\u{a0}Price: ");
        assert_eq!(session.pending_anchor(), None);
    }

    #[test]
    fn test_insert_variable_without_anchor_appends() {
        let mut session = session("Price: ");
        session.toggle_mode(BufferPosition::text(0, 0));
        session
            .insert_variable(&VariableDescriptor::new("product.price", ""))
            .unwrap();
        assert_eq!(session.raw(), "Price: {{ product.price }}\u{a0}");
    }

    #[test]
    fn test_focus_change_cancels_picker() {
        let mut session = session("x");
        session.key_pressed(BufferPosition::text(0, 1), '{').unwrap();
        assert!(session.pending_anchor().is_some());

        assert!(session.focus_changed());
        assert!(!session.focus_changed());
        assert_eq!(session.raw(), "x");
    }

    #[test]
    fn test_toggle_mode_restores_cursor() {
        let mut session = session("ab {{ x }} cd");
        let cursor = session.toggle_mode(BufferPosition::text(2, 2));
        assert_eq!(session.mode(), ViewMode::Live);
        assert_eq!(cursor, BufferPosition::text(2, 2));

        let cursor = session.toggle_mode(BufferPosition::AfterChip { token: 1 });
        assert_eq!(session.mode(), ViewMode::Raw);
        assert_eq!(cursor, BufferPosition::text(1, 7));
    }

    #[test]
    fn test_toggle_mode_falls_back_to_end() {
        let mut session = session("ab {{ x }}");
        let cursor = session.toggle_mode(BufferPosition::text(1, 3));
        assert_eq!(cursor, BufferPosition::AfterChip { token: 1 });
    }

    #[test]
    fn test_toggle_mode_cleans_source() {
        let mut session = session("a  <span> </span>  b");
        session.toggle_mode(BufferPosition::text(0, 0));
        assert_eq!(session.raw(), "a b");
        assert_eq!(session.host().changes, vec!["a b".to_string()]);
    }

    #[test]
    fn test_toggle_mode_keeps_cursor_before_cleaned_text() {
        let mut session = session("ab  c");
        let cursor = session.toggle_mode(BufferPosition::text(0, 1));
        assert_eq!(session.raw(), "ab c");
        assert_eq!(cursor, BufferPosition::text(0, 1));
    }

    #[test]
    fn test_toggle_mode_cursor_after_cleaned_text_moves_to_end() {
        let mut session = session("a  bcd");
        let cursor = session.toggle_mode(BufferPosition::text(0, 4));
        assert_eq!(session.raw(), "a bcd");
        assert_eq!(cursor, BufferPosition::text(0, 5));
    }

    #[test]
    fn test_insert_variable_at_uses_session_mode() {
        let mut session = session("Hi ");
        session.toggle_mode(BufferPosition::text(0, 0));
        let cursor = session
            .insert_variable_at(&VariableDescriptor::new("name", ""), BufferPosition::text(0, 3))
            .unwrap();
        assert_eq!(session.raw(), "Hi {{ name }}\u{a0}");
        assert_eq!(cursor, BufferPosition::text(2, 2));
    }

    #[test]
    fn test_toggle_mode_without_cleaning() {
        let config = EditorConfig {
            clean_on_mode_switch: false,
            ..EditorConfig::default()
        };
        let mut session = EditSession::new("a  b", config, NoopHost);
        session.toggle_mode(BufferPosition::text(0, 0));
        assert_eq!(session.raw(), "a  b");
    }

    #[test]
    fn test_reconcile_notifies_host() {
        let mut session = session("Hello {{ name }}!");
        session.toggle_mode(BufferPosition::text(0, 0));

        let mut tree = session.display();
        let chip = tree.chips()[0];
        tree.remove(chip).unwrap();

        assert_eq!(session.reconcile(&tree).unwrap(), "Hello !");
        assert_eq!(session.raw(), "Hello !");
        assert_eq!(session.host().changes, vec!["Hello !".to_string()]);
    }

    #[test]
    fn test_set_raw_text_and_char_count() {
        let mut session = session("");
        session.set_raw_text("né {{ a }}");
        session.set_raw_text("né {{ a }}");
        assert_eq!(session.char_count(), 10);
        assert_eq!(session.host().changes.len(), 1);
    }

    #[test]
    fn test_rejected_edit_leaves_document() {
        let mut session = session("{{ a }}");
        session.toggle_mode(BufferPosition::text(0, 0));
        let err = session
            .apply_edit(EditIntent::Insert {
                position: BufferPosition::text(0, 2),
                text: "x".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, EditorError::Edit(_)));
        assert_eq!(session.raw(), "{{ a }}");
        assert!(session.host().changes.is_empty());
    }

    #[test]
    fn test_reset_replaces_document_silently() {
        let mut session = session("old");
        session.key_pressed(BufferPosition::text(0, 0), '{').unwrap();
        session.reset("new {{ x }}");
        assert_eq!(session.raw(), "new {{ x }}");
        assert_eq!(session.pending_anchor(), None);
        assert!(session.host().changes.is_empty());
    }
}
