//! # Atomic Edit Controller
//!
//! Interprets cursor-relative edit intents against the document.
//!
//! In live mode placeholders are atomic: backward deletion next to (or
//! inside) a chip removes the whole token, and text never lands inside a
//! chip. In raw mode the document is plain source text and edits work on
//! characters, followed by re-tokenization.

use crate::document::Document;
use crate::errors::EditError;
use crate::position::{
    canonical_boundary, end_position, insert_point, position_at_offset, raw_offset, validate,
    BufferPosition, InsertPoint,
};
use serde::{Deserialize, Serialize};
use stencil_parser::{Token, Tokenizer};
use stencil_view::ViewMode;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

/// A discrete edit request from the host, keyed by cursor position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditIntent {
    /// The picker keystroke: remember the position and open the picker
    TriggerPicker { position: BufferPosition },
    /// Backspace
    DeleteBackward { position: BufferPosition },
    /// Typed or pasted text
    Insert { position: BufferPosition, text: String },
    /// Dismiss a pending picker session
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The picker should open at `anchor`; the keystroke is suppressed
    PickerRequested { anchor: BufferPosition },
    /// The document changed and the caret moves to `cursor`
    Edited { cursor: BufferPosition },
    /// Nothing to edit at this position
    Unchanged { cursor: BufferPosition },
    PickerCancelled { had_anchor: bool },
}

#[derive(Debug, Clone)]
pub struct EditController {
    mode: ViewMode,
    tokenizer: Tokenizer,
    pending_anchor: Option<BufferPosition>,
}

impl EditController {
    pub fn new(mode: ViewMode, tokenizer: Tokenizer) -> Self {
        Self {
            mode,
            tokenizer,
            pending_anchor: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch modes; any pending picker anchor refers to the old view and is dropped
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.pending_anchor = None;
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn pending_anchor(&self) -> Option<BufferPosition> {
        self.pending_anchor
    }

    /// Take the pending anchor, ending the picker session
    pub fn take_anchor(&mut self) -> Option<BufferPosition> {
        self.pending_anchor.take()
    }

    /// Drop the pending picker session. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending_anchor.take().is_some()
    }

    pub fn apply(&mut self, document: &mut Document, intent: EditIntent) -> Result<EditOutcome, EditError> {
        let result = match intent {
            EditIntent::TriggerPicker { position } => self.trigger(document, position),
            EditIntent::DeleteBackward { position } => self.delete_backward(document, position),
            EditIntent::Insert { position, text } => self.insert(document, position, &text),
            EditIntent::Escape => Ok(EditOutcome::PickerCancelled {
                had_anchor: self.cancel(),
            }),
        };

        match &result {
            Ok(outcome) => debug!(?outcome, version = document.version, "Applied edit intent"),
            Err(err) => warn!(%err, mode = ?self.mode, "Rejected edit intent"),
        }
        result
    }

    fn trigger(&mut self, document: &Document, position: BufferPosition) -> Result<EditOutcome, EditError> {
        insert_point(document.tokens(), position, self.mode)?;
        self.pending_anchor = Some(position);
        Ok(EditOutcome::PickerRequested { anchor: position })
    }

    fn delete_backward(
        &mut self,
        document: &mut Document,
        position: BufferPosition,
    ) -> Result<EditOutcome, EditError> {
        if self.mode == ViewMode::Raw {
            return self.delete_raw(document, position);
        }

        let tokens = document.tokens();
        let edit = match position {
            BufferPosition::AfterChip { token } => {
                validate(tokens, position, self.mode)?;
                Some(remove_chip(tokens, token))
            }
            // A caret reported inside a chip deletes the chip as one unit
            BufferPosition::Text { token, offset } if tokens.get(token).is_some_and(Token::is_output) => {
                if offset > tokens[token].len() {
                    return Err(EditError::OutOfRange {
                        position,
                        len: tokens.len(),
                    });
                }
                Some(remove_chip(tokens, token))
            }
            BufferPosition::Text { token, offset } => {
                validate(tokens, position, self.mode)?;
                if offset > 0 {
                    Some(delete_grapheme(tokens, token, offset))
                } else {
                    delete_before_gap(tokens, token)
                }
            }
            BufferPosition::BeforeChip { token } | BufferPosition::Boundary { token } => {
                validate(tokens, position, self.mode)?;
                delete_before_gap(tokens, token)
            }
        };

        Ok(match edit {
            Some((tokens, cursor)) => EditOutcome::Edited {
                cursor: document.commit(tokens, cursor, &self.tokenizer, self.mode),
            },
            None => EditOutcome::Unchanged { cursor: position },
        })
    }

    fn delete_raw(&mut self, document: &mut Document, position: BufferPosition) -> Result<EditOutcome, EditError> {
        let offset = raw_offset(document.tokens(), position, ViewMode::Raw)?;
        let mut source = document.source();

        let Some((start, _)) = source[..offset].grapheme_indices(true).next_back() else {
            return Ok(EditOutcome::Unchanged { cursor: position });
        };
        source.replace_range(start..offset, "");
        document.replace_source(&source, &self.tokenizer);

        Ok(EditOutcome::Edited {
            cursor: self.cursor_at(document, start),
        })
    }

    fn insert(&mut self, document: &mut Document, position: BufferPosition, text: &str) -> Result<EditOutcome, EditError> {
        let tokens = document.tokens();

        if self.mode == ViewMode::Raw {
            let offset = raw_offset(tokens, position, ViewMode::Raw)?;
            if text.is_empty() {
                return Ok(EditOutcome::Unchanged { cursor: position });
            }
            let mut source = document.source();
            source.insert_str(offset, text);
            document.replace_source(&source, &self.tokenizer);
            return Ok(EditOutcome::Edited {
                cursor: self.cursor_at(document, offset + text.len()),
            });
        }

        let point = insert_point(tokens, position, self.mode)?;
        if text.is_empty() {
            return Ok(EditOutcome::Unchanged { cursor: position });
        }

        let mut edited = tokens.to_vec();
        let cursor = match point {
            InsertPoint::Split { token, offset } => {
                push_text(&mut edited[token], offset, text);
                BufferPosition::text(token, offset + text.len())
            }
            InsertPoint::Gap(gap) => insert_text_at_gap(&mut edited, gap, text),
        };

        Ok(EditOutcome::Edited {
            cursor: document.commit(edited, cursor, &self.tokenizer, self.mode),
        })
    }

    fn cursor_at(&self, document: &Document, offset: usize) -> BufferPosition {
        position_at_offset(document.tokens(), offset, self.mode)
            .unwrap_or_else(|| end_position(document.tokens(), self.mode))
    }
}

/// Remove a chip; the caret goes to the boundary the chip leaves behind
fn remove_chip(tokens: &[Token], index: usize) -> (Vec<Token>, BufferPosition) {
    let mut edited = tokens.to_vec();
    edited.remove(index);
    let cursor = canonical_boundary(&edited, index);
    (edited, cursor)
}

/// Remove the grapheme cluster ending at `offset` inside a literal
fn delete_grapheme(tokens: &[Token], index: usize, offset: usize) -> (Vec<Token>, BufferPosition) {
    let mut edited = tokens.to_vec();
    let mut cursor = BufferPosition::text(index, offset);

    if let Token::Literal { text } = &mut edited[index] {
        if let Some((start, _)) = text[..offset].grapheme_indices(true).next_back() {
            text.replace_range(start..offset, "");
            cursor = BufferPosition::text(index, start);
        }
    }
    (edited, cursor)
}

/// Backspace at a gap: skip hidden directives and empty literals, then
/// delete the previous chip whole or the previous literal's last grapheme.
fn delete_before_gap(tokens: &[Token], gap: usize) -> Option<(Vec<Token>, BufferPosition)> {
    tokens[..gap]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, token)| match token {
            Token::Output { .. } => Some(remove_chip(tokens, index)),
            Token::Literal { text } if !text.is_empty() => {
                Some(delete_grapheme(tokens, index, text.len()))
            }
            _ => None,
        })
}

fn push_text(token: &mut Token, offset: usize, text: &str) {
    if let Token::Literal { text: current } = token {
        current.insert_str(offset, text);
    }
}

/// Put text into the literal touching the gap, or into a new literal
fn insert_text_at_gap(tokens: &mut Vec<Token>, gap: usize, text: &str) -> BufferPosition {
    if let Some(Token::Literal { text: before }) = gap.checked_sub(1).and_then(|i| tokens.get_mut(i)) {
        before.push_str(text);
        return BufferPosition::text(gap - 1, before.len());
    }
    if let Some(Token::Literal { text: after }) = tokens.get_mut(gap) {
        after.insert_str(0, text);
        return BufferPosition::text(gap, text.len());
    }
    tokens.insert(gap, Token::literal(text));
    BufferPosition::text(gap, text.len())
}
