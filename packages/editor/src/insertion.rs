//! # Variable Insertion
//!
//! Turns a chosen variable into a `{{ name }}` placeholder and splices it
//! into the document at a cursor position, followed by a spacing unit so
//! the next typed character does not abut the chip.

use crate::catalog::VariableDescriptor;
use crate::document::Document;
use crate::errors::EditError;
use crate::position::{insert_point, BufferPosition, InsertPoint};
use stencil_parser::{Token, Tokenizer};
use stencil_view::ViewMode;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct VariableInserter {
    spacing_unit: String,
    tokenizer: Tokenizer,
}

impl VariableInserter {
    pub fn new(spacing_unit: impl Into<String>, tokenizer: Tokenizer) -> Self {
        Self {
            spacing_unit: spacing_unit.into(),
            tokenizer,
        }
    }

    /// Insert a placeholder for `descriptor` at `at` and return the cursor
    /// (right after the spacing unit). Positions inside a chip are rejected.
    pub fn insert(
        &self,
        document: &mut Document,
        descriptor: &VariableDescriptor,
        at: BufferPosition,
        mode: ViewMode,
    ) -> Result<BufferPosition, EditError> {
        let chip = self.placeholder(&descriptor.name)?;
        let point = insert_point(document.tokens(), at, mode)?;

        let mut tokens = document.tokens().to_vec();
        let gap = match point {
            InsertPoint::Gap(gap) => gap,
            InsertPoint::Split { token, offset } => split_literal(&mut tokens, token, offset),
        };
        tokens.insert(gap, chip);
        let cursor = self.place_spacing(&mut tokens, gap + 1);

        let cursor = document.commit(tokens, cursor, &self.tokenizer, mode);
        debug!(variable = %descriptor.name, %cursor, "Inserted placeholder");
        Ok(cursor)
    }

    fn placeholder(&self, name: &str) -> Result<Token, EditError> {
        let name = name.trim();
        let chip = Token::output(name);
        let standalone = matches!(
            self.tokenizer.tokenize(chip.source()).as_slice(),
            [Token::Output { raw, .. }] if raw == chip.source()
        );

        if name.is_empty() || !standalone {
            return Err(EditError::InvalidVariable(name.to_string()));
        }
        Ok(chip)
    }

    /// Prefix the literal at `index` with the spacing unit, creating it if
    /// needed, and return the position just after the spacing.
    fn place_spacing(&self, tokens: &mut Vec<Token>, index: usize) -> BufferPosition {
        if self.spacing_unit.is_empty() {
            return BufferPosition::AfterChip { token: index - 1 };
        }
        match tokens.get_mut(index) {
            Some(Token::Literal { text }) => text.insert_str(0, &self.spacing_unit),
            _ => tokens.insert(index, Token::literal(self.spacing_unit.as_str())),
        }
        BufferPosition::text(index, self.spacing_unit.len())
    }
}

/// Split a literal in two at `offset`, keeping only non-empty halves.
/// Returns the gap between the halves.
fn split_literal(tokens: &mut Vec<Token>, index: usize, offset: usize) -> usize {
    let Some(Token::Literal { text }) = tokens.get(index) else {
        return index;
    };
    let (left, right) = text.split_at(offset);
    let (left, right) = (left.to_string(), right.to_string());

    let mut halves = Vec::with_capacity(2);
    if !left.is_empty() {
        halves.push(Token::literal(left));
    }
    let gap = index + halves.len();
    if !right.is_empty() {
        halves.push(Token::literal(right));
    }
    tokens.splice(index..=index, halves);
    gap
}
