//! # Document
//!
//! The ordered token sequence of one template. It is the single source of
//! truth: raw text and display trees are derived from it, and every change
//! goes through the edit controller, the insertion service or a wholesale
//! replacement.

use crate::position::{end_position, position_at_offset, raw_offset, BufferPosition};
use stencil_parser::{serialize, Token, Tokenizer};
use stencil_view::ViewMode;
use tracing::debug;

/// Editable template document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Current version number (increments on each change)
    pub version: u64,

    tokens: Vec<Token>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create document from source text
    pub fn from_source(source: &str, tokenizer: &Tokenizer) -> Self {
        Self::from_tokens(tokenizer.tokenize(source))
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { version: 0, tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Canonical raw source
    pub fn source(&self) -> String {
        serialize(&self.tokens)
    }

    /// Number of characters in the raw source
    pub fn char_count(&self) -> usize {
        self.tokens.iter().map(|t| t.source().chars().count()).sum()
    }

    /// Replace the whole token sequence
    pub fn replace(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.version += 1;
    }

    /// Re-tokenize from new source text
    pub fn replace_source(&mut self, source: &str, tokenizer: &Tokenizer) {
        self.replace(tokenizer.tokenize(source));
    }

    /// Apply an edited token sequence and return the cursor to use.
    ///
    /// Literal splits are kept as they are. Each run of adjacent literals is
    /// re-tokenized on its own, so text that now forms a delimiter (typing
    /// `{{ x }}`, or removing a chip from between two halves of one) becomes
    /// a token, while existing placeholders and directives are never
    /// absorbed or re-split. The cursor is remapped through its source
    /// offset when the tokens change.
    pub(crate) fn commit(
        &mut self,
        tokens: Vec<Token>,
        cursor: BufferPosition,
        tokenizer: &Tokenizer,
        mode: ViewMode,
    ) -> BufferPosition {
        let Some(settled) = retokenize_literal_runs(&tokens, tokenizer) else {
            self.replace(tokens);
            return cursor;
        };

        let cursor = raw_offset(&tokens, cursor, ViewMode::Raw)
            .ok()
            .and_then(|offset| position_at_offset(&settled, offset, mode))
            .unwrap_or_else(|| end_position(&settled, mode));
        debug!(tokens = settled.len(), "Edit formed new delimiters, re-tokenized literal text");
        self.replace(settled);
        cursor
    }
}

/// Re-tokenize every maximal run of literals. `None` when no run forms a
/// placeholder or directive.
fn retokenize_literal_runs(tokens: &[Token], tokenizer: &Tokenizer) -> Option<Vec<Token>> {
    let mut settled = Vec::with_capacity(tokens.len());
    let mut changed = false;
    let mut index = 0;

    while index < tokens.len() {
        if !tokens[index].is_literal() {
            settled.push(tokens[index].clone());
            index += 1;
            continue;
        }

        let run_end = tokens[index..]
            .iter()
            .position(|t| !t.is_literal())
            .map_or(tokens.len(), |n| index + n);
        let run = &tokens[index..run_end];
        let retokenized = tokenizer.tokenize(&serialize(run));
        if retokenized.iter().all(Token::is_literal) {
            settled.extend_from_slice(run);
        } else {
            settled.extend(retokenized);
            changed = true;
        }
        index = run_end;
    }

    changed.then_some(settled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_round_trips() {
        let doc = Document::from_source("Hi {{ a }}{% if b %}", &Tokenizer::default());
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.source(), "Hi {{ a }}{% if b %}");
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_replace_bumps_version() {
        let tokenizer = Tokenizer::default();
        let mut doc = Document::new();
        assert!(doc.is_empty());

        doc.replace_source("x", &tokenizer);
        doc.replace(vec![Token::literal("y")]);
        assert_eq!(doc.version, 2);
        assert_eq!(doc.source(), "y");
    }

    #[test]
    fn test_commit_keeps_literal_splits() {
        let tokenizer = Tokenizer::default();
        let mut doc = Document::new();
        let tokens = vec![Token::literal("Hello "), Token::literal("!")];
        let cursor = doc.commit(tokens.clone(), BufferPosition::text(0, 6), &tokenizer, ViewMode::Live);

        assert_eq!(doc.tokens(), tokens.as_slice());
        assert_eq!(cursor, BufferPosition::text(0, 6));
    }

    #[test]
    fn test_commit_retokenizes_new_delimiters() {
        let tokenizer = Tokenizer::default();
        let mut doc = Document::new();
        let tokens = vec![Token::literal("{"), Token::literal("{ a }} b")];
        let cursor = doc.commit(tokens, BufferPosition::text(1, 8), &tokenizer, ViewMode::Live);

        assert_eq!(doc.len(), 2);
        assert!(doc.tokens()[0].is_output());
        assert_eq!(cursor, BufferPosition::text(1, 2));
    }

    #[test]
    fn test_commit_never_absorbs_existing_placeholder() {
        let tokenizer = Tokenizer::default();
        let mut doc = Document::new();
        let tokens = vec![Token::literal("a{"), Token::output("c"), Token::literal(" }}")];
        let cursor = doc.commit(tokens.clone(), BufferPosition::text(0, 2), &tokenizer, ViewMode::Live);

        assert_eq!(doc.tokens(), tokens.as_slice());
        assert_eq!(cursor, BufferPosition::text(0, 2));
    }

    #[test]
    fn test_commit_retokenizes_runs_separately() {
        let tokenizer = Tokenizer::default();
        let mut doc = Document::new();
        let tokens = vec![
            Token::literal("{"),
            Token::literal("{ y }}{"),
            Token::output("c"),
        ];
        doc.commit(tokens, BufferPosition::text(0, 1), &tokenizer, ViewMode::Live);

        assert_eq!(
            doc.tokens(),
            &[
                Token::output_from_raw("{{ y }}"),
                Token::literal("{"),
                Token::output("c"),
            ]
        );
    }

    #[test]
    fn test_char_count_counts_chars_not_bytes() {
        let doc = Document::from_source("né {{ x }}\u{a0}", &Tokenizer::default());
        assert_eq!(doc.char_count(), 11);
    }
}
