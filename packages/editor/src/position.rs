//! # Buffer Positions
//!
//! Cursor locations expressed against the token sequence instead of a host
//! selection object. Hosts keep an adapter that maps their native cursor to
//! and from [`BufferPosition`].
//!
//! In live mode no position may sit inside a placeholder: the only ways to
//! address a chip are [`BufferPosition::BeforeChip`] and
//! [`BufferPosition::AfterChip`]. Positions inside a directive are rejected
//! too, since directives are hidden there.

use crate::errors::EditError;
use serde::{Deserialize, Serialize};
use std::fmt;
use stencil_parser::Token;
use stencil_view::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BufferPosition {
    /// Byte offset into a token's text, on a `char` boundary
    Text { token: usize, offset: usize },
    /// Boundary immediately before a chip
    BeforeChip { token: usize },
    /// Boundary immediately after a chip
    AfterChip { token: usize },
    /// Gap before token `token`; `token == len` is the end of the document
    Boundary { token: usize },
}

impl BufferPosition {
    pub fn text(token: usize, offset: usize) -> Self {
        BufferPosition::Text { token, offset }
    }

    pub fn token(&self) -> usize {
        match *self {
            BufferPosition::Text { token, .. }
            | BufferPosition::BeforeChip { token }
            | BufferPosition::AfterChip { token }
            | BufferPosition::Boundary { token } => token,
        }
    }
}

impl fmt::Display for BufferPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferPosition::Text { token, offset } => write!(f, "text({}:{})", token, offset),
            BufferPosition::BeforeChip { token } => write!(f, "before-chip({})", token),
            BufferPosition::AfterChip { token } => write!(f, "after-chip({})", token),
            BufferPosition::Boundary { token } => write!(f, "boundary({})", token),
        }
    }
}

/// Where new content goes once a position has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertPoint {
    /// Between tokens, before token `n`
    Gap(usize),
    /// Inside a literal
    Split { token: usize, offset: usize },
}

/// Check a position against the document for the given view mode
pub fn validate(tokens: &[Token], position: BufferPosition, mode: ViewMode) -> Result<(), EditError> {
    let len = tokens.len();
    let out_of_range = EditError::OutOfRange { position, len };

    match position {
        BufferPosition::Text { token, offset } => {
            let Some(target) = tokens.get(token) else {
                return Err(out_of_range);
            };
            if mode == ViewMode::Live {
                match target {
                    Token::Output { .. } => return Err(EditError::InsideChip { position, token }),
                    Token::Logic { .. } => {
                        return Err(EditError::HiddenDirective { position, token })
                    }
                    Token::Literal { .. } => {}
                }
            }
            let text = target.source();
            if offset > text.len() {
                return Err(out_of_range);
            }
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { token, offset });
            }
            Ok(())
        }
        BufferPosition::BeforeChip { token } | BufferPosition::AfterChip { token } => {
            match tokens.get(token) {
                None => Err(out_of_range),
                Some(t) if t.is_output() => Ok(()),
                Some(_) => Err(EditError::NotAChip(token)),
            }
        }
        BufferPosition::Boundary { token } => {
            if token > len {
                Err(out_of_range)
            } else {
                Ok(())
            }
        }
    }
}

/// Byte offset of a position in the serialized source
pub fn raw_offset(tokens: &[Token], position: BufferPosition, mode: ViewMode) -> Result<usize, EditError> {
    validate(tokens, position, mode)?;
    let start = |index: usize| -> usize { tokens[..index].iter().map(Token::len).sum() };

    Ok(match position {
        BufferPosition::Text { token, offset } => start(token) + offset,
        BufferPosition::BeforeChip { token } | BufferPosition::Boundary { token } => start(token),
        BufferPosition::AfterChip { token } => start(token + 1),
    })
}

/// Map a source byte offset back to a position. `None` when the offset is
/// inside a chip or hidden directive (live mode) or not a char boundary.
pub fn position_at_offset(tokens: &[Token], offset: usize, mode: ViewMode) -> Option<BufferPosition> {
    let mut start = 0;

    for (index, token) in tokens.iter().enumerate() {
        let end = start + token.len();
        if offset <= end {
            let local = offset - start;
            match (mode, token) {
                (ViewMode::Raw, _) | (ViewMode::Live, Token::Literal { .. }) => {
                    return token
                        .source()
                        .is_char_boundary(local)
                        .then_some(BufferPosition::text(index, local));
                }
                (ViewMode::Live, Token::Output { .. }) => {
                    if local == 0 {
                        return Some(canonical_boundary(tokens, index));
                    }
                    if local == token.len() {
                        return Some(BufferPosition::AfterChip { token: index });
                    }
                    return None;
                }
                (ViewMode::Live, Token::Logic { .. }) => {
                    if local == 0 {
                        return Some(canonical_boundary(tokens, index));
                    }
                    if local < token.len() {
                        return None;
                    }
                }
            }
        }
        start = end;
    }

    (offset == start).then(|| end_position(tokens, mode))
}

/// Last position of the document
pub fn end_position(tokens: &[Token], mode: ViewMode) -> BufferPosition {
    match (mode, tokens.last()) {
        (_, None) => BufferPosition::Boundary { token: 0 },
        (ViewMode::Raw, Some(last)) => BufferPosition::text(tokens.len() - 1, last.len()),
        (ViewMode::Live, Some(_)) => canonical_boundary(tokens, tokens.len()),
    }
}

/// Preferred live-mode name for the gap before token `gap`: the end of a
/// preceding literal, the trailing edge of a preceding chip, or the bare gap.
pub fn canonical_boundary(tokens: &[Token], gap: usize) -> BufferPosition {
    match gap.checked_sub(1).and_then(|i| tokens.get(i)) {
        Some(Token::Literal { text }) => BufferPosition::text(gap - 1, text.len()),
        Some(Token::Output { .. }) => BufferPosition::AfterChip { token: gap - 1 },
        _ => BufferPosition::Boundary { token: gap },
    }
}

/// Resolve a position to the place new content is inserted
pub(crate) fn insert_point(
    tokens: &[Token],
    position: BufferPosition,
    mode: ViewMode,
) -> Result<InsertPoint, EditError> {
    validate(tokens, position, mode)?;

    Ok(match position {
        BufferPosition::Text { token, offset } => match &tokens[token] {
            Token::Literal { .. } => InsertPoint::Split { token, offset },
            _ if offset == 0 => InsertPoint::Gap(token),
            other if offset == other.len() => InsertPoint::Gap(token + 1),
            Token::Output { .. } => return Err(EditError::InsideChip { position, token }),
            Token::Logic { .. } => return Err(EditError::HiddenDirective { position, token }),
        },
        BufferPosition::BeforeChip { token } | BufferPosition::Boundary { token } => {
            InsertPoint::Gap(token)
        }
        BufferPosition::AfterChip { token } => InsertPoint::Gap(token + 1),
    })
}
