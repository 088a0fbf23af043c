//! # Stencil Parser
//!
//! Tokenizes template source that mixes free-form markup with Liquid-style
//! placeholders (`{{ expr }}`) and directives (`{% tag %}`).
//!
//! The token sequence is a lossless partition of the source: the editor keeps
//! it as the single source of truth and derives every view from it.
//!
//! ```rust
//! use stencil_parser::{serialize, tokenize, Token};
//!
//! let tokens = tokenize("Hello {{ name }}!");
//! assert_eq!(tokens.len(), 3);
//! assert!(matches!(&tokens[1], Token::Output { expression, .. } if expression == "name"));
//! assert_eq!(serialize(&tokens), "Hello {{ name }}!");
//! ```

pub mod markup;
pub mod token;
pub mod tokenizer;

#[cfg(test)]
mod tests_roundtrip;

pub use markup::{lex_markup, MarkupToken};
pub use token::{serialize, DirectiveKeywords, LogicRole, Token};
pub use tokenizer::{tokenize, Tokenizer};
