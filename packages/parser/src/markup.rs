//! Lossless lexer for the HTML-like markup that lives inside literal text.
//!
//! Only the shapes the editor cares about are recognized (tags, comments,
//! whitespace, non-breaking spaces). Anything the lexer cannot classify is
//! reported as [`MarkupToken::Text`], so the returned spans always cover the
//! whole input.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupToken {
    #[regex(r"<!--([^-]|-[^-]|--[^>])*-->")]
    Comment,

    #[regex(r"<![a-zA-Z][^>]*>")]
    Doctype,

    #[regex(r"<[a-zA-Z][^>]*>")]
    OpenTag,

    #[regex(r"</[a-zA-Z][^>]*>")]
    CloseTag,

    #[token("&nbsp;")]
    NbspEntity,

    #[token("\u{a0}")]
    Nbsp,

    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    #[regex(r"[^<&\t\r\n\x0C \u{a0}]+")]
    Text,
}

impl MarkupToken {
    pub fn is_tag(self) -> bool {
        matches!(self, MarkupToken::OpenTag | MarkupToken::CloseTag)
    }

    /// Whitespace for layout purposes, including non-breaking spaces
    pub fn is_blank(self) -> bool {
        matches!(
            self,
            MarkupToken::Whitespace | MarkupToken::Nbsp | MarkupToken::NbspEntity
        )
    }
}

/// Lex markup into contiguous spans covering all of `source`
pub fn lex_markup(source: &str) -> Vec<(MarkupToken, Range<usize>)> {
    let mut pieces: Vec<(MarkupToken, Range<usize>)> = Vec::new();
    let mut last_end = 0;

    for (result, span) in MarkupToken::lexer(source).spanned() {
        if span.start > last_end {
            push_text(&mut pieces, last_end..span.start);
        }
        match result {
            Ok(token) => pieces.push((token, span.clone())),
            Err(_) => push_text(&mut pieces, span.clone()),
        }
        last_end = span.end;
    }

    if last_end < source.len() {
        push_text(&mut pieces, last_end..source.len());
    }

    pieces
}

// Unrecognized input (a lone `<` or `&`) is merged into neighbouring text.
fn push_text(pieces: &mut Vec<(MarkupToken, Range<usize>)>, span: Range<usize>) {
    if let Some((MarkupToken::Text, last)) = pieces.last_mut() {
        if last.end == span.start {
            last.end = span.end;
            return;
        }
    }
    pieces.push((MarkupToken::Text, span));
}

/// Element name of an open or close tag (`<span class="x">` → `span`)
pub fn tag_name(tag: &str) -> &str {
    let rest = tag.trim_start_matches('<').trim_start_matches('/');
    let end = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// `<br/>`, `<img ... />`
pub fn is_self_closing(tag: &str) -> bool {
    tag.trim_end_matches('>').trim_end().ends_with('/')
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that never have children or a closing tag
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Value of an attribute in an open tag. Valueless attributes yield `""`.
pub fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let inner = tag.strip_prefix('<')?;
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let inner = inner.trim_start_matches('/');
    let mut rest = &inner[tag_name(tag).len()..];

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let attr_name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    match body.find(quote) {
                        Some(close) => (&body[..close], &body[close + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = after_eq
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            rest = remaining;
            value
        } else {
            ""
        };

        if attr_name.eq_ignore_ascii_case(name) {
            return Some(value);
        }
        if attr_name.is_empty() {
            // Stray `=` with no name; skip a character to make progress
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str();
        }
    }
}

/// Whether the tag's `class` attribute lists `class`
pub fn has_class(tag: &str, class: &str) -> bool {
    attribute(tag, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
        .unwrap_or(false)
}
