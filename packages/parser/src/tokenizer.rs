//! # Template Tokenizer
//!
//! Splits template source into [`Token`]s with a single left-to-right scan.
//!
//! - `{{` opens a placeholder, closed by the first `}}` after it
//! - `{%` opens a directive, closed by the first `%}` after it
//! - Delimiters never nest or escape
//! - A delimiter with no closer before end of input is literal text
//!
//! The scan is total: every byte of the input lands in exactly one token, in
//! order, so `serialize(&tokenize(s)) == s` for every `s`.

use crate::token::{
    DirectiveKeywords, Token, LOGIC_CLOSE, LOGIC_OPEN, OUTPUT_CLOSE, OUTPUT_OPEN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelimiterKind {
    Output,
    Logic,
}

impl DelimiterKind {
    fn at(bytes: &[u8], pos: usize) -> Option<Self> {
        if bytes.get(pos) != Some(&b'{') {
            return None;
        }
        match bytes.get(pos + 1) {
            Some(b'{') => Some(DelimiterKind::Output),
            Some(b'%') => Some(DelimiterKind::Logic),
            _ => None,
        }
    }

    fn close(self) -> &'static str {
        match self {
            DelimiterKind::Output => OUTPUT_CLOSE,
            DelimiterKind::Logic => LOGIC_CLOSE,
        }
    }

    fn open(self) -> &'static str {
        match self {
            DelimiterKind::Output => OUTPUT_OPEN,
            DelimiterKind::Logic => LOGIC_OPEN,
        }
    }
}

/// Template tokenizer with configurable directive keywords
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    keywords: DirectiveKeywords,
}

impl Tokenizer {
    pub fn new(keywords: DirectiveKeywords) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &DirectiveKeywords {
        &self.keywords
    }

    pub fn tokenize(&self, source: &str) -> Vec<Token> {
        Scanner::new(source, &self.keywords).run()
    }
}

/// Tokenize with the default Liquid keyword tables
pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(source)
}

struct Scanner<'a> {
    source: &'a str,
    keywords: &'a DirectiveKeywords,
    tokens: Vec<Token>,
    literal_start: usize,
    pos: usize,
    // Once a closer is missing from some point on, it is missing from every later point too.
    output_unclosed: bool,
    logic_unclosed: bool,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, keywords: &'a DirectiveKeywords) -> Self {
        Self {
            source,
            keywords,
            tokens: Vec::new(),
            literal_start: 0,
            pos: 0,
            output_unclosed: false,
            logic_unclosed: false,
        }
    }

    fn run(mut self) -> Vec<Token> {
        let bytes = self.source.as_bytes();

        while self.pos < bytes.len() {
            match DelimiterKind::at(bytes, self.pos) {
                Some(kind) => match self.find_close(kind) {
                    Some(end) => self.emit_delimited(kind, end),
                    None => self.pos += 1,
                },
                None => self.pos += 1,
            }
        }

        self.flush_literal(self.source.len());
        self.tokens
    }

    /// End offset (exclusive) of the delimited span starting at `self.pos`
    fn find_close(&mut self, kind: DelimiterKind) -> Option<usize> {
        let unclosed = match kind {
            DelimiterKind::Output => &mut self.output_unclosed,
            DelimiterKind::Logic => &mut self.logic_unclosed,
        };
        if *unclosed {
            return None;
        }

        let body_start = self.pos + kind.open().len();
        match self.source[body_start..].find(kind.close()) {
            Some(rel) => Some(body_start + rel + kind.close().len()),
            None => {
                *unclosed = true;
                None
            }
        }
    }

    fn emit_delimited(&mut self, kind: DelimiterKind, end: usize) {
        self.flush_literal(self.pos);

        let raw = &self.source[self.pos..end];
        let token = match kind {
            DelimiterKind::Output => Token::output_from_raw(raw),
            DelimiterKind::Logic => Token::Logic {
                raw: raw.to_string(),
                role: self.keywords.classify(raw),
            },
        };
        self.tokens.push(token);

        self.pos = end;
        self.literal_start = end;
    }

    fn flush_literal(&mut self, end: usize) {
        if end > self.literal_start {
            self.tokens
                .push(Token::literal(&self.source[self.literal_start..end]));
        }
        self.literal_start = end;
    }
}
