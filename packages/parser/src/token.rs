use serde::{Deserialize, Serialize};

pub const OUTPUT_OPEN: &str = "{{";
pub const OUTPUT_CLOSE: &str = "}}";
pub const LOGIC_OPEN: &str = "{%";
pub const LOGIC_CLOSE: &str = "%}";

/// Block role of a `{% ... %}` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicRole {
    /// Starts a block (`if`, `for`, `capture`, ...)
    Opening,
    /// Ends a block (`endif`, `endfor`, ...)
    Closing,
    /// Everything else (`else`, `assign`, `when`, `break`, ...)
    Standalone,
}

/// Atomic parse unit of template source.
///
/// Concatenating [`Token::source`] over a token sequence reproduces the
/// source it was tokenized from, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Token {
    /// Passthrough text/markup
    Literal { text: String },

    /// Value placeholder `{{ expression }}`
    Output {
        /// Trimmed expression, used as the chip label
        expression: String,
        /// Exact `{{ ... }}` span including original whitespace
        raw: String,
    },

    /// Control directive `{% ... %}`
    Logic { raw: String, role: LogicRole },
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal { text: text.into() }
    }

    /// Build a placeholder for a variable name, normalized as `{{ name }}`
    pub fn output(name: impl Into<String>) -> Self {
        let expression = name.into();
        let raw = format!("{} {} {}", OUTPUT_OPEN, expression, OUTPUT_CLOSE);
        Token::Output { expression, raw }
    }

    /// Build a placeholder from an exact `{{ ... }}` span
    pub fn output_from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let expression = inner_text(&raw, OUTPUT_OPEN, OUTPUT_CLOSE).to_string();
        Token::Output { expression, raw }
    }

    /// Source text this token was parsed from
    pub fn source(&self) -> &str {
        match self {
            Token::Literal { text } => text,
            Token::Output { raw, .. } => raw,
            Token::Logic { raw, .. } => raw,
        }
    }

    /// Byte length of the token's source
    pub fn len(&self) -> usize {
        self.source().len()
    }

    pub fn is_empty(&self) -> bool {
        self.source().is_empty()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal { .. })
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Token::Output { .. })
    }

    pub fn is_logic(&self) -> bool {
        matches!(self, Token::Logic { .. })
    }

    pub fn role(&self) -> Option<LogicRole> {
        match self {
            Token::Logic { role, .. } => Some(*role),
            _ => None,
        }
    }
}

/// Concatenate token sources back into template source
pub fn serialize(tokens: &[Token]) -> String {
    let mut output = String::with_capacity(tokens.iter().map(Token::len).sum());
    for token in tokens {
        output.push_str(token.source());
    }
    output
}

/// Text between delimiters with surrounding whitespace and Liquid
/// whitespace-control dashes removed.
pub(crate) fn inner_text<'a>(raw: &'a str, open: &str, close: &str) -> &'a str {
    let inner = raw
        .strip_prefix(open)
        .and_then(|s| s.strip_suffix(close))
        .unwrap_or(raw);
    let inner = inner.strip_prefix('-').unwrap_or(inner);
    let inner = inner.strip_suffix('-').unwrap_or(inner);
    inner.trim()
}

/// Directive keyword tables used to infer [`LogicRole`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveKeywords {
    pub opening: Vec<String>,
    pub closing: Vec<String>,
}

impl Default for DirectiveKeywords {
    fn default() -> Self {
        Self {
            opening: ["if", "unless", "case", "for", "capture"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            closing: ["endif", "endunless", "endcase", "endfor", "endcapture"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DirectiveKeywords {
    /// Classify a raw `{% ... %}` span by its first word
    pub fn classify(&self, raw: &str) -> LogicRole {
        let keyword = inner_text(raw, LOGIC_OPEN, LOGIC_CLOSE)
            .split_whitespace()
            .next()
            .unwrap_or("");

        if self.opening.iter().any(|k| k == keyword) {
            LogicRole::Opening
        } else if self.closing.iter().any(|k| k == keyword) {
            LogicRole::Closing
        } else {
            LogicRole::Standalone
        }
    }
}
