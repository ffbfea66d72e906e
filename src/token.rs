//! The token definition for the boolean search language.

use std::fmt;

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw text of the token. Phrases carry their content without the quotes.
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// Whether this token may end an operand, e.g. `python`, `"ml"` or `)`.
    pub fn ends_operand(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::Phrase | TokenKind::RParen)
    }

    /// Whether this token may begin an operand, e.g. `python`, `(` or `NOT`.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Ident | TokenKind::Phrase | TokenKind::LParen | TokenKind::Not
        )
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Ident,
    Phrase, // "quoted text"

    // Keywords
    And, // "AND"
    Or,  // "OR"
    Not, // "NOT" or a leading '-'

    // Punctuation
    LParen, // (
    RParen, // )
    Colon,  // :

    // Special
    Eof, // End of input
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Ident => "identifier",
            TokenKind::Phrase => "phrase",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Colon => "':'",
            TokenKind::Eof => "end of query",
        };
        f.write_str(name)
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span used for tokens that have no source text.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }
}
