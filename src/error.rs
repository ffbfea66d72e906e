//! Error types for lexing, parsing and compiling search queries.

use thiserror::Error;

use crate::token::{Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    /// Byte position in the input where the error occurred.
    pub position: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn unterminated_phrase(position: usize) -> Self {
        Self::new(
            format!("unterminated phrase starting at position {position}"),
            position,
        )
    }

    pub fn unexpected_character(c: char, position: usize) -> Self {
        Self::new(
            format!("unexpected character {c:?} at position {position}"),
            position,
        )
    }
}

/// Parse error carrying the offending token, when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// Kind and text of the token the parser choked on.
    pub found: Option<(TokenKind, String)>,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            found: None,
            span: None,
        }
    }

    pub fn at_token(message: impl Into<String>, token: &Token<'_>) -> Self {
        Self {
            message: message.into(),
            found: Some((token.kind, token.text.to_string())),
            span: Some(token.span),
        }
    }

    pub fn position(&self) -> Option<usize> {
        self.span.map(|s| s.start)
    }
}

/// A field registry entry that cannot be compiled. This is a deployment bug,
/// never a user input error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid search configuration{}: {}", field_suffix(.field), .message)]
pub struct ConfigurationError {
    /// Field alias the defect belongs to; `None` for registry-wide settings.
    pub field: Option<String>,
    pub message: String,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|f| format!(" for field '{f}'"))
        .unwrap_or_default()
}

/// Raw query text rejected before tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    #[error("query is too long ({length} characters, at most {max} allowed)")]
    TooLong { length: usize, max: usize },
    #[error("query nests parentheses too deeply (depth {depth}, at most {max} allowed)")]
    TooDeep { depth: usize, max: usize },
}

/// Unified error returned by the engine entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query syntax error: {0}")]
    Lex(#[from] LexError),
    #[error("query syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("query rejected: {0}")]
    Limit(#[from] LimitError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl QueryError {
    /// Whether the error is caused by what the user typed, as opposed to a
    /// broken registry. User errors map to an "invalid query" response.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, QueryError::Configuration(_))
    }

    /// Byte position of the error in the query text, when known.
    pub fn position(&self) -> Option<usize> {
        match self {
            QueryError::Lex(e) => Some(e.position),
            QueryError::Parse(e) => e.position(),
            QueryError::Limit(_) | QueryError::Configuration(_) => None,
        }
    }

    /// Renders the error with the query and a caret under the failing position.
    pub fn format_with_context(&self, query: &str) -> String {
        let mut out = format!("{self}\n  {query}");
        if let Some(pos) = self.position() {
            let column = query[..pos.min(query.len())].chars().count();
            out.push_str(&format!("\n  {}^", " ".repeat(column)));
        }
        out
    }
}
