use crate::position::Position;

/// Token kinds the lexer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A complete string literal: prefix, quotes and body.
    String,
    Comment,
}

/// A located span of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn is_string(&self) -> bool {
        self.kind == TokenKind::String
    }
}
