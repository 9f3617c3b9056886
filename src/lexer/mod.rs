//! Python tokenization on top of tree-sitter.
//!
//! The lexer pulls source text one line at a time through a caller-supplied
//! line source and reports string literals and comments with `(row, column)`
//! spans. Only outermost literals are reported: a literal nested inside an
//! f-string replacement field is part of its enclosing token.

pub mod errors;
pub mod parser;
pub mod token;

pub use errors::LexError;
pub use parser::PythonLexer;
pub use token::{Token, TokenKind};
