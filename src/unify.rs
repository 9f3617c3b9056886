//! In-place, length-preserving quote normalization over an accumulated buffer.
//!
//! [`QuotationUnifier`] is fed the source one line at a time (it doubles as
//! the lexer's line source) and is then asked to [`unify`] each string
//! literal the lexer located. Every replacement is exactly as long as the
//! text it replaces, so offsets of tokens not yet visited stay valid and no
//! re-indexing is ever needed.
//!
//! [`unify`]: QuotationUnifier::unify

use crate::grammar::{QuoteGrammar, Replacement};
use crate::position::{Position, PositionIndex};
use serde::Serialize;
use thiserror::Error;

/// Internal bookkeeping failures. Any of these aborts the current file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("token text mismatch at {start}: expected {expected:?}, found {found:?}")]
    TextMismatch {
        start: Position,
        expected: String,
        found: String,
    },

    #[error("replacement changed length at {start}: {original} -> {replaced} bytes")]
    LengthChanged {
        start: Position,
        original: usize,
        replaced: usize,
    },

    #[error("row {row} requested but only {recorded} lines were fed")]
    RowOutOfRange { row: usize, recorded: usize },

    #[error("span [{byte_start}, {byte_end}) is outside the buffer of length {buffer_len}")]
    SpanOutOfBounds {
        byte_start: usize,
        byte_end: usize,
        buffer_len: usize,
    },

    #[error("string token does not match the quote grammar: {text:?}")]
    GrammarMismatch { text: String },
}

/// What happened to a single literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unified {
    /// Quote runs were rewritten to double quotes.
    Rewritten,
    /// Already double-quoted.
    AlreadyDouble,
    /// Left single-quoted because the body contains double quotes.
    Conflict,
}

/// Per-file literal counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnifyStats {
    pub literals: usize,
    pub rewritten: usize,
    pub already_double: usize,
    pub conflicts: usize,
}

impl UnifyStats {
    fn record(&mut self, unified: Unified) {
        self.literals += 1;
        match unified {
            Unified::Rewritten => self.rewritten += 1,
            Unified::AlreadyDouble => self.already_double += 1,
            Unified::Conflict => self.conflicts += 1,
        }
    }
}

/// Owns the buffer for one file and rewrites literals in it.
#[derive(Debug)]
pub struct QuotationUnifier<'g> {
    grammar: &'g QuoteGrammar,
    buffer: Vec<u8>,
    index: PositionIndex,
    stats: UnifyStats,
}

impl<'g> QuotationUnifier<'g> {
    pub fn new(grammar: &'g QuoteGrammar) -> Self {
        Self {
            grammar,
            buffer: Vec::new(),
            index: PositionIndex::new(),
            stats: UnifyStats::default(),
        }
    }

    /// Append a line to the buffer and hand it back unchanged.
    pub fn feed(&mut self, line: Vec<u8>) -> Vec<u8> {
        self.buffer.extend_from_slice(&line);
        self.index.record(line.len());
        line
    }

    /// Normalize the literal `text` located at `[start, end)`.
    pub fn unify(
        &mut self,
        text: &str,
        start: Position,
        end: Position,
    ) -> Result<Unified, ConsistencyError> {
        let byte_start = self.index.resolve(start)?;
        let byte_end = self.index.resolve(end)?;

        let current = self
            .buffer
            .get(byte_start..byte_end)
            .ok_or(ConsistencyError::SpanOutOfBounds {
                byte_start,
                byte_end,
                buffer_len: self.buffer.len(),
            })?;

        if current != text.as_bytes() {
            return Err(ConsistencyError::TextMismatch {
                start,
                expected: text.to_string(),
                found: String::from_utf8_lossy(current).into_owned(),
            });
        }

        let unified = match self.grammar.normalize(text)? {
            Replacement::Unchanged => Unified::AlreadyDouble,
            Replacement::Conflict => {
                tracing::warn!(
                    %start,
                    literal = text,
                    "leaving literal single-quoted: body contains double quotes"
                );
                Unified::Conflict
            }
            Replacement::Rewrite(replaced) => {
                if replaced.len() != current.len() {
                    return Err(ConsistencyError::LengthChanged {
                        start,
                        original: current.len(),
                        replaced: replaced.len(),
                    });
                }
                self.buffer[byte_start..byte_end].copy_from_slice(replaced.as_bytes());
                tracing::trace!(%start, %end, "rewrote literal");
                Unified::Rewritten
            }
        };

        self.stats.record(unified);
        Ok(unified)
    }

    /// Current buffer contents.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn stats(&self) -> UnifyStats {
        self.stats
    }

    pub fn into_parts(self) -> (Vec<u8>, UnifyStats) {
        (self.buffer, self.stats)
    }
}
