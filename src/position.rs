//! Line-based position bookkeeping.
//!
//! The lexer reports token spans as `(row, column)` pairs. [`PositionIndex`]
//! turns those into absolute byte offsets into the buffer accumulated from
//! every line fed so far.

use crate::unify::ConsistencyError;
use std::fmt;

/// A location reported by the lexer: 1-based row, 0-based byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            row: point.row + 1,
            column: point.column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Cumulative line-end offsets, one entry per line fed.
///
/// Entry `i` is the absolute offset at which line `i + 1` ends. The sequence
/// only grows and is strictly increasing because a fed line is never empty.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    line_ends: Vec<usize>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the byte length of the next line.
    pub fn record(&mut self, line_len: usize) {
        let end = self.total_len() + line_len;
        debug_assert!(line_len > 0, "empty line fed after row {}", self.lines());
        self.line_ends.push(end);
    }

    /// Translate a position into an absolute byte offset.
    pub fn resolve(&self, position: Position) -> Result<usize, ConsistencyError> {
        let Position { row, column } = position;
        if row == 0 || row > self.line_ends.len() {
            return Err(ConsistencyError::RowOutOfRange {
                row,
                recorded: self.line_ends.len(),
            });
        }

        let line_start = if row == 1 { 0 } else { self.line_ends[row - 2] };
        Ok(line_start + column)
    }

    /// Number of lines recorded so far.
    pub fn lines(&self) -> usize {
        self.line_ends.len()
    }

    /// Total number of bytes covered by the recorded lines.
    pub fn total_len(&self) -> usize {
        self.line_ends.last().copied().unwrap_or(0)
    }
}
