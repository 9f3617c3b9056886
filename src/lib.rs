//! pyquote: unify Python string-literal quoting on double quotes
//!
//! Every single-quoted string literal (including triple-quoted and prefixed
//! forms such as `b'...'` or `r'''...'''`) is rewritten to use double quotes.
//! Everything else, comments and quotes inside literal bodies included, is
//! left byte-for-byte intact.
//!
//! # Architecture
//!
//! - [`PythonLexer`] tokenizes source pulled one line at a time.
//! - Each pulled line is first fed to a [`QuotationUnifier`], which keeps the
//!   accumulated buffer and a [`PositionIndex`] of line ends.
//! - For every string token the unifier resolves the token's `(row, column)`
//!   span to byte offsets, verifies the text found there, and splices in the
//!   [`QuoteGrammar`] replacement.
//!
//! Replacements are always the same length as the text they replace, which
//! keeps the offsets of all later tokens valid without re-indexing.
//!
//! # Safety
//!
//! - Every splice verifies the expected token text first
//! - A length-changing replacement is a hard error
//! - Files are written atomically and only after the whole file succeeded
//! - Check mode never writes
//!
//! # Example
//!
//! ```no_run
//! use pyquote::RewritePipeline;
//!
//! let rewrite = RewritePipeline::default().run_bytes(b"x = 'foo'\n")?;
//! assert_eq!(rewrite.data, b"x = \"foo\"\n");
//! # Ok::<(), pyquote::RewriteError>(())
//! ```

pub mod config;
pub mod discover;
pub mod fix;
pub mod grammar;
pub mod lexer;
pub mod pipeline;
pub mod pool;
pub mod position;
pub mod unify;

// Re-exports
pub use config::{load_from_path, load_from_str, Config, ConfigError};
pub use discover::discover_files;
pub use fix::{FileReport, FileStatus, FixError, FixedFile, Fixer, Mode};
pub use grammar::{PrefixSet, QuoteGrammar, QuoteMatch, QuoteRun, Replacement};
pub use lexer::{LexError, PythonLexer, Token, TokenKind};
pub use pipeline::{Rewrite, RewriteError, RewritePipeline};
pub use position::{Position, PositionIndex};
pub use unify::{ConsistencyError, QuotationUnifier, Unified, UnifyStats};
