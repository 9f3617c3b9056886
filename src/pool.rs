//! Thread-local lexer pooling.
//!
//! Creating a tree-sitter parser and loading the Python grammar is not free.
//! A batch run reuses one lexer per thread across all files.

use crate::lexer::{LexError, PythonLexer};
use std::cell::RefCell;

thread_local! {
    static PYTHON_LEXER: RefCell<Option<PythonLexer>> = const { RefCell::new(None) };
}

/// Execute function with pooled lexer instance.
///
/// On first call per thread, creates a new lexer. Subsequent calls reuse
/// the same instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pyquote::pool::with_lexer;
///
/// let tokens = with_lexer(|lexer| lexer.tokenize_str("x = 'a'\n"))??;
/// # Ok(())
/// # }
/// ```
pub fn with_lexer<F, R>(f: F) -> Result<R, LexError>
where
    F: FnOnce(&mut PythonLexer) -> R,
{
    PYTHON_LEXER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(PythonLexer::new()?);
        }
        match slot.as_mut() {
            Some(lexer) => Ok(f(lexer)),
            None => Err(LexError::LanguageSet),
        }
    })
}
