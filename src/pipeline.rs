//! Lexer + unifier orchestration for one file's content.

use crate::grammar::QuoteGrammar;
use crate::lexer::LexError;
use crate::pool;
use crate::unify::{ConsistencyError, QuotationUnifier, UnifyStats};
use std::io::BufRead;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("lexing failed: {0}")]
    Lex(#[from] LexError),

    #[error("internal consistency failure: {0}")]
    Consistency(#[from] ConsistencyError),
}

/// Normalized content of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Rewrite {
    pub data: Vec<u8>,
    pub stats: UnifyStats,
}

impl Rewrite {
    /// Whether any literal was rewritten.
    pub fn changed(&self) -> bool {
        self.stats.rewritten > 0
    }
}

/// Drives the lexer over a source and rewrites every string literal.
#[derive(Debug, Clone, Default)]
pub struct RewritePipeline {
    grammar: QuoteGrammar,
}

impl RewritePipeline {
    pub fn new(grammar: QuoteGrammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &QuoteGrammar {
        &self.grammar
    }

    /// Run the pipeline to completion over `reader`.
    ///
    /// Every line the lexer pulls is fed to the unifier first. No partial
    /// output is returned on failure.
    pub fn run<R: BufRead>(&self, mut reader: R) -> Result<Rewrite, RewriteError> {
        let mut unifier = QuotationUnifier::new(&self.grammar);

        let tokens = pool::with_lexer(|lexer| {
            lexer.tokenize(|| {
                let mut line = Vec::new();
                if reader.read_until(b'\n', &mut line)? == 0 {
                    return Ok(None);
                }
                Ok(Some(unifier.feed(line)))
            })
        })??;

        for token in tokens.iter().filter(|t| t.is_string()) {
            unifier.unify(&token.text, token.start, token.end)?;
        }

        let (data, stats) = unifier.into_parts();
        tracing::debug!(
            literals = stats.literals,
            rewritten = stats.rewritten,
            conflicts = stats.conflicts,
            "pipeline finished"
        );
        Ok(Rewrite { data, stats })
    }

    /// Convenience wrapper over an in-memory source.
    pub fn run_bytes(&self, source: &[u8]) -> Result<Rewrite, RewriteError> {
        self.run(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::PrefixSet;

    fn fix(source: &str) -> String {
        let rewrite = RewritePipeline::default()
            .run_bytes(source.as_bytes())
            .unwrap();
        String::from_utf8(rewrite.data).unwrap()
    }

    #[test]
    fn rewrites_simple_literal() {
        assert_eq!(fix("'foo'\n"), "\"foo\"\n");
    }

    #[test]
    fn leaves_comments_alone() {
        let source = "# 'That's a \"test\"'\nx = 1\n";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn keeps_embedded_quotes() {
        assert_eq!(
            fix("'''Foo 'bar' foobar.'''\n"),
            "\"\"\"Foo 'bar' foobar.\"\"\"\n"
        );
    }

    #[test]
    fn source_without_trailing_newline() {
        assert_eq!(fix("x = 'a'"), "x = \"a\"");
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(fix("a = 'x'\r\nb = 'y'\r\n"), "a = \"x\"\r\nb = \"y\"\r\n");
    }

    #[test]
    fn non_ascii_columns_are_bytes() {
        assert_eq!(fix("s = '\u{e9}' + 'x'\n"), "s = \"\u{e9}\" + \"x\"\n");
    }

    #[test]
    fn stats_and_changed_flag() {
        let rewrite = RewritePipeline::default()
            .run_bytes(b"a = 'x'\nb = \"y\"\nc = 'say \"hi\"'\n")
            .unwrap();
        assert!(rewrite.changed());
        assert_eq!(rewrite.stats.literals, 3);
        assert_eq!(rewrite.stats.rewritten, 1);
        assert_eq!(rewrite.stats.already_double, 1);
        assert_eq!(rewrite.stats.conflicts, 1);

        let clean = RewritePipeline::default().run_bytes(b"b = \"y\"\n").unwrap();
        assert!(!clean.changed());
    }

    #[test]
    fn lex_error_aborts() {
        let err = RewritePipeline::default()
            .run_bytes(b"x = 'a'\ndef (:\n")
            .unwrap_err();
        assert!(matches!(err, RewriteError::Lex(LexError::Syntax { .. })));
    }

    #[test]
    fn prefix_outside_grammar_is_fatal() {
        let pipeline = RewritePipeline::new(QuoteGrammar::new(PrefixSet::new(["r"])));
        let err = pipeline.run_bytes(b"x = b'a'\n").unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Consistency(ConsistencyError::GrammarMismatch { .. })
        ));
    }
}
