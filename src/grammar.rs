//! String-literal quote grammar.
//!
//! A literal is `prefix? run body run`, where `run` is one of `'`, `"`,
//! `'''` or `"""` and the closing run is identical to the opening one.
//! Triple runs take precedence over single runs, so `'''x'''` is one triple
//! quoted literal and never `''` followed by stray text.

use crate::unify::ConsistencyError;
use std::fmt;

pub const SINGLE_QUOTE: u8 = b'\'';
pub const DOUBLE_QUOTE: u8 = b'"';

/// Literal prefixes accepted by default (compared case-insensitively).
pub const DEFAULT_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

/// Quote character family of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteFamily {
    Single,
    Double,
}

impl QuoteFamily {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SINGLE_QUOTE => Some(QuoteFamily::Single),
            DOUBLE_QUOTE => Some(QuoteFamily::Double),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            QuoteFamily::Single => SINGLE_QUOTE,
            QuoteFamily::Double => DOUBLE_QUOTE,
        }
    }
}

/// The quote run opening (and closing) a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuoteRun {
    pub family: QuoteFamily,
    pub triple: bool,
}

impl QuoteRun {
    pub fn width(self) -> usize {
        if self.triple {
            3
        } else {
            1
        }
    }

    pub fn as_str(self) -> &'static str {
        match (self.family, self.triple) {
            (QuoteFamily::Single, false) => "'",
            (QuoteFamily::Single, true) => "'''",
            (QuoteFamily::Double, false) => "\"",
            (QuoteFamily::Double, true) => "\"\"\"",
        }
    }

    /// The same run built from double quotes.
    pub fn to_double(self) -> Self {
        Self {
            family: QuoteFamily::Double,
            triple: self.triple,
        }
    }
}

impl fmt::Display for QuoteRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteMatch<'a> {
    pub prefix: &'a str,
    pub run: QuoteRun,
    pub body: &'a str,
}

impl QuoteMatch<'_> {
    /// Whether rewriting the run to double quotes would let the body close
    /// the literal early.
    pub fn conflicts_with_double(&self) -> bool {
        let body = self.body.as_bytes();
        if self.run.triple {
            let ends_in_quote = body
                .last()
                .is_some_and(|&b| b == DOUBLE_QUOTE && !is_escaped(body, body.len() - 1));
            ends_in_quote || find_unescaped(body, b"\"\"\"")
        } else {
            find_unescaped(body, b"\"")
        }
    }
}

/// Outcome of normalizing one literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Already double-quoted.
    Unchanged,
    /// Same-length rewrite using double quotes.
    Rewrite(String),
    /// Single-quoted, but the body holds double quotes that would end the
    /// literal early. Left as is.
    Conflict,
}

/// Accepted literal prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSet {
    prefixes: Vec<String>,
}

impl PrefixSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, prefix: &str) -> bool {
        prefix.is_empty() || self.prefixes.iter().any(|p| p.eq_ignore_ascii_case(prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

impl Default for PrefixSet {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES)
    }
}

/// Recognizes literal text and produces its double-quoted form.
#[derive(Debug, Clone, Default)]
pub struct QuoteGrammar {
    prefixes: PrefixSet,
}

impl QuoteGrammar {
    pub fn new(prefixes: PrefixSet) -> Self {
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &PrefixSet {
        &self.prefixes
    }

    /// Split `text` into prefix, quote run and body.
    ///
    /// Returns `None` if `text` is not a literal this grammar supports.
    pub fn matches<'a>(&self, text: &'a str) -> Option<QuoteMatch<'a>> {
        let bytes = text.as_bytes();
        let quote_at = bytes.iter().position(|&b| QuoteFamily::from_byte(b).is_some())?;

        let prefix = &text[..quote_at];
        if !prefix.bytes().all(|b| b.is_ascii_alphabetic()) || !self.prefixes.contains(prefix) {
            return None;
        }

        let rest = &bytes[quote_at..];
        let family = QuoteFamily::from_byte(rest[0])?;
        let triple_run = [family.byte(); 3];

        let run = if rest.starts_with(&triple_run) {
            // An opening triple run only closes with a triple run.
            if rest.len() < 6 || !rest.ends_with(&triple_run) {
                return None;
            }
            QuoteRun {
                family,
                triple: true,
            }
        } else {
            if rest.len() < 2 || rest[rest.len() - 1] != family.byte() {
                return None;
            }
            QuoteRun {
                family,
                triple: false,
            }
        };

        let body_start = quote_at + run.width();
        let body_end = text.len() - run.width();
        Some(QuoteMatch {
            prefix,
            run,
            body: &text[body_start..body_end],
        })
    }

    /// Compute the double-quoted replacement for a literal.
    ///
    /// Text that does not match the grammar is a [`ConsistencyError`]: the
    /// lexer classified it as a string literal, so every such token must be
    /// handled.
    pub fn normalize(&self, text: &str) -> Result<Replacement, ConsistencyError> {
        let m = self
            .matches(text)
            .ok_or_else(|| ConsistencyError::GrammarMismatch {
                text: text.to_string(),
            })?;

        match m.run.family {
            QuoteFamily::Double => Ok(Replacement::Unchanged),
            QuoteFamily::Single if m.conflicts_with_double() => Ok(Replacement::Conflict),
            QuoteFamily::Single => {
                let run = m.run.to_double().as_str();
                let mut replaced = String::with_capacity(text.len());
                replaced.push_str(m.prefix);
                replaced.push_str(run);
                replaced.push_str(m.body);
                replaced.push_str(run);
                Ok(Replacement::Rewrite(replaced))
            }
        }
    }
}

/// Whether the byte at `idx` is preceded by an odd number of backslashes.
fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    bytes[..idx].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}

fn find_unescaped(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .enumerate()
        .any(|(idx, window)| window == needle && !is_escaped(haystack, idx))
}
