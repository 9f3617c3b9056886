use crate::grammar::{PrefixSet, QuoteGrammar, DEFAULT_PREFIXES};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

const MAX_PREFIX_LEN: usize = 3;

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub grammar: GrammarConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarConfig {
    /// Accepted literal prefixes, case-insensitive.
    pub prefixes: Vec<String>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// Extensions selected when walking directories.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string(), "pyi".to_string()],
            exclude: [".git", "__pycache__", ".venv", "venv", ".tox"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.grammar.prefixes.is_empty() {
            issues.push(ValidationIssue::Empty {
                field: "grammar.prefixes",
            });
        }

        let mut seen = HashSet::new();
        for prefix in &self.grammar.prefixes {
            if prefix.is_empty()
                || prefix.len() > MAX_PREFIX_LEN
                || !prefix.bytes().all(|b| b.is_ascii_alphabetic())
            {
                issues.push(ValidationIssue::InvalidPrefix {
                    prefix: prefix.clone(),
                });
            } else if !seen.insert(prefix.to_ascii_lowercase()) {
                issues.push(ValidationIssue::DuplicatePrefix {
                    prefix: prefix.clone(),
                });
            }
        }

        if self.files.extensions.is_empty() {
            issues.push(ValidationIssue::Empty {
                field: "files.extensions",
            });
        }
        for ext in &self.files.extensions {
            if ext.trim().is_empty() || ext.starts_with('.') {
                issues.push(ValidationIssue::InvalidExtension { ext: ext.clone() });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Quote grammar built from the configured prefixes.
    pub fn quote_grammar(&self) -> QuoteGrammar {
        QuoteGrammar::new(PrefixSet::new(&self.grammar.prefixes))
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Empty { field: &'static str },
    InvalidPrefix { prefix: String },
    DuplicatePrefix { prefix: String },
    InvalidExtension { ext: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::InvalidPrefix { prefix } => write!(
                f,
                "invalid prefix '{prefix}': expected 1-{MAX_PREFIX_LEN} ASCII letters"
            ),
            ValidationIssue::DuplicatePrefix { prefix } => {
                write!(f, "prefix '{prefix}' is listed more than once")
            }
            ValidationIssue::InvalidExtension { ext } => {
                write!(f, "invalid extension '{ext}': give it without the leading dot")
            }
        }
    }
}
