use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("tree-sitter did not produce a syntax tree")]
    ParseFailed,

    #[error("syntax error at {row}:{column}")]
    Syntax { row: usize, column: usize },

    #[error("token at {row}:{column} is not valid UTF-8: {source}")]
    Encoding {
        row: usize,
        column: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("I/O error while reading source: {0}")]
    Io(#[from] std::io::Error),
}
