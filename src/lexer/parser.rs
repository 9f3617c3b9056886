use crate::lexer::errors::LexError;
use crate::lexer::token::{Token, TokenKind};
use crate::position::Position;
use ast_grep_language::{LanguageExt, SupportLang};
use std::io;
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter backed Python lexer.
pub struct PythonLexer {
    parser: Parser,
}

impl PythonLexer {
    pub fn new() -> Result<Self, LexError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::Python.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| LexError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Tokenize the text produced by `next_line`.
    ///
    /// `next_line` is called only when the parser needs text past everything
    /// read so far, and returns `Ok(None)` at end of input. Tokens are
    /// returned in source order.
    pub fn tokenize<F>(&mut self, next_line: F) -> Result<Vec<Token>, LexError>
    where
        F: FnMut() -> io::Result<Option<Vec<u8>>>,
    {
        let mut input = LineInput::new(next_line);
        let tree = self
            .parser
            .parse_with_options(&mut |offset, _| input.chunk_at(offset), None, None);

        if let Some(err) = input.error.take() {
            return Err(LexError::Io(err));
        }
        let tree = tree.ok_or(LexError::ParseFailed)?;
        collect_tokens(&tree, &input.source)
    }

    /// Tokenize an in-memory source.
    pub fn tokenize_str(&mut self, source: &str) -> Result<Vec<Token>, LexError> {
        let mut lines = source.split_inclusive('\n');
        self.tokenize(|| Ok(lines.next().map(|line| line.as_bytes().to_vec())))
    }
}

/// Pull-based input adapter: the source grows one line at a time, on demand.
struct LineInput<F> {
    next_line: F,
    source: Vec<u8>,
    exhausted: bool,
    error: Option<io::Error>,
}

impl<F> LineInput<F>
where
    F: FnMut() -> io::Result<Option<Vec<u8>>>,
{
    fn new(next_line: F) -> Self {
        Self {
            next_line,
            source: Vec::new(),
            exhausted: false,
            error: None,
        }
    }

    /// Text starting at `offset`. An empty chunk signals end of input.
    fn chunk_at(&mut self, offset: usize) -> Vec<u8> {
        while offset >= self.source.len() && !self.exhausted {
            match (self.next_line)() {
                Ok(Some(line)) => self.source.extend_from_slice(&line),
                Ok(None) => self.exhausted = true,
                Err(err) => {
                    // Reported after the parse; the parser just sees EOF.
                    self.error = Some(err);
                    self.exhausted = true;
                }
            }
        }
        self.source
            .get(offset..)
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    }
}

fn collect_tokens(tree: &Tree, source: &[u8]) -> Result<Vec<Token>, LexError> {
    let root = tree.root_node();
    if root.has_error() {
        let start = first_error_node(root).unwrap_or(root).start_position();
        return Err(LexError::Syntax {
            row: start.row + 1,
            column: start.column,
        });
    }

    let mut tokens = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let kind = match node.kind() {
            "string" => Some(TokenKind::String),
            "comment" => Some(TokenKind::Comment),
            _ => None,
        };
        if let Some(kind) = kind {
            tokens.push(to_token(node, kind, source)?);
        }

        // Literals nested in f-string replacement fields belong to the outer token.
        if kind != Some(TokenKind::String) && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Ok(tokens);
            }
        }
    }
}

fn to_token(node: Node<'_>, kind: TokenKind, source: &[u8]) -> Result<Token, LexError> {
    let start = Position::from(node.start_position());
    let end = Position::from(node.end_position());
    let bytes = source
        .get(node.byte_range())
        .ok_or(LexError::ParseFailed)?;
    let text = std::str::from_utf8(bytes).map_err(|source| LexError::Encoding {
        row: start.row,
        column: start.column,
        source,
    })?;

    Ok(Token {
        kind,
        text: text.to_string(),
        start,
        end,
    })
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.is_string())
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn lexes_literals_and_comments_in_order() {
        let mut lexer = PythonLexer::new().unwrap();
        let tokens = lexer
            .tokenize_str("x = 'a'  # it's\ny = b\"c\"\n")
            .unwrap();

        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::String, TokenKind::Comment, TokenKind::String]
        );
        assert_eq!(tokens[0].text, "'a'");
        assert_eq!(tokens[0].start, Position::new(1, 4));
        assert_eq!(tokens[0].end, Position::new(1, 7));
        assert_eq!(tokens[1].text, "# it's");
        assert_eq!(tokens[2].text, "b\"c\"");
        assert_eq!(tokens[2].start, Position::new(2, 4));
    }

    #[test]
    fn multi_line_literal_spans_rows() {
        let mut lexer = PythonLexer::new().unwrap();
        let tokens = lexer
            .tokenize_str("s = '''\nprint('CHILD')\n'''\n")
            .unwrap();

        assert_eq!(strings(&tokens), vec!["'''\nprint('CHILD')\n'''"]);
        assert_eq!(tokens[0].start, Position::new(1, 4));
        assert_eq!(tokens[0].end, Position::new(3, 3));
    }

    #[test]
    fn prefixed_literals_include_prefix() {
        let mut lexer = PythonLexer::new().unwrap();
        let tokens = lexer.tokenize_str("a = rb'x'\nb = u'''y'''\n").unwrap();
        assert_eq!(strings(&tokens), vec!["rb'x'", "u'''y'''"]);
    }

    #[test]
    fn implicit_concatenation_yields_each_literal() {
        let mut lexer = PythonLexer::new().unwrap();
        let tokens = lexer.tokenize_str("x = ('a'\n     'b')\n").unwrap();
        assert_eq!(strings(&tokens), vec!["'a'", "'b'"]);
    }

    #[test]
    fn lines_are_pulled_lazily_and_once() {
        let mut lexer = PythonLexer::new().unwrap();
        let lines = ["a = 'x'\n", "b = 'y'\n"];
        let mut pulled = 0;
        let tokens = lexer
            .tokenize(|| {
                let line = lines.get(pulled).map(|l| l.as_bytes().to_vec());
                if line.is_some() {
                    pulled += 1;
                }
                Ok(line)
            })
            .unwrap();
        assert_eq!(pulled, 2);
        assert_eq!(strings(&tokens), vec!["'x'", "'y'"]);
    }

    #[test]
    fn syntax_error_is_reported() {
        let mut lexer = PythonLexer::new().unwrap();
        let err = lexer.tokenize_str("def (:\n").unwrap_err();
        assert!(matches!(err, LexError::Syntax { row: 1, .. }));
    }

    #[test]
    fn io_error_is_surfaced() {
        let mut lexer = PythonLexer::new().unwrap();
        let err = lexer
            .tokenize(|| Err(io::Error::new(io::ErrorKind::Other, "boom")))
            .unwrap_err();
        assert!(matches!(err, LexError::Io(_)));
    }

    #[test]
    fn empty_source_has_no_tokens() {
        let mut lexer = PythonLexer::new().unwrap();
        assert!(lexer.tokenize_str("").unwrap().is_empty());
    }
}
