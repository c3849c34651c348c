//! Whitespace compression over a template token stream.
//!
//! [`Compress`] rewrites every literal-text token. [`SelectiveCompress`]
//! rewrites only the literal text between `{% strip %}` and `{% endstrip %}`
//! markers, which may nest. Both keep a single [`TagStack`] for the whole
//! stream and stop at the first [`StructuralError`].

mod normalize;
mod stack;

pub use normalize::normalize;
pub use stack::TagStack;

use crate::error::{ErrorKind, Result, StructuralError};
use crate::parser::{Token, TokenKind, TokenStream};
use tracing::debug;

/// Which literal text gets compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Every literal-text token
    #[default]
    Full,
    /// Only literal text inside strip markers
    Selective,
}

/// Iterator adapter compressing every `Data` token of a stream
pub struct Compress<I: Iterator<Item = Token>> {
    tokens: I,
    stack: TagStack,
    failed: bool,
}

impl<I: Iterator<Item = Token>> Compress<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            stack: TagStack::new(),
            failed: false,
        }
    }

    /// Elements left open so far
    pub fn stack(&self) -> &TagStack {
        &self.stack
    }
}

impl<I: Iterator<Item = Token>> Iterator for Compress<I> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let token = self.tokens.next()?;
        if token.kind != TokenKind::Data {
            return Some(Ok(token));
        }

        match normalize(&token.value, &mut self.stack, token.lineno) {
            Ok(value) => Some(Ok(Token::data(value, token.lineno))),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Begin,
    End,
}

/// Iterator adapter compressing `Data` tokens between strip markers.
///
/// Marker directives are consumed and never yielded.
pub struct SelectiveCompress<I: Iterator<Item = Token>> {
    stream: TokenStream<I>,
    stack: TagStack,
    depth: usize,
    begin_marker: String,
    end_marker: String,
    failed: bool,
}

impl<I: Iterator<Item = Token>> SelectiveCompress<I> {
    pub fn new(tokens: I, begin_marker: impl Into<String>, end_marker: impl Into<String>) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            stack: TagStack::new(),
            depth: 0,
            begin_marker: begin_marker.into(),
            end_marker: end_marker.into(),
            failed: false,
        }
    }

    /// Current nesting of strip regions
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stack(&self) -> &TagStack {
        &self.stack
    }

    /// `{%` followed by one of the marker keywords
    fn peek_marker(&mut self) -> Option<Marker> {
        if self.stream.peek()?.kind != TokenKind::BlockBegin {
            return None;
        }
        let keyword = self.stream.look()?;
        if keyword.test_name(&self.begin_marker) {
            Some(Marker::Begin)
        } else if keyword.test_name(&self.end_marker) {
            Some(Marker::End)
        } else {
            None
        }
    }

    fn consume_marker(&mut self, marker: Marker) -> Result<()> {
        self.stream.advance();
        let Some(keyword) = self.stream.advance() else {
            return Ok(());
        };

        match marker {
            Marker::Begin => self.depth += 1,
            Marker::End => {
                self.depth = self.depth.checked_sub(1).ok_or_else(|| {
                    StructuralError::new(
                        ErrorKind::UnexpectedEndMarker,
                        format!("Unexpected tag '{}'", keyword.value),
                        keyword.lineno,
                    )
                    .with_help(format!(
                        "Every '{}' needs an earlier '{}'",
                        self.end_marker, self.begin_marker
                    ))
                })?;
            }
        }
        debug!(marker = %keyword.value, depth = self.depth, lineno = keyword.lineno, "strip marker");

        match self.stream.advance() {
            Some(token) if token.kind == TokenKind::BlockEnd => Ok(()),
            Some(token) => Err(StructuralError::new(
                ErrorKind::MalformedMarker,
                format!("expected end of statement block, got {}", token.describe()),
                token.lineno,
            )
            .with_help(format!("Write the marker as {{% {} %}}", keyword.value))),
            None => Err(StructuralError::new(
                ErrorKind::MalformedMarker,
                "expected end of statement block, got end of template",
                keyword.lineno,
            )),
        }
    }

    fn step(&mut self) -> Result<Option<Token>> {
        while let Some(marker) = self.peek_marker() {
            self.consume_marker(marker)?;
        }

        let Some(token) = self.stream.advance() else {
            return Ok(None);
        };
        if self.depth == 0 || token.kind != TokenKind::Data {
            return Ok(Some(token));
        }

        let value = normalize(&token.value, &mut self.stack, token.lineno)?;
        Ok(Some(Token::data(value, token.lineno)))
    }
}

impl<I: Iterator<Item = Token>> Iterator for SelectiveCompress<I> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;

    fn run_full(source: &str) -> Result<Vec<Token>> {
        Compress::new(tokenize(source)?.into_iter()).collect()
    }

    fn run_selective(source: &str) -> Result<Vec<Token>> {
        SelectiveCompress::new(tokenize(source)?.into_iter(), "strip", "endstrip").collect()
    }

    fn data(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Data)
            .map(|t| t.value.as_str())
            .collect()
    }

    #[test]
    fn test_full_passes_directives_through() {
        let tokens = run_full("<table> {% for r in rows %} <tr>{{ r }}</tr> {% endfor %} </table>").unwrap();
        assert_eq!(data(&tokens), vec!["<table>", "<tr>", "</tr>", "</table>"]);
        assert!(tokens.iter().any(|t| t.test_name("for")));
        assert!(tokens.iter().any(|t| t.test_name("endfor")));
    }

    #[test]
    fn test_full_keeps_line_numbers() {
        let tokens = run_full("<div>\n  {{ a }}\n  <p> b </p>\n</div>").unwrap();
        let lines: Vec<usize> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Data)
            .map(|t| t.lineno)
            .collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_full_stops_after_error() {
        let tokens = tokenize("</div>{{ x }}<p>").unwrap();
        let mut filter = Compress::new(tokens.into_iter());
        assert!(matches!(filter.next(), Some(Err(_))));
        assert!(filter.next().is_none());
    }

    #[test]
    fn test_selective_only_inside_markers() {
        let tokens = run_selective("<div>  a  </div>{% strip %}<div>  b  </div>{% endstrip %}<div>  c  </div>").unwrap();
        assert_eq!(data(&tokens), vec!["<div>  a  </div>", "<div> b </div>", "<div>  c  </div>"]);
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::BlockBegin));
    }

    #[test]
    fn test_selective_nested_depth() {
        let source = "{% strip %}{% strip %}<p> x </p>{% endstrip %}<p>  y  </p>{% endstrip %}<p>  z  </p>";
        let tokens = run_selective(source).unwrap();
        assert_eq!(data(&tokens), vec!["<p> x </p>", "<p> y </p>", "<p>  z  </p>"]);
    }

    #[test]
    fn test_selective_keeps_other_blocks() {
        let tokens = run_selective("{% strip %}{% if a %} <b> x </b> {% endif %}{% endstrip %}").unwrap();
        assert!(tokens.iter().any(|t| t.test_name("if")));
        assert_eq!(data(&tokens), vec!["<b>x</b>"]);
    }

    #[test]
    fn test_selective_unmatched_end() {
        let err = run_selective("<p>\n{% endstrip %}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndMarker);
        assert_eq!(err.line, 2);
        assert!(err.message.contains("endstrip"));
    }

    #[test]
    fn test_selective_malformed_marker() {
        let err = run_selective("{% strip now %}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedMarker);
        assert_eq!(err.message, "expected end of statement block, got name 'now'");
    }

    #[test]
    fn test_selective_custom_markers() {
        let tokens = tokenize("{% squeeze %}<p>  a  </p>{% endsqueeze %}").unwrap();
        let out: Vec<Token> = SelectiveCompress::new(tokens.into_iter(), "squeeze", "endsqueeze")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(data(&out), vec!["<p> a </p>"]);
    }
}
