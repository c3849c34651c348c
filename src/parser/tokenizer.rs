use crate::error::{ErrorKind, Result, StructuralError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref ENDRAW: Regex = Regex::new(r"\{%(-?)\s*endraw\s*-?%\}").unwrap();
}

/// Kind of a template token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Literal text between directives (HTML)
    Data,
    /// `{%`
    BlockBegin,
    /// `%}`
    BlockEnd,
    /// `{{`
    VariableBegin,
    /// `}}`
    VariableEnd,
    /// `{# ... #}`, value is the inner text
    Comment,
    /// Identifier inside a directive
    Name,
    /// Quoted string literal, value keeps its quotes
    String,
    Number,
    Operator,
}

impl TokenKind {
    /// Human readable description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Data => "template data",
            TokenKind::BlockBegin => "begin of statement block",
            TokenKind::BlockEnd => "end of statement block",
            TokenKind::VariableBegin => "begin of print statement",
            TokenKind::VariableEnd => "end of print statement",
            TokenKind::Comment => "comment",
            TokenKind::Name => "name",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
        }
    }
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Line number (1-indexed) where the token starts
    pub lineno: usize,
    /// Source text of the whole directive, delimiters included. Set by the
    /// lexer on `BlockBegin`, `VariableBegin` and `Comment` tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, lineno: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            lineno,
            raw: None,
        }
    }

    /// Attach the directive's source text
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn data(value: impl Into<String>, lineno: usize) -> Self {
        Self::new(TokenKind::Data, value, lineno)
    }

    /// True for a `Name` token with exactly this value
    pub fn test_name(&self, value: &str) -> bool {
        self.kind == TokenKind::Name && self.value == value
    }

    /// Description of the token for error messages, e.g. `name 'x'`
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Name | TokenKind::String | TokenKind::Number | TokenKind::Operator => {
                format!("{} '{}'", self.kind.describe(), self.value)
            }
            _ => self.kind.describe().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Directive {
    Block,
    Variable,
    Comment,
}

impl Directive {
    fn open(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'{', b'%', ..] => Some(Directive::Block),
            [b'{', b'{', ..] => Some(Directive::Variable),
            [b'{', b'#', ..] => Some(Directive::Comment),
            _ => None,
        }
    }

    fn open_text(&self) -> &'static str {
        match self {
            Directive::Block => "{%",
            Directive::Variable => "{{",
            Directive::Comment => "{#",
        }
    }

    fn close(&self) -> &'static str {
        match self {
            Directive::Block => "%}",
            Directive::Variable => "}}",
            Directive::Comment => "#}",
        }
    }

    fn tokens(&self) -> (TokenKind, TokenKind) {
        match self {
            Directive::Block => (TokenKind::BlockBegin, TokenKind::BlockEnd),
            Directive::Variable => (TokenKind::VariableBegin, TokenKind::VariableEnd),
            Directive::Comment => (TokenKind::Comment, TokenKind::Comment),
        }
    }
}

const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", "<=", ">=", "//", "**"];

/// Lexer for Jinja-style templates
pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    /// Set by a `-%}` style close: strip leading whitespace of the next data
    lstrip_next: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            lstrip_next: false,
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.at_eof() {
            match Directive::open(&self.bytes[self.pos..]) {
                Some(directive) => self.tokenize_directive(directive, &mut tokens)?,
                None => self.tokenize_data(&mut tokens),
            }
        }

        Ok(tokens)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Advance over `len` bytes, keeping the line counter in sync
    fn bump(&mut self, len: usize) {
        let end = (self.pos + len).min(self.bytes.len());
        self.line += self.bytes[self.pos..end].iter().filter(|&&b| b == b'\n').count();
        self.pos = end;
    }

    fn tokenize_data(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        let mut end = start;
        while end < self.bytes.len() && Directive::open(&self.bytes[end..]).is_none() {
            end += 1;
        }

        let source = self.source;
        let mut text = &source[start..end];
        if std::mem::take(&mut self.lstrip_next) {
            let trimmed = text.trim_start();
            self.bump(text.len() - trimmed.len());
            text = trimmed;
        }

        // A `{%-` style opener trims the whitespace before it
        if self.bytes.get(end + 2) == Some(&b'-') && Directive::open(&self.bytes[end..]).is_some() {
            text = text.trim_end();
        }

        let lineno = self.line;
        self.bump(end - self.pos);
        if !text.is_empty() {
            tokens.push(Token::data(text, lineno));
        }
    }

    fn tokenize_directive(&mut self, directive: Directive, tokens: &mut Vec<Token>) -> Result<()> {
        let open_line = self.line;
        let start = self.pos;
        let (begin, end) = directive.tokens();
        // `-%}` only trims data that directly follows it
        self.lstrip_next = false;
        self.bump(2);
        if self.bytes.get(self.pos) == Some(&b'-') {
            self.bump(1);
        }

        let close = directive.close();
        let unterminated = || {
            StructuralError::new(
                ErrorKind::UnterminatedDirective,
                format!("Directive opened here is never closed with '{}'", close),
                open_line,
            )
            .with_help(format!("Close it with '{}'", close))
        };

        let source = self.source;
        if directive == Directive::Comment {
            let rest = &source[self.pos..];
            let close_at = rest.find(close).ok_or_else(unterminated)?;
            let mut inner = &rest[..close_at];
            if inner.ends_with('-') {
                inner = &inner[..inner.len() - 1];
                self.lstrip_next = true;
            }
            let comment = Token::new(TokenKind::Comment, inner, open_line);
            self.bump(close_at + close.len());
            tokens.push(comment.with_raw(&source[start..self.pos]));
            return Ok(());
        }

        let begin_at = tokens.len();
        tokens.push(Token::new(begin, directive.open_text(), open_line));

        loop {
            self.skip_whitespace();
            if self.at_eof() {
                return Err(unterminated());
            }

            let rest = &source[self.pos..];
            if rest.starts_with(close) {
                tokens.push(Token::new(end, close, self.line));
                self.bump(close.len());
                break;
            }
            if rest.starts_with('-') && rest[1..].starts_with(close) {
                tokens.push(Token::new(end, close, self.line));
                self.bump(1 + close.len());
                self.lstrip_next = true;
                break;
            }

            let token = self.next_inner_token(rest)?;
            tokens.push(token);
        }

        tokens[begin_at].raw = Some(source[start..self.pos].to_string());
        let opens_raw = directive == Directive::Block
            && matches!(&tokens[begin_at..], [_, keyword, _] if keyword.test_name("raw"));
        if opens_raw {
            self.tokenize_raw_body(open_line, tokens)?;
        }
        Ok(())
    }

    /// Everything up to `{% endraw %}` is literal text, directives included
    fn tokenize_raw_body(&mut self, open_line: usize, tokens: &mut Vec<Token>) -> Result<()> {
        let source = self.source;
        let rest = &source[self.pos..];
        let endraw = ENDRAW.captures(rest).ok_or_else(|| {
            StructuralError::new(
                ErrorKind::UnterminatedDirective,
                "Raw block opened here is never closed with '{% endraw %}'",
                open_line,
            )
            .with_help("Close it with '{% endraw %}'")
        })?;
        let end = endraw.get(0).map_or(rest.len(), |m| m.start());
        let body_end = self.pos + end;

        let mut text = &rest[..end];
        if std::mem::take(&mut self.lstrip_next) {
            let trimmed = text.trim_start();
            self.bump(text.len() - trimmed.len());
            text = trimmed;
        }
        if !endraw[1].is_empty() {
            text = text.trim_end();
        }

        let lineno = self.line;
        self.bump(body_end - self.pos);
        if !text.is_empty() {
            tokens.push(Token::data(text, lineno));
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        let len = self.source[self.pos..]
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(self.source.len() - self.pos);
        self.bump(len);
    }

    fn next_inner_token(&mut self, rest: &str) -> Result<Token> {
        let line = self.line;
        let first = rest.chars().next().unwrap_or_default();

        let (kind, len) = if first.is_alphabetic() || first == '_' {
            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            (TokenKind::Name, len)
        } else if first.is_ascii_digit() {
            (TokenKind::Number, number_literal_len(rest))
        } else if first == '"' || first == '\'' {
            (TokenKind::String, string_literal_len(rest, first).ok_or_else(|| {
                StructuralError::new(
                    ErrorKind::UnterminatedDirective,
                    "String literal is never closed",
                    line,
                )
            })?)
        } else if TWO_CHAR_OPERATORS.iter().any(|op| rest.starts_with(op)) {
            (TokenKind::Operator, 2)
        } else {
            (TokenKind::Operator, first.len_utf8())
        };

        let token = Token::new(kind, &rest[..len], line);
        self.bump(len);
        Ok(token)
    }
}

/// Byte length of a numeric literal: `42`, `1_000`, `2.5`, `1e-5`, `0x1F`,
/// `0o17`, `0b101`
fn number_literal_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let radix = bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B');
    let mut len = 0;
    while let Some(&b) = bytes.get(len) {
        let exponent_sign =
            !radix && matches!(b, b'+' | b'-') && len > 0 && matches!(bytes[len - 1], b'e' | b'E');
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
            len += 1;
        } else {
            break;
        }
    }
    len
}

/// Byte length of a quoted literal including both quotes
fn string_literal_len(rest: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i + c.len_utf8());
        }
    }
    None
}

/// Tokenize a template source
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Tokenizer::new(source).tokenize()
}
