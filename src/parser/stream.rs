use super::tokenizer::Token;
use std::collections::VecDeque;

/// Token stream with one token of lookahead past the current one.
///
/// `peek` is the current token, `look` the one after it. Tokens are pulled
/// from the underlying iterator lazily into a small buffer, so nothing is
/// ever rewound.
pub struct TokenStream<I: Iterator<Item = Token>> {
    tokens: I,
    buffer: VecDeque<Token>,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            buffer: VecDeque::with_capacity(2),
        }
    }

    fn fill(&mut self, count: usize) {
        while self.buffer.len() < count {
            match self.tokens.next() {
                Some(token) => self.buffer.push_back(token),
                None => break,
            }
        }
    }

    /// The current token, without consuming it
    pub fn peek(&mut self) -> Option<&Token> {
        self.fill(1);
        self.buffer.front()
    }

    /// The token after the current one
    pub fn look(&mut self) -> Option<&Token> {
        self.fill(2);
        self.buffer.get(1)
    }

    /// Consume and return the current token
    pub fn advance(&mut self) -> Option<Token> {
        self.fill(1);
        self.buffer.pop_front()
    }
}

impl<I: Iterator<Item = Token>> Iterator for TokenStream<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::TokenKind;

    fn name(value: &str) -> Token {
        Token::new(TokenKind::Name, value, 1)
    }

    #[test]
    fn test_peek_and_look() {
        let mut stream = TokenStream::new(vec![name("a"), name("b"), name("c")].into_iter());
        assert!(stream.peek().unwrap().test_name("a"));
        assert!(stream.look().unwrap().test_name("b"));
        assert!(stream.advance().unwrap().test_name("a"));
        assert!(stream.look().unwrap().test_name("c"));
        assert!(stream.advance().unwrap().test_name("b"));
        assert!(stream.look().is_none());
        assert!(stream.advance().unwrap().test_name("c"));
        assert!(stream.peek().is_none());
        assert!(stream.advance().is_none());
    }

    #[test]
    fn test_iterates_in_order() {
        let stream = TokenStream::new(vec![name("x"), name("y")].into_iter());
        let values: Vec<String> = stream.map(|t| t.value).collect();
        assert_eq!(values, vec!["x", "y"]);
    }
}
