pub mod stream;
pub mod tokenizer;

pub use stream::TokenStream;
pub use tokenizer::{Token, TokenKind, Tokenizer, tokenize};
