//! Turn a token stream back into template source.

use crate::parser::{Token, TokenKind};

/// Operators that never need a space before them
const TIGHT_BEFORE: &[&str] = &[".", ",", ")", "]", "|", "(", "["];
/// Operators that never need a space after them
const TIGHT_AFTER: &[&str] = &[".", "(", "[", "|"];

fn is_operator(token: &Token, set: &[&str]) -> bool {
    token.kind == TokenKind::Operator && set.contains(&token.value.as_str())
}

/// Emit template source for `tokens`.
///
/// Literal text is written verbatim. A directive whose opening token
/// carries its source text (everything the lexer produces) is written back
/// byte for byte. Directives built by hand are re-spaced: single spaces
/// between tokens, none around member access, calls, subscripts and
/// filters.
pub fn emit(tokens: &[Token]) -> String {
    let mut output = String::with_capacity(tokens.iter().map(|t| t.value.len() + 1).sum());
    let mut previous: Option<&Token> = None;
    // Closing kind of a directive already written from its source
    let mut skip_until: Option<TokenKind> = None;

    for token in tokens {
        if let Some(close) = skip_until {
            if token.kind == close {
                skip_until = None;
            }
            continue;
        }

        match token.kind {
            TokenKind::Data => output.push_str(&token.value),
            TokenKind::Comment => match &token.raw {
                Some(raw) => output.push_str(raw),
                None => {
                    output.push_str("{#");
                    output.push_str(&token.value);
                    output.push_str("#}");
                }
            },
            TokenKind::BlockBegin | TokenKind::VariableBegin if token.raw.is_some() => {
                output.push_str(token.raw.as_deref().unwrap_or_default());
                skip_until = Some(if token.kind == TokenKind::BlockBegin {
                    TokenKind::BlockEnd
                } else {
                    TokenKind::VariableEnd
                });
            }
            TokenKind::BlockBegin => output.push_str("{%"),
            TokenKind::VariableBegin => output.push_str("{{"),
            TokenKind::BlockEnd => output.push_str(" %}"),
            TokenKind::VariableEnd => output.push_str(" }}"),
            TokenKind::Name | TokenKind::String | TokenKind::Number | TokenKind::Operator => {
                let tight = previous.is_some_and(|p| {
                    p.kind != TokenKind::BlockBegin
                        && p.kind != TokenKind::VariableBegin
                        && (is_operator(p, TIGHT_AFTER) || is_operator(token, TIGHT_BEFORE))
                });
                if !tight {
                    output.push(' ');
                }
                output.push_str(&token.value);
            }
        }
        previous = Some(token);
    }

    output
}
