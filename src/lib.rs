//! Compile-time HTML compression for Jinja-style templates.
//!
//! Only literal text is rewritten: whitespace between tags is removed or
//! collapsed depending on the elements open around it, preformatted
//! elements (`<pre>`, `<script>`, ...) are left alone, and template
//! directives pass through untouched.
//!
//! ```
//! let html = html_compressor::compress("<ul>\n  <li> one\n  <li> two\n</ul>").unwrap();
//! assert_eq!(html, "<ul> <li> one <li> two </ul>");
//! ```

pub mod compress;
pub mod error;
pub mod generate;
pub mod html;
pub mod parser;

pub use compress::{Compress, Mode, SelectiveCompress, TagStack, normalize};
pub use error::{ErrorKind, Result, StructuralError};
pub use parser::{Token, TokenKind, TokenStream, tokenize};

use serde::Serialize;
use tracing::debug;

/// Configuration for compression.
#[derive(Debug, Clone)]
pub struct Options {
    /// Compress everything, or only between strip markers
    pub mode: Mode,
    /// Keyword opening a compressed region in selective mode
    pub begin_marker: String,
    /// Keyword closing a compressed region in selective mode
    pub end_marker: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Full,
            begin_marker: "strip".to_string(),
            end_marker: "endstrip".to_string(),
        }
    }
}

impl Options {
    /// Default markers, selective mode
    pub fn selective() -> Self {
        Self {
            mode: Mode::Selective,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub input_bytes: usize,
    pub output_bytes: usize,
    /// Literal-text tokens seen in the source
    pub data_tokens: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressResult {
    pub code: String,
    pub stats: Stats,
}

/// Compress a template with the default options.
pub fn compress(source: &str) -> Result<String> {
    compress_with(source, &Options::default()).map(|result| result.code)
}

/// Compress a template, returning the new source and some statistics.
#[tracing::instrument(level = "debug", skip_all, fields(mode = ?options.mode))]
pub fn compress_with(source: &str, options: &Options) -> Result<CompressResult> {
    let tokens = tokenize(source)?;
    let data_tokens = tokens.iter().filter(|t| t.kind == TokenKind::Data).count();

    let tokens = compress_tokens(tokens, options)?;
    let code = generate::emit(&tokens);

    let stats = Stats {
        input_bytes: source.len(),
        output_bytes: code.len(),
        data_tokens,
    };
    debug!(
        input_bytes = stats.input_bytes,
        output_bytes = stats.output_bytes,
        data_tokens,
        "compressed template"
    );

    Ok(CompressResult { code, stats })
}

/// Filter a token stream produced by another lexer.
///
/// Returns the rewritten tokens, or the first structural error.
pub fn compress_tokens<I>(tokens: I, options: &Options) -> Result<Vec<Token>>
where
    I: IntoIterator<Item = Token>,
{
    match options.mode {
        Mode::Full => Compress::new(tokens.into_iter()).collect(),
        Mode::Selective => SelectiveCompress::new(
            tokens.into_iter(),
            options.begin_marker.as_str(),
            options.end_marker.as_str(),
        )
        .collect(),
    }
}
